//! Per-order conversation state.
//!
//! One [`ConversationState`] exists per order. The pipeline derives its
//! fields in a fixed order; every derived field is append-only: `None`
//! until its owning stage succeeds, then never mutated. Message sequence
//! numbers are assigned here and are strictly increasing, never reused.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::birth::BirthFacts;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Request kind
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// What the order bought: a full report, or a bounded single-question
/// consultation. Fixed at order creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestKind {
    FullReport,
    Query,
}

impl std::fmt::Display for RequestKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::FullReport => write!(f, "full_report"),
            Self::Query => write!(f, "query"),
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Messages
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
    /// Strictly increasing per conversation, assigned by the state.
    pub sequence_number: u32,
    pub timestamp: DateTime<Utc>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Derived artifacts
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Output of the Location stage: resolved coordinates plus the corrected
/// timezone. Set once, never overwritten after first success.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolvedLocation {
    pub place_name: String,
    pub latitude: f64,
    pub longitude: f64,
    /// IANA timezone name, e.g. `"Asia/Kolkata"`.
    pub timezone: String,
}

/// Output of the Chart stage: the raw engine output plus the formatted
/// analysis text downstream stages consume. Computed once per order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartData {
    pub raw: serde_json::Value,
    pub analysis: String,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// ConversationState
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Mutable record of birth facts, derived astrological artifacts, and
/// message history for one order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationState {
    pub birth_facts: BirthFacts,
    pub request_kind: RequestKind,

    #[serde(default)]
    pub location: Option<ResolvedLocation>,
    #[serde(default)]
    pub chart_data: Option<ChartData>,
    #[serde(default)]
    pub dasha_data: Option<String>,
    #[serde(default)]
    pub goal_analysis: Option<String>,
    #[serde(default)]
    pub recommendations: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,

    /// Flips to `true` exactly once, when the terminal stage succeeds.
    #[serde(default)]
    pub analysis_complete: bool,

    #[serde(default)]
    pub messages: Vec<ChatMessage>,
}

impl ConversationState {
    pub fn new(birth_facts: BirthFacts, request_kind: RequestKind) -> Self {
        Self {
            birth_facts,
            request_kind,
            location: None,
            chart_data: None,
            dasha_data: None,
            goal_analysis: None,
            recommendations: None,
            summary: None,
            analysis_complete: false,
            messages: Vec::new(),
        }
    }

    /// Append a message; returns the assigned sequence number.
    pub fn push_message(&mut self, role: Role, content: impl Into<String>) -> u32 {
        let sequence_number = self
            .messages
            .last()
            .map(|m| m.sequence_number + 1)
            .unwrap_or(1);
        self.messages.push(ChatMessage {
            role,
            content: content.into(),
            sequence_number,
            timestamp: Utc::now(),
        });
        sequence_number
    }

    /// Number of user-authored messages (the chat quota dimension).
    pub fn user_message_count(&self) -> u32 {
        self.messages
            .iter()
            .filter(|m| m.role == Role::User)
            .count() as u32
    }

    /// The trailing user message that has no assistant reply yet.
    pub fn pending_user_message(&self) -> Option<&ChatMessage> {
        self.messages
            .last()
            .filter(|m| m.role == Role::User)
    }

    /// Mark the analysis complete. Monotonic, never unset.
    pub fn mark_complete(&mut self) {
        if !self.analysis_complete {
            self.analysis_complete = true;
        }
    }

    /// Set the resolved location unless a prior success already did.
    pub fn set_location(&mut self, location: ResolvedLocation) {
        if self.location.is_none() {
            self.location = Some(location);
        }
    }

    pub fn set_chart(&mut self, chart: ChartData) {
        if self.chart_data.is_none() {
            self.chart_data = Some(chart);
        }
    }

    pub fn set_dasha(&mut self, analysis: String) {
        if self.dasha_data.is_none() {
            self.dasha_data = Some(analysis);
        }
    }

    pub fn set_goal_analysis(&mut self, analysis: String) {
        if self.goal_analysis.is_none() {
            self.goal_analysis = Some(analysis);
        }
    }

    pub fn set_recommendations(&mut self, text: String) {
        if self.recommendations.is_none() {
            self.recommendations = Some(text);
        }
    }

    pub fn set_summary(&mut self, text: String) {
        if self.summary.is_none() {
            self.summary = Some(text);
        }
    }
}
