use serde::{Deserialize, Serialize};

/// Chat quota limits for `query` orders.
///
/// Only `query` orders are bounded; a `full_report` order's
/// post-completion chat is unlimited.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuotaConfig {
    /// Maximum user-authored messages per `query` order. The initiating
    /// query counts as the first one.
    #[serde(default = "d_max_user_messages")]
    pub max_user_messages: u32,
}

impl Default for QuotaConfig {
    fn default() -> Self {
        Self {
            max_user_messages: d_max_user_messages(),
        }
    }
}

fn d_max_user_messages() -> u32 {
    3
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_allows_three_user_messages() {
        assert_eq!(QuotaConfig::default().max_user_messages, 3);
    }
}
