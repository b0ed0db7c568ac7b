//! Birth facts: the user-supplied inputs everything else derives from.
//!
//! Birth times are interpreted as IST (`Asia/Kolkata`) regardless of the
//! birth place; this mirrors the chart convention the rest of the system
//! is calibrated against.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// The timezone every birth time is interpreted in, regardless of the
/// birth place. The chart convention for this system is IST.
pub const BIRTH_TIMEZONE: &str = "Asia/Kolkata";

/// Birth details collected before an order can be analyzed.
///
/// Immutable once the pipeline starts; the pipeline only reads these.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BirthFacts {
    pub name: String,
    /// Date of birth, `YYYY-MM-DD`.
    pub date_of_birth: String,
    /// Time of birth, `HH:MM` 24-hour, IST.
    pub time_of_birth: String,
    /// Free-form place string, e.g. `"Mumbai, Maharashtra, India"`.
    pub place_of_birth: String,
    /// Caller-supplied coordinates; when present the Location stage uses
    /// them instead of geocoding the place string.
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    /// Life areas to analyze: career, marriage, health, finance, ...
    #[serde(default)]
    pub goals: Vec<String>,
}

impl BirthFacts {
    /// Fields that are required but absent or malformed.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.name.trim().is_empty() {
            missing.push("name");
        }
        if NaiveDate::parse_from_str(self.date_of_birth.trim(), "%Y-%m-%d").is_err() {
            missing.push("date_of_birth");
        }
        if NaiveTime::parse_from_str(self.time_of_birth.trim(), "%H:%M").is_err() {
            missing.push("time_of_birth");
        }
        if self.place_of_birth.trim().is_empty() && self.latitude.is_none() {
            missing.push("place_of_birth");
        }
        missing
    }

    /// Validate all required fields, including coordinate ranges when
    /// coordinates were supplied.
    pub fn validate(&self) -> Result<()> {
        let missing = self.missing_fields();
        if !missing.is_empty() {
            return Err(Error::Validation(format!(
                "missing or malformed birth facts: {}",
                missing.join(", ")
            )));
        }
        if let Some(lat) = self.latitude {
            if !(-90.0..=90.0).contains(&lat) {
                return Err(Error::Validation(format!("latitude out of range: {lat}")));
            }
        }
        if let Some(lon) = self.longitude {
            if !(-180.0..=180.0).contains(&lon) {
                return Err(Error::Validation(format!("longitude out of range: {lon}")));
            }
        }
        Ok(())
    }

    /// Whether the caller supplied explicit coordinates.
    pub fn has_coordinates(&self) -> bool {
        self.latitude.is_some() && self.longitude.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn facts() -> BirthFacts {
        BirthFacts {
            name: "Asha Rao".into(),
            date_of_birth: "1991-04-23".into(),
            time_of_birth: "06:45".into(),
            place_of_birth: "Bengaluru, Karnataka, India".into(),
            latitude: None,
            longitude: None,
            goals: vec!["career".into()],
        }
    }

    #[test]
    fn complete_facts_validate() {
        assert!(facts().validate().is_ok());
        assert!(facts().missing_fields().is_empty());
    }

    #[test]
    fn malformed_date_is_reported() {
        let mut f = facts();
        f.date_of_birth = "23-04-1991".into();
        assert_eq!(f.missing_fields(), vec!["date_of_birth"]);
        let err = f.validate().unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[test]
    fn twelve_hour_time_is_rejected() {
        let mut f = facts();
        f.time_of_birth = "6:45 AM".into();
        assert_eq!(f.missing_fields(), vec!["time_of_birth"]);
    }

    #[test]
    fn coordinates_substitute_for_place() {
        let mut f = facts();
        f.place_of_birth = String::new();
        f.latitude = Some(12.9716);
        f.longitude = Some(77.5946);
        assert!(f.validate().is_ok());
        assert!(f.has_coordinates());
    }

    #[test]
    fn out_of_range_latitude_fails() {
        let mut f = facts();
        f.latitude = Some(123.0);
        f.longitude = Some(77.5946);
        assert!(f.validate().is_err());
    }
}
