use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::nutrition::value::Numeric;

/// Height as clients send it: feet and inches, or total inches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Height {
    Split {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        feet: Option<Numeric>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        inches: Option<Numeric>,
    },
    Inches(Numeric),
}

impl Height {
    pub fn total_inches(&self) -> Option<f64> {
        let total = match self {
            Height::Split { feet, inches } => {
                let feet = feet.as_ref().and_then(Numeric::leading).unwrap_or(0.0);
                let inches = inches.as_ref().and_then(Numeric::leading).unwrap_or(0.0);
                feet * 12.0 + inches
            }
            Height::Inches(n) => n.leading()?,
        };
        (total > 0.0).then_some(total)
    }
}

/// Personal and dietary attributes stored per user. Every field is optional
/// and updates only touch the fields present in the request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub residence: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_year: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub birthday: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<Numeric>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<Height>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<Numeric>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub activity_level: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dietary_pattern: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_kosher: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_halal: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allergies: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub health_conditions: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_goal: Option<String>,
}

impl UserProfile {
    pub fn is_empty(&self) -> bool {
        *self == UserProfile::default()
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponse {
    #[serde(flatten)]
    pub profile: UserProfile,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn height_accepts_both_shapes() {
        let split: Height = serde_json::from_value(json!({ "feet": 5, "inches": "10" })).unwrap();
        assert_eq!(split.total_inches(), Some(70.0));

        let total: Height = serde_json::from_value(json!(68)).unwrap();
        assert_eq!(total.total_inches(), Some(68.0));

        let empty: Height = serde_json::from_value(json!({})).unwrap();
        assert_eq!(empty.total_inches(), None);
    }

    #[test]
    fn partial_update_serializes_only_present_fields() {
        let update: UserProfile =
            serde_json::from_value(json!({ "weight": "150", "allergies": ["peanuts"] })).unwrap();
        let v = serde_json::to_value(&update).unwrap();
        let keys: Vec<_> = v.as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys, vec!["allergies".to_string(), "weight".to_string()]);
    }

    #[test]
    fn class_year_is_kept() {
        let update: UserProfile = serde_json::from_value(json!({ "classYear": "2027" })).unwrap();
        assert_eq!(update.class_year.as_deref(), Some("2027"));
        assert_eq!(serde_json::to_value(&update).unwrap(), json!({ "classYear": "2027" }));
    }

    #[test]
    fn unknown_fields_are_dropped() {
        let update: UserProfile = serde_json::from_value(json!({ "favoriteColor": "red" })).unwrap();
        assert!(update.is_empty());
    }
}
