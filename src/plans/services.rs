use super::dto::PlanRequest;
use super::repo_types::PlanInput;
use crate::{
    error::{ApiResult, AppError},
    nutrition::targets::sanitize_metrics,
    text::non_blank,
};

pub const DEFAULT_HISTORY_LIMIT: i64 = 10;
const MAX_HISTORY_LIMIT: i64 = 100;

impl PlanInput {
    /// Rejects an empty body and clamps every metric target.
    pub fn from_request(req: PlanRequest) -> ApiResult<PlanInput> {
        if req.is_empty() {
            return Err(AppError::invalid_request("Plan data is required."));
        }
        Ok(PlanInput {
            preset: non_blank(req.preset),
            preset_name: non_blank(req.preset_name),
            metrics: sanitize_metrics(req.metrics.unwrap_or_default()),
        })
    }
}

pub fn history_limit(limit: Option<i64>) -> i64 {
    match limit {
        Some(n) if n > 0 => n.min(MAX_HISTORY_LIMIT),
        _ => DEFAULT_HISTORY_LIMIT,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use serde_json::json;

    fn input(body: serde_json::Value) -> ApiResult<PlanInput> {
        PlanInput::from_request(serde_json::from_value(body).unwrap())
    }

    #[test]
    fn empty_body_is_rejected() {
        let err = input(json!({})).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidRequest);
        assert_eq!(err.message, "Plan data is required.");
    }

    #[test]
    fn metrics_are_sanitized() {
        let plan = input(json!({
            "preset": "balanced",
            "presetName": "Balanced",
            "metrics": {
                "calories": {"enabled": true, "unit": "kcal", "target": "999999"},
                "protein": {"enabled": true, "unit": "g", "target": -4},
                "fiber": {"enabled": false, "unit": "g", "target": "30"}
            }
        }))
        .unwrap();
        assert_eq!(plan.preset.as_deref(), Some("balanced"));
        assert_eq!(plan.metrics["calories"].target, 10_000.0);
        assert_eq!(plan.metrics["protein"].target, 0.0);
        assert_eq!(plan.metrics["fiber"].target, 30.0);
        assert!(!plan.metrics["fiber"].enabled);
    }

    #[test]
    fn missing_metrics_become_empty() {
        let plan = input(json!({"presetName": "Mine"})).unwrap();
        assert!(plan.metrics.is_empty());
        assert!(plan.preset.is_none());
    }

    #[test]
    fn history_limit_defaults_to_ten() {
        assert_eq!(history_limit(None), 10);
        assert_eq!(history_limit(Some(0)), 10);
        assert_eq!(history_limit(Some(3)), 3);
        assert_eq!(history_limit(Some(5000)), 100);
    }
}
