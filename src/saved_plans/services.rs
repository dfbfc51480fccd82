use uuid::Uuid;

use super::dto::{CreateSavedPlanRequest, UpdateSavedPlanRequest};
use super::repo_types::{NewSavedPlan, SavedPlanChanges, SavedPlanRow};
use crate::{
    error::{ApiResult, AppError},
    meal_plans::services::parse_meal_type,
    text::non_blank,
};

const MAX_STARS: i32 = 5;

fn check_stars(stars: i32) -> ApiResult<i32> {
    if !(0..=MAX_STARS).contains(&stars) {
        return Err(AppError::invalid_argument(format!(
            "stars must be between 0 and {MAX_STARS}."
        )));
    }
    Ok(stars)
}

impl NewSavedPlan {
    pub fn from_request(req: CreateSavedPlanRequest) -> ApiResult<NewSavedPlan> {
        let missing = || {
            AppError::invalid_request(
                "Missing required fields: title, mealType, locationId, locationName, and selectedItems array",
            )
        };
        let title = non_blank(req.title).ok_or_else(missing)?;
        let meal_type = non_blank(req.meal_type).ok_or_else(missing)?;
        let location_id = non_blank(req.location_id).ok_or_else(missing)?;
        let location_name = non_blank(req.location_name).ok_or_else(missing)?;
        let selected_items = req.selected_items.ok_or_else(missing)?;

        Ok(NewSavedPlan {
            title,
            meal_type: parse_meal_type(&meal_type)?,
            location_id,
            location_name,
            selected_items,
            image: non_blank(req.image),
            stars: check_stars(req.stars.unwrap_or(0))?,
        })
    }
}

impl SavedPlanChanges {
    pub fn from_request(req: UpdateSavedPlanRequest) -> ApiResult<SavedPlanChanges> {
        if matches!(&req.title, Some(t) if t.trim().is_empty()) {
            return Err(AppError::invalid_argument("title must not be empty."));
        }
        Ok(SavedPlanChanges {
            title: non_blank(req.title),
            meal_type: req.meal_type.as_deref().map(parse_meal_type).transpose()?,
            location_id: non_blank(req.location_id),
            location_name: non_blank(req.location_name),
            selected_items: req.selected_items,
            image: non_blank(req.image),
            stars: req.stars.map(check_stars).transpose()?,
        })
    }
}

/// Missing templates are 404, templates of another user 403.
pub fn owned_saved_plan(row: Option<SavedPlanRow>, user_id: Uuid) -> ApiResult<SavedPlanRow> {
    let row = row.ok_or_else(|| AppError::not_found("Saved meal plan not found"))?;
    if row.user_id != user_id {
        return Err(AppError::unauthorized(
            "You can only access your own saved meal plans",
        ));
    }
    Ok(row)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::meal_plans::dto::MealType;
    use crate::saved_plans::dto::SavedMealPlan;
    use serde_json::json;
    use sqlx::types::Json;
    use time::OffsetDateTime;

    fn row(owner: Uuid) -> SavedPlanRow {
        let now = OffsetDateTime::now_utc();
        SavedPlanRow {
            id: Uuid::new_v4(),
            user_id: owner,
            title: "Usual breakfast".into(),
            meal_type: "breakfast".into(),
            location_id: "05".into(),
            location_name: "Annenberg".into(),
            selected_items: Json(vec![json!({"ID": "1"})]),
            image: None,
            stars: 4,
            usage_count: 2,
            logged_meal_count: 3,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn create_validates_and_defaults() {
        let plan = NewSavedPlan::from_request(
            serde_json::from_value(json!({
                "title": "  Usual breakfast ",
                "mealType": "Breakfast",
                "locationId": "05",
                "locationName": "Annenberg",
                "selectedItems": []
            }))
            .unwrap(),
        )
        .unwrap();
        assert_eq!(plan.title, "Usual breakfast");
        assert_eq!(plan.meal_type, MealType::Breakfast);
        assert_eq!(plan.stars, 0);

        let err = NewSavedPlan::from_request(
            serde_json::from_value(json!({"title": "x", "mealType": "lunch"})).unwrap(),
        )
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidRequest);
    }

    #[test]
    fn stars_are_bounded() {
        let req: UpdateSavedPlanRequest = serde_json::from_value(json!({"stars": 9})).unwrap();
        assert_eq!(
            SavedPlanChanges::from_request(req).unwrap_err().code,
            ErrorCode::InvalidArgument
        );
        let req: UpdateSavedPlanRequest = serde_json::from_value(json!({"stars": 5})).unwrap();
        assert_eq!(SavedPlanChanges::from_request(req).unwrap().stars, Some(5));
    }

    #[test]
    fn update_ignores_counters_and_owner() {
        let req: UpdateSavedPlanRequest = serde_json::from_value(json!({
            "usageCount": 100,
            "userId": Uuid::new_v4(),
            "title": "Renamed"
        }))
        .unwrap();
        let changes = SavedPlanChanges::from_request(req).unwrap();
        assert_eq!(changes.title.as_deref(), Some("Renamed"));
        assert!(changes.meal_type.is_none());
    }

    #[test]
    fn foreign_templates_are_unauthorized() {
        let owner = Uuid::new_v4();
        assert_eq!(
            owned_saved_plan(None, owner).unwrap_err().code,
            ErrorCode::NotFound
        );
        let err = owned_saved_plan(Some(row(owner)), Uuid::new_v4()).unwrap_err();
        assert_eq!(err.code, ErrorCode::Unauthorized);
        assert_eq!(err.code.status(), axum::http::StatusCode::FORBIDDEN);
        assert!(owned_saved_plan(Some(row(owner)), owner).is_ok());
    }

    #[test]
    fn template_serializes_logged_meal_count() {
        let json = serde_json::to_value(SavedMealPlan::from(row(Uuid::new_v4()))).unwrap();
        assert_eq!(json["loggedMealCount"], 3);
        assert_eq!(json["usageCount"], 2);
        assert_eq!(json["mealType"], "breakfast");
    }
}
