use uuid::Uuid;

use super::dto::{CreateMealPlanRequest, MealType, UpdateMealPlanRequest};
use super::repo_types::{MealPlanChanges, MealPlanRow, NewMealPlan};
use crate::{
    dates::parse_iso_date,
    error::{ApiResult, AppError},
    text::non_blank,
};

/// Parses a breakfast/lunch/dinner meal type, ignoring case.
pub fn parse_meal_type(raw: &str) -> ApiResult<MealType> {
    raw.parse()
        .map_err(|_| AppError::invalid_argument("Invalid mealType. Must be breakfast, lunch, or dinner"))
}

impl NewMealPlan {
    pub fn from_request(req: CreateMealPlanRequest) -> ApiResult<NewMealPlan> {
        let missing = || {
            AppError::invalid_request(
                "Missing required fields: date, mealType, locationId, locationName, and selectedItems array",
            )
        };
        let date = non_blank(req.date).ok_or_else(missing)?;
        let meal_type = non_blank(req.meal_type).ok_or_else(missing)?;
        let location_id = non_blank(req.location_id).ok_or_else(missing)?;
        let location_name = non_blank(req.location_name).ok_or_else(missing)?;
        let selected_items = req.selected_items.ok_or_else(missing)?;

        Ok(NewMealPlan {
            plan_date: parse_iso_date(&date, "date")?,
            meal_type: parse_meal_type(&meal_type)?,
            location_id,
            location_name,
            selected_items,
        })
    }
}

impl MealPlanChanges {
    pub fn from_request(req: UpdateMealPlanRequest) -> ApiResult<MealPlanChanges> {
        Ok(MealPlanChanges {
            plan_date: req
                .date
                .as_deref()
                .map(|d| parse_iso_date(d, "date"))
                .transpose()?,
            meal_type: req.meal_type.as_deref().map(parse_meal_type).transpose()?,
            location_id: non_blank(req.location_id),
            location_name: non_blank(req.location_name),
            selected_items: req.selected_items,
        })
    }
}

/// Missing plans are 404, plans of another user 403.
pub fn owned_meal_plan(row: Option<MealPlanRow>, user_id: Uuid) -> ApiResult<MealPlanRow> {
    let row = row.ok_or_else(|| AppError::not_found("Meal plan not found"))?;
    if row.user_id != user_id {
        return Err(AppError::unauthorized(
            "You can only access your own meal plans",
        ));
    }
    Ok(row)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use serde_json::json;
    use sqlx::types::Json;
    use time::{macros::date, OffsetDateTime};

    fn new_plan(body: serde_json::Value) -> ApiResult<NewMealPlan> {
        NewMealPlan::from_request(serde_json::from_value(body).unwrap())
    }

    #[test]
    fn meal_type_is_case_insensitive_and_ordered() {
        assert_eq!(parse_meal_type("Dinner").unwrap(), MealType::Dinner);
        assert_eq!(parse_meal_type(" BREAKFAST ").unwrap(), MealType::Breakfast);
        assert_eq!(
            parse_meal_type("brunch").unwrap_err().code,
            ErrorCode::InvalidArgument
        );
        let mut types = vec![MealType::Dinner, MealType::Breakfast, MealType::Lunch];
        types.sort();
        assert_eq!(types, vec![MealType::Breakfast, MealType::Lunch, MealType::Dinner]);
        assert_eq!(serde_json::to_value(MealType::Lunch).unwrap(), "lunch");
    }

    #[test]
    fn create_requires_every_field() {
        let err = new_plan(json!({
            "date": "2025-03-09", "mealType": "lunch", "locationId": "05"
        }))
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidRequest);

        let plan = new_plan(json!({
            "date": "2025-03-09",
            "mealType": "Lunch",
            "locationId": "05",
            "locationName": "Annenberg",
            "selectedItems": [{"ID": "123", "Recipe_Name": "Oatmeal"}]
        }))
        .unwrap();
        assert_eq!(plan.plan_date, date!(2025 - 03 - 09));
        assert_eq!(plan.meal_type, MealType::Lunch);
        assert_eq!(plan.selected_items.len(), 1);
    }

    #[test]
    fn update_validates_date_and_type() {
        let req: UpdateMealPlanRequest = serde_json::from_value(json!({"mealType": "snack"})).unwrap();
        assert!(MealPlanChanges::from_request(req).is_err());

        let req: UpdateMealPlanRequest =
            serde_json::from_value(json!({"date": "2025-03-10", "locationName": "Quincy"})).unwrap();
        let changes = MealPlanChanges::from_request(req).unwrap();
        assert_eq!(changes.plan_date, Some(date!(2025 - 03 - 10)));
        assert_eq!(changes.location_name.as_deref(), Some("Quincy"));
        assert!(changes.meal_type.is_none());
    }

    #[test]
    fn ownership_distinguishes_missing_and_foreign() {
        let owner = Uuid::new_v4();
        let now = OffsetDateTime::now_utc();
        let row = MealPlanRow {
            id: Uuid::new_v4(),
            user_id: owner,
            plan_date: date!(2025 - 03 - 09),
            meal_type: "lunch".into(),
            location_id: "05".into(),
            location_name: "Annenberg".into(),
            selected_items: Json(vec![]),
            created_at: now,
            updated_at: now,
        };

        assert_eq!(
            owned_meal_plan(None, owner).unwrap_err().code,
            ErrorCode::NotFound
        );
        assert_eq!(
            owned_meal_plan(Some(row.clone()), Uuid::new_v4()).unwrap_err().code,
            ErrorCode::Unauthorized
        );
        assert_eq!(owned_meal_plan(Some(row), owner).unwrap().user_id, owner);
    }

    #[test]
    fn non_database_errors_are_not_unique_violations() {
        let err = anyhow::anyhow!("boom");
        assert!(!super::super::repo::is_unique_violation(&err));
    }
}
