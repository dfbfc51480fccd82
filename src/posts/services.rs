use uuid::Uuid;

use super::dto::FollowRequest;
use super::repo_types::{DiningHall, NewPost, PostRow};
use crate::{
    error::{ApiResult, AppError},
    meals::repo_types::MealRow,
    text::non_blank,
};

const DEFAULT_POST_LIMIT: i64 = 50;
const MAX_POST_LIMIT: i64 = 200;

impl NewPost {
    pub fn from_meal(meal: MealRow) -> NewPost {
        NewPost {
            user_id: meal.user_id,
            meal_id: meal.id,
            meal_date: meal.meal_date,
            meal_type: meal.meal_type,
            meal_name: meal.meal_name,
            location_id: meal.location_id,
            location_name: meal.location_name,
            items: meal.items.0,
            totals: meal.totals.0,
            image_url: meal.image_url,
            eaten_at: meal.eaten_at,
        }
    }
}

impl DiningHall {
    pub fn from_request(req: FollowRequest) -> ApiResult<DiningHall> {
        let missing = || AppError::invalid_request("locationId and locationName are required");
        Ok(DiningHall {
            location_id: non_blank(req.location_id).ok_or_else(missing)?,
            location_name: non_blank(req.location_name).ok_or_else(missing)?,
        })
    }
}

pub fn clamp_post_limit(limit: Option<i64>) -> i64 {
    limit.unwrap_or(DEFAULT_POST_LIMIT).clamp(1, MAX_POST_LIMIT)
}

/// Missing posts are 404, posts of another user 403.
pub fn owned_post(row: Option<PostRow>, user_id: Uuid) -> ApiResult<PostRow> {
    let row = row.ok_or_else(|| AppError::not_found("Post not found"))?;
    if row.user_id != user_id {
        return Err(AppError::unauthorized("You can only delete your own posts"));
    }
    Ok(row)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::nutrition::totals::{aggregate, LineItem};
    use crate::posts::dto::Post;
    use serde_json::json;
    use sqlx::types::Json;
    use time::{macros::date, OffsetDateTime};

    fn meal(user_id: Uuid) -> MealRow {
        let items: Vec<LineItem> = serde_json::from_value(json!([
            { "recipeName": "Oatmeal", "calories": 150, "protein": "5g", "quantity": 2 }
        ]))
        .unwrap();
        let totals = aggregate(&items);
        MealRow {
            id: Uuid::new_v4(),
            user_id,
            user_email: "jh@college.harvard.edu".into(),
            meal_date: date!(2025 - 03 - 04),
            meal_type: "breakfast".into(),
            meal_name: "Breakfast".into(),
            location_id: "05".into(),
            location_name: Some("Eliot House".into()),
            items: Json(items),
            totals: Json(totals),
            image_url: None,
            saved_plan_id: None,
            eaten_at: OffsetDateTime::UNIX_EPOCH,
            created_at: OffsetDateTime::UNIX_EPOCH,
            updated_at: OffsetDateTime::UNIX_EPOCH,
        }
    }

    fn post_row(new: NewPost, first_name: Option<&str>) -> PostRow {
        PostRow {
            id: Uuid::new_v4(),
            user_id: new.user_id,
            user_email: "jh@college.harvard.edu".into(),
            user_first_name: first_name.map(Into::into),
            user_last_name: first_name.map(|_| "Harvard".into()),
            meal_id: Some(new.meal_id),
            meal_date: new.meal_date,
            meal_type: new.meal_type,
            meal_name: new.meal_name,
            location_id: new.location_id,
            location_name: new.location_name,
            items: Json(new.items),
            totals: Json(new.totals),
            image_url: new.image_url,
            eaten_at: new.eaten_at,
            created_at: OffsetDateTime::UNIX_EPOCH,
            updated_at: OffsetDateTime::UNIX_EPOCH,
        }
    }

    #[test]
    fn post_copies_the_meal() {
        let user = Uuid::new_v4();
        let source = meal(user);
        let meal_id = source.id;
        let new = NewPost::from_meal(source);
        assert_eq!(new.user_id, user);
        assert_eq!(new.meal_id, meal_id);
        assert_eq!(new.location_name.as_deref(), Some("Eliot House"));
        assert_eq!(new.totals.calories, 300);
        assert_eq!(new.totals.protein, "10.0g");
        assert_eq!(new.items.len(), 1);
    }

    #[test]
    fn post_json_shape() {
        let post: Post = post_row(NewPost::from_meal(meal(Uuid::new_v4())), Some("John")).into();
        let json = serde_json::to_value(&post).unwrap();
        assert_eq!(json["userName"], "John Harvard");
        assert_eq!(json["mealDate"], "2025-03-04");
        assert_eq!(json["locationId"], "05");
        assert_eq!(json["timestamp"], "1970-01-01T00:00:00Z");
        assert!(json.get("imageUrl").is_none());

        let anonymous: Post = post_row(NewPost::from_meal(meal(Uuid::new_v4())), None).into();
        assert_eq!(anonymous.user_name, "jh@college.harvard.edu");
    }

    #[test]
    fn only_the_author_deletes_a_post() {
        let (me, them) = (Uuid::new_v4(), Uuid::new_v4());

        let err = owned_post(None, me).unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);

        let theirs = post_row(NewPost::from_meal(meal(them)), None);
        let err = owned_post(Some(theirs), me).unwrap_err();
        assert_eq!(err.code, ErrorCode::Unauthorized);

        let mine = post_row(NewPost::from_meal(meal(me)), None);
        assert!(owned_post(Some(mine), me).is_ok());
    }

    #[test]
    fn dining_hall_needs_id_and_name() {
        let hall = DiningHall::from_request(FollowRequest {
            location_id: Some(" 05 ".into()),
            location_name: Some("Eliot House".into()),
        })
        .unwrap();
        assert_eq!(hall.location_id, "05");

        let err = DiningHall::from_request(FollowRequest {
            location_id: Some("05".into()),
            location_name: Some("  ".into()),
        })
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidRequest);
        assert!(DiningHall::from_request(FollowRequest::default()).is_err());
    }

    #[test]
    fn post_limit_is_bounded() {
        assert_eq!(clamp_post_limit(None), 50);
        assert_eq!(clamp_post_limit(Some(-3)), 1);
        assert_eq!(clamp_post_limit(Some(10_000)), 200);
    }
}
