use anyhow::Context;
use bytes::Bytes;
use time::Date;
use tracing::warn;
use uuid::Uuid;

use super::dto::{CreateMealRequest, DailySummary, MealSummaryEntry, UpdateMealRequest, UploadedPhoto};
use super::repo_types::{MealChanges, MealRow, NewMeal};
use crate::{
    auth::services::AuthUser,
    dates::parse_iso_date,
    error::{ApiResult, AppError},
    nutrition::totals::{aggregate, NutrientTotals},
    state::AppState,
    text::non_blank,
};

pub const DEFAULT_LIST_LIMIT: i64 = 50;
pub const MAX_LIST_LIMIT: i64 = 500;
const PHOTO_URL_TTL_SECS: u64 = 7 * 24 * 60 * 60;

impl NewMeal {
    /// Checks the required fields and derives the totals from the items.
    pub fn from_request(user: &AuthUser, req: CreateMealRequest) -> ApiResult<NewMeal> {
        let missing =
            || AppError::invalid_request("Missing required fields: mealDate, mealType, locationId, items");

        let meal_date = non_blank(req.meal_date).ok_or_else(missing)?;
        let meal_type = non_blank(req.meal_type).ok_or_else(missing)?;
        let location_id = non_blank(req.location_id).ok_or_else(missing)?;
        let items = req.items.filter(|i| !i.is_empty()).ok_or_else(missing)?;

        let meal_date = parse_iso_date(&meal_date, "mealDate")?;
        let totals = aggregate(&items);
        Ok(NewMeal {
            user_id: user.id,
            user_email: user.email.clone(),
            meal_date,
            meal_name: non_blank(req.meal_name).unwrap_or_else(|| meal_type.clone()),
            meal_type,
            location_id,
            location_name: non_blank(req.location_name),
            items,
            totals,
            image_url: non_blank(req.image_url),
            saved_plan_id: req.saved_plan_id,
            eaten_at: req.eaten_at,
        })
    }
}

impl MealChanges {
    pub fn from_request(req: UpdateMealRequest) -> ApiResult<MealChanges> {
        let meal_date = req
            .meal_date
            .as_deref()
            .map(|raw| parse_iso_date(raw, "mealDate"))
            .transpose()?;

        let items = match req.items {
            Some(items) if items.is_empty() => {
                return Err(AppError::invalid_argument("items must not be empty."))
            }
            other => other,
        };
        let totals = items.as_deref().map(aggregate);

        if let Some(t) = &req.meal_type {
            if t.trim().is_empty() {
                return Err(AppError::invalid_argument("mealType must not be empty."));
            }
        }

        let changes = MealChanges {
            meal_date,
            meal_type: non_blank(req.meal_type),
            meal_name: non_blank(req.meal_name),
            location_id: non_blank(req.location_id),
            location_name: non_blank(req.location_name),
            items,
            totals,
            image_url: non_blank(req.image_url),
            eaten_at: req.eaten_at,
        };
        if changes.is_empty() {
            return Err(AppError::invalid_request("Meal update data is required."));
        }
        Ok(changes)
    }

    pub fn is_empty(&self) -> bool {
        self.meal_date.is_none()
            && self.meal_type.is_none()
            && self.meal_name.is_none()
            && self.location_id.is_none()
            && self.location_name.is_none()
            && self.items.is_none()
            && self.image_url.is_none()
            && self.eaten_at.is_none()
    }
}

pub fn clamp_limit(limit: Option<i64>) -> i64 {
    limit.unwrap_or(DEFAULT_LIST_LIMIT).clamp(1, MAX_LIST_LIMIT)
}

/// Per-meal breakdown plus the day's combined totals.
pub fn daily_summary(date: Date, rows: &[MealRow]) -> DailySummary {
    let mut day = NutrientTotals::default();
    let meals = rows
        .iter()
        .map(|row| {
            day += NutrientTotals::aggregate(row.items.0.iter());
            MealSummaryEntry {
                id: row.id,
                meal_type: row.meal_type.clone(),
                location_name: row.location_name.clone(),
                item_count: row.items.0.len(),
                totals: row.totals.0.clone(),
            }
        })
        .collect::<Vec<_>>();

    DailySummary {
        date,
        meal_count: meals.len(),
        meals,
        daily_totals: day.formatted(),
    }
}

pub fn ext_from_mime(ct: &str) -> Option<&'static str> {
    match ct {
        "image/jpeg" | "image/jpg" => Some("jpg"),
        "image/png" => Some("png"),
        "image/webp" => Some("webp"),
        "image/heic" => Some("heic"),
        _ => None,
    }
}

pub fn photo_key(user_id: Uuid, ext: &str) -> String {
    format!("meals/{}/{}.{}", user_id, Uuid::new_v4(), ext)
}

/// Stores one meal photo and hands back its key with a signed download URL.
pub async fn upload_photo(
    state: &AppState,
    user_id: Uuid,
    body: Bytes,
    content_type: &str,
) -> ApiResult<UploadedPhoto> {
    let ext = ext_from_mime(content_type).ok_or_else(|| {
        AppError::invalid_argument("Photo must be a JPEG, PNG, WebP or HEIC image.")
    })?;
    if body.is_empty() {
        return Err(AppError::invalid_argument("Photo is empty."));
    }
    let max = state.config.max_photo_bytes;
    if body.len() > max {
        return Err(AppError::invalid_argument(format!(
            "Photo exceeds the {max} byte limit."
        )));
    }

    let key = photo_key(user_id, ext);
    state
        .storage
        .put_object(&key, body, content_type)
        .await
        .with_context(|| format!("put_object {}", key))?;
    let url = match state.storage.presign_get(&key, PHOTO_URL_TTL_SECS).await {
        Ok(url) => url,
        Err(err) => {
            // An object nobody can reach is dropped again.
            if let Err(cleanup) = state.storage.delete_object(&key).await {
                warn!(error = ?cleanup, %key, "orphaned photo not removed");
            }
            return Err(err.context(format!("presign url for {}", key)).into());
        }
    };
    Ok(UploadedPhoto { key, url })
}
