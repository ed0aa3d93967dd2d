//! Handlers for the `/habits` resource.
//!
//! Every lookup is scoped to the caller; another user's habit reads as
//! NotFound rather than Forbidden.

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use habitual_core::dates::today_utc;
use habitual_core::error::CoreError;
use habitual_core::habit::{
    generate_public_id, resolve_public_id, HabitFrequency, DEFAULT_COLOR, DEFAULT_ICON,
    DESCRIPTION_MAX_LEN,
};
use habitual_core::types::{DbId, Timestamp};
use habitual_db::models::completion::{Completion, HabitCompletionStats};
use habitual_db::models::habit::{CreateHabit, Habit, UpdateHabit};
use habitual_db::repositories::{CompletionRepo, HabitRepo};
use habitual_events::{EventNotifier, HabitEvent};
use serde::{Deserialize, Deserializer, Serialize};
use validator::{Validate, ValidationError, ValidationErrors};

use crate::error::{AppError, AppResult};
use crate::extract::AppJson;
use crate::middleware::auth::AuthUser;
use crate::response::ApiResponse;
use crate::services::completion;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /habits`.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateHabitRequest {
    #[validate(length(min = 1, max = 100, message = "Habit name must be 1-100 characters"))]
    pub name: String,
    #[validate(length(max = 500, message = "Description cannot exceed 500 characters"))]
    pub description: Option<String>,
    #[serde(default)]
    pub frequency: HabitFrequency,
    #[validate(custom(function = "habitual_core::habit::validate_hex_color"))]
    pub color: Option<String>,
    #[validate(length(min = 1, max = 50, message = "Icon must be 1-50 characters"))]
    pub icon: Option<String>,
    pub reminder_time: Option<Timestamp>,
    #[serde(default)]
    pub is_public: bool,
}

impl CreateHabitRequest {
    fn normalized(mut self) -> Self {
        self.name = self.name.trim().to_string();
        self.description = trim_optional(self.description);
        self.icon = self.icon.map(|i| i.trim().to_string());
        self
    }
}

/// Request body for `PUT /habits/{id}`. Absent keys are left untouched;
/// `null` clears `description` / `reminderTime`.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateHabitRequest {
    #[validate(length(min = 1, max = 100, message = "Habit name must be 1-100 characters"))]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub description: Option<Option<String>>,
    pub frequency: Option<HabitFrequency>,
    #[validate(custom(function = "habitual_core::habit::validate_hex_color"))]
    pub color: Option<String>,
    #[validate(length(min = 1, max = 50, message = "Icon must be 1-50 characters"))]
    pub icon: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub reminder_time: Option<Option<Timestamp>>,
    pub is_public: Option<bool>,
}

impl UpdateHabitRequest {
    fn normalized(mut self) -> Self {
        self.name = self.name.map(|n| n.trim().to_string());
        self.description = self.description.map(trim_optional);
        self.icon = self.icon.map(|i| i.trim().to_string());
        self
    }

    /// Derive-based rules plus the length check on the nullable description.
    fn check(&self) -> Result<(), ValidationErrors> {
        let mut errors = match self.validate() {
            Ok(()) => ValidationErrors::new(),
            Err(errors) => errors,
        };
        if let Some(Some(description)) = &self.description {
            if description.chars().count() as u64 > DESCRIPTION_MAX_LEN {
                let mut err = ValidationError::new("length");
                err.message = Some("Description cannot exceed 500 characters".into());
                errors.add("description", err);
            }
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Optional body for `POST /habits/{id}/complete`.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct CompleteHabitRequest {
    #[validate(custom(function = "habitual_core::dates::validate_date_key"))]
    pub date: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HabitListItem {
    #[serde(flatten)]
    pub habit: Habit,
    pub is_completed_today: bool,
}

#[derive(Debug, Serialize)]
pub struct HabitDetail {
    #[serde(flatten)]
    pub habit: Habit,
    pub stats: HabitCompletionStats,
}

/// What anonymous visitors see of a shared habit.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicHabit {
    pub id: DbId,
    pub name: String,
    pub description: Option<String>,
    pub frequency: String,
    pub color: String,
    pub icon: String,
    pub created_at: Timestamp,
    pub stats: PublicHabitStats,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicHabitStats {
    pub completion_count: i64,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/habits
pub async fn create_habit(
    State(state): State<AppState>,
    auth: AuthUser,
    AppJson(input): AppJson<CreateHabitRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<Habit>>)> {
    let input = input.normalized();
    input.validate()?;

    let habit = HabitRepo::create(
        &state.pool,
        &CreateHabit {
            user_id: auth.user_id,
            name: input.name,
            description: input.description,
            frequency: input.frequency.as_str().to_string(),
            color: input.color.unwrap_or_else(|| DEFAULT_COLOR.to_string()),
            icon: input.icon.unwrap_or_else(|| DEFAULT_ICON.to_string()),
            reminder_time: input.reminder_time,
            is_public: input.is_public,
            public_id: input.is_public.then(generate_public_id),
        },
    )
    .await?;

    tracing::info!(habit_id = habit.id, user_id = auth.user_id, "Habit created");
    state
        .event_bus
        .notify(HabitEvent::habit_created(auth.user_id, habit_payload(&habit)));

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(habit).with_message("Habit created successfully")),
    ))
}

/// GET /api/v1/habits
///
/// Newest first, each flagged with whether it is done for today (UTC).
pub async fn list_habits(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<Json<ApiResponse<Vec<HabitListItem>>>> {
    let habits = HabitRepo::list_for_user(&state.pool, auth.user_id).await?;
    let done_today =
        CompletionRepo::habit_ids_completed_on(&state.pool, auth.user_id, today_utc()).await?;

    let items = habits
        .into_iter()
        .map(|habit| HabitListItem {
            is_completed_today: done_today.contains(&habit.id),
            habit,
        })
        .collect();

    Ok(Json(ApiResponse::ok(items)))
}

/// GET /api/v1/habits/{id}
pub async fn get_habit(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<ApiResponse<HabitDetail>>> {
    let habit = find_owned(&state, id, auth.user_id).await?;
    let stats = CompletionRepo::stats_for_habit(&state.pool, habit.id).await?;
    Ok(Json(ApiResponse::ok(HabitDetail { habit, stats })))
}

/// PUT /api/v1/habits/{id}
///
/// Partial update. Making a habit public assigns a fresh `publicId`;
/// making it private drops it.
pub async fn update_habit(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
    AppJson(input): AppJson<UpdateHabitRequest>,
) -> AppResult<Json<ApiResponse<Habit>>> {
    let input = input.normalized();
    input.check()?;

    let existing = find_owned(&state, id, auth.user_id).await?;

    let changes = UpdateHabit {
        public_id: input
            .is_public
            .map(|public| resolve_public_id(public, existing.public_id.as_deref())),
        name: input.name,
        description: input.description,
        frequency: input.frequency.map(|f| f.as_str().to_string()),
        color: input.color,
        icon: input.icon,
        reminder_time: input.reminder_time,
        is_public: input.is_public,
    };

    let habit = HabitRepo::update(&state.pool, id, auth.user_id, &changes)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Habit",
            id,
        })?;

    tracing::info!(habit_id = id, user_id = auth.user_id, "Habit updated");
    state
        .event_bus
        .notify(HabitEvent::habit_updated(auth.user_id, habit_payload(&habit)));

    Ok(Json(
        ApiResponse::ok(habit).with_message("Habit updated successfully"),
    ))
}

/// DELETE /api/v1/habits/{id}
///
/// Removes the habit together with its completions.
pub async fn delete_habit(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<ApiResponse<()>>> {
    if !HabitRepo::delete(&state.pool, id, auth.user_id).await? {
        return Err(CoreError::NotFound {
            entity: "Habit",
            id,
        }
        .into());
    }

    tracing::info!(habit_id = id, user_id = auth.user_id, "Habit deleted");
    state
        .event_bus
        .notify(HabitEvent::habit_deleted(auth.user_id, id));

    Ok(Json(ApiResponse::message("Habit deleted successfully")))
}

/// POST /api/v1/habits/{id}/complete
///
/// Body `{ "date": "YYYY-MM-DD" }` is optional; the default is today (UTC).
pub async fn complete_habit(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
    body: Bytes,
) -> AppResult<(StatusCode, Json<ApiResponse<Completion>>)> {
    let input: CompleteHabitRequest = if body.iter().all(u8::is_ascii_whitespace) {
        CompleteHabitRequest::default()
    } else {
        serde_json::from_slice(&body)
            .map_err(|e| AppError::BadRequest(format!("Invalid JSON body: {e}")))?
    };
    input.validate()?;

    let completion = completion::mark_complete(
        &state.pool,
        state.event_bus.as_ref(),
        auth.user_id,
        id,
        input.date.as_deref(),
    )
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(completion).with_message("Habit marked as complete")),
    ))
}

/// DELETE /api/v1/habits/{id}/complete/{date}
pub async fn uncomplete_habit(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((id, date)): Path<(DbId, String)>,
) -> AppResult<Json<ApiResponse<()>>> {
    completion::unmark_complete(
        &state.pool,
        state.event_bus.as_ref(),
        auth.user_id,
        id,
        &date,
    )
    .await?;

    Ok(Json(ApiResponse::message("Habit completion removed")))
}

/// GET /api/v1/habits/public/{public_id}
///
/// No authentication.
pub async fn get_public_habit(
    State(state): State<AppState>,
    Path(public_id): Path<String>,
) -> AppResult<Json<ApiResponse<PublicHabit>>> {
    let habit = HabitRepo::find_public(&state.pool, &public_id)
        .await?
        .ok_or_else(|| CoreError::NotFoundByKey {
            entity: "Public habit",
            key: public_id.clone(),
        })?;
    let stats = CompletionRepo::stats_for_habit(&state.pool, habit.id).await?;

    Ok(Json(ApiResponse::ok(PublicHabit {
        id: habit.id,
        name: habit.name,
        description: habit.description,
        frequency: habit.frequency,
        color: habit.color,
        icon: habit.icon,
        created_at: habit.created_at,
        stats: PublicHabitStats {
            completion_count: stats.completion_count,
        },
    })))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn find_owned(state: &AppState, id: DbId, user_id: DbId) -> AppResult<Habit> {
    HabitRepo::find_owned(&state.pool, id, user_id)
        .await?
        .ok_or_else(|| {
            CoreError::NotFound {
                entity: "Habit",
                id,
            }
            .into()
        })
}

/// Best effort: a row that fails to serialize is published as `null`.
fn habit_payload(habit: &Habit) -> serde_json::Value {
    serde_json::to_value(habit).unwrap_or_else(|e| {
        tracing::warn!(habit_id = habit.id, error = %e, "Failed to serialize habit for event");
        serde_json::Value::Null
    })
}

/// Trim, mapping blank strings to `None`.
fn trim_optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Keep `null` distinct from an absent key: absent stays `None` (via
/// `#[serde(default)]`), `null` becomes `Some(None)`.
fn nullable<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
