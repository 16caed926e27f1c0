use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use metrics::counter;
use serde::Deserialize;
use uuid::Uuid;

use amora_shared::errors::AppResult;
use amora_shared::middleware::ActorId;
use amora_shared::types::ApiResponse;

use crate::registry::LikeOutcome;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct SendLikeRequest {
    pub target_id: Uuid,
}

/// POST /likes - one-sided like; reports whether this call completed a
/// mutual match.
pub async fn send_like(
    ActorId(actor): ActorId,
    State(state): State<Arc<AppState>>,
    Json(req): Json<SendLikeRequest>,
) -> AppResult<Json<ApiResponse<LikeOutcome>>> {
    // Both profiles must resolve before the registry is touched; a directory
    // failure here leaves match state untouched.
    state.directory.get_profile(actor).await?;
    state.directory.get_profile(req.target_id).await?;

    let outcome = state.registry.like(actor, req.target_id)?;

    if outcome.newly_mutual {
        counter!("amora_mutual_matches_total").increment(1);
        tracing::info!(
            user_a = %outcome.record.user_a,
            user_b = %outcome.record.user_b,
            "mutual match created"
        );
    }

    Ok(Json(ApiResponse::ok(outcome)))
}

/// DELETE /likes/:target_id - pass on a user, deleting any pair record.
pub async fn pass_user(
    ActorId(actor): ActorId,
    State(state): State<Arc<AppState>>,
    Path(target_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    state.registry.pass(actor, target_id);
    tracing::debug!(actor = %actor, target = %target_id, "pass recorded");
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::InMemoryDirectory;
    use crate::models::{Gender, Profile};
    use crate::test_support::test_state;

    fn seed(dir: &InMemoryDirectory, name: &str) -> Uuid {
        let profile = Profile::new(Uuid::new_v4(), name, 30, Gender::Other);
        let id = profile.user_id;
        dir.insert(profile).unwrap();
        id
    }

    #[tokio::test]
    async fn like_both_ways_reports_newly_mutual_once() {
        let (state, dir) = test_state();
        let a = seed(&dir, "a");
        let b = seed(&dir, "b");

        let first = send_like(
            ActorId(a),
            State(state.clone()),
            Json(SendLikeRequest { target_id: b }),
        )
        .await
        .unwrap();
        assert!(!first.0.data.newly_mutual);

        let second = send_like(
            ActorId(b),
            State(state.clone()),
            Json(SendLikeRequest { target_id: a }),
        )
        .await
        .unwrap();
        assert!(second.0.data.newly_mutual);
    }

    #[tokio::test]
    async fn like_with_unknown_target_fails_before_any_write() {
        let (state, dir) = test_state();
        let a = seed(&dir, "a");
        let ghost = Uuid::new_v4();

        let result = send_like(
            ActorId(a),
            State(state.clone()),
            Json(SendLikeRequest { target_id: ghost }),
        )
        .await;
        assert!(result.is_err());
        assert!(state.registry.excluded_for(a).is_empty());
    }

    #[tokio::test]
    async fn pass_returns_no_content() {
        let (state, dir) = test_state();
        let a = seed(&dir, "a");
        let b = seed(&dir, "b");

        let status = pass_user(ActorId(a), State(state), Path(b)).await.unwrap();
        assert_eq!(status, StatusCode::NO_CONTENT);
    }
}
