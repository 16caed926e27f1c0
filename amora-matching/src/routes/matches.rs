use std::sync::Arc;

use axum::extract::State;
use axum::Json;

use amora_shared::errors::AppResult;
use amora_shared::middleware::ActorId;
use amora_shared::types::ApiResponse;

use crate::registry::MutualMatch;
use crate::AppState;

/// GET /matches - the caller's mutual matches, most recent first.
pub async fn list_matches(
    ActorId(actor): ActorId,
    State(state): State<Arc<AppState>>,
) -> AppResult<Json<ApiResponse<Vec<MutualMatch>>>> {
    Ok(Json(ApiResponse::ok(state.registry.mutual_matches(actor))))
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    use crate::test_support::test_state;

    #[tokio::test]
    async fn lists_only_mutual_pairs() {
        let (state, _dir) = test_state();
        let me = Uuid::new_v4();
        let mutual = Uuid::new_v4();
        let one_sided = Uuid::new_v4();

        state.registry.like(me, mutual).unwrap();
        state.registry.like(mutual, me).unwrap();
        state.registry.like(me, one_sided).unwrap();

        let response = list_matches(ActorId(me), State(state)).await.unwrap();
        let matches = &response.0.data;
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].other_user_id, mutual);
    }
}
