use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::Deserialize;

use amora_shared::errors::AppResult;
use amora_shared::middleware::ActorId;
use amora_shared::types::{ApiResponse, Paginated, PaginationParams};

use crate::discovery::{self, filter::FilterCriteria};
use crate::models::Profile;
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct BrowseRequest {
    #[serde(default)]
    pub criteria: FilterCriteria,
    #[serde(flatten)]
    pub pagination: PaginationParams,
}

/// POST /browse - ranked candidate discovery for the caller.
pub async fn browse(
    ActorId(actor): ActorId,
    State(state): State<Arc<AppState>>,
    Json(req): Json<BrowseRequest>,
) -> AppResult<Json<ApiResponse<Paginated<Profile>>>> {
    req.criteria.validate()?;

    let requester = state.directory.get_profile(actor).await?;
    let pool = state.directory.list_profiles().await?;

    let mut excluded = state.registry.excluded_for(actor);
    excluded.insert(actor);

    let ranked = discovery::discover(&requester, &req.criteria, &pool, &excluded);

    let total_count = ranked.len() as u64;
    let items: Vec<Profile> = ranked
        .into_iter()
        .skip(req.pagination.offset() as usize)
        .take(req.pagination.limit() as usize)
        .collect();

    tracing::debug!(
        requester = %actor,
        total = total_count,
        page = req.pagination.page,
        "browse served"
    );

    Ok(Json(ApiResponse::ok(Paginated::new(
        items,
        total_count,
        &req.pagination,
    ))))
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    use crate::directory::InMemoryDirectory;
    use crate::models::{Gender, Profile};
    use crate::test_support::test_state;

    fn seed(dir: &InMemoryDirectory, name: &str, age: i32) -> Uuid {
        let profile = Profile::new(Uuid::new_v4(), name, age, Gender::Other);
        let id = profile.user_id;
        dir.insert(profile).unwrap();
        id
    }

    #[tokio::test]
    async fn excludes_self_and_already_decided_users() {
        let (state, dir) = test_state();
        let me = seed(&dir, "me", 30);
        let liked = seed(&dir, "liked", 30);
        let fresh = seed(&dir, "fresh", 30);
        state.registry.like(me, liked).unwrap();

        let response = browse(ActorId(me), State(state), Json(BrowseRequest::default()))
            .await
            .unwrap();
        let page = &response.0.data;
        assert_eq!(page.total_count, 1);
        assert_eq!(page.items[0].user_id, fresh);
    }

    #[tokio::test]
    async fn passed_users_resurface() {
        let (state, dir) = test_state();
        let me = seed(&dir, "me", 30);
        let other = seed(&dir, "other", 30);

        state.registry.like(me, other).unwrap();
        state.registry.pass(me, other);

        let response = browse(ActorId(me), State(state), Json(BrowseRequest::default()))
            .await
            .unwrap();
        assert_eq!(response.0.data.total_count, 1);
    }

    #[tokio::test]
    async fn invalid_criteria_fail_fast() {
        let (state, dir) = test_state();
        let me = seed(&dir, "me", 30);

        let req = BrowseRequest {
            criteria: FilterCriteria {
                min_age: Some(50),
                max_age: Some(20),
                ..FilterCriteria::default()
            },
            pagination: PaginationParams::default(),
        };
        assert!(browse(ActorId(me), State(state), Json(req)).await.is_err());
    }

    #[tokio::test]
    async fn pagination_slices_the_ranked_list() {
        let (state, dir) = test_state();
        let me = seed(&dir, "me", 30);
        for i in 0..5 {
            seed(&dir, &format!("u{i}"), 25);
        }

        let req = BrowseRequest {
            criteria: FilterCriteria::default(),
            pagination: PaginationParams { page: 2, per_page: 2 },
        };
        let response = browse(ActorId(me), State(state), Json(req)).await.unwrap();
        let page = &response.0.data;
        assert_eq!(page.total_count, 5);
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.total_pages, 3);
    }
}
