use std::collections::HashMap;
use std::sync::RwLock;
use std::time::Duration;

use async_trait::async_trait;
use uuid::Uuid;

use amora_shared::errors::{AppError, AppResult, ErrorCode};
use amora_shared::types::ApiResponse;

use crate::models::Profile;

/// Minimum age a profile must carry when it enters the directory.
pub const MIN_AGE: i32 = 18;

/// Read-only access to the externally-owned user/profile store.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn get_profile(&self, user_id: Uuid) -> AppResult<Profile>;
    async fn list_profiles(&self) -> AppResult<Vec<Profile>>;
}

// ---------------------------------------------------------------------------
// In-memory implementation (tests, standalone runs)
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct InMemoryDirectory {
    profiles: RwLock<HashMap<Uuid, Profile>>,
}

impl InMemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, profile: Profile) -> AppResult<()> {
        if profile.age < MIN_AGE {
            return Err(AppError::Validation(format!(
                "profile age must be at least {MIN_AGE}"
            )));
        }
        self.profiles
            .write()
            .unwrap()
            .insert(profile.user_id, profile);
        Ok(())
    }
}

#[async_trait]
impl UserDirectory for InMemoryDirectory {
    async fn get_profile(&self, user_id: Uuid) -> AppResult<Profile> {
        self.profiles
            .read()
            .unwrap()
            .get(&user_id)
            .cloned()
            .ok_or_else(|| {
                AppError::new(ErrorCode::ProfileNotFound, format!("profile {user_id} not found"))
            })
    }

    async fn list_profiles(&self) -> AppResult<Vec<Profile>> {
        Ok(self.profiles.read().unwrap().values().cloned().collect())
    }
}

// ---------------------------------------------------------------------------
// HTTP implementation (profile service)
// ---------------------------------------------------------------------------

/// Client for the profile service. Every call is bounded by the configured
/// request timeout; a failed or timed-out read surfaces before any registry
/// state is touched.
pub struct HttpDirectory {
    client: reqwest::Client,
    base_url: String,
}

impl HttpDirectory {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::internal(format!("failed to build http client: {e}")))?;
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Ok(Self { client, base_url })
    }

    fn unavailable(err: impl std::fmt::Display) -> AppError {
        AppError::new(
            ErrorCode::UpstreamUnavailable,
            format!("user directory unavailable: {err}"),
        )
    }
}

#[async_trait]
impl UserDirectory for HttpDirectory {
    async fn get_profile(&self, user_id: Uuid) -> AppResult<Profile> {
        let url = format!("{}/profiles/{user_id}", self.base_url);
        let res = self.client.get(&url).send().await.map_err(Self::unavailable)?;

        if res.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(AppError::new(
                ErrorCode::ProfileNotFound,
                format!("profile {user_id} not found"),
            ));
        }
        if !res.status().is_success() {
            return Err(Self::unavailable(res.status()));
        }

        let body: ApiResponse<Profile> = res.json().await.map_err(Self::unavailable)?;
        Ok(body.data)
    }

    async fn list_profiles(&self) -> AppResult<Vec<Profile>> {
        let url = format!("{}/profiles", self.base_url);
        let res = self.client.get(&url).send().await.map_err(Self::unavailable)?;
        if !res.status().is_success() {
            return Err(Self::unavailable(res.status()));
        }

        let body: ApiResponse<Vec<Profile>> = res.json().await.map_err(Self::unavailable)?;
        Ok(body.data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Gender;

    #[tokio::test]
    async fn in_memory_roundtrip() {
        let dir = InMemoryDirectory::new();
        let profile = Profile::new(Uuid::new_v4(), "ana", 24, Gender::Female);
        let id = profile.user_id;
        dir.insert(profile).unwrap();

        assert_eq!(dir.get_profile(id).await.unwrap().display_name, "ana");
        assert_eq!(dir.list_profiles().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn missing_profile_is_not_found() {
        let dir = InMemoryDirectory::new();
        let err = dir.get_profile(Uuid::new_v4()).await.unwrap_err();
        assert_eq!(err.code_str(), ErrorCode::ProfileNotFound.code());
    }

    #[test]
    fn underage_profile_is_rejected() {
        let dir = InMemoryDirectory::new();
        let profile = Profile::new(Uuid::new_v4(), "kid", 17, Gender::Other);
        assert!(dir.insert(profile).is_err());
    }
}
