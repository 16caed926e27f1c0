use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use uuid::Uuid;

use crate::errors::{AppError, ErrorCode};

/// The acting user, as resolved by the edge (gateway/auth) layer.
///
/// Authentication itself happens upstream of these services; by the time a
/// request arrives here, the caller's identity is carried in the
/// `x-user-id` header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActorId(pub Uuid);

#[axum::async_trait]
impl<S> FromRequestParts<S> for ActorId
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        extract_actor(&parts.headers).map(ActorId)
    }
}

fn extract_actor(headers: &HeaderMap) -> Result<Uuid, AppError> {
    let raw = headers
        .get("x-user-id")
        .ok_or_else(|| AppError::new(ErrorCode::BadRequest, "missing x-user-id header"))?
        .to_str()
        .map_err(|_| AppError::new(ErrorCode::BadRequest, "invalid x-user-id header"))?;

    raw.parse::<Uuid>()
        .map_err(|_| AppError::new(ErrorCode::BadRequest, "x-user-id is not a valid uuid"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn parses_valid_header() {
        let id = Uuid::new_v4();
        let mut headers = HeaderMap::new();
        headers.insert("x-user-id", HeaderValue::from_str(&id.to_string()).unwrap());
        assert_eq!(extract_actor(&headers).unwrap(), id);
    }

    #[test]
    fn rejects_missing_header() {
        let headers = HeaderMap::new();
        assert!(extract_actor(&headers).is_err());
    }

    #[test]
    fn rejects_malformed_uuid() {
        let mut headers = HeaderMap::new();
        headers.insert("x-user-id", HeaderValue::from_static("not-a-uuid"));
        assert!(extract_actor(&headers).is_err());
    }
}
