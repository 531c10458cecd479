use axum::{extract::FromRequestParts, http::request::Parts};

use crate::{
    dto::validation::validate_username,
    error::{AppError, ServiceError},
};

/// Header carrying the opaque user identifier, installed by the session layer
/// in front of this service.
pub const USER_ID_HEADER: &str = "x-user-id";
/// Header carrying the display name that goes with [`USER_ID_HEADER`].
pub const USERNAME_HEADER: &str = "x-username";

/// Reserved identifier for the server-controlled Bingo participant. Disjoint
/// from every human id; requests presenting it are rejected.
pub const BOT_USER_ID: &str = "__bot__";
/// Display name shown for the bot seat.
pub const BOT_USERNAME: &str = "Bot";

/// Authenticated identity attached to every operation. The session and cookie
/// machinery lives outside this service; the room coordinators only ever see
/// this pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: String,
    pub username: String,
}

impl Identity {
    /// The server-controlled Bingo participant.
    pub fn bot() -> Self {
        Self {
            user_id: BOT_USER_ID.to_string(),
            username: BOT_USERNAME.to_string(),
        }
    }

    pub fn is_bot(&self) -> bool {
        self.user_id == BOT_USER_ID
    }
}

/// Read one identity header as UTF-8, rejecting requests that lack it.
fn header_string(parts: &Parts, name: &str) -> Result<String, ServiceError> {
    let value = parts
        .headers
        .get(name)
        .ok_or(ServiceError::Unauthorized)?;

    String::from_utf8(value.as_bytes().to_vec()).map_err(|_| ServiceError::Unauthorized)
}

impl<S> FromRequestParts<S> for Identity
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user_id = header_string(parts, USER_ID_HEADER)?;
        let username = header_string(parts, USERNAME_HEADER)?;

        if user_id.is_empty() || user_id == BOT_USER_ID {
            return Err(AppError(ServiceError::Unauthorized));
        }

        validate_username(&username).map_err(|_| ServiceError::UsernameLength)?;

        Ok(Self { user_id, username })
    }
}

#[cfg(test)]
mod tests {
    use axum::http::Request;

    use super::*;

    fn parts_with(user_id: Option<&str>, username: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri("/");
        if let Some(id) = user_id {
            builder = builder.header(USER_ID_HEADER, id);
        }
        if let Some(name) = username {
            builder = builder.header(USERNAME_HEADER, name);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[tokio::test]
    async fn extracts_identity_from_headers() {
        let mut parts = parts_with(Some("u-1"), Some("alice"));
        let identity = Identity::from_request_parts(&mut parts, &()).await.unwrap();
        assert_eq!(identity.user_id, "u-1");
        assert_eq!(identity.username, "alice");
        assert!(!identity.is_bot());
    }

    #[tokio::test]
    async fn missing_headers_are_unauthorized() {
        let mut parts = parts_with(None, None);
        let err = Identity::from_request_parts(&mut parts, &())
            .await
            .unwrap_err();
        assert_eq!(err.0, ServiceError::Unauthorized);
    }

    #[tokio::test]
    async fn bot_id_cannot_be_presented_by_clients() {
        let mut parts = parts_with(Some(BOT_USER_ID), Some("sneaky"));
        let err = Identity::from_request_parts(&mut parts, &())
            .await
            .unwrap_err();
        assert_eq!(err.0, ServiceError::Unauthorized);
    }

    #[tokio::test]
    async fn overlong_username_is_rejected() {
        let mut parts = parts_with(Some("u-1"), Some("abcdefghijklmnopqrstu"));
        let err = Identity::from_request_parts(&mut parts, &())
            .await
            .unwrap_err();
        assert_eq!(err.0, ServiceError::UsernameLength);
    }
}
