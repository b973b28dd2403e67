//! Bearer-token capability check.

use crate::api::error::ApiError;
use crate::api::AppState;
use crate::config::AppConfig;
use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Admin,
}

/// Tokens accepted by the API. An empty token grants nothing.
#[derive(Debug, Clone, Default)]
pub struct Credentials {
    pub user_token: String,
    pub admin_token: String,
}

impl Credentials {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            user_token: config.api_token.clone(),
            admin_token: config.admin_token.clone(),
        }
    }

    pub fn role_for(&self, token: &str) -> Option<Role> {
        if token.is_empty() {
            None
        } else if token == self.admin_token {
            Some(Role::Admin)
        } else if token == self.user_token {
            Some(Role::User)
        } else {
            None
        }
    }
}

/// Any authenticated caller.
#[derive(Debug, Clone, Copy)]
pub struct AuthUser {
    pub role: Role,
}

/// A caller holding the admin capability.
#[derive(Debug, Clone, Copy)]
pub struct AdminUser;

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, ApiError> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(str::trim)
            .ok_or(ApiError::Unauthorized)?;

        let role = state
            .credentials
            .role_for(token)
            .ok_or(ApiError::Unauthorized)?;
        Ok(Self { role })
    }
}

#[async_trait]
impl FromRequestParts<AppState> for AdminUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, ApiError> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        match user.role {
            Role::Admin => Ok(Self),
            Role::User => Err(ApiError::Forbidden),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_for() {
        let creds = Credentials {
            user_token: "u".into(),
            admin_token: "a".into(),
        };
        assert_eq!(creds.role_for("a"), Some(Role::Admin));
        assert_eq!(creds.role_for("u"), Some(Role::User));
        assert_eq!(creds.role_for("z"), None);
        assert_eq!(creds.role_for(""), None);
    }

    #[test]
    fn test_empty_tokens_grant_nothing() {
        let creds = Credentials::default();
        assert_eq!(creds.role_for(""), None);
        assert_eq!(creds.role_for("anything"), None);
    }
}
