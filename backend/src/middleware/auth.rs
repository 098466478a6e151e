//! Authentication middleware
//!
//! Verifies the bearer token issued by the auth provider and resolves the
//! caller's profile, which scopes every request to exactly one farm.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use jsonwebtoken::{decode, errors::ErrorKind, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use shared::{Language, Role};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::AppState;

/// Authenticated user information, resolved once per request
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub farm_id: Uuid,
    pub role: Role,
    pub language: Language,
}

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Administrative operations (ledger cleanup) are limited to farm admins
    pub fn require_admin(&self) -> AppResult<()> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(AppError::InsufficientPermissions)
        }
    }
}

/// JWT claims structure
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: i64,
    #[serde(default)]
    pub iat: i64,
}

/// Decode and validate a bearer token
pub fn decode_jwt(token: &str, secret: &str) -> AppResult<Claims> {
    let mut validation = Validation::default();
    // provider tokens carry an audience we do not pin
    validation.validate_aud = false;

    decode::<Claims>(token, &DecodingKey::from_secret(secret.as_bytes()), &validation)
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => AppError::TokenExpired,
            _ => AppError::InvalidToken,
        })
}

#[derive(sqlx::FromRow)]
struct Membership {
    farm_id: Uuid,
    role: Role,
    language: String,
}

/// Authentication middleware that validates JWT tokens and loads the profile
pub async fn auth_middleware(
    State(state): State<AppState>,
    bearer: Option<TypedHeader<Authorization<Bearer>>>,
    mut request: Request,
    next: Next,
) -> Response {
    let Some(TypedHeader(Authorization(bearer))) = bearer else {
        return AppError::Unauthorized {
            message: "Missing or invalid Authorization header".to_string(),
            message_ka: "ავტორიზაცია საჭიროა".to_string(),
        }
        .into_response();
    };

    match resolve_user(&state, bearer.token()).await {
        Ok(user) => {
            request.extensions_mut().insert(user);
            next.run(request).await
        }
        Err(e) => e.into_response(),
    }
}

async fn resolve_user(state: &AppState, token: &str) -> AppResult<AuthUser> {
    let claims = decode_jwt(token, &state.config.jwt.secret)?;
    let user_id = Uuid::parse_str(&claims.sub).map_err(|_| AppError::InvalidToken)?;

    let membership = sqlx::query_as::<_, Membership>(
        "SELECT farm_id, role, language FROM profiles WHERE id = $1",
    )
    .bind(user_id)
    .fetch_optional(&state.db)
    .await?
    .ok_or_else(|| AppError::Unauthorized {
        message: "No farm profile for this user".to_string(),
        message_ka: "მომხმარებელს ფერმის პროფილი არ აქვს".to_string(),
    })?;

    Ok(AuthUser {
        user_id,
        farm_id: membership.farm_id,
        role: membership.role,
        language: Language::from_code(&membership.language).unwrap_or_default(),
    })
}

/// Extractor for authenticated user
/// Use this in handlers to get the current user
#[derive(Clone, Debug)]
pub struct CurrentUser(pub AuthUser);

#[axum::async_trait]
impl<S> axum::extract::FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .cloned()
            .map(CurrentUser)
            .ok_or_else(|| AppError::Unauthorized {
                message: "Authentication required".to_string(),
                message_ka: "საჭიროა სისტემაში შესვლა".to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};

    fn token(sub: &str, exp_offset: i64, secret: &str) -> String {
        let now = chrono::Utc::now().timestamp();
        let claims = Claims {
            sub: sub.to_string(),
            exp: now + exp_offset,
            iat: now,
        };
        encode(&Header::default(), &claims, &EncodingKey::from_secret(secret.as_bytes())).unwrap()
    }

    #[test]
    fn valid_token_decodes() {
        let user_id = Uuid::new_v4();
        let claims = decode_jwt(&token(&user_id.to_string(), 3600, "s3cret"), "s3cret").unwrap();
        assert_eq!(claims.sub, user_id.to_string());
    }

    #[test]
    fn expired_token_is_reported_as_expired() {
        let err = decode_jwt(&token("u", -3600, "s3cret"), "s3cret").unwrap_err();
        assert!(matches!(err, AppError::TokenExpired));
    }

    #[test]
    fn wrong_secret_is_invalid() {
        let err = decode_jwt(&token("u", 3600, "one"), "other").unwrap_err();
        assert!(matches!(err, AppError::InvalidToken));
    }

    #[test]
    fn members_cannot_run_admin_operations() {
        let mut user = AuthUser {
            user_id: Uuid::new_v4(),
            farm_id: Uuid::new_v4(),
            role: Role::Member,
            language: Language::Georgian,
        };
        assert!(matches!(user.require_admin(), Err(AppError::InsufficientPermissions)));
        user.role = Role::Admin;
        assert!(user.require_admin().is_ok());
    }
}
