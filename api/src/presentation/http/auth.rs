use crate::application::use_cases::auth::login::{Login as LoginUc, LoginRequest as LoginDto};
use crate::application::use_cases::auth::register::{
    Register as RegisterUc, RegisterRequest as RegisterDto,
};
use crate::application::use_cases::auth::step_up::{StepUp as StepUpUc, has_step_up};
use crate::application::use_cases::users::profile::GetProfile;
use crate::bootstrap::app_context::AppContext;
use crate::bootstrap::config::Config;
use crate::domain::users::user::{Role, User};
use crate::presentation::http::error::{ApiError, ApiJson};
use crate::presentation::http::response::{
    ApiResult, Created, Envelope, created, ok, with_message,
};
use axum::{
    Json, Router,
    extract::{FromRequestParts, State},
    http::{HeaderMap, HeaderValue, StatusCode, header, request::Parts},
    routing::{get, post},
};
use chrono::{DateTime, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Deserialize, ToSchema)]
pub struct RegisterRequest {
    pub email: String,
    pub username: String,
    pub full_name: String,
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UserResponse {
    pub id: Uuid,
    pub email: String,
    pub username: String,
    pub full_name: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            email: u.email,
            username: u.username,
            full_name: u.full_name,
            role: u.role.as_str().to_string(),
            created_at: u.created_at,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    /// Email or username
    pub identifier: String,
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    pub access_token: String,
    pub expires_in: i64,
    pub user: UserResponse,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct StepUpRequest {
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct StepUpResponse {
    pub expires_in: u64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub role: String,
    pub exp: usize,
}

pub fn routes(ctx: AppContext) -> Router {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/step-up", post(step_up))
        .route("/me", get(me))
        .with_state(ctx)
}

#[utoipa::path(post, path = "/v1/auth/register", tag = "Auth", request_body = RegisterRequest, security(()), responses(
    (status = 201, body = UserResponse)
))]
pub async fn register(
    State(ctx): State<AppContext>,
    ApiJson(req): ApiJson<RegisterRequest>,
) -> Created<UserResponse> {
    let repo = ctx.user_repo();
    let uc = RegisterUc {
        repo: repo.as_ref(),
    };
    let dto = RegisterDto {
        email: req.email,
        username: req.username,
        full_name: req.full_name,
        password: req.password,
    };
    let user = uc.execute(&dto).await?;
    Ok(created(user.into()))
}

#[utoipa::path(post, path = "/v1/auth/login", tag = "Auth", request_body = LoginRequest, security(()), responses(
    (status = 200, body = LoginResponse)
))]
pub async fn login(
    State(ctx): State<AppContext>,
    ApiJson(req): ApiJson<LoginRequest>,
) -> Result<(HeaderMap, Json<Envelope<LoginResponse>>), ApiError> {
    let repo = ctx.user_repo();
    let uc = LoginUc {
        repo: repo.as_ref(),
    };
    let dto = LoginDto {
        identifier: req.identifier,
        password: req.password,
    };
    let user = uc.execute(&dto).await?;
    let token = issue_token(&ctx.cfg, user.id, user.role)?;

    // Browsers get the token as an HttpOnly cookie as well
    let mut headers = HeaderMap::new();
    let cookie = build_access_cookie(&token, ctx.cfg.jwt_expires_secs, secure_cookies(&ctx.cfg));
    if let Ok(value) = HeaderValue::from_str(&cookie) {
        headers.insert(header::SET_COOKIE, value);
    }

    Ok((
        headers,
        with_message(
            "login success",
            LoginResponse {
                access_token: token,
                expires_in: ctx.cfg.jwt_expires_secs,
                user: user.into(),
            },
        ),
    ))
}

#[utoipa::path(post, path = "/v1/auth/logout", tag = "Auth", responses((status = 204)))]
pub async fn logout(State(ctx): State<AppContext>) -> (HeaderMap, StatusCode) {
    let mut headers = HeaderMap::new();
    let cookie = if secure_cookies(&ctx.cfg) {
        "access_token=; HttpOnly; Secure; Path=/; Max-Age=0; SameSite=Lax"
    } else {
        "access_token=; HttpOnly; Path=/; Max-Age=0; SameSite=Lax"
    };
    headers.insert(header::SET_COOKIE, HeaderValue::from_static(cookie));
    (headers, StatusCode::NO_CONTENT)
}

#[utoipa::path(post, path = "/v1/auth/step-up", tag = "Auth", request_body = StepUpRequest, responses(
    (status = 200, body = StepUpResponse)
))]
pub async fn step_up(
    State(ctx): State<AppContext>,
    user: AuthUser,
    ApiJson(req): ApiJson<StepUpRequest>,
) -> ApiResult<StepUpResponse> {
    let repo = ctx.user_repo();
    let cache = ctx.cache();
    let uc = StepUpUc {
        repo: repo.as_ref(),
        cache: cache.as_ref(),
        ttl_secs: ctx.cfg.step_up_expires_secs,
    };
    let expires_in = uc.execute(user.id, &req.password).await?;
    Ok(ok(StepUpResponse { expires_in }))
}

#[utoipa::path(get, path = "/v1/auth/me", tag = "Auth", responses((status = 200, body = UserResponse)))]
pub async fn me(State(ctx): State<AppContext>, user: AuthUser) -> ApiResult<UserResponse> {
    let repo = ctx.user_repo();
    let uc = GetProfile {
        repo: repo.as_ref(),
    };
    let (row, _) = uc.execute(user.id).await?;
    Ok(ok(row.into()))
}

// --- Bearer extractor & JWT utils ---

pub struct Bearer(pub String);

#[axum::async_trait]
impl<S> FromRequestParts<S> for Bearer
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // 1) Prefer Authorization header if present
        if let Some(auth) = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
        {
            if let Some(t) = auth.strip_prefix("Bearer ") {
                return Ok(Bearer(t.trim().to_string()));
            }
        }

        // 2) Fallback to HttpOnly cookie `access_token`
        if let Some(cookie_hdr) = parts
            .headers
            .get(header::COOKIE)
            .and_then(|v| v.to_str().ok())
        {
            if let Some(token) = get_cookie(cookie_hdr, "access_token") {
                return Ok(Bearer(token));
            }
        }

        Err(ApiError::unauthorized())
    }
}

/// Authenticated caller resolved from a valid access token.
#[derive(Debug, Clone, Copy)]
pub struct AuthUser {
    pub id: Uuid,
    pub role: Role,
}

#[axum::async_trait]
impl FromRequestParts<AppContext> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        ctx: &AppContext,
    ) -> Result<Self, Self::Rejection> {
        let bearer = Bearer::from_request_parts(parts, ctx).await?;
        validate_token(&ctx.cfg, &bearer.0)
    }
}

/// Caller who re-entered their password within the step-up window.
#[derive(Debug, Clone, Copy)]
pub struct StepUpUser(pub AuthUser);

#[axum::async_trait]
impl FromRequestParts<AppContext> for StepUpUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        ctx: &AppContext,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, ctx).await?;
        let cache = ctx.cache();
        if !has_step_up(cache.as_ref(), user.id).await? {
            return Err(ApiError::new(
                StatusCode::UNAUTHORIZED,
                "STEP_UP_REQUIRED",
                "confirm your password first",
            ));
        }
        Ok(StepUpUser(user))
    }
}

#[derive(Debug, Clone, Copy)]
pub struct AdminUser(pub AuthUser);

#[axum::async_trait]
impl FromRequestParts<AppContext> for AdminUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        ctx: &AppContext,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, ctx).await?;
        if user.role != Role::Admin {
            return Err(ApiError::forbidden("admin only"));
        }
        Ok(AdminUser(user))
    }
}

pub(crate) fn issue_token(cfg: &Config, user_id: Uuid, role: Role) -> Result<String, ApiError> {
    let now = Utc::now().timestamp() as usize;
    let claims = Claims {
        sub: user_id.to_string(),
        role: role.as_str().to_string(),
        exp: now + (cfg.jwt_expires_secs.max(0) as usize),
    };
    jsonwebtoken::encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(cfg.jwt_secret.as_bytes()),
    )
    .map_err(|e| ApiError::internal(e.into()))
}

pub(crate) fn validate_token(cfg: &Config, token: &str) -> Result<AuthUser, ApiError> {
    let data = jsonwebtoken::decode::<Claims>(
        token,
        &DecodingKey::from_secret(cfg.jwt_secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|_| ApiError::unauthorized())?;
    let id = Uuid::parse_str(&data.claims.sub).map_err(|_| ApiError::unauthorized())?;
    Ok(AuthUser {
        id,
        role: Role::parse(&data.claims.role),
    })
}

// --- Cookie helpers ---

fn secure_cookies(cfg: &Config) -> bool {
    cfg.frontend_url
        .as_deref()
        .map(|u| u.starts_with("https://"))
        .unwrap_or(false)
}

fn get_cookie(cookie_header: &str, name: &str) -> Option<String> {
    for part in cookie_header.split(';') {
        let kv = part.trim();
        if let Some((k, v)) = kv.split_once('=') {
            if k.trim() == name {
                return Some(v.trim().to_string());
            }
        }
    }
    None
}

fn build_access_cookie(token: &str, max_age_secs: i64, secure: bool) -> String {
    let secure_attr = if secure { "; Secure" } else { "" };
    format!(
        "access_token={}; HttpOnly{}; Path=/; Max-Age={}; SameSite=Lax",
        token,
        secure_attr,
        max_age_secs.max(0)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg() -> Config {
        Config {
            api_port: 8080,
            frontend_url: Some("https://shop.example.com".into()),
            database_url: "postgres://localhost/marketplace".into(),
            db_max_connections: 5,
            redis_url: None,
            jwt_secret: "test-secret".into(),
            jwt_expires_secs: 3600,
            step_up_expires_secs: 300,
            encryption_key: "0".repeat(64),
            cache_ttl_secs: 60,
            is_production: false,
        }
    }

    #[test]
    fn token_round_trip_keeps_role() {
        let cfg = cfg();
        let id = Uuid::new_v4();
        let token = issue_token(&cfg, id, Role::Admin).unwrap();
        let user = validate_token(&cfg, &token).unwrap();
        assert_eq!(user.id, id);
        assert_eq!(user.role, Role::Admin);
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() {
        let mut other = cfg();
        other.jwt_secret = "another-secret".into();
        let token = issue_token(&other, Uuid::new_v4(), Role::User).unwrap();
        let err = validate_token(&cfg(), &token).unwrap_err();
        assert_eq!(err.status, StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn cookie_lookup_and_format() {
        let header = "theme=dark; access_token=abc.def.ghi ; lang=id";
        assert_eq!(get_cookie(header, "access_token").as_deref(), Some("abc.def.ghi"));
        assert_eq!(get_cookie(header, "missing"), None);

        let cookie = build_access_cookie("tok", 3600, secure_cookies(&cfg()));
        assert_eq!(
            cookie,
            "access_token=tok; HttpOnly; Secure; Path=/; Max-Age=3600; SameSite=Lax"
        );
        assert!(!build_access_cookie("tok", -5, false).contains("Secure"));
        assert!(build_access_cookie("tok", -5, false).contains("Max-Age=0"));
    }
}
