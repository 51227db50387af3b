//! Bearer-token verification and user/guest identity resolution
//!
//! The service only verifies tokens; issuing them belongs to the
//! authentication collaborator. Every cart/order operation runs as
//! either an authenticated user or a guest session, never both; the
//! authenticated identity wins when a request carries both headers.
use crate::config::Config;
use crate::error::AppError;
use actix_web::{dev::Payload, web, FromRequest, HttpRequest};
use futures::future::{ready, Ready};
use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use shop_cache::CacheKey;
use uuid::Uuid;

/// Decoded bearer-token claims
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub email: String,
    pub user_id: Uuid,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub is_banned: bool,
    pub exp: usize,
}

impl Claims {
    pub fn is_admin(&self) -> bool {
        matches!(self.role.as_deref(), Some("admin") | Some("superadmin"))
    }
}

/// Verify and decode a bearer token. Any failure (bad signature,
/// expiry, malformed claims) yields `None`; callers treat that as
/// "not authenticated", not as an error.
pub fn decode_token(token: &str, secret: &str) -> Option<Claims> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .ok()
    .map(|data| data.claims)
    .filter(|claims| !claims.is_banned)
}

/// The caller of a cart/order operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Identity {
    User(Uuid),
    Guest(String),
}

impl Identity {
    /// Resolve from an optional decoded token and an optional guest
    /// id, preferring the authenticated identity.
    pub fn resolve(claims: Option<&Claims>, guest_id: Option<&str>) -> Option<Identity> {
        if let Some(claims) = claims {
            return Some(Identity::User(claims.user_id));
        }
        guest_id
            .filter(|g| !g.is_empty())
            .map(|g| Identity::Guest(g.to_string()))
    }

    /// The owner's cart cache key
    pub fn cart_cache_key(&self) -> String {
        match self {
            Identity::User(id) => CacheKey::cart_user(*id),
            Identity::Guest(id) => CacheKey::cart_guest(id),
        }
    }

    pub fn user_id(&self) -> Option<Uuid> {
        match self {
            Identity::User(id) => Some(*id),
            Identity::Guest(_) => None,
        }
    }

    pub fn guest_id(&self) -> Option<&str> {
        match self {
            Identity::User(_) => None,
            Identity::Guest(id) => Some(id.as_str()),
        }
    }
}

fn header<'a>(req: &'a HttpRequest, name: &str) -> Option<&'a str> {
    req.headers().get(name).and_then(|v| v.to_str().ok())
}

fn claims_from_request(req: &HttpRequest) -> Option<Claims> {
    let config = req.app_data::<web::Data<Config>>()?;
    header(req, "token").and_then(|t| decode_token(t, &config.auth.jwt_secret))
}

/// Extractor for operations open to users and guests. Rejects when
/// neither a valid token nor a guest id is present.
impl FromRequest for Identity {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let claims = claims_from_request(req);
        let resolved = Identity::resolve(claims.as_ref(), header(req, "guestid"));
        ready(resolved.ok_or_else(|| {
            AppError::Unauthorized("user identification required".to_string())
        }))
    }
}

/// Extractor for operations requiring a valid authenticated user
#[derive(Debug, Clone)]
pub struct AuthUser(pub Claims);

impl FromRequest for AuthUser {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(
            claims_from_request(req)
                .map(AuthUser)
                .ok_or_else(|| AppError::Unauthorized("valid token required".to_string())),
        )
    }
}

/// Extractor for admin-only operations
#[derive(Debug, Clone)]
pub struct AdminUser(pub Claims);

impl FromRequest for AdminUser {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let result = match claims_from_request(req) {
            Some(claims) if claims.is_admin() => Ok(AdminUser(claims)),
            Some(_) => Err(AppError::Forbidden("you are not authorized".to_string())),
            None => Err(AppError::Unauthorized("valid token required".to_string())),
        };
        ready(result)
    }
}

/// Mint a guest id for a first-time anonymous cart caller
pub fn mint_guest_id() -> String {
    Uuid::new_v4().to_string()
}

/// Synthetic guest id for a fully anonymous checkout
pub fn synth_checkout_guest_id() -> String {
    use rand::Rng;
    let suffix: String = rand::thread_rng()
        .sample_iter(&rand::distributions::Alphanumeric)
        .take(9)
        .map(char::from)
        .collect();
    format!("guest_{}_{}", chrono::Utc::now().timestamp_millis(), suffix)
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};

    fn make_token(claims: &Claims, secret: &str) -> String {
        encode(
            &Header::default(),
            claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    fn claims(role: Option<&str>, banned: bool) -> Claims {
        Claims {
            email: "a@b.c".into(),
            user_id: Uuid::new_v4(),
            role: role.map(String::from),
            is_banned: banned,
            exp: (chrono::Utc::now().timestamp() + 3600) as usize,
        }
    }

    #[test]
    fn token_round_trip() {
        let c = claims(Some("admin"), false);
        let token = make_token(&c, "secret");
        let decoded = decode_token(&token, "secret").unwrap();
        assert_eq!(decoded.user_id, c.user_id);
        assert!(decoded.is_admin());
    }

    #[test]
    fn wrong_secret_rejected() {
        let token = make_token(&claims(None, false), "secret");
        assert!(decode_token(&token, "other").is_none());
    }

    #[test]
    fn banned_user_rejected() {
        let token = make_token(&claims(None, true), "secret");
        assert!(decode_token(&token, "secret").is_none());
    }

    #[test]
    fn identity_prefers_authenticated_user() {
        let c = claims(None, false);
        let id = Identity::resolve(Some(&c), Some("guest-1")).unwrap();
        assert_eq!(id, Identity::User(c.user_id));

        let id = Identity::resolve(None, Some("guest-1")).unwrap();
        assert_eq!(id, Identity::Guest("guest-1".into()));

        assert!(Identity::resolve(None, None).is_none());
        assert!(Identity::resolve(None, Some("")).is_none());
    }

    #[test]
    fn checkout_guest_id_format() {
        let id = synth_checkout_guest_id();
        assert!(id.starts_with("guest_"));
        assert_eq!(id.split('_').count(), 3);
    }
}
