use actix_web::{Error, FromRequest, HttpRequest, dev::Payload, error::ErrorUnauthorized, web};
use futures_util::future::{Ready, err, ok};
use tracing::warn;
use uuid::Uuid;

use crate::models::user::UserRole;
use crate::services::auth::AuthService;

/// Authenticated principal extracted from a bearer token. The role comes
/// from validated claims, never from the request body or query string.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user_id: Uuid,
    pub email: String,
    pub user_role: UserRole,
}

impl FromRequest for AuthenticatedUser {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let Some(auth_service) = req.app_data::<web::Data<AuthService>>() else {
            return err(ErrorUnauthorized("Authentication is not configured"));
        };

        let token = req
            .headers()
            .get("Authorization")
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "));

        let Some(token) = token else {
            return err(ErrorUnauthorized("Missing bearer token"));
        };

        match auth_service.decode_token(token) {
            Ok(claims) => ok(AuthenticatedUser {
                user_id: claims.sub,
                email: claims.email,
                user_role: claims.role,
            }),
            Err(e) => {
                warn!("Rejected bearer token: {}", e);
                err(ErrorUnauthorized("Invalid or expired token"))
            }
        }
    }
}
