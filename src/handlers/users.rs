use crate::{
    database::connection::DbPool,
    middleware::auth::AuthenticatedUser,
    models::{
        auth::RegisterRequest,
        user::{CreateUser, User, UserRole},
    },
    utils::helpers::ApiResponse,
};
use actix_web::{HttpResponse, Result, web};
use tracing::{error, info};

/// A requested role is honored only when the request is made by an
/// authenticated admin; everyone else gets the base role regardless of what
/// the body claims.
fn granted_role(requested: Option<&str>, requester: Option<&AuthenticatedUser>) -> UserRole {
    match requester {
        Some(user) if user.user_role.is_admin() => requested
            .and_then(|role| role.parse().ok())
            .unwrap_or(UserRole::User),
        _ => UserRole::User,
    }
}

/// Bare user-record insert, kept alongside /auth/register for clients that
/// manage their own sessions.
pub async fn create(
    pool: web::Data<DbPool>,
    request: web::Json<RegisterRequest>,
    requester: Option<AuthenticatedUser>,
) -> Result<HttpResponse> {
    info!("Registering user record for {}", request.email);

    let create_user = CreateUser {
        fullname: request.fullname.clone(),
        email: request.email.clone(),
        password: request.password.clone(),
        user_role: granted_role(request.user_role.as_deref(), requester.as_ref()),
    };

    match User::create(&pool, create_user).await {
        Ok(user) => Ok(HttpResponse::Created().json(ApiResponse::success_with_message(
            user,
            "successfully inserted!".to_string(),
        ))),
        Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
            Ok(HttpResponse::Conflict().json(ApiResponse::<()>::error(
                "A user with this email already exists".to_string(),
            )))
        }
        Err(e) => {
            error!("Failed to create user: {}", e);
            Ok(HttpResponse::InternalServerError()
                .json(ApiResponse::<()>::error("Failed to create user".to_string())))
        }
    }
}

pub async fn index(pool: web::Data<DbPool>, user: AuthenticatedUser) -> Result<HttpResponse> {
    if !user.user_role.is_admin() {
        return Ok(HttpResponse::Forbidden()
            .json(ApiResponse::<()>::error("Access denied".to_string())));
    }

    let users = User::find_all(&pool).await.map_err(|e| {
        error!("Failed to fetch users: {}", e);
        actix_web::error::ErrorInternalServerError("Failed to fetch users")
    })?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(users)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn principal(role: UserRole) -> AuthenticatedUser {
        AuthenticatedUser {
            user_id: Uuid::new_v4(),
            email: "someone@example.com".to_string(),
            user_role: role,
        }
    }

    #[test]
    fn anonymous_callers_never_get_elevated_roles() {
        assert_eq!(granted_role(Some("admin"), None), UserRole::User);
        assert_eq!(granted_role(None, None), UserRole::User);
    }

    #[test]
    fn regular_users_cannot_grant_themselves_admin() {
        let requester = principal(UserRole::User);
        assert_eq!(granted_role(Some("admin"), Some(&requester)), UserRole::User);
    }

    #[test]
    fn admins_may_provision_any_known_role() {
        let requester = principal(UserRole::Admin);
        assert_eq!(granted_role(Some("admin"), Some(&requester)), UserRole::Admin);
        assert_eq!(granted_role(Some("user"), Some(&requester)), UserRole::User);
        assert_eq!(granted_role(Some("owner"), Some(&requester)), UserRole::User);
        assert_eq!(granted_role(None, Some(&requester)), UserRole::User);
    }
}
