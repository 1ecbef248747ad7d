use actix_web::{HttpResponse, web};
use serde_json::json;
use sqlx::SqlitePool;
use tracing::{error, info, instrument};

use crate::auth::jwt::generate_token;
use crate::auth::password::verify_password;
use crate::config::Config;
use crate::errors::ApiError;
use crate::models::{LoginRequest, UserRow};

/// Looks up the username and checks the password against the stored argon2
/// hash. An unknown username and a wrong password produce the identical
/// error so the response never reveals which usernames exist.
pub async fn authenticate(
    pool: &SqlitePool,
    username: &str,
    password: &str,
) -> Result<UserRow, ApiError> {
    let user = sqlx::query_as::<_, UserRow>(
        r#"
        SELECT id, username, password
        FROM users
        WHERE username = ?
        "#,
    )
    .bind(username)
    .fetch_optional(pool)
    .await?;

    let Some(user) = user else {
        info!("Invalid credentials: user not found");
        return Err(ApiError::InvalidCredentials);
    };

    if verify_password(password, &user.password).is_err() {
        info!("Invalid credentials: password mismatch");
        return Err(ApiError::InvalidCredentials);
    }

    Ok(user)
}

/// Login endpoint
#[utoipa::path(
    post,
    path = "/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Session token issued", body = Object, example = json!({
            "token": "eyJhbGciOiJIUzI1NiJ9..."
        })),
        (status = 400, description = "Empty username or password"),
        (status = 401, description = "Invalid login")
    ),
    tag = "Auth"
)]
#[instrument(name = "auth_login", skip(pool, config, body), fields(username = %body.username))]
pub async fn login(
    body: web::Json<LoginRequest>,
    pool: web::Data<SqlitePool>,
    config: web::Data<Config>,
) -> Result<HttpResponse, ApiError> {
    if body.username.trim().is_empty() || body.password.is_empty() {
        info!("Validation failed: empty username or password");
        return Ok(
            HttpResponse::BadRequest().json(json!({"message": "Username or password required"}))
        );
    }

    let user = authenticate(pool.get_ref(), body.username.trim(), &body.password).await?;

    let token = match generate_token(user.id, &user.username, &config.jwt_secret, config.token_ttl)
    {
        Ok(t) => t,
        Err(e) => {
            error!(error = %e, "Failed to sign token");
            return Ok(HttpResponse::InternalServerError().finish());
        }
    };

    info!("Login successful");

    Ok(HttpResponse::Ok().json(json!({ "token": token })))
}
