use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

#[derive(Deserialize, ToSchema)]
pub struct LoginRequest {
    #[schema(example = "admin")]
    pub username: String,
    #[schema(example = "admin123")]
    pub password: String,
}

#[derive(Debug, FromRow)]
pub struct UserRow {
    pub id: i64,
    pub username: String,
    pub password: String,
}

/// Bearer-token claims: the system user id, a fixed expiry and a unique
/// token id. Validating a presented token is a pure function of these plus
/// the shared secret; there is no server-side revocation.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub user_id: i64,
    pub sub: String,
    pub exp: usize,
    pub jti: String,
}
