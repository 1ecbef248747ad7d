use actix_web::middleware::Next;
use actix_web::{
    Error, HttpResponse,
    body::BoxBody,
    dev::{ServiceRequest, ServiceResponse},
    web::Data,
};
use serde_json::json;

use crate::auth::jwt::verify_token;
use crate::config::Config;

/// Bearer guard for the protected scope. A missing Authorization header is
/// 401; a header that fails signature or expiry verification is 403.
pub async fn auth_middleware(
    req: ServiceRequest,
    next: Next<BoxBody>,
) -> Result<ServiceResponse<BoxBody>, Error> {
    let config = req
        .app_data::<Data<Config>>()
        .ok_or_else(|| actix_web::error::ErrorInternalServerError("App config missing"))?;

    let header_value = match req.headers().get("Authorization").and_then(|h| h.to_str().ok()) {
        Some(h) => h,
        None => {
            let resp = HttpResponse::Unauthorized().json(json!({"message": "No token"}));
            return Ok(req.into_response(resp.map_into_boxed_body()));
        }
    };

    // the frontend historically sent both "Bearer <token>" and the raw token
    let token = header_value
        .strip_prefix("Bearer ")
        .unwrap_or(header_value);

    if verify_token(token, &config.jwt_secret).is_err() {
        let resp = HttpResponse::Forbidden().json(json!({"message": "Invalid token"}));
        return Ok(req.into_response(resp.map_into_boxed_body()));
    }

    next.call(req).await
}
