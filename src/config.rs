use dotenvy::dotenv;
use std::env;

#[derive(Clone)]
pub struct Config {
    pub server_addr: String,
    pub database_url: String,
    pub jwt_secret: String,
    /// Session token lifetime in seconds.
    pub token_ttl: usize,

    /// Credential pair seeded on first startup when the user store is empty.
    pub default_username: String,
    pub default_password: String,

    // Rate limiting
    pub rate_login_per_min: u32,
    pub rate_protected_per_min: u32,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        Self {
            server_addr: env::var("SERVER_ADDR").expect("SERVER_ADDR must be set"),
            database_url: env::var("DATABASE_URL").expect("DATABASE_URL must be set"),
            jwt_secret: env::var("JWT_SECRET").expect("JWT_SECRET must be set"),
            token_ttl: env::var("TOKEN_TTL")
                .unwrap_or_else(|_| "28800".to_string()) // default 8 hours
                .parse()
                .unwrap(),

            default_username: env::var("DEFAULT_USERNAME").unwrap_or_else(|_| "admin".to_string()),
            default_password: env::var("DEFAULT_PASSWORD")
                .unwrap_or_else(|_| "admin123".to_string()),

            rate_login_per_min: env::var("RATE_LOGIN_PER_MIN")
                .unwrap_or_else(|_| "60".to_string())
                .parse()
                .unwrap(),
            rate_protected_per_min: env::var("RATE_PROTECTED_PER_MIN")
                .unwrap_or_else(|_| "1000".to_string())
                .parse()
                .unwrap(),
        }
    }
}
