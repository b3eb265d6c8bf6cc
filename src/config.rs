use crate::schemas::AppState;
use anyhow::Result;
use sea_orm::Database;

/// Initialize application state with a specific database URL
pub async fn initialize_app_state_with_url(database_url: &str) -> Result<AppState> {
    tracing::info!("Connecting to database: {}", database_url);
    let db = Database::connect(database_url).await?;

    Ok(AppState {
        db,
        jwt_secret: get_jwt_secret(),
    })
}

/// Initialize application configuration and state from the environment
pub async fn initialize_app_state() -> Result<AppState> {
    dotenvy::dotenv().ok();
    let database_url =
        std::env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://acadrust.db".to_string());
    initialize_app_state_with_url(&database_url).await
}

/// Get bind address from environment or use default
pub fn get_bind_address() -> String {
    std::env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:3000".to_string())
}

/// Get the JWT signing secret from the environment. A missing secret gets a
/// development default and a loud warning; sessions signed with it do not
/// survive a redeploy with a real secret.
pub fn get_jwt_secret() -> String {
    match std::env::var("JWT_SECRET") {
        Ok(secret) if !secret.is_empty() => secret,
        _ => {
            tracing::warn!("JWT_SECRET is not set, using an insecure development default");
            "insecure-development-secret".to_string()
        }
    }
}
