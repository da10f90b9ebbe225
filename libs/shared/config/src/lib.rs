use std::env;
use tracing::warn;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_path: String,
    pub port: u16,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let database_path = env::var("DATABASE_PATH").unwrap_or_else(|_| {
            warn!("DATABASE_PATH not set, using ./scheduler.db");
            "scheduler.db".to_string()
        });

        let port = env::var("PORT")
            .ok()
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or_else(|| {
                warn!("PORT not set or invalid, using 3000");
                3000
            });

        Self {
            database_path,
            port,
        }
    }
}
