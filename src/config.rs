use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub ttl_hours: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub relay_url: String,
    pub jwt: JwtConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")?;
        let relay_url =
            std::env::var("RELAY_API_URL").unwrap_or_else(|_| "http://localhost:6060".into());
        let jwt = JwtConfig {
            // The signing secret must come from the environment, never from
            // a literal in the source.
            secret: std::env::var("JWT_SECRET")?,
            ttl_hours: std::env::var("TOKEN_TTL_HOURS")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(24),
        };
        Ok(Self {
            database_url,
            relay_url,
            jwt,
        })
    }
}
