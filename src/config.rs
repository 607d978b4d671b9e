use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: i64,
    pub refresh_ttl_minutes: i64,
    pub reset_ttl_minutes: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MailConfig {
    pub smtp_host: String,
    pub smtp_port: u16,
    pub smtp_username: Option<String>,
    pub smtp_password: Option<String>,
    pub from_email: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt: JwtConfig,
    pub mail: MailConfig,
    /// Frontend page that receives `uid` and `token` query parameters.
    pub password_reset_url: String,
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")?;
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET")?,
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "classifieds".into()),
            audience: std::env::var("JWT_AUDIENCE")
                .unwrap_or_else(|_| "classifieds-users".into()),
            ttl_minutes: env_or("JWT_TTL_MINUTES", 60),
            refresh_ttl_minutes: env_or("JWT_REFRESH_TTL_MINUTES", 60 * 24 * 14),
            reset_ttl_minutes: env_or("PASSWORD_RESET_TTL_MINUTES", 60 * 24 * 3),
        };
        let mail = MailConfig {
            smtp_host: std::env::var("SMTP_HOST").unwrap_or_else(|_| "localhost".into()),
            smtp_port: env_or("SMTP_PORT", 1025),
            smtp_username: std::env::var("SMTP_USERNAME").ok().filter(|v| !v.is_empty()),
            smtp_password: std::env::var("SMTP_PASSWORD").ok().filter(|v| !v.is_empty()),
            from_email: std::env::var("DEFAULT_FROM_EMAIL")
                .unwrap_or_else(|_| "noreply@classifieds.local".into()),
        };
        let password_reset_url = std::env::var("PASSWORD_RESET_URL")
            .unwrap_or_else(|_| "http://localhost:3000/reset-password".into());
        Ok(Self {
            database_url,
            jwt,
            mail,
            password_reset_url,
        })
    }
}
