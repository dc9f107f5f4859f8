// config.rs
use std::env;

#[derive(Debug, Clone)]
pub struct MailConfig {
    pub api_base: String,
    pub api_key: String,
    pub domain: String,
    pub from: String,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub jwt_secret: String,
    pub access_token_expire_minutes: i64,
    pub otp_expire_minutes: i64,
    pub database_url: String,
    pub database_name: String,
    pub mail: Option<MailConfig>,
    pub port: u16,
    pub host: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        AppConfig {
            jwt_secret: env::var("JWT_SECRET")
                .expect("JWT_SECRET must be set"),
            access_token_expire_minutes: env::var("ACCESS_TOKEN_EXPIRE_MINUTES")
                .unwrap_or_else(|_| "30".to_string())
                .parse()
                .expect("ACCESS_TOKEN_EXPIRE_MINUTES must be a number"),
            otp_expire_minutes: env::var("OTP_EXPIRE_MINUTES")
                .unwrap_or_else(|_| "10".to_string())
                .parse()
                .expect("OTP_EXPIRE_MINUTES must be a number"),
            database_url: env::var("DATABASE_URL")
                .expect("DATABASE_URL must be set"),
            database_name: env::var("DATABASE_NAME")
                .unwrap_or_else(|_| "commercedb".to_string()),
            mail: Self::mail_from_env(),
            port: env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .expect("PORT must be a number"),
            host: env::var("HOST")
                .unwrap_or_else(|_| "0.0.0.0".to_string()),
        }
    }

    // Mail is optional: without credentials the service still boots and
    // outbound mail is dropped with a warning.
    fn mail_from_env() -> Option<MailConfig> {
        let api_key = env::var("MAILGUN_API_KEY").ok()?;
        let domain = env::var("MAILGUN_DOMAIN").ok()?;

        Some(MailConfig {
            api_base: env::var("MAILGUN_API_BASE")
                .unwrap_or_else(|_| "https://api.mailgun.net".to_string()),
            from: env::var("MAIL_FROM")
                .unwrap_or_else(|_| format!("noreply@{}", domain)),
            api_key,
            domain,
        })
    }
}
