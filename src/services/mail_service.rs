// src/services/mail_service.rs
use async_trait::async_trait;
use reqwest::Client;

use crate::config::MailConfig;
use crate::errors::{AppError, Result};

/// Outbound mail contract. Callers fire-and-forget: a send failure is logged
/// by the caller, never propagated into the triggering request.
#[async_trait]
pub trait MailSender: Send + Sync {
    async fn send(&self, to: &str, subject: &str, html_body: &str) -> Result<()>;
}

#[derive(Clone)]
pub struct HttpMailer {
    client: Client,
    api_base: String,
    api_key: String,
    domain: String,
    from: String,
}

impl HttpMailer {
    pub fn new(config: MailConfig) -> Self {
        Self {
            client: Client::new(),
            api_base: config.api_base,
            api_key: config.api_key,
            domain: config.domain,
            from: config.from,
        }
    }
}

#[async_trait]
impl MailSender for HttpMailer {
    async fn send(&self, to: &str, subject: &str, html_body: &str) -> Result<()> {
        let url = format!("{}/v3/{}/messages", self.api_base, self.domain);

        let response = self
            .client
            .post(&url)
            .basic_auth("api", Some(&self.api_key))
            .form(&[
                ("from", self.from.as_str()),
                ("to", to),
                ("subject", subject),
                ("html", html_body),
            ])
            .send()
            .await
            .map_err(|e| AppError::MailProvider(format!("mail API request failed: {}", e)))?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(AppError::MailProvider(format!(
                "mail API responded with status {}",
                response.status()
            )))
        }
    }
}

/// Stand-in used when mail credentials are not configured: logs the send and
/// drops it, keeping every flow functional in development.
pub struct NullMailer;

#[async_trait]
impl MailSender for NullMailer {
    async fn send(&self, to: &str, subject: &str, _html_body: &str) -> Result<()> {
        tracing::info!("mail disabled, dropping \"{}\" to {}", subject, to);
        Ok(())
    }
}

pub fn otp_email_body(name: &str, code: &str, valid_minutes: i64) -> String {
    format!(
        "<p>Hello <b>{}</b>,</p>\
         <p>Your password reset code is:</p>\
         <p style=\"font-size:24px;letter-spacing:4px\"><b>{}</b></p>\
         <p>This code is valid for {} minutes. If you did not request it, \
         please ignore this email.</p>",
        name, code, valid_minutes
    )
}

pub fn welcome_email_body(name: &str) -> String {
    format!(
        "<p>Hello <b>{}</b>,</p>\
         <p>Your account has been created. Welcome aboard!</p>",
        name
    )
}
