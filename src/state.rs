use std::sync::Arc;

use crate::config::AppConfig;
use crate::services::mail_service::MailSender;
use crate::services::otp_service::OTPService;
use crate::services::token::TokenService;
use crate::store::CredentialStore;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn CredentialStore>,
    pub tokens: TokenService,
    pub otp: OTPService,
    pub mailer: Arc<dyn MailSender>,
    pub otp_expire_minutes: i64,
}

impl AppState {
    pub fn new(
        store: Arc<dyn CredentialStore>,
        mailer: Arc<dyn MailSender>,
        config: &AppConfig,
    ) -> Self {
        let tokens = TokenService::new(
            &config.jwt_secret,
            config.access_token_expire_minutes,
            config.otp_expire_minutes,
        );
        let otp = OTPService::new(store.clone(), config.otp_expire_minutes);

        AppState {
            store,
            tokens,
            otp,
            mailer,
            otp_expire_minutes: config.otp_expire_minutes,
        }
    }
}
