pub mod mail_service;
pub mod otp_service;
pub mod password;
pub mod token;
