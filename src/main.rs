use std::net::SocketAddr;
use std::sync::Arc;

use commerce_auth_api::config::AppConfig;
use commerce_auth_api::database::connection::get_db_client;
use commerce_auth_api::routes::build_router;
use commerce_auth_api::services::mail_service::{HttpMailer, MailSender, NullMailer};
use commerce_auth_api::state::AppState;
use commerce_auth_api::store::MongoStore;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let config = AppConfig::from_env();

    let db = get_db_client(&config).await;
    let store = MongoStore::new(db);
    if let Err(e) = store.ensure_indexes().await {
        panic!("Failed to create database indexes: {}", e);
    }

    let mailer: Arc<dyn MailSender> = match config.mail.clone() {
        Some(mail_config) => {
            tracing::info!("✅ Mail sender initialized for domain {}", mail_config.domain);
            Arc::new(HttpMailer::new(mail_config))
        }
        None => {
            tracing::warn!("Mail credentials not set, outbound mail disabled");
            Arc::new(NullMailer)
        }
    };

    let state = AppState::new(Arc::new(store), mailer, &config);
    let app = build_router(state);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .expect("HOST/PORT must form a valid socket address");

    tracing::info!("🚀 Server starting on {}", addr);

    match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => {
            axum::serve(listener, app).await.unwrap();
        }
        Err(e) => {
            tracing::error!("Failed to bind to {}: {}", addr, e);
            std::process::exit(1);
        }
    }
}
