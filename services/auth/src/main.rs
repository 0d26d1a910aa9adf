use std::time::Duration;

use anyhow::Context as _;
use sea_orm::Database;
use tokio::signal;
use tracing::{info, warn};

use shofy_auth::config::AuthConfig;
use shofy_auth::infra::notification::{LogOtpSender, Notifier, WhatsAppSender};
use shofy_auth::infra::revocation::{RevocationList, RevocationSweeper};
use shofy_auth::router::build_router;
use shofy_auth::state::AppState;
use shofy_auth::usecase::token::TokenAuthority;
use shofy_core::config::Config;
use shofy_core::tracing::init_tracing;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = AuthConfig::load().context("load auth config")?;
    anyhow::ensure!(config.otp_length > 0, "OTP_LENGTH must be > 0");

    let revocations = RevocationList::new();
    let authority = TokenAuthority::new(config.jwt_secret_key.clone(), revocations.clone());
    authority
        .ensure_configured()
        .context("JWT_SECRET_KEY must be set")?;

    let notifier = match config.whatsapp_credentials() {
        Some((access_token, phone_number_id)) => Notifier::WhatsApp(WhatsAppSender::new(
            &config.whatsapp_api_base,
            access_token,
            phone_number_id,
        )?),
        None => {
            warn!("whatsapp credentials not set, otp codes will not be delivered");
            Notifier::Log(LogOtpSender)
        }
    };

    let db = Database::connect(&config.database_url)
        .await
        .context("connect to database")?;

    let sweeper = RevocationSweeper::start(
        revocations,
        Duration::from_secs(config.revocation_sweep_secs),
    );

    let state = AppState {
        db,
        authority,
        notifier,
        otp_length: config.otp_length,
        otp_echo_code: config.otp_echo_code,
    };
    if state.otp_echo_code {
        warn!("OTP_ECHO_CODE is on, codes are returned in responses");
    }

    let router = build_router(state);
    let addr = format!("0.0.0.0:{}", config.auth_port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("bind {addr}"))?;

    info!(%addr, "auth service listening");
    let served = axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error");

    sweeper.stop().await;
    info!("auth service stopped");
    served
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("received SIGINT, shutting down"),
        _ = terminate => info!("received SIGTERM, shutting down"),
    }
}
