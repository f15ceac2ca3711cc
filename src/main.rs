use tokio::signal;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use register_gate::api;
use register_gate::config::Config;
use register_gate::state::AppState;
use register_gate::ui::Pages;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_env("REGISTER_LOG").unwrap_or_else(|_| "info".into()))
        .with(fmt::layer().json())
        .init();

    let cfg = Config::load();
    tracing::debug!(config = ?cfg, "configuration resolved");
    cfg.warn_on_gaps();

    let pages = Pages::load(&cfg.templates_dir)
        .inspect_err(|e| tracing::error!(error = ?e, "failed to load page templates"))?;

    let addr = cfg
        .socket_addr()
        .inspect_err(|e| tracing::error!(error = %e, "invalid listen address"))?;

    let state = AppState::new(cfg, pages);
    let app = api::app(state);

    tracing::info!(%addr, "starting register-gate");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .inspect_err(|e| tracing::error!(error = %e, %addr, "failed to bind listener"))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("register-gate stopped");
    Ok(())
}

/// Waits for SIGINT or SIGTERM and logs which one arrived.
///
/// A handler that cannot be installed is logged and never fires; the other
/// one still can.
async fn shutdown_signal() {
    let interrupt = async {
        match signal::ctrl_c().await {
            Ok(()) => "SIGINT",
            Err(e) => {
                tracing::warn!(error = %e, "cannot listen for SIGINT");
                std::future::pending().await
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                "SIGTERM"
            }
            Err(e) => {
                tracing::warn!(error = %e, "cannot listen for SIGTERM");
                std::future::pending().await
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<&'static str>();

    let received = tokio::select! {
        name = interrupt => name,
        name = terminate => name,
    };

    tracing::info!(signal = received, "draining in-flight registrations before exit");
}
