//! Serve command implementation

use crate::api::{create_router, AppState};
use crate::cli::{build_http_client, ServeArgs};
use crate::config::{ConfigError, EaselConfig, LogFormat};
use crate::dispatch::FallbackManager;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Load configuration with CLI overrides
pub fn load_config_with_overrides(args: &ServeArgs) -> Result<EaselConfig, ConfigError> {
    let mut config = if args.config.exists() {
        EaselConfig::load(Some(&args.config))?
    } else {
        tracing::debug!("Config file not found, using defaults");
        EaselConfig::default()
    };

    config = config.with_env_overrides();

    // CLI flags win over file and environment
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(ref host) = args.host {
        config.server.host = host.clone();
    }
    if let Some(ref log_level) = args.log_level {
        config.logging.level = log_level.clone();
    }
    if args.no_health_check {
        config.health_check.enabled = false;
    }

    config.validate()?;
    Ok(config)
}

/// Initialize tracing based on configuration
pub fn init_tracing(
    config: &crate::config::LoggingConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let filter_str = crate::logging::build_filter_directives(config);

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&filter_str));

    match config.format {
        LogFormat::Pretty => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .try_init()?;
        }
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .try_init()?;
        }
    }

    Ok(())
}

/// Wait for SIGINT or SIGTERM, then cancel `cancel_token`.
async fn shutdown_signal(cancel_token: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for CTRL+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received SIGINT, shutting down...");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, shutting down...");
        }
        _ = cancel_token.cancelled() => {}
    }

    cancel_token.cancel();
}

/// Main serve command handler
pub async fn run_serve(args: ServeArgs) -> Result<(), Box<dyn std::error::Error>> {
    // 1. Load and merge configuration
    let config = load_config_with_overrides(&args)?;

    // 2. Initialize tracing
    init_tracing(&config.logging)?;
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "Starting Easel gateway");
    tracing::debug!(?config, "Loaded configuration");

    // 3. Providers and dispatch engine
    let client = Arc::new(build_http_client()?);
    let manager = Arc::new(FallbackManager::from_config(&config, client)?);
    for (provider_id, issue) in manager.config_issues() {
        tracing::warn!(
            provider_id = %provider_id,
            issue = %issue,
            "Provider misconfigured; generation requests will be rejected until fixed"
        );
    }

    // 4. Gallery storage
    let store = crate::storage::from_config(&config.storage)?;
    tracing::info!(backend = store.backend(), "Gallery storage ready");

    // 5. Router
    let config = Arc::new(config);
    let app_state = Arc::new(AppState::new(
        Arc::clone(&manager),
        store,
        Arc::clone(&config),
    ));
    let app = create_router(app_state);

    // 6. Background health probes
    let probe = if config.health_check.enabled {
        tracing::info!(
            interval_seconds = config.health_check.interval_seconds,
            "Starting health prober"
        );
        Some(manager.start_health_probe())
    } else {
        tracing::info!("Health probing disabled");
        None
    };

    // 7. Bind and serve
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(addr = %addr, "Easel API server listening");

    let cancel_token = CancellationToken::new();
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(cancel_token))
        .await?;

    // 8. Cleanup
    if let Some(probe) = probe {
        tracing::info!("Waiting for health prober to stop");
        probe.stop().await;
    }

    tracing::info!("Easel server stopped");
    Ok(())
}
