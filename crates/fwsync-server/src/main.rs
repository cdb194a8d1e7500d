use std::{env, sync::Arc};

use fwsync_config::loader::load_config;
use fwsync_engine::Reconciler;
use fwsync_provider::DynProvider;
use fwsync_provider_azure::{AzureCredentials, AzureProvider};
use fwsync_server::ServerBuilder;

/// How the configuration path was determined.
#[derive(Debug, Clone, Copy)]
enum ConfigSource {
    /// From --config CLI argument
    CliArgument,
    /// From FWSYNC_CONFIG environment variable
    EnvironmentVariable,
    /// Default path (fwsync.toml)
    Default,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CliArgument => write!(f, "CLI argument (--config)"),
            Self::EnvironmentVariable => write!(f, "environment variable (FWSYNC_CONFIG)"),
            Self::Default => write!(f, "default"),
        }
    }
}

#[tokio::main]
async fn main() {
    // Load .env file if present (before anything else), so credentials can
    // come from .env for local development
    if let Err(e) = dotenvy::dotenv() {
        // Not an error if .env doesn't exist - it's optional
        if !matches!(e, dotenvy::Error::Io(ref io_err) if io_err.kind() == std::io::ErrorKind::NotFound)
        {
            eprintln!("Warning: Failed to load .env file: {e}");
        }
    }

    // Initialize tracing early with the default level
    fwsync_server::observability::init_tracing();

    // Parse config path from CLI, environment, or use default
    let (config_path, source) = resolve_config_path();

    let cfg = match load_config(Some(&config_path)) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            std::process::exit(2);
        }
    };

    tracing::info!(
        path = %config_path,
        source = %source,
        "Configuration loaded"
    );

    fwsync_server::observability::apply_logging_level(&cfg.logging.level);

    let credentials = AzureCredentials {
        tenant_id: cfg.azure.tenant_id.clone(),
        subscription_id: cfg.azure.subscription_id.clone(),
        client_id: cfg.azure.client_id.clone(),
        client_secret: cfg.azure.client_secret.clone(),
    };
    let provider: DynProvider = Arc::new(AzureProvider::new(credentials));
    let reconciler = Arc::new(Reconciler::new(provider, cfg.azure.resource_group.clone()));

    if cfg.scheduler.enabled {
        fwsync_server::scheduler::spawn(Arc::clone(&reconciler), cfg.scheduler.interval());
        tracing::info!(
            interval_secs = cfg.scheduler.interval_secs,
            "periodic trigger enabled"
        );
    }

    let server = ServerBuilder::new(&cfg, reconciler).build();
    if let Err(err) = server.run().await {
        eprintln!("Server error: {err}");
    }
}

/// Resolve the configuration file path.
///
/// Priority order:
/// 1. CLI argument: --config <path>
/// 2. Environment variable: FWSYNC_CONFIG
/// 3. Default: fwsync.toml
fn resolve_config_path() -> (String, ConfigSource) {
    // 1. Check CLI: --config <path>
    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        if arg == "--config" {
            if let Some(path) = args.next() {
                return (path, ConfigSource::CliArgument);
            }
        }
    }

    // 2. Check environment variable
    if let Ok(path) = env::var("FWSYNC_CONFIG") {
        if !path.is_empty() {
            return (path, ConfigSource::EnvironmentVariable);
        }
    }

    // 3. Default to fwsync.toml
    ("fwsync.toml".to_string(), ConfigSource::Default)
}
