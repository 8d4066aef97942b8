//! CLI runner for common setup and operations.
//!
//! Encapsulates config loading, logging initialization and service creation
//! to reduce duplication across command handlers.

use crate::error::CliError;
use clap::Args;
use catloader::config::ConfigFile;
use catloader::logging::{init_logging, LoggingGuard};
use catloader::local::SharedActiveDataset;
use catloader::remote::{AsyncReqwestClient, RemoteCatalog, RemoteConfig};
use catloader::service::CatalogService;
use tracing::info;

/// The service every command talks to.
pub type RemoteService = CatalogService<RemoteCatalog<AsyncReqwestClient>>;

/// Remote overrides given on the command line.
#[derive(Debug, Clone, Default, Args)]
pub struct RemoteArgs {
    /// Catalog server base URL (overrides remote.base_url)
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// HTTP timeout in seconds (overrides remote.timeout)
    #[arg(long, global = true)]
    pub timeout: Option<u64>,
}

/// Runner that manages CLI lifecycle and common operations.
pub struct CliRunner {
    /// Logging guard - keeps logging active while runner exists
    #[allow(dead_code)]
    logging_guard: LoggingGuard,
    /// Loaded configuration file
    config: ConfigFile,
}

impl CliRunner {
    /// Create a new CLI runner, loading config and initializing logging.
    ///
    /// # Arguments
    ///
    /// * `verbose` - Mirror log output to stderr
    pub fn new(verbose: bool) -> Result<Self, CliError> {
        // Load config file (or use defaults if not present)
        let config = ConfigFile::load()?;

        let logging_guard = init_logging(&config.logging.file, verbose)
            .map_err(|e| CliError::LoggingInit(e.to_string()))?;

        Ok(Self {
            logging_guard,
            config,
        })
    }

    /// Get the loaded configuration.
    pub fn config(&self) -> &ConfigFile {
        &self.config
    }

    /// Log startup information for a command.
    pub fn log_startup(&self, command: &str) {
        info!("catloader v{}", catloader::VERSION);
        info!("catloader CLI: {} command", command);
    }

    /// Resolve remote settings: CLI takes precedence, then config.
    pub fn remote_config(&self, args: &RemoteArgs) -> RemoteConfig {
        let base = self.config.remote_config();
        let base_url = args
            .base_url
            .clone()
            .unwrap_or_else(|| base.base_url().to_string());
        RemoteConfig::new(base_url).with_timeout(args.timeout.unwrap_or(base.timeout_secs()))
    }

    /// Create a catalog service backed by the remote server.
    ///
    /// `active` is consulted before the cache, so a dataset placed in it is
    /// served locally.
    pub fn create_service(
        &self,
        args: &RemoteArgs,
        active: SharedActiveDataset,
    ) -> Result<RemoteService, CliError> {
        let remote = self.remote_config(args);
        info!(base_url = remote.base_url(), "Connecting to catalog server");

        RemoteCatalog::from_config(&remote)
            .map(|source| CatalogService::with_active(source, active))
            .map_err(CliError::Fetch)
            .inspect(|_| info!("Service created successfully"))
    }
}
