//! Core application

use std::sync::Arc;

use anyhow::{Context, Result};

use crate::api::{ApiServer, CredentialService};
use crate::core::banner;
use crate::core::cli::{self, CliConfig, Commands, SystemCommands};
use crate::core::config::AppConfig;
use crate::core::constants::{APP_NAME_LOWER, ENV_LOG};
use crate::core::shutdown::ShutdownService;
use crate::core::storage::AppStorage;
use crate::data::TransactionalService;
use crate::data::cache::{CacheKeys, CacheService, EntityCache, TtlTable};
use crate::domain::{
    CustomerLookup, OrderFeedbackService, OrderLookup, ProductFeedbackService, ProductLookup,
};

pub struct CoreApp {
    pub shutdown: ShutdownService,
    pub config: AppConfig,
    pub storage: AppStorage,
    pub database: Arc<TransactionalService>,
    pub cache: Arc<EntityCache>,
    pub credentials: CredentialService,
    pub order_feedback: Arc<OrderFeedbackService>,
    pub product_feedback: Arc<ProductFeedbackService>,
}

impl CoreApp {
    /// Run the application with CLI argument parsing
    pub async fn run() -> Result<()> {
        dotenvy::dotenv().ok();
        Self::init_logging();

        tracing::debug!("Application starting");

        let (cli_config, command) = cli::parse();
        tracing::trace!(command = ?command, "Parsed command");

        match command {
            Some(Commands::System {
                command: system_cmd,
            }) => {
                return Self::handle_system_command(system_cmd);
            }
            Some(Commands::Start) | None => {}
        }

        let app = Self::init(&cli_config).await?;
        Self::start_server(app).await
    }

    async fn init(cli: &CliConfig) -> Result<Self> {
        let config = AppConfig::load(cli)?;
        let storage = AppStorage::init(&config).await?;

        // Cache service and the typed entity layer above it
        let cache_service = Arc::new(
            CacheService::new(&config.cache.backend_config())
                .await
                .map_err(|e| anyhow::anyhow!("Failed to initialize cache service: {}", e))?,
        );
        tracing::debug!(backend = cache_service.backend_name(), "Cache initialized");

        let ttl = TtlTable::new(&config.cache.expiry)
            .map_err(|e| anyhow::anyhow!("Invalid cache expiry table: {}", e))?;
        let cache = Arc::new(EntityCache::new(
            cache_service,
            CacheKeys::new(config.cache.alias.clone()),
            ttl,
        ));

        let database = Arc::new(
            TransactionalService::init(
                config.database.backend,
                &storage,
                config.database.postgres.as_ref(),
            )
            .await?,
        );
        let repository = database.repository();

        let customers = CustomerLookup::new(repository.clone(), cache.clone());
        let orders = OrderLookup::new(repository.clone(), cache.clone());
        let products = ProductLookup::new(repository.clone(), cache.clone());

        let order_feedback = Arc::new(OrderFeedbackService::new(
            repository.clone(),
            cache.clone(),
            customers.clone(),
            orders.clone(),
            products.clone(),
        ));
        let product_feedback = Arc::new(ProductFeedbackService::new(
            repository.clone(),
            cache.clone(),
            customers,
            orders,
            products,
        ));
        let credentials = CredentialService::new(repository, cache.clone());

        let shutdown = ShutdownService::new(database.clone());

        Ok(Self {
            shutdown,
            config,
            storage,
            database,
            cache,
            credentials,
            order_feedback,
            product_feedback,
        })
    }

    fn handle_system_command(cmd: SystemCommands) -> Result<()> {
        match cmd {
            SystemCommands::Prune { yes } => Self::prune_data(yes),
        }
    }

    fn prune_data(skip_confirm: bool) -> Result<()> {
        let data_dir = AppStorage::resolve_data_dir();

        if !data_dir.exists() {
            println!(
                "Nothing to prune. Data directory does not exist: {}",
                data_dir.display()
            );
            return Ok(());
        }

        let data_dir = data_dir.canonicalize().unwrap_or(data_dir);

        println!("This will permanently delete the local data directory:");
        println!("  {}", data_dir.display());
        println!();
        println!(
            "Make sure the server is not running. \
             Deleting data while the server is running will cause data corruption."
        );

        if !skip_confirm {
            print!("\nContinue? [y/N] ");
            std::io::Write::flush(&mut std::io::stdout())?;

            let mut input = String::new();
            std::io::stdin().read_line(&mut input)?;

            if !matches!(input.trim().to_lowercase().as_str(), "y" | "yes") {
                println!("Aborted.");
                return Ok(());
            }
        }

        std::fs::remove_dir_all(&data_dir)
            .with_context(|| format!("Failed to delete data directory: {}", data_dir.display()))?;
        println!("Pruned: {}", data_dir.display());
        Ok(())
    }

    fn init_logging() {
        let default_filter = format!("info,{}=info", APP_NAME_LOWER);

        let filter = std::env::var(ENV_LOG)
            .or_else(|_| std::env::var("RUST_LOG"))
            .unwrap_or(default_filter);

        tracing_subscriber::fmt()
            .with_target(false)
            .with_thread_ids(false)
            .with_level(true)
            .with_ansi(true)
            .compact()
            .with_env_filter(filter)
            .init();
    }

    async fn start_server(app: Self) -> Result<()> {
        // Install signal handlers FIRST (before any blocking calls)
        app.shutdown.install_signal_handlers();

        app.start_background_tasks().await;

        banner::print_banner(
            &app.config.server.host,
            app.config.server.port,
            app.config.auth.enabled,
            &app.storage.data_dir().display().to_string(),
        );

        let server = ApiServer::new(app);
        let app = server.start().await?;
        app.shutdown.shutdown().await;

        Ok(())
    }

    pub async fn start_background_tasks(&self) {
        self.shutdown
            .register(
                self.database
                    .start_checkpoint_task(self.shutdown.subscribe()),
            )
            .await;

        tracing::debug!("Background tasks started");
    }
}
