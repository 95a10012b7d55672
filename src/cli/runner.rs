//! CLI runner - executes commands

use crate::cli::commands::{Cli, Commands, OutputFormat};
use crate::config::MediatorConfig;
use crate::error::{Error, Result};
use crate::mediator::MediationEngine;
use crate::paging::PagingDriver;
use crate::remote::ListingFetcher;
use crate::store::{CacheDatabase, DuckDbDatabase};
use crate::types::{LoadDirection, MediationOutcome};
use serde_json::{json, Value};
use tracing::info;

type Driver = PagingDriver<DuckDbDatabase, ListingFetcher>;

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        match &self.cli.command {
            Commands::Refresh { partition } => {
                let mut driver = self.driver(partition)?;
                let outcome = driver.refresh().await?;
                self.report(LoadDirection::Refresh, &driver, outcome)
            }
            Commands::Append { partition } => {
                let mut driver = self.driver(partition)?;
                driver.restore()?;
                let outcome = driver.append().await?;
                self.report(LoadDirection::Append, &driver, outcome)
            }
            Commands::Sync { partition, pages } => self.sync(partition, *pages).await,
            Commands::Show {
                partition,
                keys,
                limit,
            } => self.show(partition, *keys, *limit),
            Commands::Validate => self.validate(),
        }
    }

    /// Load configuration, applying the `--store` override
    fn load_config(&self) -> Result<MediatorConfig> {
        let mut config = MediatorConfig::from_file(&self.cli.config)?;
        if let Some(store) = &self.cli.store {
            config.store.path.clone_from(store);
        }
        Ok(config)
    }

    fn driver(&self, partition: &str) -> Result<Driver> {
        let config = self.load_config()?;
        let database = DuckDbDatabase::from_config(&config.store)?;
        let fetcher = ListingFetcher::new(config.remote.clone(), &config.http)?;

        info!(
            "Partition '{}' cached in {}",
            partition,
            database.location()
        );

        let engine = MediationEngine::new(database, fetcher, partition)
            .with_refresh_on_start(config.refresh_on_start);
        Ok(PagingDriver::new(engine, config.paging))
    }

    async fn sync(&self, partition: &str, pages: usize) -> Result<()> {
        let mut driver = self.driver(partition)?;

        // `refresh_on_start: false` serves a cached partition as-is
        if let Some(outcome) = driver.start().await? {
            self.report(LoadDirection::Refresh, &driver, outcome)?;
        }

        for _ in 0..pages {
            if driver.is_exhausted() {
                break;
            }
            let outcome = driver.append().await?;
            self.report(LoadDirection::Append, &driver, outcome)?;
        }

        info!(
            "Synced '{}': {} items cached, exhausted={}",
            partition,
            driver.state().item_count(),
            driver.is_exhausted()
        );
        Ok(())
    }

    fn show(&self, partition: &str, keys: bool, limit: usize) -> Result<()> {
        let config = self.load_config()?;
        let database = DuckDbDatabase::from_config(&config.store)?;

        let (items, remote_keys) = database.transaction(|tx| {
            let items = tx.items().items_by_partition(partition, 0, limit)?;
            let remote_keys = if keys {
                tx.remote_keys().keys_by_partition(partition)?
            } else {
                Vec::new()
            };
            Ok((items, remote_keys))
        })?;

        for item in &items {
            self.output_message(&json!({ "type": "ITEM", "item": item }));
        }
        for key in &remote_keys {
            self.output_message(&json!({ "type": "KEY", "key": key }));
        }
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        let config = self.load_config()?;

        self.output_message(&json!({
            "type": "LOG",
            "log": {
                "level": "INFO",
                "message": format!(
                    "Configuration for {} is valid (page_size={}, initial_load_size={})",
                    config.remote.base_url,
                    config.paging.page_size,
                    config.paging.initial_load_size
                )
            }
        }));

        Ok(())
    }

    /// Print a load outcome; a fetch failure fails the command
    fn report(
        &self,
        direction: LoadDirection,
        driver: &Driver,
        outcome: MediationOutcome,
    ) -> Result<()> {
        let partition = driver.engine().partition();
        match outcome {
            MediationOutcome::Success {
                end_of_pagination_reached,
            } => {
                self.output_message(&json!({
                    "type": "OUTCOME",
                    "direction": direction,
                    "partition": partition,
                    "status": "success",
                    "end_of_pagination_reached": end_of_pagination_reached,
                    "cached_items": driver.state().item_count(),
                }));
                Ok(())
            }
            MediationOutcome::Error(cause) => {
                self.output_message(&json!({
                    "type": "OUTCOME",
                    "direction": direction,
                    "partition": partition,
                    "status": "error",
                    "error": cause.to_string(),
                }));
                Err(Error::Fetch(cause))
            }
        }
    }

    /// Output a message
    fn output_message(&self, msg: &Value) {
        match self.cli.format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string(msg).unwrap_or_default());
            }
            OutputFormat::Pretty => {
                println!("{}", serde_json::to_string_pretty(msg).unwrap_or_default());
            }
        }
    }
}
