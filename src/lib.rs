pub mod api;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod database;
pub mod errors;
pub mod http;
pub mod rating;
pub mod services;

#[cfg(test)]
pub(crate) mod testing;

use anyhow::Result;
use clap::Parser;
use cli::Cli;
use log::info;
use serde::Serialize;
use std::sync::Arc;

use crate::api::AppState;
use crate::catalog::CkanClient;
use crate::cli::Command;
use crate::config::AppConfig;
use crate::database::SqliteLedger;
use crate::rating::RatingEngine;
use crate::services::ServerService;

pub type CkanRatingEngine = RatingEngine<SqliteLedger, CkanClient>;

pub fn interpret() -> Command {
    let cli = Cli::parse();
    cli.command
}

pub fn build_engine(config: &AppConfig) -> Result<CkanRatingEngine> {
    let ledger = SqliteLedger::open(&config.ledger)?;
    let catalog = CkanClient::new(&config.catalog)?;
    Ok(RatingEngine::new(ledger, catalog))
}

pub fn handle_serve(port: u16) -> Result<()> {
    let config = AppConfig::from_env()?;
    // Built outside the runtime: the blocking catalog client owns its own runtime.
    let state = Arc::new(AppState::new(build_engine(&config)?));

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async {
        let service = ServerService::new(port, Arc::clone(&state));
        service.run().await
    })
}

pub fn handle_init_db() -> Result<()> {
    let config = AppConfig::from_env()?;
    let ledger = SqliteLedger::open(&config.ledger)?;
    info!(
        "Ledger ready at {} (table '{}')",
        config.ledger.database_path,
        ledger.table()
    );
    Ok(())
}

pub fn handle_get(dataset_id: &str) -> Result<()> {
    let config = AppConfig::from_env()?;
    let engine = build_engine(&config)?;
    print_json(&engine.get_rating(dataset_id)?)
}

pub fn handle_post(dataset_id: &str, user_id: &str, score: i64) -> Result<()> {
    let config = AppConfig::from_env()?;
    let engine = build_engine(&config)?;
    print_json(&engine.post_rating(dataset_id, user_id, score)?)
}

pub fn handle_show(dataset_id: &str) -> Result<()> {
    let config = AppConfig::from_env()?;
    let ledger = SqliteLedger::open(&config.ledger)?;
    print_json(&ledger.list_for_dataset(dataset_id)?)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
