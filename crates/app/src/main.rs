use clap::Parser;
use migration::{Migrator, MigratorTrait};

mod cli;
mod commands;
mod render;
mod settings;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let cli = cli::Cli::parse();
    let settings = settings::Settings::load(cli.config.as_deref())?;

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "tally={level},engine={level}",
            level = settings.log.level
        ))
        .with_writer(std::io::stderr)
        .init();

    let url = cli
        .database_url
        .clone()
        .unwrap_or_else(|| settings.database.url());
    let db = connect(&url).await?;
    let engine = engine::Engine::builder().database(db).build().await?;

    commands::run(&engine, cli.command).await
}

async fn connect(
    url: &str,
) -> Result<sea_orm::DatabaseConnection, Box<dyn std::error::Error + Send + Sync>> {
    let database = sea_orm::Database::connect(url).await?;
    Migrator::up(&database, None).await?;
    tracing::debug!("database ready");
    Ok(database)
}
