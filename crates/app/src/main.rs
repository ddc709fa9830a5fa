use clap::Parser;
use migration::{Migrator, MigratorTrait};
use settings::{Cli, Command, Database, MigrateAction, Settings};

mod settings;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let cli = Cli::parse();
    let settings = Settings::new(cli.config.as_deref())?;

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "beansd={level},server={level},engine={level}",
            level = settings.app.level
        ))
        .init();

    let db = connect(&settings.database()).await?;

    match cli.command.unwrap_or(Command::Serve) {
        Command::Migrate { action } => {
            match action {
                MigrateAction::Up => Migrator::up(&db, None).await?,
                MigrateAction::Down => Migrator::down(&db, None).await?,
                MigrateAction::Fresh => Migrator::fresh(&db).await?,
                MigrateAction::Status => Migrator::status(&db).await?,
            }
            tracing::info!("migrate {action:?} done");
        }
        Command::Serve => {
            Migrator::up(&db, None).await?;
            let engine = engine::Engine::builder().database(db).build().await?;
            let listener = tokio::net::TcpListener::bind(settings.address()).await?;
            server::run_with_listener(engine, listener).await?;
        }
    }

    Ok(())
}

async fn connect(
    config: &Database,
) -> Result<sea_orm::DatabaseConnection, Box<dyn std::error::Error + Send + Sync>> {
    let url = match config {
        Database::Memory => String::from("sqlite::memory:"),
        Database::Sqlite(path) => format!("sqlite:{}?mode=rwc", path),
    };

    tracing::debug!("connecting to {url}");
    Ok(sea_orm::Database::connect(url).await?)
}
