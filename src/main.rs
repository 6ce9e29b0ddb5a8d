//! EasyMeal
//!
//! An MCP server for calorie budgets, food diaries and habit trackers.

use rmcp::ServiceExt;
use tokio::io::{stdin, stdout};
use tokio::sync::broadcast::error::RecvError;
use tracing_subscriber::EnvFilter;

use easymeal::{build_info, config, db};
use easymeal::mcp::EasyMealService;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging (output to stderr to not interfere with MCP stdio)
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("easymeal=info".parse()?))
        .with_writer(std::io::stderr)
        .init();

    build_info::print_startup_banner();
    eprintln!("Starting MCP server on stdio...");

    let db_path = config::database_path();
    eprintln!("Database path: {}", db_path.display());

    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    eprintln!("Initializing database...");
    let database = db::Database::new(&db_path)?;

    database.with_conn(|conn| {
        if db::migrations::needs_migration(conn)? {
            eprintln!("Applying schema migrations...");
            db::migrations::run_migrations(conn)?;
        }
        let version = db::migrations::get_schema_version(conn)?;
        eprintln!("Database schema version: {}", version);
        Ok(())
    })?;

    let service = EasyMealService::new(db_path, database);

    // Log diary events as they happen
    let mut events = service.subscribe();
    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(dated) => tracing::info!(date = %dated.date, event = ?dated.event, "diary event"),
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!("Diary event log skipped {} events", skipped)
                }
                Err(RecvError::Closed) => break,
            }
        }
    });

    let transport = (stdin(), stdout());
    let server = service.serve(transport).await?;
    server.waiting().await?;

    Ok(())
}
