//! NutriScan
//!
//! An MCP server for food ingredient analysis.

use nutriscan::build_info;
use nutriscan::config::Settings;
use nutriscan::db;
use nutriscan::mcp::NutriscanService;
use rmcp::ServiceExt;
use tokio::io::{stdin, stdout};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Logging goes to stderr so it does not interfere with MCP stdio
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("nutriscan=info".parse()?))
        .with_writer(std::io::stderr)
        .init();

    build_info::print_startup_banner();
    eprintln!("Starting MCP server on stdio...");

    let settings = Settings::from_env();
    eprintln!("Database path: {}", settings.database_path.display());
    eprintln!("Report directory: {}", settings.report_dir.display());

    if let Some(parent) = settings.database_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::create_dir_all(&settings.report_dir)?;

    eprintln!("Initializing database...");
    let database = db::Database::new(&settings.database_path)?;

    database.with_conn(|conn| {
        db::migrations::run_migrations(conn)?;
        let version = db::migrations::get_schema_version(conn)?;
        eprintln!("Database schema version: {}", version);
        Ok(())
    })?;

    let service = NutriscanService::new(settings, database);

    let transport = (stdin(), stdout());
    let server = service.serve(transport).await?;
    server.waiting().await?;

    Ok(())
}
