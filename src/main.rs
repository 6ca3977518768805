use fleet_session::app::AppContext;
use fleet_session::cli;
use fleet_session::config::AppConfig;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = AppConfig::from_env().unwrap_or_else(|e| {
        eprintln!("Error: {e}");
        std::process::exit(1);
    });

    eprintln!("🚚 Fleet Session v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Store: {}", config.db_path.display());
    eprintln!("   Gateway: {}", config.gateway);
    if let Some(url) = &config.api_url {
        eprintln!("   Auth API: {url}");
    }

    let ctx = AppContext::open(&config).await.unwrap_or_else(|e| {
        eprintln!("Error: Failed to open store at {}: {e}", config.db_path.display());
        std::process::exit(1);
    });

    let route = ctx.bootstrap().await;
    eprintln!("   Initial route: {route}");
    eprintln!("   Type `help` for commands. `quit` to exit.\n");

    cli::run_repl(&ctx).await?;

    tracing::info!("Shutting down");
    Ok(())
}
