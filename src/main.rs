use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

// Use the library instead of redeclaring modules
use stream_endpoint_manager::{
    config::{Config, LogFormat},
    database::Database,
    web::{AppState, WebServer},
};

#[derive(Parser)]
#[command(name = "stream-endpoint-manager")]
#[command(version)]
#[command(about = "Generates and keeps consistent the catalog of CDN video stream endpoints")]
#[command(long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    /// Listening IP address
    #[arg(short = 'H', long, value_name = "IP")]
    host: Option<String>,

    /// Listening port
    #[arg(short, long, value_name = "PORT")]
    port: Option<u16>,

    /// Database URL (overrides config file)
    #[arg(short = 'd', long, value_name = "URL")]
    database_url: Option<String>,

    /// Log level (overrides config file)
    #[arg(short = 'v', long)]
    log_level: Option<String>,

    /// Log output format
    #[arg(long, value_parser = ["pretty", "json"])]
    log_format: Option<String>,
}

fn init_tracing(level: &str, format: LogFormat) {
    let log_filter = if level == "trace" {
        format!("stream_endpoint_manager={level},tower_http=trace,sea_orm=debug")
    } else {
        format!("stream_endpoint_manager={level}")
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| log_filter.into());

    let registry = tracing_subscriber::registry().with(filter);
    match format {
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).init(),
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).init(),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration from specified file
    let mut config = Config::load_from_file(&cli.config)?;

    // Override config with CLI arguments
    if let Some(host) = cli.host {
        config.web.host = host;
    }
    if let Some(port) = cli.port {
        config.web.port = port;
    }
    if let Some(database_url) = cli.database_url {
        config.database.url = database_url;
    }
    if let Some(log_level) = cli.log_level {
        config.logging.level = log_level;
    }
    match cli.log_format.as_deref() {
        Some("json") => config.logging.format = LogFormat::Json,
        Some("pretty") => config.logging.format = LogFormat::Pretty,
        _ => {}
    }

    init_tracing(&config.logging.level, config.logging.format);

    info!(
        "Starting Stream Endpoint Manager v{}",
        env!("CARGO_PKG_VERSION")
    );
    info!("Configuration loaded from: {}", cli.config);
    info!(
        strategy = ?config.regeneration.strategy,
        probe_timeout = ?config.probe.timeout,
        "Endpoint engine settings"
    );

    let database = Database::new(&config.database).await?;
    database.migrate().await?;

    let state = AppState::new(config, database)?;
    let server = WebServer::new(state)?;
    info!("Serving on {}:{}", server.host(), server.port());

    server.serve(None).await?;

    info!("Stream Endpoint Manager stopped");
    Ok(())
}
