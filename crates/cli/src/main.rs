use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use fintech_monitor_core::{AppConfig, ConfigLoader};
use fintech_monitor_web_api::{ApiServer, ServiceKind};
use serde::Serialize;

mod app;

use app::ServiceContext;

#[derive(Parser)]
#[command(name = "fintech-monitor")]
#[command(about = "Market, news and sentiment monitoring with email/SMS alerts", long_about = None)]
struct Cli {
    /// Config file path
    #[arg(short, long, global = true, default_value = "config/Config.toml")]
    config: PathBuf,

    /// Postgres connection URL, overriding the config file
    #[arg(long, global = true, env = "DATABASE_URL")]
    database_url: Option<String>,

    /// Optional log file path (logs to file instead of stderr)
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the HTTP endpoints of one service, or all of them
    Serve {
        /// scraper, analyzer, alert or all
        #[arg(short, long, default_value = "all")]
        service: ServiceKind,
        /// Listening port (defaults to the service's configured port)
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Run one scraping cycle and print the result
    Scrape,
    /// Run one analysis cycle and print the result
    Analyze,
    /// Run one alert cycle and print the result
    CheckAlerts,
    /// Serve HTTP and run cycles on the configured schedule
    Run {
        /// scraper, analyzer, alert or all
        #[arg(short, long, default_value = "all")]
        service: ServiceKind,
        /// Listening port (defaults to the service's configured port)
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Create tables and indexes
    InitDb,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_file.as_ref())?;

    let config = load_config(&cli)?;
    let ctx = ServiceContext::connect(config)?;

    let result = match cli.command {
        Commands::Serve { service, port } => run_server(&ctx, service, port).await,
        Commands::Scrape => print_json(&ctx.scraper.run_cycle(&ctx.config.symbols).await?),
        Commands::Analyze => print_json(&ctx.analyzer.run_cycle(&ctx.config.symbols).await?),
        Commands::CheckAlerts => print_json(&ctx.alerts.run_cycle().await?),
        Commands::Run { service, port } => run_daemon(&ctx, service, port).await,
        Commands::InitDb => run_init_db(&ctx).await,
    };

    ctx.shutdown().await;
    result
}

fn init_logging(log_file: Option<&PathBuf>) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    match log_file {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::sync::Mutex::new(file))
                .with_ansi(false)
                .init();
        }
        None => {
            tracing_subscriber::fmt().with_env_filter(filter).init();
        }
    }
    Ok(())
}

fn load_config(cli: &Cli) -> Result<AppConfig> {
    let mut config = ConfigLoader::load_from(&cli.config)?;
    if let Some(url) = &cli.database_url {
        config.database.url.clone_from(url);
    }
    tracing::info!(
        config = %cli.config.display(),
        symbols = ?config.symbols,
        "Configuration loaded"
    );
    Ok(config)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn listen_addr(ctx: &ServiceContext, service: ServiceKind, port: Option<u16>) -> String {
    let port = port.unwrap_or_else(|| ctx.default_port(service));
    format!("{}:{}", ctx.config.server.host, port)
}

async fn run_server(ctx: &ServiceContext, service: ServiceKind, port: Option<u16>) -> Result<()> {
    tracing::info!("Initializing {} service...", service);
    ctx.prepare_schema().await;

    let server = ApiServer::new(ctx.app_state(service));
    let addr = listen_addr(ctx, service, port);

    tokio::select! {
        result = server.serve(&addr) => result?,
        result = shutdown_signal() => result?,
    }
    Ok(())
}

async fn run_daemon(ctx: &ServiceContext, service: ServiceKind, port: Option<u16>) -> Result<()> {
    tracing::info!("Starting {} daemon", service);
    ctx.prepare_schema().await;

    let server = ApiServer::new(ctx.app_state(service));
    let addr = listen_addr(ctx, service, port);

    let server_handle = tokio::spawn(async move {
        if let Err(e) = server.serve(&addr).await {
            tracing::error!("Server error: {}", e);
        }
    });
    let schedulers = app::spawn_all(ctx, service);

    shutdown_signal().await?;

    for handle in schedulers {
        handle.abort();
    }
    server_handle.abort();

    tracing::info!("Daemon stopped");
    Ok(())
}

async fn run_init_db(ctx: &ServiceContext) -> Result<()> {
    let db = ctx
        .db
        .as_ref()
        .ok_or_else(|| anyhow::anyhow!("no database configured"))?;
    db.connect().await?;
    db.initialize_schema().await?;
    println!("Database schema initialized");
    Ok(())
}

/// Waits for SIGINT or SIGTERM.
async fn shutdown_signal() -> Result<()> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;

    tokio::select! {
        _ = sigterm.recv() => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
        }
        _ = sigint.recv() => {
            tracing::info!("Received SIGINT (Ctrl+C), initiating graceful shutdown");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_serve_defaults_to_all() {
        let cli = Cli::try_parse_from(["fintech-monitor", "serve"]).unwrap();
        match cli.command {
            Commands::Serve { service, port } => {
                assert_eq!(service, ServiceKind::All);
                assert_eq!(port, None);
            }
            _ => panic!("expected serve"),
        }
    }

    #[test]
    fn test_parse_service_and_port() {
        let cli = Cli::try_parse_from([
            "fintech-monitor",
            "run",
            "--service",
            "alert",
            "--port",
            "6000",
            "--config",
            "custom.toml",
        ])
        .unwrap();
        assert_eq!(cli.config, PathBuf::from("custom.toml"));
        assert!(matches!(
            cli.command,
            Commands::Run {
                service: ServiceKind::Alert,
                port: Some(6000)
            }
        ));
    }

    #[test]
    fn test_rejects_unknown_service() {
        assert!(Cli::try_parse_from(["fintech-monitor", "serve", "--service", "billing"]).is_err());
    }
}
