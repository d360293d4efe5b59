use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};

use crate::config::AppConfig;
use crate::database::{MemoryStore, PgStore, Store};
use crate::services::email::{LogMailer, Mailer, SmtpMailer};
use crate::state::AppState;

#[derive(Parser)]
#[command(name = "shopfront-api")]
#[command(about = "Shopfront API - accounts, business profiles and product catalog")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Run the HTTP server (default)")]
    Serve {
        #[arg(long, help = "Port to listen on, overrides PORT")]
        port: Option<u16>,

        #[arg(long, help = "Use the in-memory store instead of PostgreSQL")]
        memory: bool,
    },

    #[command(about = "Apply database migrations and exit")]
    Migrate,
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = AppConfig::from_env().context("failed to load configuration")?;
    tracing::info!("Starting Shopfront API in {:?} mode", config.environment);

    match cli.command.unwrap_or(Commands::Serve { port: None, memory: false }) {
        Commands::Serve { port, memory } => serve(config, port, memory).await,
        Commands::Migrate => {
            let store = PgStore::connect(&config.database).await?;
            store.migrate().await?;
            Ok(())
        }
    }
}

async fn serve(mut config: AppConfig, port: Option<u16>, memory: bool) -> anyhow::Result<()> {
    if let Some(port) = port {
        config.server.port = port;
    }

    let store: Arc<dyn Store> = if memory {
        tracing::warn!("Using in-memory store; data is lost on shutdown");
        Arc::new(MemoryStore::new())
    } else {
        let store = PgStore::connect(&config.database).await?;
        store.migrate().await?;
        Arc::new(store)
    };

    let mailer: Arc<dyn Mailer> = match &config.email {
        Some(email) => Arc::new(SmtpMailer::new(email).context("failed to configure SMTP transport")?),
        None => {
            tracing::warn!("SMTP_HOST not set; verification emails are only logged");
            Arc::new(LogMailer)
        }
    };

    let bind_addr = format!("0.0.0.0:{}", config.server.port);
    let app = crate::app(AppState::new(config, store, mailer));

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("Shopfront API listening on http://{}", bind_addr);
    axum::serve(listener, app).await?;
    Ok(())
}
