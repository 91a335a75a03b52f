use anyhow::{Context, Result};
use clap::Parser;
use std::process::ExitCode;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use catalog_watcher::cli::{Cli, Command};
use catalog_watcher::config::{AppConfig, LoggingConfig};
use catalog_watcher::plugins::notifiers::EmailNotifier;
use catalog_watcher::plugins::{reporters, NotifierPlugin};
use catalog_watcher::scraper::fetch_products;
use catalog_watcher::{BrowserFetcher, PollLoop, ProductExtractor};

fn init_tracing(config: &LoggingConfig) -> Result<Option<WorkerGuard>> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.filter)?,
    };
    let registry = tracing_subscriber::registry().with(filter).with(fmt::layer());

    match &config.directory {
        Some(directory) => {
            let appender = tracing_appender::rolling::daily(directory, &config.file_prefix);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            registry
                .with(fmt::layer().with_ansi(false).with_writer(writer))
                .init();
            Ok(Some(guard))
        }
        None => {
            registry.init();
            Ok(None)
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for ctrl-c: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

fn cancel_on_signal() -> CancellationToken {
    let cancel = CancellationToken::new();
    let token = cancel.clone();
    tokio::spawn(async move {
        shutdown_signal().await;
        info!("Exiting...");
        token.cancel();
    });
    cancel
}

async fn run(config: AppConfig) -> Result<ExitCode> {
    let extractor = ProductExtractor::new(&config.extractor)?;
    let fetcher = BrowserFetcher::new(&config.site, config.scraper.clone());
    let notifier = EmailNotifier::new(
        config.notifications.smtp.clone(),
        config.notifications.content.clone(),
        &config.site,
    )?;
    let reporter = reporters::from_config(&config.status)?;

    let poll = PollLoop::new(
        Box::new(fetcher),
        extractor,
        Box::new(notifier),
        reporter,
        config.scheduler.clone(),
        config.status.friendly_name.clone(),
    );

    info!("Watching {}", config.site.url);
    let stats = poll.run(cancel_on_signal()).await;
    if let Some(last_error) = &stats.last_error {
        warn!("Last error before shutdown: {}", last_error);
    }

    info!("Done");
    Ok(ExitCode::SUCCESS)
}

async fn check_once(config: AppConfig) -> Result<ExitCode> {
    let extractor = ProductExtractor::new(&config.extractor)?;
    let fetcher = BrowserFetcher::new(&config.site, config.scraper.clone());

    match fetch_products(&fetcher, &extractor, &cancel_on_signal()).await {
        Ok(products) => {
            for product in &products {
                println!("{} - {}", product.name, product.absolute_url(&config.site.origin));
            }
            info!("Found {} available products", products.len());
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            error!("Could not get products: {}", e);
            Ok(ExitCode::FAILURE)
        }
    }
}

async fn test_smtp(config: AppConfig) -> Result<ExitCode> {
    let notifier = EmailNotifier::new(
        config.notifications.smtp.clone(),
        config.notifications.content.clone(),
        &config.site,
    )?;

    let host = &config.notifications.smtp.host;
    match notifier.test_connection().await {
        Ok(true) => {
            info!("SMTP connection to {} succeeded", host);
            Ok(ExitCode::SUCCESS)
        }
        Ok(false) => {
            error!("SMTP server {} rejected the connection", host);
            Ok(ExitCode::FAILURE)
        }
        Err(e) => {
            error!("SMTP connection to {} failed: {}", host, e);
            Ok(ExitCode::FAILURE)
        }
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let mut config = AppConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;
    cli.apply(&mut config);
    config.validate().context("Invalid configuration")?;

    let _guard = init_tracing(&config.logging)?;
    info!("Catalog watcher started");

    match cli.command() {
        Command::Run => run(config).await,
        Command::Check => check_once(config).await,
        Command::TestSmtp => test_smtp(config).await,
    }
}
