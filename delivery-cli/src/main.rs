mod cli;
mod commands;
mod console;
mod error;
mod paths;
mod render;

use std::fs;
use std::fs::File;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use delivery_lib::DeliveryClient;
use delivery_lib::auth::AutoRefreshTokenProvider;
use delivery_lib::auth::IdentityPasswordFlow;
use delivery_lib::auth::StaticTokenProvider;
use delivery_lib::auth::TokenProvider;
use delivery_lib::config::DeliveryConfig;
use delivery_lib::notify::AlertKind;
use delivery_lib::notify::Notifier;
use simplelog::Config;
use simplelog::LevelFilter;
use simplelog::WriteLogger;
use tokio_util::sync::CancellationToken;

use crate::cli::Cli;
use crate::cli::Command;
use crate::commands::Context;
use crate::commands::ListOptions;
use crate::error::CliError;

const CONSOLE_SHUTDOWN: Duration = Duration::from_secs(1);

#[tokio::main]
async fn main() -> ExitCode {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();
    init_logging(cli.log_level);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            eprintln!("{} {}", console::badge(AlertKind::Error), e.message());
            ExitCode::FAILURE
        }
    }
}

/// Logs go to `latest.log` in the cache directory; without one, nowhere.
fn init_logging(level: LevelFilter) {
    paths::rotate_logs();
    let Some(path) = paths::log_file() else { return };
    if let Some(dir) = path.parent() {
        let _ = fs::create_dir_all(dir);
    }
    match File::create(&path) {
        Ok(file) => {
            if let Err(e) = WriteLogger::init(level, Config::default(), file) {
                eprintln!("Failed to initialize logger: {}", e);
            }
        }
        Err(e) => eprintln!("Failed to create log file {}: {}", path.display(), e),
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let mut config = DeliveryConfig::from_env()?;
    if let Some(url) = cli.api_url.clone() {
        config = config.api_url(url);
    }
    if let Some(url) = cli.stats_url.clone() {
        config = config.stats_url(url);
    }

    let provider = token_provider(&cli, &config).await?;
    let client = DeliveryClient::from_config(&config, provider)?;
    log::info!("Using backend {}", client.base_url());

    let notifier = Notifier::new();
    let cancel = CancellationToken::new();
    let console = console::attach(&notifier, cancel.clone());

    let ctrl_c = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            log::info!("Interrupted");
            ctrl_c.cancel();
        }
    });

    let ctx = Context {
        client,
        config,
        notifier,
        cancel: cancel.clone(),
    };
    let result = tokio::select! {
        result = dispatch(&ctx, cli.command) => result,
        _ = cancel.cancelled() => Ok(()),
    };

    cancel.cancel();
    if tokio::time::timeout(CONSOLE_SHUTDOWN, console).await.is_err() {
        log::warn!("Console did not stop within {:?}", CONSOLE_SHUTDOWN);
    }
    result
}

async fn dispatch(ctx: &Context, command: Command) -> Result<(), CliError> {
    match command {
        Command::List {
            resource,
            search,
            sort,
            page,
            page_size,
        } => {
            let options = ListOptions {
                search,
                sort,
                page,
                page_size,
            };
            commands::list(ctx, resource, options).await
        }
        Command::Get { resource, id } => commands::get(ctx, resource, id).await,
        Command::Delete { resource, id, yes } => commands::delete(ctx, resource, id, yes).await,
        Command::WatchOrders { interval } => commands::watch_orders(ctx, interval).await,
        Command::Stats { series } => commands::stats(ctx, series).await,
        Command::Ask { question, faq } => commands::ask(ctx, &question.join(" "), faq).await,
    }
}

/// `--token` wins, then email sign-in, else requests go unauthenticated.
async fn token_provider(
    cli: &Cli,
    config: &DeliveryConfig,
) -> Result<Arc<dyn TokenProvider>, CliError> {
    if let Some(token) = &cli.token {
        return Ok(Arc::new(StaticTokenProvider::new(token.clone())));
    }

    let (Some(email), Some(password)) = (&cli.email, &cli.password) else {
        log::debug!("No credentials given, sending requests without a token");
        return Ok(Arc::new(StaticTokenProvider::signed_out()));
    };
    let api_key = config
        .identity_api_key
        .clone()
        .ok_or(CliError::MissingApiKey)?;

    let provider = AutoRefreshTokenProvider::new(IdentityPasswordFlow::new(
        api_key,
        email.clone(),
        password.clone(),
    ));
    // Surface bad credentials before the first request
    let token = provider.sign_in().await?;
    log::info!("Signed in as {} ({})", email, token.redacted());
    Ok(Arc::new(provider))
}
