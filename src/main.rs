//! arcana-relay entry point.
//!
//! Startup sequence:
//!   1. Load .env (if present)
//!   2. Load config
//!   3. Resolve effective log level (CLI `-v` flags > env > config)
//!   4. Init logger once
//!   5. Build provider, retriever and relay
//!   6. Spawn Ctrl-C → shutdown signal watcher
//!   7. Serve HTTP until shutdown

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use arcana_relay::config;
use arcana_relay::error::AppError;
use arcana_relay::llm::providers;
use arcana_relay::logger;
use arcana_relay::relay::CompletionRelay;
use arcana_relay::retrieval;
use arcana_relay::server::{self, AppState};
use arcana_relay::tarot::DrawEngine;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), AppError> {
    // .env is optional.
    let _ = dotenvy::dotenv();

    let args = parse_cli_args();

    let config = config::load(args.config_path.as_deref())?;

    let effective_log_level = args.log_level.unwrap_or(config.log_level.as_str());
    let force_cli_level = args.log_level.is_some();

    logger::init(effective_log_level, force_cli_level, config.log_file.as_deref())?;

    info!(
        bind = %config.server.bind,
        provider = %config.llm.provider,
        model = %config.llm.model(),
        configured_log_level = %config.log_level,
        effective_log_level = %effective_log_level,
        auth = config.auth.require_auth,
        "config loaded"
    );
    if !config.auth.require_auth {
        info!("WEB_APP_USERNAME or WEB_APP_PASSWORD not set: authentication disabled");
    }

    let client = providers::build(&config.llm, config.llm_api_key.clone())
        .map_err(|e| AppError::Provider(e.to_string()))?;
    let retriever = retrieval::build(&config.retrieval)?;

    let relay = match client {
        Some(client) => Some(CompletionRelay::new(client, retriever, config.llm.model())),
        None => {
            warn!("no completion provider configured: /chat will answer 503");
            None
        }
    };

    let state = AppState::new(DrawEngine::new(), relay, config.auth.clone());
    let router = server::build_router(state);

    let shutdown = CancellationToken::new();

    let ctrlc_token = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("ctrl-c received, shutting down");
            ctrlc_token.cancel();
        }
    });

    server::serve(&config.server.bind, router, shutdown).await
}

// ── CLI ───────────────────────────────────────────────────────────────────────

struct CliArgs {
    log_level: Option<&'static str>,
    config_path: Option<String>,
}

fn parse_cli_args() -> CliArgs {
    let mut verbosity = 0u8;
    let mut config_path = None;

    let mut iter = std::env::args().skip(1);
    while let Some(arg) = iter.next() {
        if arg == "--" {
            break;
        }

        match arg.as_str() {
            "-h" | "--help" => {
                println!("Usage: arcana-relay [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -h, --help                 Print help");
                println!("  -f, --config <PATH>        Path to configuration file (default: config/default.toml)");
                println!("  -v, -vv, -vvv              Increase logging verbosity");
                std::process::exit(0);
            }
            "-f" | "--config" => {
                if let Some(path) = iter.next() {
                    config_path = Some(path);
                } else {
                    eprintln!("error: -f/--config requires a path argument");
                    std::process::exit(1);
                }
            }
            "--verbose" => verbosity = verbosity.saturating_add(1),
            a if a.starts_with('-') && a.len() > 1 && a.chars().skip(1).all(|c| c == 'v') => {
                verbosity = verbosity.saturating_add((a.len() - 1) as u8);
            }
            _ => {}
        }
    }

    //   -v   → info
    //   -vv  → debug
    //   -vvv → trace
    let log_level = match verbosity {
        0 => None,
        1 => Some("info"),
        2 => Some("debug"),
        _ => Some("trace"),
    };

    CliArgs { log_level, config_path }
}
