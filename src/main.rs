use std::sync::Arc;

use color_eyre::eyre::{eyre, WrapErr};
use color_eyre::Result;
use tracing::{info, warn};

use livedash::adapters::{MemoryDom, ReqwestHttpClient};
use livedash::cli::{parse_args, run_cli_command};
use livedash::config::LiveConfig;
use livedash::live::{ConnectionManager, ConnectionState};
use livedash::traits::{Headers, HttpClient};

#[tokio::main]
async fn main() -> Result<()> {
    // Handle CLI flags before any initialization
    let config = match run_cli_command(parse_args(std::env::args())) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(2);
        }
    };

    color_eyre::install()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("livedash=info")),
        )
        .init();

    run(config).await
}

/// Load the page once, then keep it current until Ctrl-C.
async fn run(config: LiveConfig) -> Result<()> {
    let http: Arc<dyn HttpClient> = Arc::new(ReqwestHttpClient::new());
    let dom = Arc::new(load_page(http.as_ref(), &config).await?);
    info!(page = %config.page_url(), "page loaded");

    let manager = ConnectionManager::new(config, http, dom);
    let mut state = manager.state_receiver();
    manager.start();

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            changed = state.changed() => {
                if changed.is_err() {
                    break;
                }
                let current = *state.borrow_and_update();
                match current {
                    ConnectionState::Open => info!("live"),
                    ConnectionState::Connecting => info!("connecting"),
                    ConnectionState::Closed => warn!("offline"),
                }
            }
            _ = &mut shutdown => {
                info!("shutting down");
                break;
            }
        }
    }

    manager.stop();
    Ok(())
}

async fn load_page(http: &dyn HttpClient, config: &LiveConfig) -> Result<MemoryDom> {
    let url = config.page_url();
    let response = http
        .get(&url, &Headers::new())
        .await
        .wrap_err_with(|| format!("failed to load {}", url))?;
    if !response.is_success() {
        return Err(eyre!("{} returned status {}", url, response.status));
    }
    let html = response.text().wrap_err("page is not UTF-8")?;
    Ok(MemoryDom::from_page(&url, &html, &config.selectors)?.without_recording())
}
