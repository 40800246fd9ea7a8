//! CLI module for livedash.
//!
//! Flags that end the process before any networking (`--version`, `--help`,
//! argument errors) are handled here; everything else becomes a
//! [`LiveConfig`] for the live client.
//!
//! ```ignore
//! use livedash::cli::{parse_args, run_cli_command};
//!
//! let command = parse_args(std::env::args());
//! let config = match run_cli_command(command) {
//!     Ok(config) => config,
//!     Err(e) => { eprintln!("Error: {}", e); std::process::exit(2); }
//! };
//! ```

pub mod args;
pub mod version;

pub use args::{parse_args, usage, CliCommand};
pub use version::{handle_version_command, version_line, VERSION};

use color_eyre::eyre::eyre;
use color_eyre::Result;

use crate::config::LiveConfig;

/// Turn a parsed command into a validated configuration.
///
/// `Version` and `Help` print and exit the process.
pub fn run_cli_command(command: CliCommand) -> Result<LiveConfig> {
    match command {
        CliCommand::Version => handle_version_command(),
        CliCommand::Help => {
            println!("{}", usage());
            std::process::exit(0)
        }
        CliCommand::Invalid(message) => Err(eyre!("{}\n\n{}", message, usage())),
        CliCommand::Run { url, page } => config_for(url, page),
    }
}

/// Configuration for following `page` on the dashboard at `url`.
pub fn config_for(url: String, page: String) -> Result<LiveConfig> {
    let config = LiveConfig::default().with_base_url(url).with_page_path(page);
    config.validate()?;
    Ok(config)
}
