//! Command-line argument parsing for livedash.

use crate::config::{DEFAULT_BASE_URL, DEFAULT_PAGE_PATH};

/// Parsed CLI command to execute.
#[derive(Debug, Clone, PartialEq)]
pub enum CliCommand {
    /// Show version information
    Version,
    /// Show usage
    Help,
    /// Follow a dashboard page (default)
    Run { url: String, page: String },
    /// Arguments could not be parsed
    Invalid(String),
}

/// Parse command-line arguments and return the command to execute.
///
/// `--version` and `--help` win over everything else. Values may be given
/// as `--url VALUE` or `--url=VALUE`.
///
/// # Examples
///
/// ```
/// use livedash::cli::args::{parse_args, CliCommand};
///
/// let args = vec!["livedash".to_string(), "--version".to_string()];
/// assert_eq!(parse_args(args.into_iter()), CliCommand::Version);
/// ```
pub fn parse_args<I>(args: I) -> CliCommand
where
    I: Iterator<Item = String>,
{
    let mut url = DEFAULT_BASE_URL.to_string();
    let mut page = DEFAULT_PAGE_PATH.to_string();
    let mut error = None;

    // Skip the program name
    let mut args = args.skip(1);
    while let Some(arg) = args.next() {
        let (flag, inline) = match arg.split_once('=') {
            Some((flag, value)) if flag.starts_with("--") => (flag.to_string(), Some(value.to_string())),
            _ => (arg.clone(), None),
        };
        match flag.as_str() {
            "--version" | "-V" => return CliCommand::Version,
            "--help" | "-h" => return CliCommand::Help,
            "--url" | "--page" => {
                let Some(value) = inline.or_else(|| args.next()) else {
                    error.get_or_insert_with(|| format!("{} requires a value", flag));
                    continue;
                };
                if flag == "--url" {
                    url = value;
                } else {
                    page = value;
                }
            }
            other => {
                error.get_or_insert_with(|| format!("unknown argument '{}'", other));
            }
        }
    }

    match error {
        Some(message) => CliCommand::Invalid(message),
        None => CliCommand::Run { url, page },
    }
}

/// Usage text for `--help`.
pub fn usage() -> String {
    format!(
        "Usage: livedash [--url <base>] [--page <path>]\n\
         \n\
         Follow a dashboard page and keep it current from the activity stream.\n\
         \n\
         Options:\n\
         \x20 --url <base>    Dashboard base URL (default: {})\n\
         \x20 --page <path>   Page to follow (default: {})\n\
         \x20 -V, --version   Print version\n\
         \x20 -h, --help      Print this help",
        DEFAULT_BASE_URL, DEFAULT_PAGE_PATH
    )
}
