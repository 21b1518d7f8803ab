//! Spotted, a Spotify track suggestion CLI library
//!
//! This library suggests new tracks to a listener based on the playlists they
//! already curate. It lists the listener's tracked playlists, collects candidates
//! from discovery playlists or the recommendation endpoint, filters out what is
//! already known and ranks the rest with a small additive heuristic.
//!
//! # Modules
//!
//! - `api` - HTTP endpoints for the local OAuth callback server
//! - `cli` - Command-line interface implementations
//! - `config` - Environment loading and the immutable run configuration
//! - `engine` - Pagination, deduplication, album resolution, scoring and playlist reconciliation
//! - `error` - Error taxonomy shared by every module
//! - `management` - Token and playlist caches on disk
//! - `server` - Local HTTP server for OAuth callbacks
//! - `spotify` - Spotify Web API client and authentication flows
//! - `types` - Data structures and type definitions
//! - `utils` - Utility functions and helpers

pub mod api;
pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod management;
pub mod server;
pub mod spotify;
pub mod types;
pub mod utils;

/// A convenient Result type alias for operations that may fail.
///
/// Every fallible library operation reports a [`error::SpotError`], which lets
/// callers tell transport failures apart from cache problems or a partially
/// updated playlist.
pub type Res<T> = std::result::Result<T, error::SpotError>;

/// Prints an informational message with a blue bullet point.
///
/// # Example
///
/// ```
/// info!("Fetching playlists of user {}", user_id);
/// ```
#[macro_export]
macro_rules! info {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "o".blue().bold(), std::format_args!($($arg)*));
  })
}

/// Prints a success message with a green checkmark.
///
/// # Example
///
/// ```
/// success!("Generated {} suggestions", count);
/// ```
#[macro_export]
macro_rules! success {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "✓".green().bold(), std::format_args!($($arg)*));
  })
}

/// Prints an error message with a red exclamation mark and exits the program.
///
/// Only used for conditions the process cannot recover from, such as a cache
/// directory that cannot be created or an aborted top-level operation. The
/// process exits with code 1 right after printing.
///
/// # Example
///
/// ```
/// error!("Failed to write playlist cache: {}", e);
/// // Program exits here - code after this will not execute
/// ```
#[macro_export]
macro_rules! error {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".red().bold(), std::format_args!($($arg)*));
    std::process::exit(1);
  })
}

/// Prints a warning message with a yellow exclamation mark.
///
/// Used for recoverable issues, e.g. a paginated listing that had to be cut
/// short because the server reported an inconsistent total.
///
/// # Example
///
/// ```
/// warning!("Token cache could not be written: {}", e);
/// ```
#[macro_export]
macro_rules! warning {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".yellow().bold(), std::format_args!($($arg)*));
  })
}
