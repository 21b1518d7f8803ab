//! # CLI Module
//!
//! User-facing commands of Spotted. Each command resolves the listener,
//! lists their tracked playlists (through the playlist cache) and then hands
//! over to the [`crate::engine`].
//!
//! ## Commands
//!
//! - [`discover`] - Suggests new tracks found in the discovery playlists
//!   (Discover Weekly and Release Radar by default)
//! - [`recommend`] - Suggests new tracks from the recommendation feed, seeded by
//!   the listener's top artists and tuned to their top tracks
//! - [`check_track`] - Tells whether the currently playing track is already tracked
//! - [`check_holes`] - Reports gaps in the numbering of tracked playlists
//!
//! ## Output
//!
//! Suggestions are always printed as a table, best first. With
//! `--output-type playlist` they are also written to a dedicated playlist,
//! replacing whatever it held before.
//!
//! ## Error Handling
//!
//! Recoverable issues (an unreadable cache, missing discovery playlists) are
//! reported with `warning!` and the command carries on. A failing catalog call
//! aborts the command through `error!`, which exits with code 1.
//!
//! ## Usage
//!
//! ```bash
//! spotted discover
//! spotted --output-type playlist recommend
//! spotted --credentials-flow redirect check-track
//! spotted check-holes
//! ```

mod check;
mod discover;
mod output;
mod recommend;

pub use check::check_holes;
pub use check::check_track;
pub use discover::discover;
pub use output::render_table;
pub use recommend::recommend;
