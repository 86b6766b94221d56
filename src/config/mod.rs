//! Project settings.
//!
//! Settings are read from `.toolwarden/config.yml` at the project root:
//!
//! ```yaml
//! catalog: tools/catalog.yml
//! probe_timeout_secs: 5
//! command_timeout_secs: 600
//! log_tail: 20
//! ```
//!
//! Command-line flags take precedence over the file.

pub mod loader;
pub mod schema;

pub use loader::{load_settings, load_settings_file, parse_settings};
pub use schema::Settings;
