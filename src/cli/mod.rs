//! # Command-Line Interface
//!
//! A small admin binary for bootstrapping and inspecting a tracker database.
//!
//! ## Commands
//!
//! | Command | Purpose |
//! |---------|---------|
//! | `init [path]` | Create `.shotline/`, the schema and the site row |
//! | `status` | Row counts per table |
//! | `shows` | List shows |
//! | `search <show>` | Search units by category, group, unit, tag, status and task facets |
//! | `add-user <id>` | Add a user; the password comes from `--password` or `SHOTLINE_PASSWORD` |
//!
//! ## Output Formats
//!
//! All commands support `--format`:
//! - `text` (default) - Human-readable output
//! - `json` - `{ "msg": ..., "err": "" }` envelopes
//!
//! ## Logging
//!
//! `SHOTLINE_LOG` takes a tracing filter; otherwise `--verbose` selects
//! `debug`, otherwise the `[log] level` of the global config applies.
//!
//! ## Entry Point
//!
//! Call [`run()`] to parse arguments and execute the appropriate command.

mod app;
mod output;
mod query;
mod user;

pub use app::{run, Cli, Commands, SearchArgs, LOG_ENV, PASSWORD_ENV};
pub use output::{Output, OutputFormat};
