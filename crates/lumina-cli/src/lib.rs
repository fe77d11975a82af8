//! # lumina-cli — Command-Line Interface for Lumina
//!
//! ## Subcommands
//!
//! - `lumina guardian simulate`: Walk with a simulated location feed and
//!   exercise the SOS countdown end to end.
//! - `lumina cycle phase|log|list`: Phase lookup and cycle entries in the
//!   data store.
//! - `lumina sage insight|chat|image`: Talk to the Sage.
//!
//! ## Crate Policy
//!
//! - Argument parsing is separated from behaviour; handlers delegate to the
//!   library crates.
//! - Handlers return `anyhow::Result<u8>`; the exit code is the `u8`.

pub mod cycle;
pub mod guardian;
pub mod sage;
