//! # lumina-sage — the Sage companion
//!
//! Typed client for the Gemini REST API behind three features:
//!
//! - **Daily insight**: a two-sentence "hormonal weather report" plus one
//!   tip, from the fast model.
//! - **Chat**: streamed replies from the smart model under the Sage persona,
//!   delivered fragment by fragment.
//! - **Image analysis**: a photo of a meal or a label, read by the vision
//!   model.
//!
//! ## Failure Policy
//!
//! No error crosses this crate's public API. A missing API key, a transport
//! failure, a non-2xx status, or an unreadable body each log once and turn
//! into the operation's fixed fallback reply (see [`prompt`]).

pub mod client;
pub mod config;
pub(crate) mod error;
pub mod image;
pub mod prompt;
pub(crate) mod wire;

pub use client::Sage;
pub use config::{ConfigError, SageConfig};
pub use image::Image;
