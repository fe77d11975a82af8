//! # Sage Subcommand
//!
//! - `insight`: Today's hormonal weather report.
//! - `chat`: One message, reply streamed to stdout. When the data store
//!   is configured the stored history is sent along and both turns are
//!   saved.
//! - `image`: Analyze a photo.
//!
//! The Sage never fails: without `GEMINI_API_KEY` every command prints its
//! fallback reply.

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Subcommand};

use lumina_core::{AppMode, ChatRole, ChatTurn};
use lumina_sage::{Image, Sage, SageConfig};
use lumina_store_client::{StoreClient, StoreConfig};

use crate::cycle::symptom_log;

/// Arguments for the `lumina sage` subcommand.
#[derive(Args, Debug)]
pub struct SageArgs {
    #[command(subcommand)]
    pub command: SageCommand,
}

#[derive(Subcommand, Debug)]
pub enum SageCommand {
    /// Daily insight for a cycle or pregnancy day.
    Insight {
        #[arg(long)]
        day: u32,
        /// `cycle` or `pregnancy`.
        #[arg(long, default_value = "cycle")]
        mode: AppMode,
        /// Symptom id logged today. Repeat for several.
        #[arg(long = "symptom")]
        symptoms: Vec<String>,
    },

    /// Send one message to the Sage.
    Chat {
        message: String,
        /// Do not read or write stored history.
        #[arg(long)]
        no_history: bool,
    },

    /// Analyze an image file.
    Image {
        path: PathBuf,
        /// Question about the image.
        #[arg(long, default_value = "")]
        prompt: String,
    },
}

pub async fn run_sage(args: &SageArgs) -> Result<u8> {
    let sage = Sage::new(SageConfig::from_env()?)?;

    match &args.command {
        SageCommand::Insight {
            day,
            mode,
            symptoms,
        } => {
            let log = symptom_log(symptoms)?;
            println!("{}", sage.daily_insight(*day, *mode, &log).await);
        }
        SageCommand::Chat {
            message,
            no_history,
        } => {
            let store = if *no_history { None } else { optional_store() };
            chat(&sage, store.as_ref(), message).await?;
        }
        SageCommand::Image { path, prompt } => {
            let bytes = std::fs::read(path)
                .with_context(|| format!("reading image {}", path.display()))?;
            let mime = path
                .extension()
                .and_then(|e| e.to_str())
                .map(Image::mime_for_extension)
                .unwrap_or("image/jpeg");
            let image = Image::from_bytes(&bytes, mime);
            println!("{}", sage.analyze_image(&image, prompt).await);
        }
    }
    Ok(0)
}

async fn chat(sage: &Sage, store: Option<&StoreClient>, message: &str) -> Result<()> {
    let history: Vec<ChatTurn> = match store {
        Some(store) => store
            .chat()
            .history()
            .await?
            .iter()
            .map(|m| m.turn())
            .collect(),
        None => Vec::new(),
    };

    let mut stdout = std::io::stdout();
    let reply = sage
        .stream_chat(&history, message, |chunk| {
            // Best effort: a closed stdout should not abort the reply.
            let _ = stdout.write_all(chunk.as_bytes());
            let _ = stdout.flush();
        })
        .await;
    println!();

    if let Some(store) = store {
        store.chat().save_message(ChatRole::User, message).await?;
        store.chat().save_message(ChatRole::Model, &reply).await?;
    }
    Ok(())
}

/// Store client when configured; chat works without one.
fn optional_store() -> Option<StoreClient> {
    match StoreConfig::from_env() {
        Ok(config) => match StoreClient::new(config) {
            Ok(client) => Some(client),
            Err(e) => {
                tracing::warn!(error = %e, "chat history disabled");
                None
            }
        },
        Err(e) => {
            tracing::info!(reason = %e, "chat history disabled");
            None
        }
    }
}
