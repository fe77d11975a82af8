//! # Cycle Subcommand
//!
//! - `phase`: Phase lookup for a cycle day. Offline.
//! - `log`: Save today's (or a given day's) entry to the data store.
//! - `list`: Saved entries, newest first.
//!
//! Store-backed commands read `LUMINA_STORE_*` and `LUMINA_USER_ID` from
//! the environment.

use anyhow::{bail, Context, Result};
use clap::{Args, Subcommand};

use lumina_core::{
    validate_cycle_day, CalendarDate, CyclePhase, SymptomLog, DEFAULT_CYCLE_LENGTH,
};
use lumina_store_client::{CycleEntry, StoreClient, StoreConfig};

/// Arguments for the `lumina cycle` subcommand.
#[derive(Args, Debug)]
pub struct CycleArgs {
    #[command(subcommand)]
    pub command: CycleCommand,
}

#[derive(Subcommand, Debug)]
pub enum CycleCommand {
    /// Show the phase for a cycle day.
    Phase {
        /// Cycle day, starting at 1. Days past the cycle length wrap.
        #[arg(long)]
        day: u32,
        /// Cycle length in days.
        #[arg(long, default_value_t = DEFAULT_CYCLE_LENGTH)]
        length: u32,
    },

    /// Save the day's entry with the symptoms logged.
    Log {
        /// Cycle day, starting at 1.
        #[arg(long)]
        day: u32,
        /// Cycle length the day is checked against.
        #[arg(long, default_value_t = DEFAULT_CYCLE_LENGTH)]
        length: u32,
        /// Symptom id from the catalogue. Repeat for several.
        #[arg(long = "symptom")]
        symptoms: Vec<String>,
        /// Calendar date (YYYY-MM-DD). Defaults to today (UTC).
        #[arg(long)]
        date: Option<String>,
    },

    /// List saved entries, newest first.
    List {
        /// Earliest date to include (YYYY-MM-DD).
        #[arg(long)]
        from: Option<String>,
        /// Latest date to include (YYYY-MM-DD).
        #[arg(long)]
        to: Option<String>,
    },
}

pub async fn run_cycle(args: &CycleArgs) -> Result<u8> {
    match &args.command {
        CycleCommand::Phase { day, length } => {
            println!("{}", describe_phase(*day, *length)?);
            Ok(0)
        }
        CycleCommand::Log {
            day,
            length,
            symptoms,
            date,
        } => {
            let day = validate_cycle_day(*day, *length)?;
            let log = symptom_log(symptoms)?;
            let date = match date {
                Some(raw) => CalendarDate::parse(raw)?,
                None => CalendarDate::today(),
            };
            let entry = store()?.cycle().save_entry(date, day, &log).await?;
            println!("saved {}", format_entry(&entry));
            Ok(0)
        }
        CycleCommand::List { from, to } => {
            let from = from.as_deref().map(CalendarDate::parse).transpose()?;
            let to = to.as_deref().map(CalendarDate::parse).transpose()?;
            let entries = store()?.cycle().list_entries(from, to).await?;
            if entries.is_empty() {
                println!("no entries");
            }
            for entry in &entries {
                println!("{}", format_entry(entry));
            }
            Ok(0)
        }
    }
}

/// One line naming the phase a day falls in.
pub fn describe_phase(day: u32, length: u32) -> Result<String> {
    let Some(phase) = CyclePhase::for_day(day, length) else {
        bail!("cycle day must be at least 1 and the cycle at least one day long");
    };
    Ok(format!(
        "Day {day} of {length}: {} (days {}-{}, {})",
        phase.name, phase.start_day, phase.end_day, phase.color
    ))
}

/// Resolve symptom ids against the catalogue, rejecting unknown ones.
pub fn symptom_log(ids: &[String]) -> Result<SymptomLog> {
    let mut log = SymptomLog::new();
    for id in ids {
        log.log(id).with_context(|| format!("logging symptom {id:?}"))?;
    }
    Ok(log)
}

fn format_entry(entry: &CycleEntry) -> String {
    let symptoms = entry.symptoms();
    let names = if symptoms.is_empty() {
        "-".to_string()
    } else {
        symptoms.names().join(", ")
    };
    format!("{}  day {:>2}  {}", entry.date, entry.cycle_day, names)
}

fn store() -> Result<StoreClient> {
    let config = StoreConfig::from_env().context("data store is not configured")?;
    Ok(StoreClient::new(config)?)
}
