//! Typed client for the `cycle_entries` table.
//!
//! One row per user per calendar day, keyed by `(user_id, date)`.
//!
//! | Method | Query | Operation |
//! |--------|-------|-----------|
//! | POST   | `?on_conflict=user_id,date` | Save (upsert) the day's entry |
//! | GET    | `?user_id=eq.&date=gte.&date=lte.&order=date.desc` | List entries |
//! | GET    | `?user_id=eq.&date=eq.` | Entry for one day |
//! | DELETE | `?user_id=eq.&id=eq.` | Delete an entry |

use lumina_core::{CalendarDate, CycleEntryId, SymptomLog, Timestamp, UserId};
use serde::{Deserialize, Serialize};

use crate::error::StoreError;
use crate::rest::{eq, Query, Table};

pub(crate) const TABLE: &str = "cycle_entries";

/// A stored day of cycle tracking.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CycleEntry {
    pub id: CycleEntryId,
    pub user_id: UserId,
    pub date: CalendarDate,
    pub cycle_day: u32,
    /// Symptom ids as stored. May include ids the catalogue no longer has.
    #[serde(default)]
    pub logged_symptoms: Vec<String>,
    #[serde(default)]
    pub created_at: Option<Timestamp>,
    #[serde(default)]
    pub updated_at: Option<Timestamp>,
}

impl CycleEntry {
    /// Stored symptom ids resolved against the catalogue.
    pub fn symptoms(&self) -> SymptomLog {
        SymptomLog::from_stored_ids(self.logged_symptoms.iter().map(String::as_str))
    }
}

#[derive(Debug, Serialize)]
struct UpsertEntry {
    user_id: UserId,
    date: CalendarDate,
    cycle_day: u32,
    logged_symptoms: Vec<String>,
    updated_at: Timestamp,
}

/// Client for cycle entries owned by one user.
#[derive(Debug, Clone)]
pub struct CycleClient {
    table: Table,
    user_id: UserId,
}

impl CycleClient {
    pub(crate) fn new(table: Table, user_id: UserId) -> Self {
        Self { table, user_id }
    }

    /// Create or replace the entry for `date`.
    pub async fn save_entry(
        &self,
        date: CalendarDate,
        cycle_day: u32,
        symptoms: &SymptomLog,
    ) -> Result<CycleEntry, StoreError> {
        let body = UpsertEntry {
            user_id: self.user_id,
            date,
            cycle_day,
            logged_symptoms: symptoms.ids(),
            updated_at: Timestamp::now(),
        };
        let entry: CycleEntry = self.table.upsert(&body, "user_id,date").await?;
        tracing::debug!(date = %entry.date, cycle_day, "cycle entry saved");
        Ok(entry)
    }

    /// Entries within the optional inclusive date bounds, newest first.
    pub async fn list_entries(
        &self,
        start: Option<CalendarDate>,
        end: Option<CalendarDate>,
    ) -> Result<Vec<CycleEntry>, StoreError> {
        let mut query: Query = vec![
            ("user_id", eq(self.user_id)),
            ("order", "date.desc".to_string()),
        ];
        if let Some(start) = start {
            query.push(("date", format!("gte.{start}")));
        }
        if let Some(end) = end {
            query.push(("date", format!("lte.{end}")));
        }
        self.table.select(&query).await
    }

    /// The entry for `date`, if one was saved.
    pub async fn entry_for(&self, date: CalendarDate) -> Result<Option<CycleEntry>, StoreError> {
        let query: Query = vec![("user_id", eq(self.user_id)), ("date", eq(date))];
        self.table.maybe_single(&query).await
    }

    pub async fn delete_entry(&self, id: CycleEntryId) -> Result<(), StoreError> {
        let query: Query = vec![("user_id", eq(self.user_id)), ("id", eq(id))];
        self.table.delete(&query).await
    }
}
