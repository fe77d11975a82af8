//! Typed client for the `user_profiles` table.
//!
//! At most one profile row exists per user.

use lumina_core::{AppMode, Timestamp, UserId};
use serde::{Deserialize, Serialize};

use crate::error::StoreError;
use crate::rest::{eq, Query, Table};

pub(crate) const TABLE: &str = "user_profiles";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UserProfile {
    pub user_id: UserId,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub cycle_mode: AppMode,
    #[serde(default)]
    pub cycle_length: Option<u32>,
    #[serde(default)]
    pub created_at: Option<Timestamp>,
    #[serde(default)]
    pub updated_at: Option<Timestamp>,
}

/// Partial profile update; `None` fields are left as stored.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProfilePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cycle_mode: Option<AppMode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cycle_length: Option<u32>,
}

#[derive(Serialize)]
struct StampedPatch<'a> {
    #[serde(flatten)]
    patch: &'a ProfilePatch,
    updated_at: Timestamp,
}

#[derive(Serialize)]
struct NewProfile<'a> {
    user_id: UserId,
    display_name: &'a str,
}

#[derive(Debug, Clone)]
pub struct ProfileClient {
    table: Table,
    user_id: UserId,
}

impl ProfileClient {
    pub(crate) fn new(table: Table, user_id: UserId) -> Self {
        Self { table, user_id }
    }

    pub async fn get(&self) -> Result<Option<UserProfile>, StoreError> {
        let query: Query = vec![("user_id", eq(self.user_id))];
        self.table.maybe_single(&query).await
    }

    /// Apply `patch` and stamp `updated_at`.
    pub async fn update(&self, patch: &ProfilePatch) -> Result<UserProfile, StoreError> {
        let query: Query = vec![("user_id", eq(self.user_id))];
        let body = StampedPatch {
            patch,
            updated_at: Timestamp::now(),
        };
        self.table.update(&query, &body).await
    }

    /// Return the existing profile, creating one with `display_name` if absent.
    pub async fn create_if_missing(&self, display_name: &str) -> Result<UserProfile, StoreError> {
        if let Some(existing) = self.get().await? {
            return Ok(existing);
        }
        let body = NewProfile {
            user_id: self.user_id,
            display_name,
        };
        let profile: UserProfile = self.table.insert(&body).await?;
        tracing::info!(user_id = %self.user_id, "profile created");
        Ok(profile)
    }
}
