//! # lumina-store-client — Typed Rust client for the Lumina data store
//!
//! Provides typed access to the four tables the app persists:
//! - **Cycle entries** (`cycle_entries`): one row per user per day
//! - **Chat messages** (`chat_messages`): conversation with the Sage
//! - **Emergency contacts** (`emergency_contacts`)
//! - **User profiles** (`user_profiles`)
//!
//! ## API Path Convention
//!
//! The store is a PostgREST service. Every table lives at
//! `{base_url}/rest/v1/{table}`; filters go in the query string
//! (`user_id=eq.{uuid}`, `date=gte.2026-01-01`, `order=date.desc`).
//!
//! ## Error Policy
//!
//! Each operation is exactly one request. Failures are logged and
//! returned as [`StoreError`]; nothing is retried or swallowed.

pub mod chat;
pub mod config;
pub mod contacts;
pub mod cycle;
pub mod error;
pub mod profile;
pub(crate) mod rest;

pub use chat::{ChatClient, ChatMessage};
pub use config::{ConfigError, StoreConfig};
pub use contacts::{ContactPatch, ContactsClient, EmergencyContact, NewContact};
pub use cycle::{CycleClient, CycleEntry};
pub use error::StoreError;
pub use profile::{ProfileClient, ProfilePatch, UserProfile};

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};

use rest::Table;

/// Top-level store client. Holds one sub-client per table.
#[derive(Debug, Clone)]
pub struct StoreClient {
    cycle: CycleClient,
    chat: ChatClient,
    contacts: ContactsClient,
    profile: ProfileClient,
}

impl StoreClient {
    /// Create a new store client from configuration.
    pub fn new(config: StoreConfig) -> Result<Self, StoreError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers({
                let mut headers = HeaderMap::new();
                let mut api_key = HeaderValue::from_str(config.anon_key.as_str())
                    .map_err(|_| StoreError::Config(ConfigError::InvalidCredential))?;
                api_key.set_sensitive(true);
                headers.insert("apikey", api_key);
                let mut bearer =
                    HeaderValue::from_str(&format!("Bearer {}", config.access_token.as_str()))
                        .map_err(|_| StoreError::Config(ConfigError::InvalidCredential))?;
                bearer.set_sensitive(true);
                headers.insert(AUTHORIZATION, bearer);
                headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
                headers
            })
            .build()
            .map_err(|e| StoreError::Http {
                endpoint: "client_init".into(),
                source: e,
            })?;

        let table = |name: &'static str| Table::new(http.clone(), config.table_url(name), name);
        let user_id = config.user_id;

        Ok(Self {
            cycle: CycleClient::new(table(cycle::TABLE), user_id),
            chat: ChatClient::new(table(chat::TABLE), user_id),
            contacts: ContactsClient::new(table(contacts::TABLE), user_id),
            profile: ProfileClient::new(table(profile::TABLE), user_id),
        })
    }

    /// Access the cycle-entries client.
    pub fn cycle(&self) -> &CycleClient {
        &self.cycle
    }

    /// Access the chat-history client.
    pub fn chat(&self) -> &ChatClient {
        &self.chat
    }

    /// Access the emergency-contacts client.
    pub fn contacts(&self) -> &ContactsClient {
        &self.contacts
    }

    /// Access the user-profile client.
    pub fn profile(&self) -> &ProfileClient {
        &self.profile
    }
}
