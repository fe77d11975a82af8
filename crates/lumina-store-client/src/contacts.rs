//! Typed client for the `emergency_contacts` table.

use lumina_core::{ContactId, Timestamp, UserId};
use serde::{Deserialize, Serialize};

use crate::error::StoreError;
use crate::rest::{eq, Query, Table};

pub(crate) const TABLE: &str = "emergency_contacts";

/// Someone to reach when a walk goes wrong.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EmergencyContact {
    pub id: ContactId,
    pub name: String,
    pub number: String,
    pub relation: String,
    #[serde(default)]
    pub created_at: Option<Timestamp>,
}

/// Fields for a new contact.
#[derive(Debug, Clone, Serialize)]
pub struct NewContact {
    pub name: String,
    pub number: String,
    pub relation: String,
}

/// Partial update; `None` fields are left as stored.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ContactPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relation: Option<String>,
}

#[derive(Serialize)]
struct OwnedContact<'a> {
    user_id: UserId,
    #[serde(flatten)]
    contact: &'a NewContact,
}

#[derive(Debug, Clone)]
pub struct ContactsClient {
    table: Table,
    user_id: UserId,
}

impl ContactsClient {
    pub(crate) fn new(table: Table, user_id: UserId) -> Self {
        Self { table, user_id }
    }

    pub async fn create(&self, contact: &NewContact) -> Result<EmergencyContact, StoreError> {
        let body = OwnedContact {
            user_id: self.user_id,
            contact,
        };
        self.table.insert(&body).await
    }

    /// Newest first.
    pub async fn list(&self) -> Result<Vec<EmergencyContact>, StoreError> {
        let query: Query = vec![
            ("user_id", eq(self.user_id)),
            ("order", "created_at.desc".to_string()),
        ];
        self.table.select(&query).await
    }

    pub async fn update(
        &self,
        id: ContactId,
        patch: &ContactPatch,
    ) -> Result<EmergencyContact, StoreError> {
        let query: Query = vec![("user_id", eq(self.user_id)), ("id", eq(id))];
        self.table.update(&query, patch).await
    }

    pub async fn delete(&self, id: ContactId) -> Result<(), StoreError> {
        let query: Query = vec![("user_id", eq(self.user_id)), ("id", eq(id))];
        self.table.delete(&query).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn patch_omits_unset_fields() {
        let patch = ContactPatch {
            number: Some("+44 7700 900123".into()),
            ..ContactPatch::default()
        };
        assert_eq!(
            serde_json::to_value(&patch).unwrap(),
            serde_json::json!({ "number": "+44 7700 900123" })
        );
    }

    #[test]
    fn new_contact_is_stamped_with_owner() {
        let user_id = UserId::new();
        let contact = NewContact {
            name: "Maya".into(),
            number: "555-0100".into(),
            relation: "Sister".into(),
        };
        let json = serde_json::to_value(OwnedContact {
            user_id,
            contact: &contact,
        })
        .unwrap();
        assert_eq!(json["user_id"], user_id.to_string());
        assert_eq!(json["relation"], "Sister");
    }
}
