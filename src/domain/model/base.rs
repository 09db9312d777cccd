//! Identity and timestamp fields shared by every entity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Common fields embedded (flattened) into every entity record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BaseModel {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl BaseModel {
    /// Fresh identity: random v4 id, both timestamps set to now.
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Refreshes `updated_at`. Called whenever the record is saved.
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

impl Default for BaseModel {
    fn default() -> Self {
        Self::new()
    }
}
