use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DocumentRow {
    pub id: Uuid,
    pub user_id: Option<Uuid>,
    pub kind: String,
    pub title: String,
    pub content: Value,
    pub defaulted_fields: Vec<String>,
    pub model: String,
    pub created_at: DateTime<Utc>,
}

/// A generated document that has not been stored yet.
#[derive(Debug, Clone)]
pub struct NewDocument {
    pub user_id: Option<Uuid>,
    pub kind: String,
    pub title: String,
    pub content: Value,
    pub defaulted_fields: Vec<String>,
    pub model: String,
}

impl NewDocument {
    pub fn into_row(self, id: Uuid, created_at: DateTime<Utc>) -> DocumentRow {
        DocumentRow {
            id,
            user_id: self.user_id,
            kind: self.kind,
            title: self.title,
            content: self.content,
            defaulted_fields: self.defaulted_fields,
            model: self.model,
            created_at,
        }
    }
}
