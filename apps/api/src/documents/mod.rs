//! Storage for generated documents.
//!
//! `PgDocumentStore` is the production store. `MemoryDocumentStore` keeps rows in process
//! and is used when no database is configured, and in tests.

pub mod handlers;

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::document::{DocumentRow, NewDocument};

#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn save(&self, document: NewDocument) -> Result<DocumentRow, AppError>;

    async fn get(&self, id: Uuid) -> Result<Option<DocumentRow>, AppError>;

    /// Newest first.
    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<DocumentRow>, AppError>;
}

pub struct PgDocumentStore {
    pool: PgPool,
}

impl PgDocumentStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DocumentStore for PgDocumentStore {
    async fn save(&self, document: NewDocument) -> Result<DocumentRow, AppError> {
        let row: DocumentRow = sqlx::query_as(
            r#"
            INSERT INTO documents
                (id, user_id, kind, title, content, defaulted_fields, model)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(document.user_id)
        .bind(&document.kind)
        .bind(&document.title)
        .bind(&document.content)
        .bind(&document.defaulted_fields)
        .bind(&document.model)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn get(&self, id: Uuid) -> Result<Option<DocumentRow>, AppError> {
        let row: Option<DocumentRow> = sqlx::query_as("SELECT * FROM documents WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<DocumentRow>, AppError> {
        let rows: Vec<DocumentRow> = sqlx::query_as(
            "SELECT * FROM documents WHERE user_id = $1 ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}

#[derive(Default)]
pub struct MemoryDocumentStore {
    rows: RwLock<HashMap<Uuid, DocumentRow>>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn save(&self, document: NewDocument) -> Result<DocumentRow, AppError> {
        let row = document.into_row(Uuid::new_v4(), Utc::now());
        self.rows.write().await.insert(row.id, row.clone());
        Ok(row)
    }

    async fn get(&self, id: Uuid) -> Result<Option<DocumentRow>, AppError> {
        Ok(self.rows.read().await.get(&id).cloned())
    }

    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<DocumentRow>, AppError> {
        let mut rows: Vec<DocumentRow> = self
            .rows
            .read()
            .await
            .values()
            .filter(|row| row.user_id == Some(user_id))
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn new_document(user_id: Option<Uuid>, title: &str) -> NewDocument {
        NewDocument {
            user_id,
            kind: "letter".to_string(),
            title: title.to_string(),
            content: json!({"subject": title}),
            defaulted_fields: vec!["closing".to_string()],
            model: "scripted".to_string(),
        }
    }

    #[tokio::test]
    async fn test_memory_store_round_trips_a_row() {
        let store = MemoryDocumentStore::new();
        let saved = store.save(new_document(None, "Hello")).await.unwrap();
        let loaded = store.get(saved.id).await.unwrap().unwrap();
        assert_eq!(loaded.title, "Hello");
        assert_eq!(loaded.defaulted_fields, vec!["closing"]);
        assert!(store.get(Uuid::new_v4()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_memory_store_lists_only_the_users_rows() {
        let store = MemoryDocumentStore::new();
        let user = Uuid::new_v4();
        store.save(new_document(Some(user), "First")).await.unwrap();
        store.save(new_document(Some(user), "Second")).await.unwrap();
        store.save(new_document(Some(Uuid::new_v4()), "Other")).await.unwrap();
        store.save(new_document(None, "Anonymous")).await.unwrap();

        let rows = store.list_for_user(user).await.unwrap();
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|row| row.user_id == Some(user)));
        assert!(rows[0].created_at >= rows[1].created_at);
    }
}
