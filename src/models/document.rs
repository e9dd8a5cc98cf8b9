use crate::database::connection::DbPool;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use std::str::FromStr;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Type, PartialEq, Eq)]
#[sqlx(type_name = "document_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum DocumentStatus {
    Pending,
    Approved,
    Rejected,
}

impl DocumentStatus {
    /// Approved and Rejected are terminal; a re-submission is a new
    /// document, never a reused id.
    pub fn can_transition_to(&self, next: DocumentStatus) -> bool {
        matches!(
            (self, next),
            (DocumentStatus::Pending, DocumentStatus::Approved)
                | (DocumentStatus::Pending, DocumentStatus::Rejected)
        )
    }
}

impl FromStr for DocumentStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(DocumentStatus::Pending),
            "approved" => Ok(DocumentStatus::Approved),
            "rejected" => Ok(DocumentStatus::Rejected),
            _ => Err(()),
        }
    }
}

/// Verification-document metadata. The file bytes themselves live in the
/// blob store; `storage_path` is the only pointer to them.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Document {
    pub id: Uuid,
    pub file_name: String,
    pub original_name: String,
    pub content_type: String,
    pub size_bytes: i64,
    pub email: String,
    pub status: DocumentStatus,
    pub feedback: Option<String>,
    pub storage_path: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct CreateDocument {
    pub file_name: String,
    pub original_name: String,
    pub content_type: String,
    pub size_bytes: i64,
    pub email: String,
    pub storage_path: String,
}

impl Document {
    pub async fn create(pool: &DbPool, document: CreateDocument) -> Result<Self, sqlx::Error> {
        let now = Utc::now();

        let document = sqlx::query_as::<_, Document>(
            "INSERT INTO documents (id, file_name, original_name, content_type, size_bytes, email, status, storage_path, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
             RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(document.file_name)
        .bind(document.original_name)
        .bind(document.content_type)
        .bind(document.size_bytes)
        .bind(document.email)
        .bind(DocumentStatus::Pending)
        .bind(document.storage_path)
        .bind(now)
        .bind(now)
        .fetch_one(pool)
        .await?;

        Ok(document)
    }

    pub async fn find_by_id(pool: &DbPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let document = sqlx::query_as::<_, Document>("SELECT * FROM documents WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await?;

        Ok(document)
    }

    pub async fn find_by_email(pool: &DbPool, email: &str) -> Result<Vec<Self>, sqlx::Error> {
        let documents = sqlx::query_as::<_, Document>(
            "SELECT * FROM documents WHERE email = $1 ORDER BY created_at DESC",
        )
        .bind(email)
        .fetch_all(pool)
        .await?;

        Ok(documents)
    }

    pub async fn find_all(pool: &DbPool) -> Result<Vec<Self>, sqlx::Error> {
        let documents =
            sqlx::query_as::<_, Document>("SELECT * FROM documents ORDER BY created_at DESC")
                .fetch_all(pool)
                .await?;

        Ok(documents)
    }

    /// Conditional review write from Pending; feedback is stored only for
    /// rejections and cleared otherwise.
    pub async fn update_status_if_pending(
        pool: &DbPool,
        id: Uuid,
        status: DocumentStatus,
        feedback: Option<&str>,
    ) -> Result<Option<Self>, sqlx::Error> {
        let document = sqlx::query_as::<_, Document>(
            "UPDATE documents
             SET status = $2, feedback = $3, updated_at = $4
             WHERE id = $1 AND status = $5
             RETURNING *",
        )
        .bind(id)
        .bind(status)
        .bind(feedback)
        .bind(Utc::now())
        .bind(DocumentStatus::Pending)
        .fetch_optional(pool)
        .await?;

        Ok(document)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pending_reaches_both_review_outcomes() {
        assert!(DocumentStatus::Pending.can_transition_to(DocumentStatus::Approved));
        assert!(DocumentStatus::Pending.can_transition_to(DocumentStatus::Rejected));
    }

    #[test]
    fn reviewed_documents_are_terminal() {
        for from in [DocumentStatus::Approved, DocumentStatus::Rejected] {
            for to in [
                DocumentStatus::Pending,
                DocumentStatus::Approved,
                DocumentStatus::Rejected,
            ] {
                assert!(!from.can_transition_to(to));
            }
        }
    }
}
