use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::database::connection::DbPool;
use crate::models::document::{CreateDocument, Document, DocumentStatus};
use crate::models::payment::{CreatePayment, Payment, PaymentFilter, PaymentStatus};

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// Persistence seam for payments. Backed by Postgres in the binary and by
/// in-memory fakes in the engine tests.
#[async_trait]
pub trait PaymentStore: Send + Sync {
    async fn insert(&self, new: CreatePayment) -> Result<Payment, StoreError>;

    async fn get(&self, id: Uuid) -> Result<Option<Payment>, StoreError>;

    async fn list(&self, filter: &PaymentFilter) -> Result<Vec<Payment>, StoreError>;

    /// Records a gateway reference only while none exists; returns None when
    /// the id is unknown or a reference is already attached.
    async fn set_gateway_reference(
        &self,
        id: Uuid,
        reference: &str,
    ) -> Result<Option<Payment>, StoreError>;

    /// Conditional status write keyed on the expected current status.
    async fn set_status_if(
        &self,
        id: Uuid,
        from: PaymentStatus,
        to: PaymentStatus,
    ) -> Result<Option<Payment>, StoreError>;
}

/// Persistence seam for verification-document metadata.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn insert(&self, new: CreateDocument) -> Result<Document, StoreError>;

    async fn get(&self, id: Uuid) -> Result<Option<Document>, StoreError>;

    /// `owner = None` lists every document (admin view).
    async fn list(&self, owner: Option<&str>) -> Result<Vec<Document>, StoreError>;

    async fn set_status_if_pending(
        &self,
        id: Uuid,
        status: DocumentStatus,
        feedback: Option<&str>,
    ) -> Result<Option<Document>, StoreError>;
}

#[async_trait]
impl PaymentStore for DbPool {
    async fn insert(&self, new: CreatePayment) -> Result<Payment, StoreError> {
        Ok(Payment::create(self, new).await?)
    }

    async fn get(&self, id: Uuid) -> Result<Option<Payment>, StoreError> {
        Ok(Payment::find_by_id(self, id).await?)
    }

    async fn list(&self, filter: &PaymentFilter) -> Result<Vec<Payment>, StoreError> {
        Ok(Payment::find_all(self, filter).await?)
    }

    async fn set_gateway_reference(
        &self,
        id: Uuid,
        reference: &str,
    ) -> Result<Option<Payment>, StoreError> {
        Ok(Payment::set_gateway_reference(self, id, reference).await?)
    }

    async fn set_status_if(
        &self,
        id: Uuid,
        from: PaymentStatus,
        to: PaymentStatus,
    ) -> Result<Option<Payment>, StoreError> {
        Ok(Payment::update_status_if(self, id, from, to).await?)
    }
}

#[async_trait]
impl DocumentStore for DbPool {
    async fn insert(&self, new: CreateDocument) -> Result<Document, StoreError> {
        Ok(Document::create(self, new).await?)
    }

    async fn get(&self, id: Uuid) -> Result<Option<Document>, StoreError> {
        Ok(Document::find_by_id(self, id).await?)
    }

    async fn list(&self, owner: Option<&str>) -> Result<Vec<Document>, StoreError> {
        match owner {
            Some(email) => Ok(Document::find_by_email(self, email).await?),
            None => Ok(Document::find_all(self).await?),
        }
    }

    async fn set_status_if_pending(
        &self,
        id: Uuid,
        status: DocumentStatus,
        feedback: Option<&str>,
    ) -> Result<Option<Document>, StoreError> {
        Ok(Document::update_status_if_pending(self, id, status, feedback).await?)
    }
}
