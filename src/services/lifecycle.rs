use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{error, info};
use uuid::Uuid;

use crate::config::UploadSettings;
use crate::middleware::auth::AuthenticatedUser;
use crate::models::document::{CreateDocument, Document, DocumentStatus};
use crate::models::payment::{CreatePayment, Payment, PaymentFilter, PaymentStatus};
use crate::models::summary::PaymentSummary;
use crate::services::gateway::{self, GatewayError, PaymentGateway, PaymentIntent};
use crate::services::storage::{self, DocumentStorage, StorageError};
use crate::services::store::{DocumentStore, PaymentStore, StoreError};

#[derive(Error, Debug)]
pub enum LifecycleError {
    #[error("{0}")]
    Validation(String),
    #[error("Insufficient permissions for this action")]
    Forbidden,
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error(transparent)]
    Gateway(#[from] GatewayError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

#[derive(Debug, Clone)]
pub struct DocumentUpload {
    pub original_name: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

/// State machine for payments and verification documents. Validation and
/// authorization run before any side effect; gateway actions run before the
/// corresponding status write, so a gateway failure leaves the record
/// untouched. A crash between the two steps leaves the gateway ahead of the
/// store, which only an out-of-band reconciliation pass can repair.
pub struct LifecycleEngine {
    payments: Arc<dyn PaymentStore>,
    documents: Arc<dyn DocumentStore>,
    gateway: Arc<dyn PaymentGateway>,
    storage: Arc<dyn DocumentStorage>,
    upload: UploadSettings,
    // Serializes gateway-coupled operations per payment id. Entries live for
    // the process lifetime; the map only holds ids seen by this process.
    payment_locks: Mutex<HashMap<Uuid, Arc<Mutex<()>>>>,
}

impl LifecycleEngine {
    pub fn new(
        payments: Arc<dyn PaymentStore>,
        documents: Arc<dyn DocumentStore>,
        gateway: Arc<dyn PaymentGateway>,
        storage: Arc<dyn DocumentStorage>,
        upload: UploadSettings,
    ) -> Self {
        Self {
            payments,
            documents,
            gateway,
            storage,
            upload,
            payment_locks: Mutex::new(HashMap::new()),
        }
    }

    async fn lock_for(&self, id: Uuid) -> Arc<Mutex<()>> {
        let mut locks = self.payment_locks.lock().await;
        locks.entry(id).or_default().clone()
    }

    fn require_admin(user: &AuthenticatedUser) -> Result<(), LifecycleError> {
        if user.user_role.is_admin() {
            Ok(())
        } else {
            Err(LifecycleError::Forbidden)
        }
    }

    pub async fn create_payment(
        &self,
        user: &AuthenticatedUser,
        title: &str,
        amount: Decimal,
    ) -> Result<Payment, LifecycleError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(LifecycleError::Validation(
                "Payment title must not be empty".to_string(),
            ));
        }
        if amount <= Decimal::ZERO {
            return Err(LifecycleError::Validation(
                "Payment amount must be greater than zero".to_string(),
            ));
        }

        let payment = self
            .payments
            .insert(CreatePayment {
                title: title.to_string(),
                amount,
                email: user.email.clone(),
            })
            .await?;

        info!("Created payment {} for {}", payment.id, payment.email);
        Ok(payment)
    }

    /// Opens a gateway intent for a pending payment. Safe to retry: once a
    /// reference is recorded the engine re-reads that intent instead of
    /// creating, so a late retry can never mint a second live intent whose
    /// secret diverges from the reference an admin will capture or cancel.
    pub async fn create_gateway_intent(
        &self,
        payment_id: Uuid,
    ) -> Result<PaymentIntent, LifecycleError> {
        let lock = self.lock_for(payment_id).await;
        let _guard = lock.lock().await;

        let payment = self
            .payments
            .get(payment_id)
            .await?
            .ok_or(LifecycleError::NotFound("Payment"))?;

        if payment.status != PaymentStatus::Pending {
            return Err(LifecycleError::Validation(
                "Payment is no longer pending".to_string(),
            ));
        }

        if let Some(reference) = &payment.gateway_reference {
            return Ok(self.gateway.retrieve_intent(reference).await?);
        }

        let amount_minor = gateway::to_minor_units(payment.amount)?;
        let intent = self
            .gateway
            .create_intent(amount_minor, payment.id, &payment.title)
            .await?;

        self.payments
            .set_gateway_reference(payment_id, &intent.reference)
            .await?;

        Ok(intent)
    }

    /// Admin review of a payment. Completed settles the held funds, Failed
    /// voids them; the gateway must confirm before the status is persisted.
    pub async fn set_payment_status(
        &self,
        user: &AuthenticatedUser,
        payment_id: Uuid,
        new_status: PaymentStatus,
    ) -> Result<Payment, LifecycleError> {
        Self::require_admin(user)?;

        let lock = self.lock_for(payment_id).await;
        let _guard = lock.lock().await;

        let payment = self
            .payments
            .get(payment_id)
            .await?
            .ok_or(LifecycleError::NotFound("Payment"))?;

        if !payment.status.can_transition_to(new_status) {
            return Err(LifecycleError::Validation(format!(
                "Illegal payment status transition {:?} -> {:?}",
                payment.status, new_status
            )));
        }

        if let Some(reference) = &payment.gateway_reference {
            match new_status {
                PaymentStatus::Completed => self.gateway.capture(reference).await?,
                PaymentStatus::Failed => self.gateway.cancel(reference).await?,
                // can_transition_to never admits pending as a target
                PaymentStatus::Pending => {}
            }
        }

        let updated = self
            .payments
            .set_status_if(payment_id, PaymentStatus::Pending, new_status)
            .await?
            .ok_or_else(|| {
                LifecycleError::Validation("Payment is no longer pending".to_string())
            })?;

        info!(
            "Payment {} moved to {:?} by admin {}",
            payment_id, new_status, user.email
        );
        Ok(updated)
    }

    pub async fn list_payments(
        &self,
        user: &AuthenticatedUser,
        mut filter: PaymentFilter,
    ) -> Result<Vec<Payment>, LifecycleError> {
        // Owner scoping is decided by role here, never by the caller's
        // query string.
        if !user.user_role.is_admin() {
            filter.email = Some(user.email.clone());
        }

        Ok(self.payments.list(&filter).await?)
    }

    pub async fn summarize_payments(
        &self,
        user: &AuthenticatedUser,
        filter: PaymentFilter,
    ) -> Result<PaymentSummary, LifecycleError> {
        let payments = self.list_payments(user, filter).await?;
        Ok(PaymentSummary::from_payments(&payments))
    }

    /// Uploads the blob first, then the metadata row. A failed row insert
    /// triggers a compensating blob delete so no orphan is left behind.
    pub async fn create_document(
        &self,
        user: &AuthenticatedUser,
        upload: DocumentUpload,
    ) -> Result<Document, LifecycleError> {
        if upload.original_name.trim().is_empty() {
            return Err(LifecycleError::Validation(
                "Document file name must not be empty".to_string(),
            ));
        }
        if !self
            .upload
            .allowed_content_types
            .iter()
            .any(|t| t.eq_ignore_ascii_case(&upload.content_type))
        {
            return Err(LifecycleError::Validation(format!(
                "Content type {} is not allowed",
                upload.content_type
            )));
        }
        if upload.data.is_empty() {
            return Err(LifecycleError::Validation(
                "Document is empty".to_string(),
            ));
        }
        if upload.data.len() > self.upload.max_size_bytes {
            return Err(LifecycleError::Validation(format!(
                "Document exceeds the maximum size of {} bytes",
                self.upload.max_size_bytes
            )));
        }

        let stored_name = storage::generate_stored_name(&upload.original_name);
        let storage_path = self.storage.upload(&stored_name, &upload.data).await?;

        let created = self
            .documents
            .insert(CreateDocument {
                file_name: stored_name.clone(),
                original_name: upload.original_name.clone(),
                content_type: upload.content_type.clone(),
                size_bytes: upload.data.len() as i64,
                email: user.email.clone(),
                storage_path: storage_path.clone(),
            })
            .await;

        match created {
            Ok(document) => {
                info!("Created document {} for {}", document.id, document.email);
                Ok(document)
            }
            Err(e) => {
                if let Err(cleanup) = self.storage.delete(&storage_path).await {
                    error!(
                        "Compensating delete of blob {} failed: {}",
                        storage_path, cleanup
                    );
                }
                Err(e.into())
            }
        }
    }

    pub async fn set_document_status(
        &self,
        user: &AuthenticatedUser,
        document_id: Uuid,
        new_status: DocumentStatus,
        feedback: Option<&str>,
    ) -> Result<Document, LifecycleError> {
        Self::require_admin(user)?;

        let document = self
            .documents
            .get(document_id)
            .await?
            .ok_or(LifecycleError::NotFound("Document"))?;

        if !document.status.can_transition_to(new_status) {
            return Err(LifecycleError::Validation(format!(
                "Illegal document status transition {:?} -> {:?}",
                document.status, new_status
            )));
        }

        // Feedback is stored only for rejections; any other status clears
        // whatever the request supplied.
        let feedback = match new_status {
            DocumentStatus::Rejected => {
                let text = feedback.map(str::trim).unwrap_or_default();
                if text.is_empty() {
                    return Err(LifecycleError::Validation(
                        "Rejecting a document requires feedback".to_string(),
                    ));
                }
                Some(text)
            }
            _ => None,
        };

        let updated = self
            .documents
            .set_status_if_pending(document_id, new_status, feedback)
            .await?
            .ok_or_else(|| {
                LifecycleError::Validation("Document is no longer pending".to_string())
            })?;

        info!(
            "Document {} moved to {:?} by admin {}",
            document_id, new_status, user.email
        );
        Ok(updated)
    }

    pub async fn list_documents(
        &self,
        user: &AuthenticatedUser,
    ) -> Result<Vec<Document>, LifecycleError> {
        let owner = if user.user_role.is_admin() {
            None
        } else {
            Some(user.email.as_str())
        };

        Ok(self.documents.list(owner).await?)
    }
}
