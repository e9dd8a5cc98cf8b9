use serde::Deserialize;

use crate::models::document::DocumentStatus;

#[derive(Debug, Deserialize)]
pub struct UpdateDocumentStatusRequest {
    pub status: DocumentStatus,
    pub feedback: Option<String>,
}
