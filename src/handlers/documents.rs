use crate::{
    config::Settings,
    middleware::auth::AuthenticatedUser,
    requests::document::UpdateDocumentStatusRequest,
    services::lifecycle::{DocumentUpload, LifecycleEngine, LifecycleError},
    utils::helpers::ApiResponse,
};
use actix_multipart::Multipart;
use actix_web::{HttpResponse, Result, web};
use futures_util::TryStreamExt;
use tracing::{error, info};
use uuid::Uuid;

/// Pulls the `file` part out of the multipart body, refusing to buffer more
/// than the configured maximum.
async fn read_file_part(
    mut payload: Multipart,
    max_size_bytes: usize,
) -> Result<Option<DocumentUpload>, actix_web::Error> {
    while let Some(mut field) = payload.try_next().await? {
        let (name, original_name) = match field.content_disposition() {
            Some(cd) => (
                cd.get_name().unwrap_or_default().to_string(),
                cd.get_filename().unwrap_or_default().to_string(),
            ),
            None => continue,
        };
        if name != "file" {
            continue;
        }

        let content_type = field
            .content_type()
            .map(|mime| mime.to_string())
            .unwrap_or_default();

        let mut data = Vec::new();
        while let Some(chunk) = field.try_next().await? {
            if data.len() + chunk.len() > max_size_bytes {
                return Err(actix_web::error::ErrorBadRequest(
                    "Document exceeds the maximum allowed size",
                ));
            }
            data.extend_from_slice(&chunk);
        }

        return Ok(Some(DocumentUpload {
            original_name,
            content_type,
            data,
        }));
    }

    Ok(None)
}

pub async fn create(
    engine: web::Data<LifecycleEngine>,
    settings: web::Data<Settings>,
    payload: Multipart,
    user: AuthenticatedUser,
) -> Result<HttpResponse> {
    info!("Uploading document for user: {}", user.email);

    let upload = match read_file_part(payload, settings.upload.max_size_bytes).await? {
        Some(upload) => upload,
        None => {
            return Ok(HttpResponse::BadRequest().json(ApiResponse::<()>::error(
                "Multipart body must contain a 'file' part".to_string(),
            )));
        }
    };

    match engine.create_document(&user, upload).await {
        Ok(document) => Ok(HttpResponse::Created().json(ApiResponse::success(document))),
        Err(LifecycleError::Validation(message)) => {
            Ok(HttpResponse::BadRequest().json(ApiResponse::<()>::error(message)))
        }
        Err(e) => {
            error!("Error creating document: {}", e);
            Ok(
                HttpResponse::InternalServerError().json(ApiResponse::<()>::error(
                    "Failed to upload document".to_string(),
                )),
            )
        }
    }
}

pub async fn index(
    engine: web::Data<LifecycleEngine>,
    user: AuthenticatedUser,
) -> Result<HttpResponse> {
    match engine.list_documents(&user).await {
        Ok(documents) => Ok(HttpResponse::Ok().json(ApiResponse::success(documents))),
        Err(e) => {
            error!("Error listing documents: {}", e);
            Ok(
                HttpResponse::InternalServerError().json(ApiResponse::<()>::error(
                    "Failed to retrieve documents".to_string(),
                )),
            )
        }
    }
}

pub async fn update_status(
    engine: web::Data<LifecycleEngine>,
    path: web::Path<Uuid>,
    request: web::Json<UpdateDocumentStatusRequest>,
    user: AuthenticatedUser,
) -> Result<HttpResponse> {
    let document_id = path.into_inner();
    info!(
        "Updating document {} status to {:?} for admin: {}",
        document_id, request.status, user.email
    );

    match engine
        .set_document_status(&user, document_id, request.status, request.feedback.as_deref())
        .await
    {
        Ok(document) => Ok(HttpResponse::Ok().json(ApiResponse::success_with_message(
            document,
            "Document status updated".to_string(),
        ))),
        Err(LifecycleError::Forbidden) => Ok(HttpResponse::Forbidden()
            .json(ApiResponse::<()>::error("Access denied".to_string()))),
        Err(LifecycleError::NotFound(_)) => Ok(HttpResponse::NotFound().json(
            ApiResponse::<()>::error(format!("Document {} not found", document_id)),
        )),
        Err(LifecycleError::Validation(message)) => {
            Ok(HttpResponse::BadRequest().json(ApiResponse::<()>::error(message)))
        }
        Err(e) => {
            error!("Error updating document {}: {}", document_id, e);
            Ok(
                HttpResponse::InternalServerError().json(ApiResponse::<()>::error(
                    "Failed to update document status".to_string(),
                )),
            )
        }
    }
}
