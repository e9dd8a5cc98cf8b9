use crate::{
    middleware::auth::AuthenticatedUser,
    models::payment::PaymentFilter,
    requests::payment::{
        CreateIntentRequest, CreatePaymentRequest, PaymentListQuery, UpdatePaymentStatusRequest,
    },
    services::lifecycle::{LifecycleEngine, LifecycleError},
    utils::helpers::ApiResponse,
};
use actix_web::{HttpResponse, Result, web};
use serde_json::json;
use tracing::{error, info};
use uuid::Uuid;

fn query_filter(query: &PaymentListQuery) -> PaymentFilter {
    PaymentFilter {
        email: query.email.clone(),
        status: query.status,
        start_date: query.start_date,
        end_date: query.end_date,
    }
}

pub async fn create(
    engine: web::Data<LifecycleEngine>,
    request: web::Json<CreatePaymentRequest>,
    user: AuthenticatedUser,
) -> Result<HttpResponse> {
    info!("Creating payment for user: {}", user.email);

    match engine
        .create_payment(&user, &request.title, request.amount)
        .await
    {
        Ok(payment) => Ok(HttpResponse::Created().json(ApiResponse::success(payment))),
        Err(LifecycleError::Validation(message)) => {
            Ok(HttpResponse::BadRequest().json(ApiResponse::<()>::error(message)))
        }
        Err(e) => {
            error!("Error creating payment: {}", e);
            Ok(
                HttpResponse::InternalServerError().json(ApiResponse::<()>::error(
                    "Failed to create payment".to_string(),
                )),
            )
        }
    }
}

pub async fn index(
    engine: web::Data<LifecycleEngine>,
    query: web::Query<PaymentListQuery>,
    user: AuthenticatedUser,
) -> Result<HttpResponse> {
    match engine.list_payments(&user, query_filter(&query)).await {
        Ok(payments) => Ok(HttpResponse::Ok().json(ApiResponse::success(payments))),
        Err(e) => {
            error!("Error listing payments: {}", e);
            Ok(
                HttpResponse::InternalServerError().json(ApiResponse::<()>::error(
                    "Failed to retrieve payments".to_string(),
                )),
            )
        }
    }
}

pub async fn summary(
    engine: web::Data<LifecycleEngine>,
    query: web::Query<PaymentListQuery>,
    user: AuthenticatedUser,
) -> Result<HttpResponse> {
    match engine.summarize_payments(&user, query_filter(&query)).await {
        Ok(summary) => Ok(HttpResponse::Ok().json(ApiResponse::success(summary))),
        Err(e) => {
            error!("Error summarizing payments: {}", e);
            Ok(
                HttpResponse::InternalServerError().json(ApiResponse::<()>::error(
                    "Failed to summarize payments".to_string(),
                )),
            )
        }
    }
}

pub async fn update_status(
    engine: web::Data<LifecycleEngine>,
    path: web::Path<Uuid>,
    request: web::Json<UpdatePaymentStatusRequest>,
    user: AuthenticatedUser,
) -> Result<HttpResponse> {
    let payment_id = path.into_inner();
    info!(
        "Updating payment {} status to {:?} for admin: {}",
        payment_id, request.status, user.email
    );

    match engine
        .set_payment_status(&user, payment_id, request.status)
        .await
    {
        Ok(payment) => Ok(HttpResponse::Ok().json(ApiResponse::success_with_message(
            payment,
            "Payment status updated".to_string(),
        ))),
        Err(LifecycleError::Forbidden) => Ok(HttpResponse::Forbidden()
            .json(ApiResponse::<()>::error("Access denied".to_string()))),
        Err(LifecycleError::NotFound(_)) => Ok(HttpResponse::NotFound().json(
            ApiResponse::<()>::error(format!("Payment {} not found", payment_id)),
        )),
        Err(LifecycleError::Validation(message)) => {
            Ok(HttpResponse::BadRequest().json(ApiResponse::<()>::error(message)))
        }
        Err(LifecycleError::Gateway(e)) => {
            error!("Gateway error updating payment {}: {}", payment_id, e);
            Ok(HttpResponse::BadRequest().json(ApiResponse::<()>::error(
                "Payment gateway rejected the operation, please try again".to_string(),
            )))
        }
        Err(e) => {
            error!("Error updating payment {}: {}", payment_id, e);
            Ok(
                HttpResponse::InternalServerError().json(ApiResponse::<()>::error(
                    "Failed to update payment status".to_string(),
                )),
            )
        }
    }
}

pub async fn create_intent(
    engine: web::Data<LifecycleEngine>,
    request: web::Json<CreateIntentRequest>,
    user: AuthenticatedUser,
) -> Result<HttpResponse> {
    info!(
        "Creating gateway intent for payment {} (user: {})",
        request.payment_id, user.email
    );

    match engine.create_gateway_intent(request.payment_id).await {
        Ok(intent) => Ok(HttpResponse::Ok().json(ApiResponse::success(json!({
            "clientSecret": intent.client_secret,
        })))),
        Err(LifecycleError::NotFound(_)) => Ok(HttpResponse::NotFound().json(
            ApiResponse::<()>::error(format!("Payment {} not found", request.payment_id)),
        )),
        Err(LifecycleError::Validation(message)) => {
            Ok(HttpResponse::BadRequest().json(ApiResponse::<()>::error(message)))
        }
        Err(e) => {
            error!(
                "Error creating intent for payment {}: {}",
                request.payment_id, e
            );
            Ok(
                HttpResponse::InternalServerError().json(ApiResponse::<()>::error(
                    "Failed to create payment intent".to_string(),
                )),
            )
        }
    }
}
