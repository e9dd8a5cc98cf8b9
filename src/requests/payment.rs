use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;

use crate::models::payment::PaymentStatus;

#[derive(Debug, Deserialize)]
pub struct CreatePaymentRequest {
    pub title: String,
    pub amount: Decimal,
}

#[derive(Debug, Deserialize)]
pub struct PaymentListQuery {
    /// Honored for admin callers only; users are always scoped to their own
    /// records regardless of this parameter.
    pub email: Option<String>,
    pub status: Option<PaymentStatus>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
pub struct UpdatePaymentStatusRequest {
    pub status: PaymentStatus,
}

#[derive(Debug, Deserialize)]
pub struct CreateIntentRequest {
    pub payment_id: Uuid,
}
