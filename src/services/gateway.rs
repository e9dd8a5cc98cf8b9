use async_trait::async_trait;
use reqwest::Client;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;
use tracing::{error, info};
use uuid::Uuid;

use crate::config::StripeSettings;

#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("Invalid amount for gateway: {0}")]
    InvalidAmount(String),
    #[error("Gateway request failed: {0}")]
    Request(String),
    #[error("Gateway rejected the operation: {0}")]
    Rejected(String),
    #[error("Gateway request timed out")]
    Timeout,
}

#[derive(Debug, Clone)]
pub struct PaymentIntent {
    pub reference: String,
    pub client_secret: String,
}

/// Card-processor contract the lifecycle engine depends on. Amounts cross
/// this boundary as integer minor units only.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn create_intent(
        &self,
        amount_minor: i64,
        payment_id: Uuid,
        title: &str,
    ) -> Result<PaymentIntent, GatewayError>;

    /// Fetches an already-created intent by its reference.
    async fn retrieve_intent(&self, reference: &str) -> Result<PaymentIntent, GatewayError>;

    async fn capture(&self, reference: &str) -> Result<(), GatewayError>;

    async fn cancel(&self, reference: &str) -> Result<(), GatewayError>;
}

/// Converts a decimal currency amount to integer minor units (cents),
/// rounding midpoints away from zero: 19.99 -> 1999, 0.005 -> 1.
pub fn to_minor_units(amount: Decimal) -> Result<i64, GatewayError> {
    if amount.is_sign_negative() {
        return Err(GatewayError::InvalidAmount(format!(
            "negative amount {amount}"
        )));
    }

    let minor = (amount * Decimal::from(100))
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);

    minor
        .to_i64()
        .ok_or_else(|| GatewayError::InvalidAmount(format!("amount {amount} out of range")))
}

#[derive(Debug, Deserialize)]
struct StripeIntentResponse {
    id: String,
    client_secret: String,
}

#[derive(Debug, Deserialize)]
struct StripeErrorBody {
    error: StripeErrorDetail,
}

#[derive(Debug, Deserialize)]
struct StripeErrorDetail {
    message: Option<String>,
}

/// Stripe REST adapter. Form-encoded requests, bounded timeout; a timed-out
/// call is reported as failure, never assumed to have succeeded.
#[derive(Clone)]
pub struct StripeGateway {
    http: Client,
    settings: StripeSettings,
}

impl StripeGateway {
    pub fn new(settings: StripeSettings) -> Result<Self, GatewayError> {
        let timeout = Duration::from_millis(if settings.timeout_ms > 0 {
            settings.timeout_ms
        } else {
            15_000
        });

        let http = Client::builder()
            .use_rustls_tls()
            .timeout(timeout)
            .build()
            .map_err(|e| GatewayError::Request(e.to_string()))?;

        Ok(Self { http, settings })
    }

    fn classify(err: reqwest::Error) -> GatewayError {
        if err.is_timeout() {
            GatewayError::Timeout
        } else {
            GatewayError::Request(err.to_string())
        }
    }

    async fn rejection(response: reqwest::Response) -> GatewayError {
        let status = response.status();
        let message = match response.json::<StripeErrorBody>().await {
            Ok(body) => body.error.message.unwrap_or_else(|| status.to_string()),
            Err(_) => status.to_string(),
        };
        GatewayError::Rejected(message)
    }

    async fn post_action(&self, reference: &str, action: &str) -> Result<(), GatewayError> {
        let url = format!(
            "{}/v1/payment_intents/{}/{}",
            self.settings.api_base, reference, action
        );

        let response = self
            .http
            .post(&url)
            .basic_auth(&self.settings.secret_key, None::<&str>)
            .send()
            .await
            .map_err(Self::classify)?;

        if !response.status().is_success() {
            let err = Self::rejection(response).await;
            error!("Stripe {} failed for {}: {}", action, reference, err);
            return Err(err);
        }

        info!("Stripe {} succeeded for {}", action, reference);
        Ok(())
    }
}

#[async_trait]
impl PaymentGateway for StripeGateway {
    async fn create_intent(
        &self,
        amount_minor: i64,
        payment_id: Uuid,
        title: &str,
    ) -> Result<PaymentIntent, GatewayError> {
        let url = format!("{}/v1/payment_intents", self.settings.api_base);
        let amount = amount_minor.to_string();
        let payment_id_value = payment_id.to_string();

        let form = [
            ("amount", amount.as_str()),
            ("currency", self.settings.currency.as_str()),
            // Manual capture keeps the funds on hold until an admin
            // approves or rejects the payment.
            ("capture_method", "manual"),
            ("metadata[payment_id]", payment_id_value.as_str()),
            ("metadata[title]", title),
        ];

        let response = self
            .http
            .post(&url)
            .basic_auth(&self.settings.secret_key, None::<&str>)
            // Deterministic key derived from the payment id lets Stripe
            // dedupe a retried creation instead of opening a second intent.
            .header("Idempotency-Key", format!("payment-intent-{payment_id}"))
            .form(&form)
            .send()
            .await
            .map_err(Self::classify)?;

        if !response.status().is_success() {
            let err = Self::rejection(response).await;
            error!("Stripe intent creation failed for {}: {}", payment_id, err);
            return Err(err);
        }

        let intent: StripeIntentResponse = response
            .json()
            .await
            .map_err(|e| GatewayError::Request(e.to_string()))?;

        info!("Created Stripe intent {} for payment {}", intent.id, payment_id);
        Ok(PaymentIntent {
            reference: intent.id,
            client_secret: intent.client_secret,
        })
    }

    async fn retrieve_intent(&self, reference: &str) -> Result<PaymentIntent, GatewayError> {
        let url = format!("{}/v1/payment_intents/{}", self.settings.api_base, reference);

        let response = self
            .http
            .get(&url)
            .basic_auth(&self.settings.secret_key, None::<&str>)
            .send()
            .await
            .map_err(Self::classify)?;

        if !response.status().is_success() {
            let err = Self::rejection(response).await;
            error!("Stripe intent lookup failed for {}: {}", reference, err);
            return Err(err);
        }

        let intent: StripeIntentResponse = response
            .json()
            .await
            .map_err(|e| GatewayError::Request(e.to_string()))?;

        Ok(PaymentIntent {
            reference: intent.id,
            client_secret: intent.client_secret,
        })
    }

    async fn capture(&self, reference: &str) -> Result<(), GatewayError> {
        self.post_action(reference, "capture").await
    }

    async fn cancel(&self, reference: &str) -> Result<(), GatewayError> {
        self.post_action(reference, "cancel").await
    }
}
