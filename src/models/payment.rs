use crate::database::connection::DbPool;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, QueryBuilder, Type};
use std::str::FromStr;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Type, PartialEq, Eq)]
#[sqlx(type_name = "payment_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Completed,
    Failed,
}

impl PaymentStatus {
    /// Completed and Failed are terminal. The only legal moves are
    /// Pending -> Completed and Pending -> Failed.
    pub fn can_transition_to(&self, next: PaymentStatus) -> bool {
        matches!(
            (self, next),
            (PaymentStatus::Pending, PaymentStatus::Completed)
                | (PaymentStatus::Pending, PaymentStatus::Failed)
        )
    }
}

impl FromStr for PaymentStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(PaymentStatus::Pending),
            "completed" => Ok(PaymentStatus::Completed),
            "failed" => Ok(PaymentStatus::Failed),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Payment {
    pub id: Uuid,
    pub title: String,
    pub amount: Decimal,
    pub email: String,
    pub status: PaymentStatus,
    pub gateway_reference: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreatePayment {
    pub title: String,
    pub amount: Decimal,
    pub email: String,
}

/// Conjunctive listing predicates. `email` is set by the lifecycle engine
/// from the caller's role, never taken from the query string directly.
#[derive(Debug, Clone, Default)]
pub struct PaymentFilter {
    pub email: Option<String>,
    pub status: Option<PaymentStatus>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
}

impl Payment {
    pub async fn create(pool: &DbPool, payment: CreatePayment) -> Result<Self, sqlx::Error> {
        let now = Utc::now();

        let payment = sqlx::query_as::<_, Payment>(
            "INSERT INTO payments (id, title, amount, email, status, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(payment.title)
        .bind(payment.amount)
        .bind(payment.email)
        .bind(PaymentStatus::Pending)
        .bind(now)
        .bind(now)
        .fetch_one(pool)
        .await?;

        Ok(payment)
    }

    pub async fn find_by_id(pool: &DbPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let payment = sqlx::query_as::<_, Payment>("SELECT * FROM payments WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await?;

        Ok(payment)
    }

    pub async fn find_all(pool: &DbPool, filter: &PaymentFilter) -> Result<Vec<Self>, sqlx::Error> {
        let mut query =
            QueryBuilder::<sqlx::Postgres>::new("SELECT * FROM payments WHERE 1 = 1");

        if let Some(email) = &filter.email {
            query.push(" AND email = ").push_bind(email);
        }
        if let Some(status) = filter.status {
            query.push(" AND status = ").push_bind(status);
        }
        if let Some(start) = filter.start_date {
            query.push(" AND created_at >= ").push_bind(start);
        }
        if let Some(end) = filter.end_date {
            query.push(" AND created_at <= ").push_bind(end);
        }
        query.push(" ORDER BY created_at DESC");

        let payments = query.build_query_as::<Payment>().fetch_all(pool).await?;

        Ok(payments)
    }

    /// Attaches a gateway reference only while none is recorded, so a
    /// retried intent creation can never overwrite a live reference.
    pub async fn set_gateway_reference(
        pool: &DbPool,
        id: Uuid,
        reference: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        let payment = sqlx::query_as::<_, Payment>(
            "UPDATE payments
             SET gateway_reference = $2, updated_at = $3
             WHERE id = $1 AND gateway_reference IS NULL
             RETURNING *",
        )
        .bind(id)
        .bind(reference)
        .bind(Utc::now())
        .fetch_optional(pool)
        .await?;

        Ok(payment)
    }

    /// Conditional status write keyed on the expected current status. Two
    /// racing updates on the same id cannot both succeed.
    pub async fn update_status_if(
        pool: &DbPool,
        id: Uuid,
        from: PaymentStatus,
        to: PaymentStatus,
    ) -> Result<Option<Self>, sqlx::Error> {
        let payment = sqlx::query_as::<_, Payment>(
            "UPDATE payments
             SET status = $3, updated_at = $4
             WHERE id = $1 AND status = $2
             RETURNING *",
        )
        .bind(id)
        .bind(from)
        .bind(to)
        .bind(Utc::now())
        .fetch_optional(pool)
        .await?;

        Ok(payment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pending_can_reach_both_terminals() {
        assert!(PaymentStatus::Pending.can_transition_to(PaymentStatus::Completed));
        assert!(PaymentStatus::Pending.can_transition_to(PaymentStatus::Failed));
    }

    #[test]
    fn terminal_states_have_no_outbound_transitions() {
        for from in [PaymentStatus::Completed, PaymentStatus::Failed] {
            for to in [
                PaymentStatus::Pending,
                PaymentStatus::Completed,
                PaymentStatus::Failed,
            ] {
                assert!(!from.can_transition_to(to));
            }
        }
    }

    #[test]
    fn pending_cannot_stay_pending_via_transition() {
        assert!(!PaymentStatus::Pending.can_transition_to(PaymentStatus::Pending));
    }

    #[test]
    fn status_parses_wire_values() {
        assert_eq!("pending".parse::<PaymentStatus>(), Ok(PaymentStatus::Pending));
        assert_eq!(
            "completed".parse::<PaymentStatus>(),
            Ok(PaymentStatus::Completed)
        );
        assert_eq!("failed".parse::<PaymentStatus>(), Ok(PaymentStatus::Failed));
        assert!("approved".parse::<PaymentStatus>().is_err());
    }
}
