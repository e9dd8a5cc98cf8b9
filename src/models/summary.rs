use rust_decimal::Decimal;
use serde::Serialize;

use crate::models::payment::{Payment, PaymentStatus};

/// Derived reporting view over a payment set. Operates on whatever slice it
/// is given (filtered or not) and never re-fetches.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct PaymentSummary {
    pub total_payments: usize,
    pub pending_payments: usize,
    pub completed_payments: usize,
    pub failed_payments: usize,
    pub total_amount: Decimal,
}

impl PaymentSummary {
    pub fn from_payments(payments: &[Payment]) -> Self {
        let mut summary = PaymentSummary {
            total_payments: 0,
            pending_payments: 0,
            completed_payments: 0,
            failed_payments: 0,
            total_amount: Decimal::ZERO,
        };

        for payment in payments {
            summary.total_payments += 1;
            summary.total_amount += payment.amount;
            match payment.status {
                PaymentStatus::Pending => summary.pending_payments += 1,
                PaymentStatus::Completed => summary.completed_payments += 1,
                PaymentStatus::Failed => summary.failed_payments += 1,
            }
        }

        summary
    }
}
