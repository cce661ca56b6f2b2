//! Payment Records

use jiff::Timestamp;
use soko::payments::{PaymentChannel, PaymentStatus};

use crate::{auth::UserUuid, domain::orders::records::OrderUuid, uuids::TypedUuid};

/// Payment UUID
pub type PaymentUuid = TypedUuid<PaymentRecord>;

/// A customer's claim to have paid for an order, and the admin decision on it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentRecord {
    pub uuid: PaymentUuid,
    pub order_uuid: OrderUuid,
    pub message: String,
    pub transaction_code: Option<String>,
    pub phone: Option<String>,
    pub channel: PaymentChannel,
    pub amount: u64,
    pub status: PaymentStatus,
    pub confirmed_by: Option<UserUuid>,
    pub confirmed_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Number of payment records in each status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PaymentSummary {
    pub pending: u64,
    pub confirmed: u64,
    pub rejected: u64,
}

impl PaymentSummary {
    #[must_use]
    pub fn total(&self) -> u64 {
        self.pending
            .saturating_add(self.confirmed)
            .saturating_add(self.rejected)
    }
}
