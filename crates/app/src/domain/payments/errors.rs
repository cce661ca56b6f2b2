//! Payments service errors.

use soko::{
    orders::{OrderStatus, PaymentMethodError},
    payments::PaymentStatus,
};
use sqlx::{
    Error,
    error::{DatabaseError, ErrorKind},
};
use thiserror::Error;

use crate::domain::flash_sales::records::FlashSaleUuid;

#[derive(Debug, Error)]
pub enum PaymentsServiceError {
    #[error(transparent)]
    MissingConfirmation(#[from] PaymentMethodError),

    #[error("payment amount must be positive")]
    InvalidAmount,

    #[error("order is not paid by mobile money")]
    NotMobileMoney,

    #[error("order is {0}, payment can only be submitted while pending")]
    OrderNotPending(OrderStatus),

    #[error("payment not found")]
    NotFound,

    #[error("payment is already {0}")]
    AlreadyProcessed(PaymentStatus),

    #[error("cannot move order from {from} to {to}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },

    #[error("flash sale {0} cannot cover the ordered quantity")]
    FlashSaleSoldOut(FlashSaleUuid),

    #[error("admin role required")]
    Permission,

    #[error("payment already exists")]
    AlreadyExists,

    #[error("related resource not found")]
    InvalidReference,

    #[error("missing required data")]
    MissingRequiredData,

    #[error("invalid data")]
    InvalidData,

    #[error("storage error")]
    Sql(#[source] Error),
}

impl From<Error> for PaymentsServiceError {
    fn from(error: Error) -> Self {
        if matches!(error, Error::RowNotFound) {
            return Self::NotFound;
        }

        match error.as_database_error().map(DatabaseError::kind) {
            Some(ErrorKind::UniqueViolation) => Self::AlreadyExists,
            Some(ErrorKind::ForeignKeyViolation) => Self::InvalidReference,
            Some(ErrorKind::NotNullViolation) => Self::MissingRequiredData,
            Some(ErrorKind::CheckViolation) => Self::InvalidData,
            Some(ErrorKind::Other | _) | None => Self::Sql(error),
        }
    }
}
