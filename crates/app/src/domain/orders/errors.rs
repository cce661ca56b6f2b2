//! Orders service errors.

use soko::{
    flash_sales::FlashSaleError, orders::OrderStatus, pricing::PricingError,
    vouchers::VoucherError,
};
use sqlx::{
    Error,
    error::{DatabaseError, ErrorKind},
};
use thiserror::Error;

use crate::domain::{flash_sales::records::FlashSaleUuid, products::records::ProductUuid};

/// Reasons a checkout request is rejected before anything is written.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CheckoutError {
    #[error("cart is empty")]
    EmptyCart,

    #[error("line {0} has a quantity of zero")]
    InvalidQuantity(usize),

    #[error("line {0} has no unit price")]
    MissingUnitPrice(usize),

    #[error("product {0} does not exist")]
    UnknownProduct(ProductUuid),

    #[error("product {0} is out of stock")]
    OutOfStock(ProductUuid),

    #[error("flash sale {0} does not exist")]
    UnknownFlashSale(FlashSaleUuid),

    #[error("flash sale {sale} is not for product {product}")]
    FlashSaleProductMismatch {
        sale: FlashSaleUuid,
        product: ProductUuid,
    },

    #[error("flash sale {sale} sells at {sale_price}, not {captured}")]
    SalePriceMismatch {
        sale: FlashSaleUuid,
        sale_price: u64,
        captured: u64,
    },

    #[error("customer name is required")]
    BlankCustomerName,

    #[error("customer email is required")]
    BlankCustomerEmail,

    #[error("shipping address is required")]
    BlankShippingAddress,
}

#[derive(Debug, Error)]
pub enum OrdersServiceError {
    #[error(transparent)]
    Validation(#[from] CheckoutError),

    #[error(transparent)]
    Voucher(VoucherError),

    #[error(transparent)]
    FlashSale(#[from] FlashSaleError),

    #[error(transparent)]
    Pricing(PricingError),

    #[error("voucher has no uses left")]
    VoucherExhausted,

    #[error("flash sale {0} cannot cover the ordered quantity")]
    FlashSaleSoldOut(FlashSaleUuid),

    #[error("order not found")]
    NotFound,

    #[error("order is already {0}")]
    AlreadyProcessed(OrderStatus),

    #[error("cannot move order from {from} to {to}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },

    #[error("admin role required")]
    Permission,

    #[error("order already exists")]
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

impl OrdersServiceError {
    /// Whether the request lost a race for a limited resource.
    #[must_use]
    pub fn is_capacity(&self) -> bool {
        match self {
            Self::VoucherExhausted | Self::FlashSaleSoldOut(_) => true,
            Self::Voucher(error) => error.is_capacity(),
            Self::FlashSale(error) => error.is_capacity(),
            _ => false,
        }
    }

    /// Error for a refused move from `from` to `to`. Asking for the state the
    /// order is already in is reported as already processed.
    #[must_use]
    pub fn refused_transition(from: OrderStatus, to: OrderStatus) -> Self {
        if from == to {
            Self::AlreadyProcessed(from)
        } else {
            Self::InvalidTransition { from, to }
        }
    }
}

impl From<PricingError> for OrdersServiceError {
    fn from(error: PricingError) -> Self {
        match error {
            PricingError::Voucher(error) => Self::Voucher(error),
            other => Self::Pricing(other),
        }
    }
}

impl From<Error> for OrdersServiceError {
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
