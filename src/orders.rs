//! Orders

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    lifecycle::Lifecycle,
    payments::{PaymentChannel, TransactionCode, extract_transaction_code},
};

/// Order lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Awaiting payment confirmation.
    Pending,

    /// Paid (or cash on delivery) and being prepared.
    Processing,

    /// Handed to the courier.
    Shipped,

    /// Received by the customer.
    Delivered,

    /// Cancelled by the customer or by a rejected payment.
    Cancelled,
}

impl OrderStatus {
    /// Every status, in lifecycle order.
    pub const ALL: [Self; 5] = [
        Self::Pending,
        Self::Processing,
        Self::Shipped,
        Self::Delivered,
        Self::Cancelled,
    ];

    /// Storage name of the status.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Shipped => "shipped",
            Self::Delivered => "delivered",
            Self::Cancelled => "cancelled",
        }
    }
}

impl Lifecycle for OrderStatus {
    fn allows(self, to: Self) -> bool {
        matches!(
            (self, to),
            (Self::Pending, Self::Processing | Self::Cancelled)
                | (Self::Processing, Self::Shipped)
                | (Self::Shipped, Self::Delivered)
        )
    }

    fn is_terminal(self) -> bool {
        matches!(self, Self::Delivered | Self::Cancelled)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unrecognised status name.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown status: {0}")]
pub struct UnknownStatus(pub String);

impl FromStr for OrderStatus {
    type Err = UnknownStatus;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == value)
            .ok_or_else(|| UnknownStatus(value.to_string()))
    }
}

/// Errors building a payment method.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PaymentMethodError {
    /// Mobile money needs the pasted confirmation message.
    #[error("mobile money payments need a confirmation message")]
    MissingConfirmation,
}

/// Proof of an off-platform mobile-money transfer, as pasted by the customer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentConfirmation {
    message: String,
    phone: Option<String>,
    channel: PaymentChannel,
}

impl PaymentConfirmation {
    /// Wrap a pasted M-Pesa message and optional payer phone number.
    ///
    /// # Errors
    ///
    /// Returns [`PaymentMethodError::MissingConfirmation`] if the message is blank.
    pub fn new(message: &str, phone: Option<&str>) -> Result<Self, PaymentMethodError> {
        let message = message.trim();

        if message.is_empty() {
            return Err(PaymentMethodError::MissingConfirmation);
        }

        Ok(Self {
            message: message.to_string(),
            phone: phone
                .map(str::trim)
                .filter(|phone| !phone.is_empty())
                .map(ToString::to_string),
            channel: PaymentChannel::Mpesa,
        })
    }

    /// Record the transfer as sent through `channel` instead of M-Pesa.
    #[must_use]
    pub fn with_channel(mut self, channel: PaymentChannel) -> Self {
        self.channel = channel;
        self
    }

    /// The pasted message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// The payer's phone number, if supplied.
    pub fn phone(&self) -> Option<&str> {
        self.phone.as_deref()
    }

    /// Channel the money went through.
    pub fn channel(&self) -> &PaymentChannel {
        &self.channel
    }

    /// Transaction code found in the message, if any.
    pub fn transaction_code(&self) -> Option<TransactionCode> {
        extract_transaction_code(&self.message)
    }
}

/// Payment method without its per-variant data, as stored on an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethodKind {
    /// Off-platform mobile-money transfer.
    MobileMoney,

    /// Paid to the courier on delivery.
    CashOnDelivery,
}

impl PaymentMethodKind {
    /// Storage name of the method.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::MobileMoney => "mobile_money",
            Self::CashOnDelivery => "cash_on_delivery",
        }
    }
}

impl fmt::Display for PaymentMethodKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unrecognised payment method name.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown payment method: {0}")]
pub struct UnknownPaymentMethod(pub String);

impl FromStr for PaymentMethodKind {
    type Err = UnknownPaymentMethod;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "mobile_money" => Ok(Self::MobileMoney),
            "cash_on_delivery" => Ok(Self::CashOnDelivery),
            other => Err(UnknownPaymentMethod(other.to_string())),
        }
    }
}

/// How the customer pays for an order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentMethod {
    /// Off-platform mobile-money transfer, confirmed manually by an admin.
    MobileMoney(PaymentConfirmation),

    /// Paid to the courier on delivery.
    CashOnDelivery,
}

impl PaymentMethod {
    /// The method without its data.
    pub const fn kind(&self) -> PaymentMethodKind {
        match self {
            Self::MobileMoney(_) => PaymentMethodKind::MobileMoney,
            Self::CashOnDelivery => PaymentMethodKind::CashOnDelivery,
        }
    }

    /// Storage name of the method.
    pub const fn type_as_str(&self) -> &'static str {
        self.kind().as_str()
    }

    /// Status a freshly submitted order starts in.
    ///
    /// Cash-on-delivery orders have no confirmation step, so they go straight to processing.
    pub const fn initial_status(&self) -> OrderStatus {
        match self {
            Self::MobileMoney(_) => OrderStatus::Pending,
            Self::CashOnDelivery => OrderStatus::Processing,
        }
    }

    /// Whether an admin must confirm a payment before the order proceeds.
    pub const fn requires_confirmation(&self) -> bool {
        matches!(self, Self::MobileMoney(_))
    }
}
