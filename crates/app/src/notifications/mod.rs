//! Customer notifications for order and payment events.
//!
//! Notifications are sent after the triggering transaction commits. Delivery
//! failures are logged and never undo the change that caused them.

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use mockall::automock;
use reqwest::{Client, Url};
use serde::Serialize;
use soko::{
    money::{AmountError, STORE_CURRENCY, format_amount},
    orders::PaymentMethodKind,
};
use thiserror::Error;
use tracing::{info, warn};

use crate::domain::{orders::records::OrderUuid, payments::records::PaymentUuid};

/// Country prefix applied to local `0`-prefixed phone numbers.
const COUNTRY_CODE: &str = "254";

/// Something a customer should hear about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum Notification {
    OrderPlaced {
        order: OrderUuid,
        customer_name: String,
        phone: Option<String>,
        total: u64,
        payment_method: PaymentMethodKind,
    },
    PaymentConfirmed {
        order: OrderUuid,
        payment: PaymentUuid,
        customer_name: String,
        phone: Option<String>,
        amount: u64,
    },
    PaymentRejected {
        order: OrderUuid,
        payment: PaymentUuid,
        customer_name: String,
        phone: Option<String>,
        amount: u64,
    },
}

impl Notification {
    #[must_use]
    pub const fn event(&self) -> &'static str {
        match self {
            Self::OrderPlaced { .. } => "order_placed",
            Self::PaymentConfirmed { .. } => "payment_confirmed",
            Self::PaymentRejected { .. } => "payment_rejected",
        }
    }

    #[must_use]
    pub const fn order(&self) -> OrderUuid {
        match self {
            Self::OrderPlaced { order, .. }
            | Self::PaymentConfirmed { order, .. }
            | Self::PaymentRejected { order, .. } => *order,
        }
    }

    #[must_use]
    pub fn phone(&self) -> Option<&str> {
        match self {
            Self::OrderPlaced { phone, .. }
            | Self::PaymentConfirmed { phone, .. }
            | Self::PaymentRejected { phone, .. } => phone.as_deref(),
        }
    }

    /// Text sent to the customer.
    ///
    /// # Errors
    ///
    /// Returns an error if the amount cannot be formatted.
    pub fn message(&self) -> Result<String, AmountError> {
        let message = match self {
            Self::OrderPlaced {
                order,
                customer_name,
                total,
                payment_method,
                ..
            } => {
                let total = format_amount(*total, STORE_CURRENCY)?;

                match payment_method {
                    PaymentMethodKind::MobileMoney => format!(
                        "Hi {customer_name}, we received order {order} for {total}. \
                         We will confirm your payment shortly."
                    ),
                    PaymentMethodKind::CashOnDelivery => format!(
                        "Hi {customer_name}, we received order {order} for {total}. \
                         Please pay on delivery."
                    ),
                }
            }
            Self::PaymentConfirmed {
                order,
                customer_name,
                amount,
                ..
            } => format!(
                "Hi {customer_name}, your payment of {} for order {order} is confirmed.",
                format_amount(*amount, STORE_CURRENCY)?
            ),
            Self::PaymentRejected {
                order,
                customer_name,
                amount,
                ..
            } => format!(
                "Hi {customer_name}, we could not verify your payment of {} for order {order}. \
                 The order has been cancelled.",
                format_amount(*amount, STORE_CURRENCY)?
            ),
        };

        Ok(message)
    }
}

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("failed to format notification")]
    Format(#[from] AmountError),

    #[error("webhook request failed")]
    Http(#[from] reqwest::Error),
}

#[automock]
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver a single notification.
    async fn notify(&self, notification: &Notification) -> Result<(), NotifyError>;
}

/// Send `notification` in the background, logging failures.
pub fn dispatch(notifier: &Arc<dyn Notifier>, notification: Notification) {
    let notifier = Arc::clone(notifier);

    let _task = tokio::spawn(async move {
        if let Err(error) = notifier.notify(&notification).await {
            warn!(
                event = notification.event(),
                order_uuid = %notification.order(),
                error = %error,
                "failed to deliver notification"
            );
        }
    });
}

/// Logs each notification with a click-to-chat link an operator can open.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, notification: &Notification) -> Result<(), NotifyError> {
        let message = notification.message()?;

        let link = notification
            .phone()
            .and_then(normalize_phone)
            .and_then(|phone| whatsapp_link(&phone, &message));

        info!(
            event = notification.event(),
            order_uuid = %notification.order(),
            whatsapp_link = link.as_ref().map(Url::as_str),
            "customer notification"
        );

        Ok(())
    }
}

/// POSTs each notification as JSON to a configured endpoint.
#[derive(Debug, Clone)]
pub struct WebhookNotifier {
    client: Client,
    url: Url,
}

impl WebhookNotifier {
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(url: Url, timeout: Duration) -> Result<Self, NotifyError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self { client, url })
    }
}

#[derive(Debug, Serialize)]
struct WebhookPayload<'a> {
    #[serde(flatten)]
    notification: &'a Notification,
    message: String,
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn notify(&self, notification: &Notification) -> Result<(), NotifyError> {
        let payload = WebhookPayload {
            notification,
            message: notification.message()?,
        };

        self.client
            .post(self.url.clone())
            .json(&payload)
            .send()
            .await?
            .error_for_status()?;

        info!(
            event = notification.event(),
            order_uuid = %notification.order(),
            "delivered notification webhook"
        );

        Ok(())
    }
}

/// Reduce a phone number to international digits, e.g. `0712 345 678`
/// becomes `254712345678`. Returns `None` when no digits remain.
#[must_use]
pub fn normalize_phone(phone: &str) -> Option<String> {
    let digits: String = phone.chars().filter(char::is_ascii_digit).collect();

    if digits.is_empty() {
        return None;
    }

    match digits.strip_prefix('0') {
        Some(local) => Some(format!("{COUNTRY_CODE}{local}")),
        None => Some(digits),
    }
}

/// `https://wa.me/<phone>?text=<message>` with the message URL-encoded.
#[must_use]
pub fn whatsapp_link(phone: &str, message: &str) -> Option<Url> {
    Url::parse_with_params(&format!("https://wa.me/{phone}"), &[("text", message)]).ok()
}
