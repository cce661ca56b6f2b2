//! Submit Payment Handler

use std::sync::Arc;

use salvo::{
    oapi::{
        ToSchema,
        extract::{JsonBody, PathParam},
    },
    prelude::*,
};
use serde::{Deserialize, Serialize};
use soko::payments::{PaymentChannel, PaymentChannelKind};
use soko_app::domain::payments::data::PaymentSubmission;
use uuid::Uuid;

use crate::{
    extensions::*,
    payments::{errors::into_status_error, index::PaymentResponse},
    state::State,
};

/// Parse the channel a transfer went through. No channel means M-Pesa.
pub(crate) fn parse_channel(
    channel: Option<&str>,
    paybill_number: Option<&str>,
    account_number: Option<&str>,
) -> Result<PaymentChannel, StatusError> {
    let kind = channel
        .map(str::parse::<PaymentChannelKind>)
        .transpose()
        .or_400("invalid payment channel")?
        .unwrap_or(PaymentChannelKind::Mpesa);

    Ok(PaymentChannel::from_parts(kind, paybill_number, account_number))
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct SubmitPaymentRequest {
    /// The confirmation message received after sending the transfer
    pub message: String,
    #[serde(default)]
    pub phone: Option<String>,
    /// `mpesa` (default) or `ncba_loop`
    #[serde(default)]
    pub channel: Option<String>,
    /// NCBA Loop paybill number
    #[serde(default)]
    pub paybill_number: Option<String>,
    /// NCBA Loop account number
    #[serde(default)]
    pub account_number: Option<String>,
    /// Amount sent in minor units
    pub amount: u64,
}

impl SubmitPaymentRequest {
    fn into_submission(self) -> Result<PaymentSubmission, StatusError> {
        let channel = parse_channel(
            self.channel.as_deref(),
            self.paybill_number.as_deref(),
            self.account_number.as_deref(),
        )?;

        Ok(PaymentSubmission {
            message: self.message,
            phone: self.phone,
            channel,
            amount: self.amount,
        })
    }
}

/// Submit Payment Handler
///
/// Records proof of a mobile-money transfer for a pending order. A second
/// submission replaces the pending one.
#[endpoint(
    tags("payments"),
    summary = "Submit Payment",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::CREATED, description = "Payment submitted"),
        (status_code = StatusCode::BAD_REQUEST, description = "Missing message or invalid amount"),
        (status_code = StatusCode::NOT_FOUND, description = "Order not found"),
        (status_code = StatusCode::CONFLICT, description = "Order is no longer pending"),
    ),
)]
pub(crate) async fn handler(
    order: PathParam<Uuid>,
    json: JsonBody<SubmitPaymentRequest>,
    depot: &mut Depot,
    res: &mut Response,
) -> Result<Json<PaymentResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let user = depot.user_uuid_or_401()?;
    let submission = json.into_inner().into_submission()?;

    let payment = state
        .app
        .payments
        .submit_payment(user, order.into_inner().into(), submission)
        .await
        .map_err(into_status_error)?;

    res.status_code(StatusCode::CREATED);

    Ok(Json(payment.into()))
}
