//! Submit Order Handler

use std::sync::Arc;

use salvo::{
    http::header::LOCATION,
    oapi::{ToSchema, extract::JsonBody},
    prelude::*,
};
use serde::{Deserialize, Serialize};
use soko::orders::{PaymentConfirmation, PaymentMethod, PaymentMethodKind};
use soko_app::domain::orders::{data::NewOrder, records::CustomerContact};
use uuid::Uuid;

use crate::{
    extensions::*,
    orders::{
        errors::into_status_error,
        get::OrderResponse,
        quote::{CheckoutLineRequest, parse_voucher_code},
    },
    payments::submit::parse_channel,
    state::State,
};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct CustomerRequest {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
}

/// How the order will be paid.
///
/// Mobile money needs the confirmation message the customer received after
/// sending the transfer.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct PaymentMethodRequest {
    /// `mobile_money` or `cash_on_delivery`
    pub method: String,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    /// Mobile-money channel: `mpesa` (default) or `ncba_loop`
    #[serde(default)]
    pub channel: Option<String>,
    #[serde(default)]
    pub paybill_number: Option<String>,
    #[serde(default)]
    pub account_number: Option<String>,
}

impl PaymentMethodRequest {
    fn into_payment_method(self) -> Result<PaymentMethod, StatusError> {
        let kind = self
            .method
            .parse::<PaymentMethodKind>()
            .or_400("invalid payment method")?;

        match kind {
            PaymentMethodKind::CashOnDelivery => Ok(PaymentMethod::CashOnDelivery),
            PaymentMethodKind::MobileMoney => {
                let channel = parse_channel(
                    self.channel.as_deref(),
                    self.paybill_number.as_deref(),
                    self.account_number.as_deref(),
                )?;

                PaymentConfirmation::new(
                    self.message.as_deref().unwrap_or_default(),
                    self.phone.as_deref(),
                )
                .map(|confirmation| PaymentMethod::MobileMoney(confirmation.with_channel(channel)))
                .or_400("invalid payment method")
            }
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct SubmitOrderRequest {
    pub uuid: Uuid,
    pub lines: Vec<CheckoutLineRequest>,
    pub customer: CustomerRequest,
    pub shipping_address: String,
    #[serde(default)]
    pub voucher_code: Option<String>,
    pub payment: PaymentMethodRequest,
}

impl SubmitOrderRequest {
    fn into_new_order(self) -> Result<NewOrder, StatusError> {
        Ok(NewOrder {
            uuid: self.uuid.into(),
            voucher_code: parse_voucher_code(self.voucher_code.as_deref())?,
            payment_method: self.payment.into_payment_method()?,
            lines: self.lines.into_iter().map(Into::into).collect(),
            customer: CustomerContact {
                name: self.customer.name,
                email: self.customer.email,
                phone: self.customer.phone,
            },
            shipping_address: self.shipping_address,
        })
    }
}

/// Submit Order Handler
///
/// Places an order for the cart. Prices and the voucher discount are fixed
/// at this point.
#[endpoint(
    tags("orders"),
    summary = "Submit Order",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::CREATED, description = "Order placed"),
        (status_code = StatusCode::BAD_REQUEST, description = "Invalid order"),
        (status_code = StatusCode::CONFLICT, description = "Voucher or flash sale exhausted"),
    ),
)]
pub(crate) async fn handler(
    json: JsonBody<SubmitOrderRequest>,
    depot: &mut Depot,
    res: &mut Response,
) -> Result<Json<OrderResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let user = depot.user_uuid_or_401()?;
    let order = json.into_inner().into_new_order()?;

    let record = state
        .app
        .orders
        .submit_order(user, order)
        .await
        .map_err(into_status_error)?;

    res.add_header(LOCATION, format!("/orders/{}", record.uuid), true)
        .or_500("failed to set location header")?
        .status_code(StatusCode::CREATED);

    Ok(Json(record.into()))
}
