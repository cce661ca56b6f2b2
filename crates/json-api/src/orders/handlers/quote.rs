//! Quote Handler

use std::sync::Arc;

use salvo::{
    oapi::{ToSchema, extract::JsonBody},
    prelude::*,
};
use serde::{Deserialize, Serialize};
use soko::{
    money::{STORE_CURRENCY, format_amount},
    pricing::Quote,
    vouchers::VoucherCode,
};
use soko_app::domain::orders::data::CheckoutLine;
use uuid::Uuid;

use crate::{extensions::*, orders::errors::into_status_error, state::State};

/// A cart line with the unit price shown when it was added to the cart.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema)]
pub(crate) struct CheckoutLineRequest {
    pub product_uuid: Uuid,
    /// Buy at this flash sale's price
    #[serde(default)]
    pub flash_sale_uuid: Option<Uuid>,
    pub quantity: u32,
    /// Unit price in minor units, captured at add-to-cart time
    pub unit_price: u64,
}

impl From<CheckoutLineRequest> for CheckoutLine {
    fn from(line: CheckoutLineRequest) -> Self {
        CheckoutLine {
            product: line.product_uuid.into(),
            flash_sale: line.flash_sale_uuid.map(Into::into),
            quantity: line.quantity,
            unit_price: line.unit_price,
        }
    }
}

/// Parse an optional voucher code, treating a blank code as none.
pub(crate) fn parse_voucher_code(code: Option<&str>) -> Result<Option<VoucherCode>, StatusError> {
    code.map(str::trim)
        .filter(|code| !code.is_empty())
        .map(VoucherCode::new)
        .transpose()
        .or_400("invalid voucher code")
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct QuoteRequest {
    pub lines: Vec<CheckoutLineRequest>,
    #[serde(default)]
    pub voucher_code: Option<String>,
}

/// Price breakdown in minor units. `total` always equals
/// `subtotal - voucher_discount + shipping_fee + tax`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct QuoteResponse {
    pub subtotal: u64,
    pub shipping_fee: u64,
    pub tax: u64,
    pub voucher_discount: u64,
    pub total: u64,
    /// Total formatted for display, e.g. `KSh131.00`
    pub total_display: String,
}

impl QuoteResponse {
    pub(crate) fn from_quote(quote: &Quote) -> Result<Self, StatusError> {
        Ok(QuoteResponse {
            subtotal: quote.subtotal,
            shipping_fee: quote.shipping_fee,
            tax: quote.tax,
            voucher_discount: quote.voucher_discount,
            total: quote.total,
            total_display: format_amount(quote.total, STORE_CURRENCY)
                .or_500("failed to format total")?,
        })
    }
}

/// Quote Handler
///
/// Prices a cart exactly as checkout would, without placing an order.
#[endpoint(
    tags("orders"),
    summary = "Quote Cart",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Cart priced"),
        (status_code = StatusCode::BAD_REQUEST, description = "Invalid cart or voucher"),
        (status_code = StatusCode::CONFLICT, description = "Voucher or flash sale exhausted"),
    ),
)]
pub(crate) async fn handler(
    json: JsonBody<QuoteRequest>,
    depot: &mut Depot,
) -> Result<Json<QuoteResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let request = json.into_inner();
    let voucher_code = parse_voucher_code(request.voucher_code.as_deref())?;

    let quote = state
        .app
        .orders
        .quote_cart(request.lines.into_iter().map(Into::into).collect(), voucher_code)
        .await
        .map_err(into_status_error)?;

    Ok(Json(QuoteResponse::from_quote(&quote)?))
}
