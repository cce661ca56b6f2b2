//! Get Order Handler

use std::sync::Arc;

use salvo::{
    oapi::{ToSchema, extract::PathParam},
    prelude::*,
};
use serde::{Deserialize, Serialize};
use soko_app::domain::orders::records::{CustomerContact, OrderLineRecord, OrderRecord};
use uuid::Uuid;

use crate::{extensions::*, orders::errors::into_status_error, state::State};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct CustomerResponse {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
}

impl From<CustomerContact> for CustomerResponse {
    fn from(customer: CustomerContact) -> Self {
        CustomerResponse {
            name: customer.name,
            email: customer.email,
            phone: customer.phone,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct OrderLineResponse {
    pub product_uuid: Uuid,
    pub flash_sale_uuid: Option<Uuid>,
    pub quantity: u32,

    /// Price per unit captured at checkout
    pub unit_price: u64,

    pub line_total: u64,
}

impl From<OrderLineRecord> for OrderLineResponse {
    fn from(line: OrderLineRecord) -> Self {
        OrderLineResponse {
            product_uuid: line.product_uuid.into(),
            flash_sale_uuid: line.flash_sale_uuid.map(Into::into),
            quantity: line.quantity,
            unit_price: line.unit_price,
            line_total: line.line_total,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct OrderResponse {
    /// The unique identifier of the order
    pub uuid: Uuid,

    /// One of `pending`, `processing`, `shipped`, `delivered` or `cancelled`
    pub status: String,

    /// `mobile_money` or `cash_on_delivery`
    pub payment_method: String,

    pub customer: CustomerResponse,
    pub shipping_address: String,
    pub voucher_uuid: Option<Uuid>,

    pub subtotal: u64,
    pub shipping_fee: u64,
    pub tax: u64,
    pub voucher_discount: u64,
    pub total: u64,

    pub lines: Vec<OrderLineResponse>,

    /// The date and time the order was placed
    pub created_at: String,

    /// The date and time the order last changed status
    pub updated_at: String,
}

impl From<OrderRecord> for OrderResponse {
    fn from(order: OrderRecord) -> Self {
        OrderResponse {
            uuid: order.uuid.into(),
            status: order.status.to_string(),
            payment_method: order.payment_method.to_string(),
            customer: order.customer.into(),
            shipping_address: order.shipping_address,
            voucher_uuid: order.voucher_uuid.map(Into::into),
            subtotal: order.amounts.subtotal,
            shipping_fee: order.amounts.shipping_fee,
            tax: order.amounts.tax,
            voucher_discount: order.amounts.voucher_discount,
            total: order.amounts.total,
            lines: order.lines.into_iter().map(Into::into).collect(),
            created_at: order.created_at.to_string(),
            updated_at: order.updated_at.to_string(),
        }
    }
}

/// Get Order Handler
///
/// Returns one of the caller's orders.
#[endpoint(
    tags("orders"),
    summary = "Get Order",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Order found"),
        (status_code = StatusCode::NOT_FOUND, description = "Order not found"),
    ),
)]
pub(crate) async fn handler(
    order: PathParam<Uuid>,
    depot: &mut Depot,
) -> Result<Json<OrderResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let user = depot.user_uuid_or_401()?;

    let order = state
        .app
        .orders
        .get_order(user, order.into_inner().into())
        .await
        .map_err(into_status_error)?;

    Ok(Json(order.into()))
}
