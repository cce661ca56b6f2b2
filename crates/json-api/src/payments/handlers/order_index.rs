//! List Order Payments Handler

use std::sync::Arc;

use salvo::{oapi::extract::PathParam, prelude::*};
use uuid::Uuid;

use crate::{
    extensions::*,
    payments::{errors::into_status_error, index::PaymentsResponse},
    state::State,
};

/// List Order Payments Handler
///
/// Returns the payment records submitted for one of the caller's orders.
#[endpoint(
    tags("payments"),
    summary = "List Order Payments",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Payments listed"),
        (status_code = StatusCode::NOT_FOUND, description = "Order not found"),
    ),
)]
pub(crate) async fn handler(
    order: PathParam<Uuid>,
    depot: &mut Depot,
) -> Result<Json<PaymentsResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let user = depot.user_uuid_or_401()?;

    let payments = state
        .app
        .payments
        .list_order_payments(user, order.into_inner().into())
        .await
        .map_err(into_status_error)?;

    Ok(Json(payments.into()))
}
