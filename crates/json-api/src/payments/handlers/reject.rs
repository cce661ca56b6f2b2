//! Reject Payment Handler

use std::sync::Arc;

use salvo::{oapi::extract::PathParam, prelude::*};
use uuid::Uuid;

use crate::{
    extensions::*,
    payments::{errors::into_status_error, index::PaymentResponse},
    state::State,
};

/// Reject Payment Handler
///
/// Marks a pending payment rejected and cancels its order.
#[endpoint(
    tags("payments"),
    summary = "Reject Payment",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Payment rejected"),
        (status_code = StatusCode::FORBIDDEN, description = "Admin role required"),
        (status_code = StatusCode::NOT_FOUND, description = "Payment not found"),
        (status_code = StatusCode::CONFLICT, description = "Payment already processed"),
    ),
)]
#[tracing::instrument(
    name = "payments.reject",
    skip(payment, depot),
    fields(
        admin_uuid = tracing::field::Empty,
        payment_uuid = tracing::field::Empty
    ),
    err
)]
pub(crate) async fn handler(
    payment: PathParam<Uuid>,
    depot: &mut Depot,
) -> Result<Json<PaymentResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let admin = depot.user_uuid_or_401()?;
    let payment = payment.into_inner();

    let span = tracing::Span::current();

    span.record("admin_uuid", tracing::field::display(admin));
    span.record("payment_uuid", tracing::field::display(payment));

    let record = state
        .app
        .payments
        .reject_payment(admin, payment.into())
        .await
        .map_err(into_status_error)?;

    Ok(Json(record.into()))
}
