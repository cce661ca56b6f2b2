//! Voucher Activation Handler

use std::sync::Arc;

use salvo::{
    oapi::{
        ToSchema,
        extract::{JsonBody, PathParam},
    },
    prelude::*,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    extensions::*,
    state::State,
    vouchers::{errors::into_status_error, index::VoucherResponse},
};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct SetVoucherActiveRequest {
    pub active: bool,
}

/// Switch a voucher on or off.
#[endpoint(
    tags("vouchers"),
    summary = "Activate or Deactivate Voucher",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Voucher updated"),
        (status_code = StatusCode::NOT_FOUND, description = "Voucher not found"),
        (status_code = StatusCode::FORBIDDEN, description = "Admin role required"),
    ),
)]
pub(crate) async fn handler(
    voucher: PathParam<Uuid>,
    json: JsonBody<SetVoucherActiveRequest>,
    depot: &mut Depot,
) -> Result<Json<VoucherResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;

    let record = state
        .app
        .vouchers
        .set_voucher_active(voucher.into_inner().into(), json.into_inner().active)
        .await
        .map_err(into_status_error)?;

    Ok(Json(record.into()))
}
