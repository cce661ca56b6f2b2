//! Flash Sale Availability Handler

use std::{string::ToString, sync::Arc};

use salvo::{
    oapi::{
        ToSchema,
        extract::{PathParam, QueryParam},
    },
    prelude::*,
};
use serde::{Deserialize, Serialize};
use soko_app::domain::flash_sales::records::FlashSaleAvailability;
use uuid::Uuid;

use crate::{extensions::*, flash_sales::errors::into_status_error, state::State};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct AvailabilityResponse {
    pub uuid: Uuid,
    pub live: bool,
    /// Units left, absent when the sale is uncapped
    pub available: Option<u32>,
    pub sold_quantity: u32,
    pub time_remaining: Option<String>,
}

impl From<FlashSaleAvailability> for AvailabilityResponse {
    fn from(availability: FlashSaleAvailability) -> Self {
        AvailabilityResponse {
            uuid: availability.uuid.into(),
            live: availability.live,
            available: availability.available,
            sold_quantity: availability.sold_quantity,
            time_remaining: availability.time_remaining.as_ref().map(ToString::to_string),
        }
    }
}

/// Flash Sale Availability Handler
///
/// Advisory check that `quantity` units (default 1) could be added to a
/// cart. Stock is only claimed when an order is paid for.
#[endpoint(
    tags("flash-sales"),
    summary = "Check Flash Sale Availability",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Units can be added"),
        (status_code = StatusCode::BAD_REQUEST, description = "Sale not live or quantity invalid"),
        (status_code = StatusCode::CONFLICT, description = "Not enough units left"),
        (status_code = StatusCode::NOT_FOUND, description = "Flash sale not found"),
    ),
)]
pub(crate) async fn handler(
    sale: PathParam<Uuid>,
    quantity: QueryParam<u32, false>,
    at: QueryParam<String, false>,
    depot: &mut Depot,
) -> Result<Json<AvailabilityResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let point_in_time = at.at_or_now()?;

    let availability = state
        .app
        .flash_sales
        .check_availability(
            sale.into_inner().into(),
            quantity.into_inner().unwrap_or(1),
            point_in_time,
        )
        .await
        .map_err(into_status_error)?;

    Ok(Json(availability.into()))
}
