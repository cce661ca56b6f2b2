//! Get Flash Sale Handler

use std::{string::ToString, sync::Arc};

use jiff::Timestamp;
use salvo::{
    oapi::{
        ToSchema,
        extract::{PathParam, QueryParam},
    },
    prelude::*,
};
use serde::{Deserialize, Serialize};
use soko_app::domain::flash_sales::records::FlashSaleRecord;
use uuid::Uuid;

use crate::{extensions::*, flash_sales::errors::into_status_error, state::State};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct FlashSaleResponse {
    pub uuid: Uuid,

    pub product_uuid: Uuid,

    /// Catalog price when the sale was created, in minor units
    pub original_price: u64,

    pub sale_price: u64,

    /// Whole percent saved
    pub discount_percentage: u8,

    pub starts_at: String,

    pub ends_at: String,

    pub quantity_limit: Option<u32>,

    pub sold_quantity: u32,

    /// Units left, absent when the sale is uncapped
    pub available: Option<u32>,

    pub active: bool,

    /// Whether the sale is live at the requested point in time
    pub live: bool,

    /// Countdown to the end of the sale, e.g. `2d 3h 15m`
    pub time_remaining: Option<String>,
}

impl FlashSaleResponse {
    pub(crate) fn at(record: FlashSaleRecord, now: Timestamp) -> Self {
        let sale = &record.sale;

        FlashSaleResponse {
            uuid: record.uuid.into(),
            product_uuid: sale.product,
            original_price: sale.original_price,
            sale_price: sale.sale_price,
            discount_percentage: record.discount_percentage,
            starts_at: sale.starts_at.to_string(),
            ends_at: sale.ends_at.to_string(),
            quantity_limit: sale.quantity_limit,
            sold_quantity: sale.sold_quantity,
            available: sale.available(),
            active: sale.active,
            live: sale.is_live(now),
            time_remaining: sale.time_remaining(now).as_ref().map(ToString::to_string),
        }
    }
}

/// Get Flash Sale Handler
#[endpoint(
    tags("flash-sales"),
    summary = "Get Flash Sale",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Flash sale found"),
        (status_code = StatusCode::NOT_FOUND, description = "Flash sale not found"),
    ),
)]
pub(crate) async fn handler(
    sale: PathParam<Uuid>,
    at: QueryParam<String, false>,
    depot: &mut Depot,
) -> Result<Json<FlashSaleResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let point_in_time = at.at_or_now()?;

    let record = state
        .app
        .flash_sales
        .get_flash_sale(sale.into_inner().into())
        .await
        .map_err(into_status_error)?;

    Ok(Json(FlashSaleResponse::at(record, point_in_time)))
}
