//! Create Flash Sale Handler

use std::sync::Arc;

use jiff::Timestamp;
use salvo::{
    http::header::LOCATION,
    oapi::{ToSchema, extract::JsonBody},
    prelude::*,
};
use serde::{Deserialize, Serialize};
use soko_app::domain::flash_sales::data::NewFlashSale;
use uuid::Uuid;

use crate::{
    extensions::*,
    flash_sales::{errors::into_status_error, get::FlashSaleResponse},
    state::State,
};

/// Create Flash Sale Request
///
/// The original price is the product's catalog price at creation.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct CreateFlashSaleRequest {
    pub uuid: Uuid,
    pub product_uuid: Uuid,
    pub sale_price: u64,
    pub starts_at: String,
    pub ends_at: String,
    #[serde(default)]
    pub quantity_limit: Option<u32>,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

impl CreateFlashSaleRequest {
    fn into_new_flash_sale(self) -> Result<NewFlashSale, StatusError> {
        Ok(NewFlashSale {
            uuid: self.uuid.into(),
            product: self.product_uuid.into(),
            sale_price: self.sale_price,
            starts_at: parse_timestamp("starts_at", &self.starts_at)?,
            ends_at: parse_timestamp("ends_at", &self.ends_at)?,
            quantity_limit: self.quantity_limit,
            active: self.active,
        })
    }
}

/// Create Flash Sale Handler
#[endpoint(
    tags("flash-sales"),
    summary = "Create Flash Sale",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::CREATED, description = "Flash sale created"),
        (status_code = StatusCode::BAD_REQUEST, description = "Bad Request"),
        (status_code = StatusCode::CONFLICT, description = "Flash sale already exists"),
        (status_code = StatusCode::FORBIDDEN, description = "Admin role required"),
    ),
)]
pub(crate) async fn handler(
    json: JsonBody<CreateFlashSaleRequest>,
    depot: &mut Depot,
    res: &mut Response,
) -> Result<Json<FlashSaleResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let sale = json.into_inner().into_new_flash_sale()?;

    let record = state
        .app
        .flash_sales
        .create_flash_sale(sale)
        .await
        .map_err(into_status_error)?;

    res.add_header(LOCATION, format!("/flash-sales/{}", record.uuid), true)
        .or_500("failed to set location header")?
        .status_code(StatusCode::CREATED);

    Ok(Json(FlashSaleResponse::at(record, Timestamp::now())))
}
