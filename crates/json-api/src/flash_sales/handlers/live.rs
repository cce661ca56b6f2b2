//! Live Flash Sales Handler

use std::sync::Arc;

use salvo::{
    oapi::{ToSchema, extract::QueryParam},
    prelude::*,
};
use serde::{Deserialize, Serialize};

use crate::{
    extensions::*,
    flash_sales::{errors::into_status_error, get::FlashSaleResponse},
    state::State,
};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct FlashSalesResponse {
    pub flash_sales: Vec<FlashSaleResponse>,
}

/// Live Flash Sales Handler
///
/// Sales that are active and inside their window, ending soonest first.
/// Pass `at` to look at another point in time.
#[endpoint(
    tags("flash-sales"),
    summary = "List Live Flash Sales",
    security(("bearer_auth" = []))
)]
pub(crate) async fn handler(
    at: QueryParam<String, false>,
    depot: &mut Depot,
) -> Result<Json<FlashSalesResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let point_in_time = at.at_or_now()?;

    let sales = state
        .app
        .flash_sales
        .list_live_flash_sales(point_in_time)
        .await
        .map_err(into_status_error)?;

    Ok(Json(FlashSalesResponse {
        flash_sales: sales
            .into_iter()
            .map(|sale| FlashSaleResponse::at(sale, point_in_time))
            .collect(),
    }))
}

#[cfg(test)]
mod tests {
    use jiff::Timestamp;
    use salvo::test::{ResponseExt, TestClient};
    use soko_app::domain::flash_sales::records::FlashSaleUuid;
    use testresult::TestResult;

    use crate::{flash_sales::get::tests::make_flash_sale, test_helpers::TestServices};

    use super::*;

    #[tokio::test]
    async fn test_live_sales_use_requested_point_in_time() -> TestResult {
        let uuid = FlashSaleUuid::new();
        let record = make_flash_sale(uuid)?;
        let at: Timestamp = "2026-10-19T13:00:00Z".parse()?;

        let mut services = TestServices::default();

        services
            .flash_sales
            .expect_list_live_flash_sales()
            .once()
            .withf(move |now| *now == at)
            .return_once(move |_| Ok(vec![record]));

        let response: FlashSalesResponse =
            TestClient::get("http://example.com/flash-sales?at=2026-10-19T13:00:00Z")
                .send(&services.service(Router::with_path("flash-sales").get(handler)))
                .await
                .take_json()
                .await?;

        let sale = response.flash_sales.first().ok_or("expected one sale")?;

        assert_eq!(sale.uuid, uuid.into_uuid());
        assert_eq!(sale.discount_percentage, 20);
        assert_eq!(sale.time_remaining.as_deref(), Some("23h 0m"));

        Ok(())
    }
}
