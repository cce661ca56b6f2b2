//! List Orders Handler

use std::sync::Arc;

use salvo::{oapi::ToSchema, prelude::*};
use serde::{Deserialize, Serialize};

use crate::{
    extensions::*,
    orders::{errors::into_status_error, get::OrderResponse},
    state::State,
};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct OrdersResponse {
    pub orders: Vec<OrderResponse>,
}

/// List Orders Handler
///
/// Returns the caller's orders, newest first.
#[endpoint(
    tags("orders"),
    summary = "List Orders",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Orders listed"),
    ),
)]
pub(crate) async fn handler(depot: &mut Depot) -> Result<Json<OrdersResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let user = depot.user_uuid_or_401()?;

    let orders = state
        .app
        .orders
        .list_orders(user)
        .await
        .map_err(into_status_error)?;

    Ok(Json(OrdersResponse {
        orders: orders.into_iter().map(Into::into).collect(),
    }))
}

#[cfg(test)]
mod tests {
    use salvo::test::{ResponseExt, TestClient};
    use soko::orders::OrderStatus;
    use soko_app::domain::orders::records::OrderUuid;
    use testresult::TestResult;

    use crate::test_helpers::{TEST_USER_UUID, TestServices, make_order};

    use super::*;

    #[tokio::test]
    async fn test_index_lists_callers_orders() -> TestResult {
        let mut services = TestServices::default();

        services
            .orders
            .expect_list_orders()
            .once()
            .withf(|user| *user == TEST_USER_UUID)
            .return_once(|_| {
                Ok(vec![
                    make_order(OrderUuid::new(), OrderStatus::Processing),
                    make_order(OrderUuid::new(), OrderStatus::Pending),
                ])
            });

        let mut res = TestClient::get("http://example.com/orders")
            .send(&services.service(Router::with_path("orders").get(handler)))
            .await;

        let body: OrdersResponse = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::OK));
        assert_eq!(body.orders.len(), 2);
        assert_eq!(
            body.orders.first().map(|order| order.status.as_str()),
            Some("processing")
        );

        Ok(())
    }
}
