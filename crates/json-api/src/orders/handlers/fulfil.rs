//! Advance Fulfilment Handler

use std::sync::Arc;

use salvo::{
    oapi::{
        ToSchema,
        extract::{JsonBody, PathParam},
    },
    prelude::*,
};
use serde::{Deserialize, Serialize};
use soko::orders::OrderStatus;
use uuid::Uuid;

use crate::{
    extensions::*,
    orders::{errors::into_status_error, get::OrderResponse},
    state::State,
};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct FulfilmentRequest {
    /// `shipped` or `delivered`
    pub status: String,
}

/// Advance Fulfilment Handler
///
/// Moves an order one step along processing, shipped, delivered.
#[endpoint(
    tags("orders"),
    summary = "Advance Fulfilment",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Order advanced"),
        (status_code = StatusCode::BAD_REQUEST, description = "Unknown status"),
        (status_code = StatusCode::FORBIDDEN, description = "Admin role required"),
        (status_code = StatusCode::NOT_FOUND, description = "Order not found"),
        (status_code = StatusCode::CONFLICT, description = "Transition not allowed"),
    ),
)]
#[tracing::instrument(
    name = "orders.fulfil",
    skip(order, json, depot),
    fields(
        order_uuid = tracing::field::Empty,
        to = tracing::field::Empty
    ),
    err
)]
pub(crate) async fn handler(
    order: PathParam<Uuid>,
    json: JsonBody<FulfilmentRequest>,
    depot: &mut Depot,
) -> Result<Json<OrderResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let admin = depot.user_uuid_or_401()?;
    let order = order.into_inner();
    let to = json
        .into_inner()
        .status
        .parse::<OrderStatus>()
        .or_400("invalid order status")?;

    let span = tracing::Span::current();

    span.record("order_uuid", tracing::field::display(order));
    span.record("to", tracing::field::display(to));

    let record = state
        .app
        .orders
        .advance_fulfilment(admin, order.into(), to)
        .await
        .map_err(into_status_error)?;

    Ok(Json(record.into()))
}

#[cfg(test)]
mod tests {
    use salvo::test::{ResponseExt, TestClient};
    use serde_json::json;
    use soko_app::domain::orders::{OrdersServiceError, records::OrderUuid};
    use testresult::TestResult;

    use crate::test_helpers::{TEST_USER_UUID, TestServices, make_order};

    use super::*;

    fn make_service(services: TestServices) -> Service {
        services.service(Router::with_path("admin/orders/{order}/fulfilment").post(handler))
    }

    #[tokio::test]
    async fn test_ship_processing_order() -> TestResult {
        let uuid = OrderUuid::new();

        let mut services = TestServices::default();

        services
            .orders
            .expect_advance_fulfilment()
            .once()
            .withf(move |admin, order, to| {
                *admin == TEST_USER_UUID && *order == uuid && *to == OrderStatus::Shipped
            })
            .return_once(move |_, _, _| Ok(make_order(uuid, OrderStatus::Shipped)));

        let mut res = TestClient::post(format!("http://example.com/admin/orders/{uuid}/fulfilment"))
            .json(&json!({ "status": "shipped" }))
            .send(&make_service(services))
            .await;

        let body: OrderResponse = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::OK));
        assert_eq!(body.status, "shipped");

        Ok(())
    }

    #[tokio::test]
    async fn test_unknown_status_returns_400() -> TestResult {
        let res = TestClient::post(format!(
            "http://example.com/admin/orders/{}/fulfilment",
            Uuid::now_v7()
        ))
        .json(&json!({ "status": "teleported" }))
        .send(&make_service(TestServices::default()))
        .await;

        assert_eq!(res.status_code, Some(StatusCode::BAD_REQUEST));

        Ok(())
    }

    #[tokio::test]
    async fn test_non_admin_returns_403() -> TestResult {
        let mut services = TestServices::default();

        services
            .orders
            .expect_advance_fulfilment()
            .once()
            .return_once(|_, _, _| Err(OrdersServiceError::Permission));

        let res = TestClient::post(format!(
            "http://example.com/admin/orders/{}/fulfilment",
            Uuid::now_v7()
        ))
        .json(&json!({ "status": "delivered" }))
        .send(&make_service(services))
        .await;

        assert_eq!(res.status_code, Some(StatusCode::FORBIDDEN));

        Ok(())
    }

    #[tokio::test]
    async fn test_skipping_a_step_returns_409() -> TestResult {
        let mut services = TestServices::default();

        services
            .orders
            .expect_advance_fulfilment()
            .once()
            .return_once(|_, _, _| {
                Err(OrdersServiceError::InvalidTransition {
                    from: OrderStatus::Processing,
                    to: OrderStatus::Delivered,
                })
            });

        let res = TestClient::post(format!(
            "http://example.com/admin/orders/{}/fulfilment",
            Uuid::now_v7()
        ))
        .json(&json!({ "status": "delivered" }))
        .send(&make_service(services))
        .await;

        assert_eq!(res.status_code, Some(StatusCode::CONFLICT));

        Ok(())
    }
}
