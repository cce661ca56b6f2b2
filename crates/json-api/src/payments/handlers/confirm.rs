//! Confirm Payment Handler

use std::sync::Arc;

use salvo::{oapi::extract::PathParam, prelude::*};
use uuid::Uuid;

use crate::{
    extensions::*,
    payments::{errors::into_status_error, index::PaymentResponse},
    state::State,
};

/// Confirm Payment Handler
///
/// Marks a pending payment confirmed and moves its order to processing.
/// Flash sale stock held by the order is claimed at this point; if it is
/// gone, nothing changes and the request fails with 409.
#[endpoint(
    tags("payments"),
    summary = "Confirm Payment",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Payment confirmed"),
        (status_code = StatusCode::FORBIDDEN, description = "Admin role required"),
        (status_code = StatusCode::NOT_FOUND, description = "Payment not found"),
        (status_code = StatusCode::CONFLICT, description = "Payment already processed"),
    ),
)]
#[tracing::instrument(
    name = "payments.confirm",
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
        .confirm_payment(admin, payment.into())
        .await
        .map_err(into_status_error)?;

    Ok(Json(record.into()))
}

#[cfg(test)]
mod tests {
    use salvo::test::{ResponseExt, TestClient};
    use soko::payments::PaymentStatus;
    use soko_app::domain::{
        flash_sales::records::FlashSaleUuid,
        orders::records::OrderUuid,
        payments::{PaymentsServiceError, records::PaymentUuid},
    };
    use testresult::TestResult;

    use crate::test_helpers::{TEST_USER_UUID, TestServices, make_payment};

    use super::*;

    fn make_service(services: TestServices) -> Service {
        services.service(Router::with_path("admin/payments/{payment}/confirm").post(handler))
    }

    #[tokio::test]
    async fn test_confirm_records_deciding_admin() -> TestResult {
        let uuid = PaymentUuid::new();

        let mut services = TestServices::default();

        services
            .payments
            .expect_confirm_payment()
            .once()
            .withf(move |admin, payment| *admin == TEST_USER_UUID && *payment == uuid)
            .return_once(move |admin, _| {
                let mut payment = make_payment(uuid, OrderUuid::new(), PaymentStatus::Confirmed);
                payment.confirmed_by = Some(admin);

                Ok(payment)
            });

        let mut res = TestClient::post(format!("http://example.com/admin/payments/{uuid}/confirm"))
            .send(&make_service(services))
            .await;

        let body: PaymentResponse = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::OK));
        assert_eq!(body.status, "confirmed");
        assert_eq!(body.confirmed_by, Some(TEST_USER_UUID.into_uuid()));

        Ok(())
    }

    #[tokio::test]
    async fn test_second_confirmation_returns_409() -> TestResult {
        let mut services = TestServices::default();

        services
            .payments
            .expect_confirm_payment()
            .once()
            .return_once(|_, _| Err(PaymentsServiceError::AlreadyProcessed(PaymentStatus::Confirmed)));

        let res = TestClient::post(format!(
            "http://example.com/admin/payments/{}/confirm",
            Uuid::now_v7()
        ))
        .send(&make_service(services))
        .await;

        assert_eq!(res.status_code, Some(StatusCode::CONFLICT));

        Ok(())
    }

    #[tokio::test]
    async fn test_sold_out_flash_sale_returns_409() -> TestResult {
        let mut services = TestServices::default();

        services
            .payments
            .expect_confirm_payment()
            .once()
            .return_once(|_, _| Err(PaymentsServiceError::FlashSaleSoldOut(FlashSaleUuid::new())));

        let res = TestClient::post(format!(
            "http://example.com/admin/payments/{}/confirm",
            Uuid::now_v7()
        ))
        .send(&make_service(services))
        .await;

        assert_eq!(res.status_code, Some(StatusCode::CONFLICT));

        Ok(())
    }

    #[tokio::test]
    async fn test_non_admin_returns_403() -> TestResult {
        let mut services = TestServices::default();

        services
            .payments
            .expect_confirm_payment()
            .once()
            .return_once(|_, _| Err(PaymentsServiceError::Permission));

        let res = TestClient::post(format!(
            "http://example.com/admin/payments/{}/confirm",
            Uuid::now_v7()
        ))
        .send(&make_service(services))
        .await;

        assert_eq!(res.status_code, Some(StatusCode::FORBIDDEN));

        Ok(())
    }
}
