//! List Payments Handler

use std::sync::Arc;

use salvo::{
    oapi::{ToSchema, extract::QueryParam},
    prelude::*,
};
use serde::{Deserialize, Serialize};
use soko::payments::{PaymentChannelKind, PaymentStatus};
use soko_app::domain::payments::{data::PaymentFilter, records::PaymentRecord};
use uuid::Uuid;

use crate::{extensions::*, payments::errors::into_status_error, state::State};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct PaymentResponse {
    /// The unique identifier of the payment record
    pub uuid: Uuid,

    pub order_uuid: Uuid,

    /// The confirmation message as pasted by the customer
    pub message: String,

    /// Transaction code found in the message, if any
    pub transaction_code: Option<String>,

    pub phone: Option<String>,

    /// `mpesa` or `ncba_loop`
    pub channel: String,

    pub paybill_number: Option<String>,
    pub account_number: Option<String>,

    /// Amount claimed in minor units
    pub amount: u64,

    /// `pending`, `confirmed` or `rejected`
    pub status: String,

    /// Admin who decided the payment
    pub confirmed_by: Option<Uuid>,

    pub confirmed_at: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<PaymentRecord> for PaymentResponse {
    fn from(payment: PaymentRecord) -> Self {
        PaymentResponse {
            uuid: payment.uuid.into(),
            order_uuid: payment.order_uuid.into(),
            message: payment.message,
            transaction_code: payment.transaction_code,
            phone: payment.phone,
            channel: payment.channel.kind().to_string(),
            paybill_number: payment.channel.paybill_number().map(ToString::to_string),
            account_number: payment.channel.account_number().map(ToString::to_string),
            amount: payment.amount,
            status: payment.status.to_string(),
            confirmed_by: payment.confirmed_by.map(Into::into),
            confirmed_at: payment.confirmed_at.map(|at| at.to_string()),
            created_at: payment.created_at.to_string(),
            updated_at: payment.updated_at.to_string(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct PaymentsResponse {
    pub payments: Vec<PaymentResponse>,
}

impl From<Vec<PaymentRecord>> for PaymentsResponse {
    fn from(payments: Vec<PaymentRecord>) -> Self {
        PaymentsResponse {
            payments: payments.into_iter().map(Into::into).collect(),
        }
    }
}

/// List Payments Handler
///
/// Returns payment records across all orders, newest first. Pass `status`
/// to see only `pending`, `confirmed` or `rejected` records, `channel` to see
/// one of `mpesa` or `ncba_loop`, and `search` to match the customer's name or
/// email, the pasted message or the payer's phone.
#[endpoint(
    tags("payments"),
    summary = "List Payments",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Payments listed"),
        (status_code = StatusCode::BAD_REQUEST, description = "Unknown status or channel"),
        (status_code = StatusCode::FORBIDDEN, description = "Admin role required"),
    ),
)]
pub(crate) async fn handler(
    status: QueryParam<String, false>,
    channel: QueryParam<String, false>,
    search: QueryParam<String, false>,
    depot: &mut Depot,
) -> Result<Json<PaymentsResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let admin = depot.user_uuid_or_401()?;

    let filter = PaymentFilter {
        status: status
            .into_inner()
            .map(|status| status.parse::<PaymentStatus>())
            .transpose()
            .or_400("invalid payment status")?,
        channel: channel
            .into_inner()
            .map(|channel| channel.parse::<PaymentChannelKind>())
            .transpose()
            .or_400("invalid payment channel")?,
        search: search.into_inner(),
    };

    let payments = state
        .app
        .payments
        .list_payments(admin, filter)
        .await
        .map_err(into_status_error)?;

    Ok(Json(payments.into()))
}

#[cfg(test)]
mod tests {
    use salvo::test::{ResponseExt, TestClient};
    use soko_app::domain::{
        orders::records::OrderUuid,
        payments::{PaymentsServiceError, records::PaymentUuid},
    };
    use testresult::TestResult;

    use crate::test_helpers::{TEST_USER_UUID, TestServices, make_payment};

    use super::*;

    fn make_service(services: TestServices) -> Service {
        services.service(Router::with_path("admin/payments").get(handler))
    }

    #[tokio::test]
    async fn test_index_filters_by_status() -> TestResult {
        let mut services = TestServices::default();

        services
            .payments
            .expect_list_payments()
            .once()
            .withf(|admin, filter| {
                *admin == TEST_USER_UUID && filter.status == Some(PaymentStatus::Pending)
            })
            .return_once(|_, _| {
                Ok(vec![make_payment(
                    PaymentUuid::new(),
                    OrderUuid::new(),
                    PaymentStatus::Pending,
                )])
            });

        let mut res = TestClient::get("http://example.com/admin/payments?status=pending")
            .send(&make_service(services))
            .await;

        let body: PaymentsResponse = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::OK));
        assert_eq!(body.payments.len(), 1);
        assert_eq!(
            body.payments
                .first()
                .and_then(|payment| payment.transaction_code.as_deref()),
            Some("QGH7XK2M9P")
        );
        assert_eq!(
            body.payments.first().map(|payment| payment.channel.as_str()),
            Some("mpesa")
        );

        Ok(())
    }

    #[tokio::test]
    async fn test_index_without_status_lists_everything() -> TestResult {
        let mut services = TestServices::default();

        services
            .payments
            .expect_list_payments()
            .once()
            .withf(|_, filter| *filter == PaymentFilter::default())
            .return_once(|_, _| Ok(Vec::new()));

        let res = TestClient::get("http://example.com/admin/payments")
            .send(&make_service(services))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::OK));

        Ok(())
    }

    #[tokio::test]
    async fn test_index_filters_by_channel_and_search() -> TestResult {
        let mut services = TestServices::default();

        services
            .payments
            .expect_list_payments()
            .once()
            .withf(|_, filter| {
                filter.status.is_none()
                    && filter.channel == Some(PaymentChannelKind::NcbaLoop)
                    && filter.search.as_deref() == Some("wanjiku")
            })
            .return_once(|_, _| Ok(Vec::new()));

        let res = TestClient::get("http://example.com/admin/payments?channel=ncba_loop&search=wanjiku")
            .send(&make_service(services))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::OK));

        Ok(())
    }

    #[tokio::test]
    async fn test_unknown_channel_returns_400() -> TestResult {
        let res = TestClient::get("http://example.com/admin/payments?channel=airtel")
            .send(&make_service(TestServices::default()))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::BAD_REQUEST));

        Ok(())
    }

    #[tokio::test]
    async fn test_unknown_status_returns_400() -> TestResult {
        let res = TestClient::get("http://example.com/admin/payments?status=refunded")
            .send(&make_service(TestServices::default()))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::BAD_REQUEST));

        Ok(())
    }

    #[tokio::test]
    async fn test_non_admin_returns_403() -> TestResult {
        let mut services = TestServices::default();

        services
            .payments
            .expect_list_payments()
            .once()
            .return_once(|_, _| Err(PaymentsServiceError::Permission));

        let res = TestClient::get("http://example.com/admin/payments")
            .send(&make_service(services))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::FORBIDDEN));

        Ok(())
    }
}
