//! Payment Summary Handler

use std::sync::Arc;

use salvo::{oapi::ToSchema, prelude::*};
use serde::{Deserialize, Serialize};
use soko_app::domain::payments::records::PaymentSummary;

use crate::{extensions::*, payments::errors::into_status_error, state::State};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct PaymentSummaryResponse {
    pub pending: u64,
    pub confirmed: u64,
    pub rejected: u64,
    pub total: u64,
}

impl From<PaymentSummary> for PaymentSummaryResponse {
    fn from(summary: PaymentSummary) -> Self {
        PaymentSummaryResponse {
            pending: summary.pending,
            confirmed: summary.confirmed,
            rejected: summary.rejected,
            total: summary.total(),
        }
    }
}

/// Payment Summary Handler
///
/// Counts payment records per status.
#[endpoint(
    tags("payments"),
    summary = "Payment Summary",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Summary returned"),
        (status_code = StatusCode::FORBIDDEN, description = "Admin role required"),
    ),
)]
pub(crate) async fn handler(depot: &mut Depot) -> Result<Json<PaymentSummaryResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let admin = depot.user_uuid_or_401()?;

    let summary = state
        .app
        .payments
        .payment_summary(admin)
        .await
        .map_err(into_status_error)?;

    Ok(Json(summary.into()))
}

#[cfg(test)]
mod tests {
    use salvo::test::{ResponseExt, TestClient};
    use soko_app::domain::payments::PaymentsServiceError;
    use testresult::TestResult;

    use crate::test_helpers::TestServices;

    use super::*;

    fn make_service(services: TestServices) -> Service {
        services.service(Router::with_path("admin/payments/summary").get(handler))
    }

    #[tokio::test]
    async fn test_summary_includes_total() -> TestResult {
        let mut services = TestServices::default();

        services
            .payments
            .expect_payment_summary()
            .once()
            .return_once(|_| {
                Ok(PaymentSummary {
                    pending: 3,
                    confirmed: 10,
                    rejected: 2,
                })
            });

        let mut res = TestClient::get("http://example.com/admin/payments/summary")
            .send(&make_service(services))
            .await;

        let body: PaymentSummaryResponse = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::OK));
        assert_eq!(body.pending, 3);
        assert_eq!(body.total, 15);

        Ok(())
    }

    #[tokio::test]
    async fn test_non_admin_returns_403() -> TestResult {
        let mut services = TestServices::default();

        services
            .payments
            .expect_payment_summary()
            .once()
            .return_once(|_| Err(PaymentsServiceError::Permission));

        let res = TestClient::get("http://example.com/admin/payments/summary")
            .send(&make_service(services))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::FORBIDDEN));

        Ok(())
    }
}
