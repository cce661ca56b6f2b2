//! Create Voucher Handler

use std::sync::Arc;

use rust_decimal::Decimal;
use salvo::{
    oapi::{ToSchema, extract::JsonBody},
    prelude::*,
};
use serde::{Deserialize, Serialize};
use soko::vouchers::{VoucherCode, VoucherDiscount};
use soko_app::domain::vouchers::data::NewVoucher;
use uuid::Uuid;

use crate::{
    extensions::*,
    state::State,
    vouchers::{errors::into_status_error, index::VoucherResponse},
};

/// Create Voucher Request
///
/// Exactly one of `percentage` and `fixed_amount` must be given.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct CreateVoucherRequest {
    pub uuid: Uuid,
    pub code: String,
    /// Percent off the subtotal as a decimal string, e.g. `"12.5"`
    #[serde(default)]
    pub percentage: Option<String>,
    /// Minor units off the subtotal
    #[serde(default)]
    pub fixed_amount: Option<u64>,
    #[serde(default)]
    pub minimum_purchase_amount: Option<u64>,
    #[serde(default)]
    pub max_uses: Option<u32>,
    #[serde(default = "default_active")]
    pub active: bool,
    #[serde(default)]
    pub starts_at: Option<String>,
    #[serde(default)]
    pub ends_at: Option<String>,
}

fn default_active() -> bool {
    true
}

impl CreateVoucherRequest {
    fn into_new_voucher(self) -> Result<NewVoucher, StatusError> {
        let discount = match (self.percentage, self.fixed_amount) {
            (Some(percentage), None) => VoucherDiscount::Percentage(
                percentage
                    .trim()
                    .parse::<Decimal>()
                    .or_400("percentage must be a decimal number")?,
            ),
            (None, Some(amount)) => VoucherDiscount::FixedAmount(amount),
            _ => {
                return Err(StatusError::bad_request()
                    .brief("Give exactly one of percentage and fixed_amount"));
            }
        };

        Ok(NewVoucher {
            uuid: self.uuid.into(),
            code: VoucherCode::new(&self.code).or_400("invalid voucher code")?,
            discount,
            minimum_purchase_amount: self.minimum_purchase_amount,
            max_uses: self.max_uses,
            active: self.active,
            starts_at: parse_optional_timestamp("starts_at", self.starts_at.as_deref())?,
            ends_at: parse_optional_timestamp("ends_at", self.ends_at.as_deref())?,
        })
    }
}

/// Create Voucher Handler
#[endpoint(
    tags("vouchers"),
    summary = "Create Voucher",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::CREATED, description = "Voucher created"),
        (status_code = StatusCode::CONFLICT, description = "Voucher code already exists"),
        (status_code = StatusCode::BAD_REQUEST, description = "Bad Request"),
        (status_code = StatusCode::FORBIDDEN, description = "Admin role required"),
    ),
)]
pub(crate) async fn handler(
    json: JsonBody<CreateVoucherRequest>,
    depot: &mut Depot,
    res: &mut Response,
) -> Result<Json<VoucherResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let voucher = json.into_inner().into_new_voucher()?;

    let record = state
        .app
        .vouchers
        .create_voucher(voucher)
        .await
        .map_err(into_status_error)?;

    res.status_code(StatusCode::CREATED);

    Ok(Json(record.into()))
}

#[cfg(test)]
mod tests {
    use salvo::test::{ResponseExt, TestClient};
    use serde_json::json;
    use soko::vouchers::VoucherError;
    use soko_app::domain::vouchers::{VouchersServiceError, records::VoucherUuid};
    use testresult::TestResult;

    use crate::{test_helpers::TestServices, vouchers::index::tests::make_voucher};

    use super::*;

    fn make_service(services: TestServices) -> Service {
        services.service(Router::with_path("admin/vouchers").post(handler))
    }

    #[tokio::test]
    async fn test_create_percentage_voucher() -> TestResult {
        let uuid = VoucherUuid::new();
        let code = VoucherCode::new("SAVE10")?;

        let mut services = TestServices::default();

        services
            .vouchers
            .expect_create_voucher()
            .once()
            .withf(move |new| {
                new.uuid == uuid
                    && new.code.as_str() == "SAVE10"
                    && new.discount == VoucherDiscount::Percentage(Decimal::TEN)
                    && new.minimum_purchase_amount == Some(5_000)
            })
            .return_once(move |new| Ok(make_voucher(uuid, code, new.discount)));

        let mut res = TestClient::post("http://example.com/admin/vouchers")
            .json(&json!({
                "uuid": uuid.into_uuid(),
                "code": " save10 ",
                "percentage": "10",
                "minimum_purchase_amount": 5_000,
            }))
            .send(&make_service(services))
            .await;

        let created: VoucherResponse = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::CREATED));
        assert_eq!(created.code, "SAVE10");
        assert_eq!(created.discount_type, "percentage");

        Ok(())
    }

    #[tokio::test]
    async fn test_both_discount_kinds_return_400() -> TestResult {
        let res = TestClient::post("http://example.com/admin/vouchers")
            .json(&json!({
                "uuid": Uuid::now_v7(),
                "code": "SAVE10",
                "percentage": "10",
                "fixed_amount": 500,
            }))
            .send(&make_service(TestServices::default()))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::BAD_REQUEST));

        Ok(())
    }

    #[tokio::test]
    async fn test_out_of_range_percentage_returns_400() -> TestResult {
        let mut services = TestServices::default();

        services
            .vouchers
            .expect_create_voucher()
            .once()
            .return_once(|_| Err(VouchersServiceError::Validation(VoucherError::InvalidPercentage)));

        let res = TestClient::post("http://example.com/admin/vouchers")
            .json(&json!({
                "uuid": Uuid::now_v7(),
                "code": "TOOMUCH",
                "percentage": "150",
            }))
            .send(&make_service(services))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::BAD_REQUEST));

        Ok(())
    }

    #[tokio::test]
    async fn test_duplicate_code_returns_409() -> TestResult {
        let mut services = TestServices::default();

        services
            .vouchers
            .expect_create_voucher()
            .once()
            .return_once(|_| Err(VouchersServiceError::AlreadyExists));

        let res = TestClient::post("http://example.com/admin/vouchers")
            .json(&json!({
                "uuid": Uuid::now_v7(),
                "code": "SAVE10",
                "fixed_amount": 500,
            }))
            .send(&make_service(services))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::CONFLICT));

        Ok(())
    }
}
