//! Vouchers Repository

use jiff_sqlx::Timestamp as SqlxTimestamp;
use rust_decimal::{Decimal, prelude::ToPrimitive};
use soko::vouchers::{Voucher, VoucherCode, VoucherDiscount};
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query, query_as};

use crate::{
    auth::UserUuid,
    database::{
        encode_amount, encode_count, try_get_amount, try_get_count, try_get_optional_amount,
        try_get_optional_count,
    },
    domain::{
        orders::records::OrderUuid,
        vouchers::{
            data::NewVoucher,
            records::{VoucherRecord, VoucherUsageRecord, VoucherUsageUuid, VoucherUuid},
        },
    },
};

const CREATE_VOUCHER_SQL: &str = include_str!("sql/create_voucher.sql");
const GET_VOUCHER_SQL: &str = include_str!("sql/get_voucher.sql");
const FIND_VOUCHER_BY_CODE_SQL: &str = include_str!("sql/find_voucher_by_code.sql");
const LIST_VOUCHERS_SQL: &str = include_str!("sql/list_vouchers.sql");
const SET_VOUCHER_ACTIVE_SQL: &str = include_str!("sql/set_voucher_active.sql");
const CLAIM_VOUCHER_USE_SQL: &str = include_str!("sql/claim_voucher_use.sql");
const CREATE_VOUCHER_USAGE_SQL: &str = include_str!("sql/create_voucher_usage.sql");
const LIST_VOUCHER_USAGES_SQL: &str = include_str!("sql/list_voucher_usages.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgVouchersRepository;

impl PgVouchersRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn create_voucher(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        voucher: &NewVoucher,
    ) -> Result<VoucherRecord, sqlx::Error> {
        let minimum_purchase_amount = voucher
            .minimum_purchase_amount
            .map(|amount| encode_amount(amount, "minimum_purchase_amount"))
            .transpose()?;

        let max_uses = voucher
            .max_uses
            .map(|max_uses| encode_count(max_uses, "max_uses"))
            .transpose()?;

        query_as::<Postgres, VoucherRecord>(CREATE_VOUCHER_SQL)
            .bind(voucher.uuid.into_uuid())
            .bind(voucher.code.as_str())
            .bind(voucher.discount.type_as_str())
            .bind(discount_value(&voucher.discount))
            .bind(minimum_purchase_amount)
            .bind(max_uses)
            .bind(voucher.active)
            .bind(voucher.starts_at.map(SqlxTimestamp::from))
            .bind(voucher.ends_at.map(SqlxTimestamp::from))
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn get_voucher(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        voucher: VoucherUuid,
    ) -> Result<VoucherRecord, sqlx::Error> {
        query_as::<Postgres, VoucherRecord>(GET_VOUCHER_SQL)
            .bind(voucher.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn find_voucher_by_code(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        code: &VoucherCode,
    ) -> Result<Option<VoucherRecord>, sqlx::Error> {
        query_as::<Postgres, VoucherRecord>(FIND_VOUCHER_BY_CODE_SQL)
            .bind(code.as_str())
            .fetch_optional(&mut **tx)
            .await
    }

    pub(crate) async fn list_vouchers(
        &self,
        tx: &mut Transaction<'_, Postgres>,
    ) -> Result<Vec<VoucherRecord>, sqlx::Error> {
        query_as::<Postgres, VoucherRecord>(LIST_VOUCHERS_SQL)
            .fetch_all(&mut **tx)
            .await
    }

    pub(crate) async fn set_voucher_active(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        voucher: VoucherUuid,
        active: bool,
    ) -> Result<VoucherRecord, sqlx::Error> {
        query_as::<Postgres, VoucherRecord>(SET_VOUCHER_ACTIVE_SQL)
            .bind(voucher.into_uuid())
            .bind(active)
            .fetch_one(&mut **tx)
            .await
    }

    /// Consume one use. Returns the rows affected, zero when the voucher is
    /// inactive or has no uses left.
    pub(crate) async fn claim_voucher_use(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        voucher: VoucherUuid,
    ) -> Result<u64, sqlx::Error> {
        let rows_affected = query(CLAIM_VOUCHER_USE_SQL)
            .bind(voucher.into_uuid())
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }

    pub(crate) async fn create_voucher_usage(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        voucher: VoucherUuid,
        order: OrderUuid,
        user: UserUuid,
        discount_amount: u64,
    ) -> Result<VoucherUsageRecord, sqlx::Error> {
        query_as::<Postgres, VoucherUsageRecord>(CREATE_VOUCHER_USAGE_SQL)
            .bind(VoucherUsageUuid::new().into_uuid())
            .bind(voucher.into_uuid())
            .bind(order.into_uuid())
            .bind(user.into_uuid())
            .bind(encode_amount(discount_amount, "discount_amount")?)
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn list_voucher_usages(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        voucher: VoucherUuid,
    ) -> Result<Vec<VoucherUsageRecord>, sqlx::Error> {
        query_as::<Postgres, VoucherUsageRecord>(LIST_VOUCHER_USAGES_SQL)
            .bind(voucher.into_uuid())
            .fetch_all(&mut **tx)
            .await
    }
}

fn discount_value(discount: &VoucherDiscount) -> Decimal {
    match discount {
        VoucherDiscount::Percentage(percent) => *percent,
        VoucherDiscount::FixedAmount(amount) => Decimal::from(*amount),
    }
}

fn decode_error(column: &str, message: String) -> sqlx::Error {
    sqlx::Error::ColumnDecode {
        index: column.to_string(),
        source: message.into(),
    }
}

fn try_get_discount(row: &PgRow) -> Result<VoucherDiscount, sqlx::Error> {
    let discount_type: String = row.try_get("discount_type")?;
    let value: Decimal = row.try_get("discount_value")?;

    match discount_type.as_str() {
        "percentage" => Ok(VoucherDiscount::Percentage(value)),
        "fixed_amount" => value
            .fract()
            .is_zero()
            .then(|| value.to_u64())
            .flatten()
            .map(VoucherDiscount::FixedAmount)
            .ok_or_else(|| decode_error("discount_value", format!("invalid fixed amount {value}"))),
        other => Err(decode_error(
            "discount_type",
            format!("unknown discount type {other}"),
        )),
    }
}

impl<'r> FromRow<'r, PgRow> for VoucherRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let code: String = row.try_get("code")?;

        let code = VoucherCode::new(&code).map_err(|e| sqlx::Error::ColumnDecode {
            index: "code".to_string(),
            source: Box::new(e),
        })?;

        Ok(Self {
            uuid: VoucherUuid::from_uuid(row.try_get("uuid")?),
            voucher: Voucher {
                code,
                discount: try_get_discount(row)?,
                minimum_purchase_amount: try_get_optional_amount(row, "minimum_purchase_amount")?,
                max_uses: try_get_optional_count(row, "max_uses")?,
                used_count: try_get_count(row, "used_count")?,
                active: row.try_get("active")?,
                starts_at: row
                    .try_get::<Option<SqlxTimestamp>, _>("starts_at")?
                    .map(SqlxTimestamp::to_jiff),
                ends_at: row
                    .try_get::<Option<SqlxTimestamp>, _>("ends_at")?
                    .map(SqlxTimestamp::to_jiff),
            },
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
        })
    }
}

impl<'r> FromRow<'r, PgRow> for VoucherUsageRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            uuid: VoucherUsageUuid::from_uuid(row.try_get("uuid")?),
            voucher_uuid: VoucherUuid::from_uuid(row.try_get("voucher_uuid")?),
            order_uuid: OrderUuid::from_uuid(row.try_get("order_uuid")?),
            user_uuid: UserUuid::from_uuid(row.try_get("user_uuid")?),
            discount_amount: try_get_amount(row, "discount_amount")?,
            used_at: row.try_get::<SqlxTimestamp, _>("used_at")?.to_jiff(),
        })
    }
}
