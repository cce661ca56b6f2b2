//! Payments Repository

use jiff_sqlx::Timestamp as SqlxTimestamp;
use soko::{
    orders::PaymentConfirmation,
    payments::{PaymentChannel, PaymentChannelKind, PaymentStatus},
};
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query, query_as};
use uuid::Uuid;

use crate::{
    auth::UserUuid,
    database::{encode_amount, try_get_amount},
    domain::{
        orders::records::OrderUuid,
        payments::{
            data::PaymentFilter,
            records::{PaymentRecord, PaymentSummary, PaymentUuid},
        },
    },
};

const CREATE_PAYMENT_RECORD_SQL: &str = include_str!("sql/create_payment_record.sql");
const UPDATE_PENDING_PAYMENT_RECORD_SQL: &str =
    include_str!("sql/update_pending_payment_record.sql");
const GET_PAYMENT_RECORD_SQL: &str = include_str!("sql/get_payment_record.sql");
const DECIDE_PAYMENT_RECORD_SQL: &str = include_str!("sql/decide_payment_record.sql");
const REJECT_PENDING_ORDER_PAYMENTS_SQL: &str =
    include_str!("sql/reject_pending_order_payments.sql");
const LIST_PAYMENT_RECORDS_SQL: &str = include_str!("sql/list_payment_records.sql");
const LIST_ORDER_PAYMENT_RECORDS_SQL: &str = include_str!("sql/list_order_payment_records.sql");
const COUNT_PAYMENT_RECORDS_BY_STATUS_SQL: &str =
    include_str!("sql/count_payment_records_by_status.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgPaymentsRepository;

impl PgPaymentsRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    /// Insert a pending payment record. At most one pending record may exist
    /// per order.
    pub(crate) async fn create_payment_record(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: OrderUuid,
        confirmation: &PaymentConfirmation,
        amount: u64,
    ) -> Result<PaymentRecord, sqlx::Error> {
        query_as::<Postgres, PaymentRecord>(CREATE_PAYMENT_RECORD_SQL)
            .bind(PaymentUuid::new().into_uuid())
            .bind(order.into_uuid())
            .bind(confirmation.message())
            .bind(confirmation.transaction_code().map(String::from))
            .bind(confirmation.phone())
            .bind(confirmation.channel().kind().as_str())
            .bind(confirmation.channel().paybill_number())
            .bind(confirmation.channel().account_number())
            .bind(encode_amount(amount, "amount")?)
            .fetch_one(&mut **tx)
            .await
    }

    /// Replace the details of the order's pending record, if it has one.
    pub(crate) async fn update_pending_payment_record(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: OrderUuid,
        confirmation: &PaymentConfirmation,
        amount: u64,
    ) -> Result<Option<PaymentRecord>, sqlx::Error> {
        query_as::<Postgres, PaymentRecord>(UPDATE_PENDING_PAYMENT_RECORD_SQL)
            .bind(order.into_uuid())
            .bind(confirmation.message())
            .bind(confirmation.transaction_code().map(String::from))
            .bind(confirmation.phone())
            .bind(confirmation.channel().kind().as_str())
            .bind(confirmation.channel().paybill_number())
            .bind(confirmation.channel().account_number())
            .bind(encode_amount(amount, "amount")?)
            .fetch_optional(&mut **tx)
            .await
    }

    pub(crate) async fn get_payment_record(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        payment: PaymentUuid,
    ) -> Result<PaymentRecord, sqlx::Error> {
        query_as::<Postgres, PaymentRecord>(GET_PAYMENT_RECORD_SQL)
            .bind(payment.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }

    /// Confirm or reject a pending record on behalf of `admin`. Returns `None`
    /// when the record is no longer pending.
    pub(crate) async fn decide_payment_record(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        payment: PaymentUuid,
        status: PaymentStatus,
        admin: UserUuid,
    ) -> Result<Option<PaymentRecord>, sqlx::Error> {
        query_as::<Postgres, PaymentRecord>(DECIDE_PAYMENT_RECORD_SQL)
            .bind(payment.into_uuid())
            .bind(status.as_str())
            .bind(admin.into_uuid())
            .fetch_optional(&mut **tx)
            .await
    }

    /// Reject whatever is still pending for an order, without a deciding admin.
    pub(crate) async fn reject_pending_order_payments(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: OrderUuid,
    ) -> Result<u64, sqlx::Error> {
        let rows_affected = query(REJECT_PENDING_ORDER_PAYMENTS_SQL)
            .bind(order.into_uuid())
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }

    pub(crate) async fn list_payment_records(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        filter: &PaymentFilter,
    ) -> Result<Vec<PaymentRecord>, sqlx::Error> {
        query_as::<Postgres, PaymentRecord>(LIST_PAYMENT_RECORDS_SQL)
            .bind(filter.status.map(PaymentStatus::as_str))
            .bind(filter.channel.map(PaymentChannelKind::as_str))
            .bind(filter.search_pattern())
            .fetch_all(&mut **tx)
            .await
    }

    pub(crate) async fn list_order_payment_records(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: OrderUuid,
    ) -> Result<Vec<PaymentRecord>, sqlx::Error> {
        query_as::<Postgres, PaymentRecord>(LIST_ORDER_PAYMENT_RECORDS_SQL)
            .bind(order.into_uuid())
            .fetch_all(&mut **tx)
            .await
    }

    pub(crate) async fn count_payment_records_by_status(
        &self,
        tx: &mut Transaction<'_, Postgres>,
    ) -> Result<PaymentSummary, sqlx::Error> {
        let rows = query(COUNT_PAYMENT_RECORDS_BY_STATUS_SQL)
            .fetch_all(&mut **tx)
            .await?;

        let mut summary = PaymentSummary::default();

        for row in rows {
            let status: String = row.try_get("status")?;
            let count = try_get_amount(&row, "record_count")?;

            match status.parse().map_err(|e| decode_error("status", e))? {
                PaymentStatus::Pending => summary.pending = count,
                PaymentStatus::Confirmed => summary.confirmed = count,
                PaymentStatus::Rejected => summary.rejected = count,
            }
        }

        Ok(summary)
    }
}

fn decode_error(column: &str, source: impl std::error::Error + Send + Sync + 'static) -> sqlx::Error {
    sqlx::Error::ColumnDecode {
        index: column.to_string(),
        source: Box::new(source),
    }
}

impl<'r> FromRow<'r, PgRow> for PaymentRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let status: String = row.try_get("status")?;
        let channel: String = row.try_get("channel")?;
        let paybill_number: Option<String> = row.try_get("paybill_number")?;
        let account_number: Option<String> = row.try_get("account_number")?;

        Ok(Self {
            uuid: PaymentUuid::from_uuid(row.try_get("uuid")?),
            order_uuid: OrderUuid::from_uuid(row.try_get("order_uuid")?),
            message: row.try_get("message")?,
            transaction_code: row.try_get("transaction_code")?,
            phone: row.try_get("phone")?,
            channel: PaymentChannel::from_parts(
                channel.parse().map_err(|e| decode_error("channel", e))?,
                paybill_number.as_deref(),
                account_number.as_deref(),
            ),
            amount: try_get_amount(row, "amount")?,
            status: status.parse().map_err(|e| decode_error("status", e))?,
            confirmed_by: row
                .try_get::<Option<Uuid>, _>("confirmed_by")?
                .map(UserUuid::from_uuid),
            confirmed_at: row
                .try_get::<Option<SqlxTimestamp>, _>("confirmed_at")?
                .map(SqlxTimestamp::to_jiff),
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
        })
    }
}
