//! Orders Repository

use std::collections::HashMap;

use jiff_sqlx::Timestamp as SqlxTimestamp;
use soko::{cart::CartLine, orders::OrderStatus, pricing::Quote};
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query, query_as};
use uuid::Uuid;

use crate::{
    auth::UserUuid,
    database::{encode_amount, encode_count, try_get_amount, try_get_count},
    domain::{
        flash_sales::records::FlashSaleUuid,
        orders::{
            data::NewOrder,
            records::{CustomerContact, OrderLineRecord, OrderLineUuid, OrderRecord, OrderUuid},
        },
        products::records::ProductUuid,
        vouchers::records::VoucherUuid,
    },
};

const CREATE_ORDER_SQL: &str = include_str!("sql/create_order.sql");
const CREATE_ORDER_LINE_SQL: &str = include_str!("sql/create_order_line.sql");
const GET_ORDER_SQL: &str = include_str!("sql/get_order.sql");
const GET_USER_ORDER_SQL: &str = include_str!("sql/get_user_order.sql");
const LIST_USER_ORDERS_SQL: &str = include_str!("sql/list_user_orders.sql");
const LIST_ORDER_LINES_SQL: &str = include_str!("sql/list_order_lines.sql");
const TRANSITION_ORDER_STATUS_SQL: &str = include_str!("sql/transition_order_status.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgOrdersRepository;

impl PgOrdersRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    /// Insert the order row. Lines are inserted separately.
    pub(crate) async fn create_order(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: UserUuid,
        order: &NewOrder,
        voucher: Option<VoucherUuid>,
        amounts: &Quote,
        status: OrderStatus,
    ) -> Result<OrderRecord, sqlx::Error> {
        query_as::<Postgres, OrderRecord>(CREATE_ORDER_SQL)
            .bind(order.uuid.into_uuid())
            .bind(user.into_uuid())
            .bind(order.customer.name.trim())
            .bind(order.customer.email.trim())
            .bind(order.customer.phone.as_deref().map(str::trim))
            .bind(order.shipping_address.trim())
            .bind(order.payment_method.type_as_str())
            .bind(voucher.map(VoucherUuid::into_uuid))
            .bind(encode_amount(amounts.subtotal, "subtotal")?)
            .bind(encode_amount(amounts.voucher_discount, "voucher_discount")?)
            .bind(encode_amount(amounts.shipping_fee, "shipping_fee")?)
            .bind(encode_amount(amounts.tax, "tax")?)
            .bind(encode_amount(amounts.total, "total_amount")?)
            .bind(status.as_str())
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn create_order_line(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: OrderUuid,
        line: &CartLine,
    ) -> Result<OrderLineRecord, sqlx::Error> {
        let line_total = line
            .line_total()
            .map_err(|e| sqlx::Error::ColumnDecode {
                index: "line_total".to_string(),
                source: Box::new(e),
            })?;

        query_as::<Postgres, OrderLineRecord>(CREATE_ORDER_LINE_SQL)
            .bind(OrderLineUuid::new().into_uuid())
            .bind(order.into_uuid())
            .bind(line.product)
            .bind(line.flash_sale)
            .bind(encode_count(line.quantity, "quantity")?)
            .bind(encode_amount(line.unit_price, "unit_price")?)
            .bind(encode_amount(line_total, "line_total")?)
            .fetch_one(&mut **tx)
            .await
    }

    /// Fetch an order with its lines.
    pub(crate) async fn get_order(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: OrderUuid,
    ) -> Result<OrderRecord, sqlx::Error> {
        let order = query_as::<Postgres, OrderRecord>(GET_ORDER_SQL)
            .bind(order.into_uuid())
            .fetch_one(&mut **tx)
            .await?;

        let mut orders = self.attach_lines(tx, vec![order]).await?;

        orders.pop().ok_or(sqlx::Error::RowNotFound)
    }

    /// Fetch an order with its lines, only if `user` placed it.
    pub(crate) async fn get_user_order(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: UserUuid,
        order: OrderUuid,
    ) -> Result<OrderRecord, sqlx::Error> {
        let order = query_as::<Postgres, OrderRecord>(GET_USER_ORDER_SQL)
            .bind(order.into_uuid())
            .bind(user.into_uuid())
            .fetch_one(&mut **tx)
            .await?;

        let mut orders = self.attach_lines(tx, vec![order]).await?;

        orders.pop().ok_or(sqlx::Error::RowNotFound)
    }

    pub(crate) async fn list_user_orders(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: UserUuid,
    ) -> Result<Vec<OrderRecord>, sqlx::Error> {
        let orders = query_as::<Postgres, OrderRecord>(LIST_USER_ORDERS_SQL)
            .bind(user.into_uuid())
            .fetch_all(&mut **tx)
            .await?;

        self.attach_lines(tx, orders).await
    }

    /// Move the order from `from` to `to`. Returns the rows affected, zero
    /// when the order is no longer in `from`.
    pub(crate) async fn transition_order_status(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: OrderUuid,
        from: OrderStatus,
        to: OrderStatus,
    ) -> Result<u64, sqlx::Error> {
        let rows_affected = query(TRANSITION_ORDER_STATUS_SQL)
            .bind(order.into_uuid())
            .bind(from.as_str())
            .bind(to.as_str())
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }

    async fn attach_lines(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        mut orders: Vec<OrderRecord>,
    ) -> Result<Vec<OrderRecord>, sqlx::Error> {
        if orders.is_empty() {
            return Ok(orders);
        }

        let uuids: Vec<Uuid> = orders.iter().map(|order| order.uuid.into_uuid()).collect();

        let lines = query_as::<Postgres, OrderLineRecord>(LIST_ORDER_LINES_SQL)
            .bind(uuids)
            .fetch_all(&mut **tx)
            .await?;

        let mut by_order: HashMap<OrderUuid, Vec<OrderLineRecord>> = HashMap::new();

        for line in lines {
            by_order.entry(line.order_uuid).or_default().push(line);
        }

        for order in &mut orders {
            order.lines = by_order.remove(&order.uuid).unwrap_or_default();
        }

        Ok(orders)
    }
}

fn decode_error(column: &str, source: impl std::error::Error + Send + Sync + 'static) -> sqlx::Error {
    sqlx::Error::ColumnDecode {
        index: column.to_string(),
        source: Box::new(source),
    }
}

impl<'r> FromRow<'r, PgRow> for OrderRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let payment_method: String = row.try_get("payment_method")?;
        let status: String = row.try_get("status")?;

        Ok(Self {
            uuid: OrderUuid::from_uuid(row.try_get("uuid")?),
            user_uuid: UserUuid::from_uuid(row.try_get("user_uuid")?),
            customer: CustomerContact {
                name: row.try_get("customer_name")?,
                email: row.try_get("customer_email")?,
                phone: row.try_get("customer_phone")?,
            },
            shipping_address: row.try_get("shipping_address")?,
            payment_method: payment_method
                .parse()
                .map_err(|e| decode_error("payment_method", e))?,
            voucher_uuid: row
                .try_get::<Option<Uuid>, _>("voucher_uuid")?
                .map(VoucherUuid::from_uuid),
            amounts: Quote {
                subtotal: try_get_amount(row, "subtotal")?,
                shipping_fee: try_get_amount(row, "shipping_fee")?,
                tax: try_get_amount(row, "tax")?,
                voucher_discount: try_get_amount(row, "voucher_discount")?,
                total: try_get_amount(row, "total_amount")?,
            },
            status: status.parse().map_err(|e| decode_error("status", e))?,
            lines: Vec::new(),
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
        })
    }
}

impl<'r> FromRow<'r, PgRow> for OrderLineRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            uuid: OrderLineUuid::from_uuid(row.try_get("uuid")?),
            order_uuid: OrderUuid::from_uuid(row.try_get("order_uuid")?),
            product_uuid: ProductUuid::from_uuid(row.try_get("product_uuid")?),
            flash_sale_uuid: row
                .try_get::<Option<Uuid>, _>("flash_sale_uuid")?
                .map(FlashSaleUuid::from_uuid),
            quantity: try_get_count(row, "quantity")?,
            unit_price: try_get_amount(row, "unit_price")?,
            line_total: try_get_amount(row, "line_total")?,
        })
    }
}
