//! Flash Sales Repository

use jiff::Timestamp;
use jiff_sqlx::Timestamp as SqlxTimestamp;
use soko::flash_sales::FlashSale;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query, query_as};
use uuid::Uuid;

use crate::{
    database::{
        encode_amount, encode_count, try_get_amount, try_get_count, try_get_optional_count,
    },
    domain::flash_sales::records::{FlashSaleRecord, FlashSaleUuid},
};

const CREATE_FLASH_SALE_SQL: &str = include_str!("sql/create_flash_sale.sql");
const GET_FLASH_SALE_SQL: &str = include_str!("sql/get_flash_sale.sql");
const GET_FLASH_SALES_SQL: &str = include_str!("sql/get_flash_sales.sql");
const LIST_LIVE_FLASH_SALES_SQL: &str = include_str!("sql/list_live_flash_sales.sql");
const CLAIM_FLASH_SALE_INVENTORY_SQL: &str = include_str!("sql/claim_flash_sale_inventory.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgFlashSalesRepository;

impl PgFlashSalesRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn create_flash_sale(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        uuid: FlashSaleUuid,
        sale: &FlashSale,
        discount_percentage: u8,
    ) -> Result<FlashSaleRecord, sqlx::Error> {
        let quantity_limit = sale
            .quantity_limit
            .map(|limit| encode_count(limit, "quantity_limit"))
            .transpose()?;

        query_as::<Postgres, FlashSaleRecord>(CREATE_FLASH_SALE_SQL)
            .bind(uuid.into_uuid())
            .bind(sale.product)
            .bind(encode_amount(sale.original_price, "original_price")?)
            .bind(encode_amount(sale.sale_price, "sale_price")?)
            .bind(i16::from(discount_percentage))
            .bind(SqlxTimestamp::from(sale.starts_at))
            .bind(SqlxTimestamp::from(sale.ends_at))
            .bind(quantity_limit)
            .bind(sale.active)
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn get_flash_sale(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        sale: FlashSaleUuid,
    ) -> Result<FlashSaleRecord, sqlx::Error> {
        query_as::<Postgres, FlashSaleRecord>(GET_FLASH_SALE_SQL)
            .bind(sale.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }

    /// Fetch several sales at once. Unknown ids are simply absent from the result.
    pub(crate) async fn get_flash_sales(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        sales: &[FlashSaleUuid],
    ) -> Result<Vec<FlashSaleRecord>, sqlx::Error> {
        let uuids: Vec<Uuid> = sales.iter().map(|sale| sale.into_uuid()).collect();

        query_as::<Postgres, FlashSaleRecord>(GET_FLASH_SALES_SQL)
            .bind(uuids)
            .fetch_all(&mut **tx)
            .await
    }

    pub(crate) async fn list_live_flash_sales(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        now: Timestamp,
    ) -> Result<Vec<FlashSaleRecord>, sqlx::Error> {
        query_as::<Postgres, FlashSaleRecord>(LIST_LIVE_FLASH_SALES_SQL)
            .bind(SqlxTimestamp::from(now))
            .fetch_all(&mut **tx)
            .await
    }

    /// Increment `sold_quantity` by `quantity` unless that would pass the limit.
    /// Returns the rows affected, zero when the sale cannot cover the quantity.
    pub(crate) async fn claim_flash_sale_inventory(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        sale: FlashSaleUuid,
        quantity: u32,
    ) -> Result<u64, sqlx::Error> {
        let rows_affected = query(CLAIM_FLASH_SALE_INVENTORY_SQL)
            .bind(sale.into_uuid())
            .bind(encode_count(quantity, "quantity")?)
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }
}

impl<'r> FromRow<'r, PgRow> for FlashSaleRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let discount_percentage: i16 = row.try_get("discount_percentage")?;

        let discount_percentage =
            u8::try_from(discount_percentage).map_err(|e| sqlx::Error::ColumnDecode {
                index: "discount_percentage".to_string(),
                source: Box::new(e),
            })?;

        Ok(Self {
            uuid: FlashSaleUuid::from_uuid(row.try_get("uuid")?),
            sale: FlashSale {
                product: row.try_get("product_uuid")?,
                original_price: try_get_amount(row, "original_price")?,
                sale_price: try_get_amount(row, "sale_price")?,
                starts_at: row.try_get::<SqlxTimestamp, _>("starts_at")?.to_jiff(),
                ends_at: row.try_get::<SqlxTimestamp, _>("ends_at")?.to_jiff(),
                quantity_limit: try_get_optional_count(row, "quantity_limit")?,
                sold_quantity: try_get_count(row, "sold_quantity")?,
                active: row.try_get("active")?,
            },
            discount_percentage,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
        })
    }
}
