//! Flash sales service.

use async_trait::async_trait;
use jiff::Timestamp;
use mockall::automock;
use soko::flash_sales::FlashSale;
use tracing::info;

use crate::{
    database::Db,
    domain::{
        flash_sales::{
            FlashSalesServiceError,
            data::NewFlashSale,
            records::{FlashSaleAvailability, FlashSaleRecord, FlashSaleUuid},
            repository::PgFlashSalesRepository,
        },
        products::repository::PgProductsRepository,
    },
};

#[derive(Debug, Clone)]
pub struct PgFlashSalesService {
    db: Db,
    flash_sales: PgFlashSalesRepository,
    products: PgProductsRepository,
}

impl PgFlashSalesService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            flash_sales: PgFlashSalesRepository::new(),
            products: PgProductsRepository::new(),
        }
    }
}

#[async_trait]
impl FlashSalesService for PgFlashSalesService {
    #[tracing::instrument(
        name = "flash_sales.service.create_flash_sale",
        skip(self, sale),
        fields(flash_sale_uuid = %sale.uuid, product_uuid = %sale.product),
        err
    )]
    async fn create_flash_sale(
        &self,
        sale: NewFlashSale,
    ) -> Result<FlashSaleRecord, FlashSalesServiceError> {
        let mut tx = self.db.begin().await?;

        let product = self
            .products
            .get_product(&mut tx, sale.product)
            .await
            .map_err(|error| match error {
                sqlx::Error::RowNotFound => FlashSalesServiceError::InvalidReference,
                other => FlashSalesServiceError::from(other),
            })?;

        let flash_sale = FlashSale {
            product: product.uuid.into_uuid(),
            original_price: product.price,
            sale_price: sale.sale_price,
            starts_at: sale.starts_at,
            ends_at: sale.ends_at,
            quantity_limit: sale.quantity_limit,
            sold_quantity: 0,
            active: sale.active,
        };

        flash_sale.validate()?;

        let discount_percentage = flash_sale.discount_percentage()?;

        let record = self
            .flash_sales
            .create_flash_sale(&mut tx, sale.uuid, &flash_sale, discount_percentage)
            .await?;

        tx.commit().await?;

        info!(
            flash_sale_uuid = %record.uuid,
            discount_percentage,
            "created flash sale"
        );

        Ok(record)
    }

    async fn get_flash_sale(
        &self,
        sale: FlashSaleUuid,
    ) -> Result<FlashSaleRecord, FlashSalesServiceError> {
        let mut tx = self.db.begin().await?;

        let record = self.flash_sales.get_flash_sale(&mut tx, sale).await?;

        tx.commit().await?;

        Ok(record)
    }

    async fn list_live_flash_sales(
        &self,
        now: Timestamp,
    ) -> Result<Vec<FlashSaleRecord>, FlashSalesServiceError> {
        let mut tx = self.db.begin().await?;

        let sales = self.flash_sales.list_live_flash_sales(&mut tx, now).await?;

        tx.commit().await?;

        Ok(sales)
    }

    async fn check_availability(
        &self,
        sale: FlashSaleUuid,
        quantity: u32,
        now: Timestamp,
    ) -> Result<FlashSaleAvailability, FlashSalesServiceError> {
        let mut tx = self.db.begin().await?;

        let record = self.flash_sales.get_flash_sale(&mut tx, sale).await?;

        tx.commit().await?;

        record.sale.check_purchase(quantity, now)?;

        Ok(FlashSaleAvailability {
            uuid: record.uuid,
            live: record.sale.is_live(now),
            available: record.sale.available(),
            sold_quantity: record.sale.sold_quantity,
            time_remaining: record.sale.time_remaining(now),
        })
    }
}

#[automock]
#[async_trait]
pub trait FlashSalesService: Send + Sync {
    /// Create a flash sale priced below the product's current catalog price.
    async fn create_flash_sale(
        &self,
        sale: NewFlashSale,
    ) -> Result<FlashSaleRecord, FlashSalesServiceError>;

    /// Retrieve a single flash sale.
    async fn get_flash_sale(
        &self,
        sale: FlashSaleUuid,
    ) -> Result<FlashSaleRecord, FlashSalesServiceError>;

    /// Sales that are active and inside their window at `now`, ending soonest first.
    async fn list_live_flash_sales(
        &self,
        now: Timestamp,
    ) -> Result<Vec<FlashSaleRecord>, FlashSalesServiceError>;

    /// Advisory check that `quantity` units could be added to a cart at `now`.
    ///
    /// The authoritative check happens when inventory is claimed.
    async fn check_availability(
        &self,
        sale: FlashSaleUuid,
        quantity: u32,
        now: Timestamp,
    ) -> Result<FlashSaleAvailability, FlashSalesServiceError>;
}
