//! App Context

use std::sync::Arc;

use soko::pricing::PricingConfig;

use crate::{
    auth::{AuthService, PgAuthService},
    database::Db,
    domain::{
        flash_sales::{FlashSalesService, PgFlashSalesService},
        orders::{OrdersService, PgOrdersService},
        payments::{PaymentsService, PgPaymentsService},
        products::{PgProductsService, ProductsService},
        vouchers::{PgVouchersService, VouchersService},
    },
    notifications::Notifier,
};

#[derive(Clone)]
pub struct AppContext {
    pub products: Arc<dyn ProductsService>,
    pub vouchers: Arc<dyn VouchersService>,
    pub flash_sales: Arc<dyn FlashSalesService>,
    pub orders: Arc<dyn OrdersService>,
    pub payments: Arc<dyn PaymentsService>,
    pub auth: Arc<dyn AuthService>,
}

impl AppContext {
    /// Build every service over one connection pool.
    #[must_use]
    pub fn new(db: Db, pricing: PricingConfig, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            products: Arc::new(PgProductsService::new(db.clone())),
            vouchers: Arc::new(PgVouchersService::new(db.clone())),
            flash_sales: Arc::new(PgFlashSalesService::new(db.clone())),
            orders: Arc::new(PgOrdersService::new(
                db.clone(),
                pricing,
                Arc::clone(&notifier),
            )),
            payments: Arc::new(PgPaymentsService::new(db.clone(), notifier)),
            auth: Arc::new(PgAuthService::new(db)),
        }
    }
}
