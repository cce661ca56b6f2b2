//! Orders service.

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use jiff::Timestamp;
use mockall::automock;
use soko::{
    cart::{Cart, CartLine},
    lifecycle::Lifecycle,
    orders::{OrderStatus, PaymentMethod},
    pricing::{PricingConfig, PricingError, Quote, quote},
    vouchers::{VoucherCode, VoucherError},
};
use sqlx::{Postgres, Transaction};
use tracing::info;

use crate::{
    auth::{PgAuthRepository, Role, UserUuid},
    database::Db,
    domain::{
        flash_sales::{
            records::{FlashSaleRecord, FlashSaleUuid},
            repository::PgFlashSalesRepository,
        },
        orders::{
            CheckoutError, OrdersServiceError,
            data::{CheckoutLine, NewOrder},
            records::{OrderRecord, OrderUuid},
            repository::PgOrdersRepository,
        },
        payments::repository::PgPaymentsRepository,
        products::{
            records::{ProductRecord, ProductUuid},
            repository::PgProductsRepository,
        },
        vouchers::{records::VoucherRecord, repository::PgVouchersRepository},
    },
    notifications::{Notification, Notifier, dispatch},
};

/// A cart checked against the catalog and live sales, priced at its captured
/// unit prices with an optional voucher.
struct PricedCart {
    cart: Cart,
    voucher: Option<VoucherRecord>,
    amounts: Quote,
}

#[derive(Clone)]
pub struct PgOrdersService {
    db: Db,
    pricing: PricingConfig,
    notifier: Arc<dyn Notifier>,
    orders: PgOrdersRepository,
    products: PgProductsRepository,
    flash_sales: PgFlashSalesRepository,
    vouchers: PgVouchersRepository,
    payments: PgPaymentsRepository,
    auth: PgAuthRepository,
}

impl PgOrdersService {
    #[must_use]
    pub fn new(db: Db, pricing: PricingConfig, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            db,
            pricing,
            notifier,
            orders: PgOrdersRepository::new(),
            products: PgProductsRepository::new(),
            flash_sales: PgFlashSalesRepository::new(),
            vouchers: PgVouchersRepository::new(),
            payments: PgPaymentsRepository::new(),
            auth: PgAuthRepository::new(),
        }
    }

    async fn price_cart(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        lines: &[CheckoutLine],
        voucher_code: Option<&VoucherCode>,
        now: Timestamp,
    ) -> Result<PricedCart, OrdersServiceError> {
        if lines.is_empty() {
            return Err(CheckoutError::EmptyCart.into());
        }

        if let Some(index) = lines.iter().position(|line| line.quantity == 0) {
            return Err(CheckoutError::InvalidQuantity(index).into());
        }

        if let Some(index) = lines.iter().position(|line| line.unit_price == 0) {
            return Err(CheckoutError::MissingUnitPrice(index).into());
        }

        let product_uuids: Vec<ProductUuid> = lines.iter().map(|line| line.product).collect();

        let products: HashMap<ProductUuid, ProductRecord> = self
            .products
            .get_products(tx, &product_uuids)
            .await?
            .into_iter()
            .map(|product| (product.uuid, product))
            .collect();

        let sale_uuids: Vec<FlashSaleUuid> =
            lines.iter().filter_map(|line| line.flash_sale).collect();

        let sales: HashMap<FlashSaleUuid, FlashSaleRecord> = if sale_uuids.is_empty() {
            HashMap::new()
        } else {
            self.flash_sales
                .get_flash_sales(tx, &sale_uuids)
                .await?
                .into_iter()
                .map(|sale| (sale.uuid, sale))
                .collect()
        };

        let mut cart = Cart::new();

        for line in lines {
            let product = products
                .get(&line.product)
                .ok_or(CheckoutError::UnknownProduct(line.product))?;

            if !product.in_stock {
                return Err(CheckoutError::OutOfStock(product.uuid).into());
            }

            let cart_line = match line.flash_sale {
                Some(sale_uuid) => {
                    let sale = sales
                        .get(&sale_uuid)
                        .ok_or(CheckoutError::UnknownFlashSale(sale_uuid))?;

                    if sale.product_uuid() != product.uuid {
                        return Err(CheckoutError::FlashSaleProductMismatch {
                            sale: sale_uuid,
                            product: product.uuid,
                        }
                        .into());
                    }

                    if line.unit_price != sale.sale.sale_price {
                        return Err(CheckoutError::SalePriceMismatch {
                            sale: sale_uuid,
                            sale_price: sale.sale.sale_price,
                            captured: line.unit_price,
                        }
                        .into());
                    }

                    CartLine::on_sale(
                        product.uuid.into_uuid(),
                        sale_uuid.into_uuid(),
                        line.quantity,
                        line.unit_price,
                    )
                }
                None => CartLine::new(product.uuid.into_uuid(), line.quantity, line.unit_price),
            };

            cart.add(cart_line).map_err(PricingError::from)?;
        }

        // Merged lines may ask one sale for more than any single line did.
        for line in cart.lines() {
            if let Some(sale) = line
                .flash_sale
                .and_then(|sale| sales.get(&FlashSaleUuid::from_uuid(sale)))
            {
                sale.sale.check_purchase(line.quantity, now)?;
            }
        }

        let voucher = match voucher_code {
            Some(code) => Some(
                self.vouchers
                    .find_voucher_by_code(tx, code)
                    .await?
                    .ok_or(OrdersServiceError::Voucher(VoucherError::UnknownCode))?,
            ),
            None => None,
        };

        let amounts = quote(
            &cart,
            voucher.as_ref().map(|record| &record.voucher),
            &self.pricing,
            now,
        )?;

        Ok(PricedCart {
            cart,
            voucher,
            amounts,
        })
    }

    async fn claim_flash_sale_inventory(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: &OrderRecord,
    ) -> Result<(), OrdersServiceError> {
        for (sale, quantity) in order.flash_sale_claims() {
            let claimed = self
                .flash_sales
                .claim_flash_sale_inventory(tx, sale, quantity)
                .await?;

            if claimed == 0 {
                return Err(OrdersServiceError::FlashSaleSoldOut(sale));
            }
        }

        Ok(())
    }

    /// Conditionally move an order, re-reading its status when another
    /// request changed it first.
    async fn move_order(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: &OrderRecord,
        to: OrderStatus,
    ) -> Result<(), OrdersServiceError> {
        order
            .status
            .transition(to)
            .map_err(|_| OrdersServiceError::refused_transition(order.status, to))?;

        let moved = self
            .orders
            .transition_order_status(tx, order.uuid, order.status, to)
            .await?;

        if moved == 0 {
            let current = self.orders.get_order(tx, order.uuid).await?;

            return Err(OrdersServiceError::refused_transition(current.status, to));
        }

        Ok(())
    }
}

fn check_contact(order: &NewOrder) -> Result<(), CheckoutError> {
    if order.customer.name.trim().is_empty() {
        return Err(CheckoutError::BlankCustomerName);
    }

    if order.customer.email.trim().is_empty() {
        return Err(CheckoutError::BlankCustomerEmail);
    }

    if order.shipping_address.trim().is_empty() {
        return Err(CheckoutError::BlankShippingAddress);
    }

    Ok(())
}

#[async_trait]
impl OrdersService for PgOrdersService {
    #[tracing::instrument(
        name = "orders.service.submit_order",
        skip(self, order),
        fields(
            user_uuid = %user,
            order_uuid = %order.uuid,
            payment_method = order.payment_method.type_as_str(),
        ),
        err
    )]
    async fn submit_order(
        &self,
        user: UserUuid,
        order: NewOrder,
    ) -> Result<OrderRecord, OrdersServiceError> {
        check_contact(&order)?;

        let now = Timestamp::now();

        let mut tx = self.db.begin().await?;

        let priced = self
            .price_cart(&mut tx, &order.lines, order.voucher_code.as_ref(), now)
            .await?;

        let mut record = self
            .orders
            .create_order(
                &mut tx,
                user,
                &order,
                priced.voucher.as_ref().map(|voucher| voucher.uuid),
                &priced.amounts,
                order.payment_method.initial_status(),
            )
            .await?;

        for line in priced.cart.lines() {
            let line = self
                .orders
                .create_order_line(&mut tx, record.uuid, line)
                .await?;

            record.lines.push(line);
        }

        if let Some(voucher) = &priced.voucher {
            if self.vouchers.claim_voucher_use(&mut tx, voucher.uuid).await? == 0 {
                return Err(OrdersServiceError::VoucherExhausted);
            }

            self.vouchers
                .create_voucher_usage(
                    &mut tx,
                    voucher.uuid,
                    record.uuid,
                    user,
                    priced.amounts.voucher_discount,
                )
                .await?;
        }

        match &order.payment_method {
            PaymentMethod::MobileMoney(confirmation) => {
                self.payments
                    .create_payment_record(&mut tx, record.uuid, confirmation, record.amounts.total)
                    .await?;
            }
            PaymentMethod::CashOnDelivery => {
                self.claim_flash_sale_inventory(&mut tx, &record).await?;
            }
        }

        tx.commit().await?;

        info!(
            order_uuid = %record.uuid,
            status = %record.status,
            total = record.amounts.total,
            "submitted order"
        );

        dispatch(
            &self.notifier,
            Notification::OrderPlaced {
                order: record.uuid,
                customer_name: record.customer.name.clone(),
                phone: record.customer.phone.clone(),
                total: record.amounts.total,
                payment_method: record.payment_method,
            },
        );

        Ok(record)
    }

    async fn quote_cart(
        &self,
        lines: Vec<CheckoutLine>,
        voucher_code: Option<VoucherCode>,
    ) -> Result<Quote, OrdersServiceError> {
        let mut tx = self.db.begin().await?;

        let priced = self
            .price_cart(&mut tx, &lines, voucher_code.as_ref(), Timestamp::now())
            .await?;

        tx.commit().await?;

        Ok(priced.amounts)
    }

    async fn get_order(
        &self,
        user: UserUuid,
        order: OrderUuid,
    ) -> Result<OrderRecord, OrdersServiceError> {
        let mut tx = self.db.begin().await?;

        let record = self.orders.get_user_order(&mut tx, user, order).await?;

        tx.commit().await?;

        Ok(record)
    }

    async fn list_orders(&self, user: UserUuid) -> Result<Vec<OrderRecord>, OrdersServiceError> {
        let mut tx = self.db.begin().await?;

        let orders = self.orders.list_user_orders(&mut tx, user).await?;

        tx.commit().await?;

        Ok(orders)
    }

    #[tracing::instrument(
        name = "orders.service.cancel_order",
        skip(self),
        fields(user_uuid = %user, order_uuid = %order),
        err
    )]
    async fn cancel_order(
        &self,
        user: UserUuid,
        order: OrderUuid,
    ) -> Result<OrderRecord, OrdersServiceError> {
        let mut tx = self.db.begin().await?;

        let mut record = self.orders.get_user_order(&mut tx, user, order).await?;

        self.move_order(&mut tx, &record, OrderStatus::Cancelled)
            .await?;

        let withdrawn = self
            .payments
            .reject_pending_order_payments(&mut tx, order)
            .await?;

        tx.commit().await?;

        info!(order_uuid = %order, withdrawn, "cancelled order");

        record.status = OrderStatus::Cancelled;

        Ok(record)
    }

    #[tracing::instrument(
        name = "orders.service.advance_fulfilment",
        skip(self),
        fields(admin_uuid = %admin, order_uuid = %order, to = %to),
        err
    )]
    async fn advance_fulfilment(
        &self,
        admin: UserUuid,
        order: OrderUuid,
        to: OrderStatus,
    ) -> Result<OrderRecord, OrdersServiceError> {
        let mut tx = self.db.begin().await?;

        if !self.auth.has_role(&mut tx, admin, Role::Admin).await? {
            return Err(OrdersServiceError::Permission);
        }

        let mut record = self.orders.get_order(&mut tx, order).await?;

        if !matches!(to, OrderStatus::Shipped | OrderStatus::Delivered) {
            return Err(OrdersServiceError::refused_transition(record.status, to));
        }

        self.move_order(&mut tx, &record, to).await?;

        tx.commit().await?;

        info!(order_uuid = %order, from = %record.status, to = %to, "advanced order");

        record.status = to;

        Ok(record)
    }
}

#[automock]
#[async_trait]
pub trait OrdersService: Send + Sync {
    /// Price and place an order in one transaction.
    ///
    /// Mobile-money orders start pending with a pending payment record.
    /// Cash-on-delivery orders start processing and claim flash-sale stock
    /// immediately. A voucher use is consumed either way.
    async fn submit_order(
        &self,
        user: UserUuid,
        order: NewOrder,
    ) -> Result<OrderRecord, OrdersServiceError>;

    /// Price a cart exactly as submission would, without writing anything.
    async fn quote_cart(
        &self,
        lines: Vec<CheckoutLine>,
        voucher_code: Option<VoucherCode>,
    ) -> Result<Quote, OrdersServiceError>;

    /// One of the user's orders. Other users' orders are not found.
    async fn get_order(
        &self,
        user: UserUuid,
        order: OrderUuid,
    ) -> Result<OrderRecord, OrdersServiceError>;

    /// The user's orders, newest first.
    async fn list_orders(&self, user: UserUuid) -> Result<Vec<OrderRecord>, OrdersServiceError>;

    /// Cancel a pending order and withdraw its pending payment.
    async fn cancel_order(
        &self,
        user: UserUuid,
        order: OrderUuid,
    ) -> Result<OrderRecord, OrdersServiceError>;

    /// Mark an order shipped or delivered. Admin only.
    async fn advance_fulfilment(
        &self,
        admin: UserUuid,
        order: OrderUuid,
        to: OrderStatus,
    ) -> Result<OrderRecord, OrdersServiceError>;
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use soko::{
        flash_sales::FlashSaleError, orders::PaymentMethodKind, vouchers::VoucherDiscount,
    };
    use testresult::TestResult;

    use crate::{
        domain::{
            flash_sales::FlashSalesService,
            payments::{PaymentsService, data::PaymentFilter},
            products::{ProductsService, data::ProductUpdate},
            vouchers::{VouchersService, data::NewVoucher, records::VoucherUuid},
        },
        test::{
            TestContext,
            helpers::{
                cash_order, create_flash_sale, create_product, line, mobile_order, sale_line,
            },
        },
    };

    use super::*;

    #[tokio::test]
    async fn mobile_money_order_is_pending_with_payment_record() -> TestResult {
        let ctx = TestContext::new().await;
        let customer = ctx.create_customer("Wanjiku").await?;
        let admin = ctx.create_admin("Otieno").await?;
        let product = create_product(&ctx, 1_000_000).await?;

        let order = ctx
            .orders
            .submit_order(customer.uuid, mobile_order(&[line(&product, 1)])?)
            .await?;

        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.payment_method, PaymentMethodKind::MobileMoney);
        assert_eq!(order.amounts.subtotal, 1_000_000);
        assert_eq!(order.amounts.total, 1_310_000);
        assert!(order.amounts.reconciles());
        assert_eq!(order.lines.len(), 1);

        let payments = ctx
            .payments
            .list_payments(admin.uuid, PaymentFilter::default())
            .await?;
        let payment = payments
            .iter()
            .find(|payment| payment.order_uuid == order.uuid)
            .ok_or("payment record missing")?;

        assert_eq!(payment.amount, 1_310_000);
        assert_eq!(payment.transaction_code.as_deref(), Some("QGH7XK2M9P"));

        Ok(())
    }

    #[tokio::test]
    async fn voucher_discount_applies_to_subtotal_only() -> TestResult {
        let ctx = TestContext::new().await;
        let customer = ctx.create_customer("Wanjiku").await?;
        let product = create_product(&ctx, 1_000_000).await?;

        let voucher = ctx
            .vouchers
            .create_voucher(NewVoucher {
                uuid: VoucherUuid::new(),
                code: VoucherCode::new("SAVE10")?,
                discount: VoucherDiscount::Percentage(Decimal::TEN),
                minimum_purchase_amount: Some(500_000),
                max_uses: Some(1),
                active: true,
                starts_at: None,
                ends_at: None,
            })
            .await?;

        let order = ctx
            .orders
            .submit_order(
                customer.uuid,
                NewOrder {
                    voucher_code: Some(VoucherCode::new("save10")?),
                    ..cash_order(&[line(&product, 1)])
                },
            )
            .await?;

        assert_eq!(order.amounts.voucher_discount, 100_000);
        assert_eq!(order.amounts.total, 1_210_000);
        assert_eq!(order.voucher_uuid, Some(voucher.uuid));

        let usages = ctx.vouchers.list_voucher_usages(voucher.uuid).await?;

        assert_eq!(usages.len(), 1);
        assert_eq!(usages[0].discount_amount, 100_000);

        let result = ctx
            .orders
            .submit_order(
                customer.uuid,
                NewOrder {
                    voucher_code: Some(VoucherCode::new("SAVE10")?),
                    ..cash_order(&[line(&product, 1)])
                },
            )
            .await;

        assert!(
            matches!(
                result,
                Err(OrdersServiceError::Voucher(VoucherError::Exhausted))
            ),
            "expected Exhausted, got {result:?}"
        );
        assert!(result.is_err_and(|error| error.is_capacity()));

        Ok(())
    }

    #[tokio::test]
    async fn unknown_voucher_is_rejected() -> TestResult {
        let ctx = TestContext::new().await;
        let customer = ctx.create_customer("Wanjiku").await?;
        let product = create_product(&ctx, 1_000_000).await?;

        let result = ctx
            .orders
            .quote_cart(
                vec![line(&product, 1)],
                Some(VoucherCode::new("NOPE")?),
            )
            .await;

        assert!(
            matches!(
                result,
                Err(OrdersServiceError::Voucher(VoucherError::UnknownCode))
            ),
            "expected UnknownCode, got {result:?}"
        );

        assert!(ctx.orders.list_orders(customer.uuid).await?.is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn catalog_price_change_does_not_reprice_captured_line() -> TestResult {
        let ctx = TestContext::new().await;
        let customer = ctx.create_customer("Wanjiku").await?;
        let product = create_product(&ctx, 10_000).await?;

        let captured = line(&product, 1);

        ctx.products
            .update_product(
                product.uuid,
                ProductUpdate {
                    name: product.name.clone(),
                    category: product.category.clone(),
                    price: 12_000,
                    original_price: None,
                    in_stock: true,
                },
            )
            .await?;

        let order = ctx
            .orders
            .submit_order(customer.uuid, cash_order(&[captured]))
            .await?;

        assert_eq!(order.amounts.subtotal, 10_000);
        assert_eq!(order.amounts.total, 13_100);
        assert_eq!(order.lines.first().map(|line| line.unit_price), Some(10_000));

        Ok(())
    }

    #[tokio::test]
    async fn sale_line_must_carry_sale_price() -> TestResult {
        let ctx = TestContext::new().await;
        let customer = ctx.create_customer("Wanjiku").await?;
        let product = create_product(&ctx, 10_000).await?;
        let sale = create_flash_sale(&ctx, product.uuid, 7_500, Some(5)).await?;

        let result = ctx
            .orders
            .submit_order(
                customer.uuid,
                cash_order(&[CheckoutLine {
                    unit_price: 5_000,
                    ..sale_line(&sale, 1)
                }]),
            )
            .await;

        assert!(
            matches!(
                result,
                Err(OrdersServiceError::Validation(CheckoutError::SalePriceMismatch {
                    sale_price: 7_500,
                    captured: 5_000,
                    ..
                }))
            ),
            "expected SalePriceMismatch, got {result:?}"
        );

        let sale = ctx.flash_sales.get_flash_sale(sale.uuid).await?;

        assert_eq!(sale.sale.sold_quantity, 0);

        Ok(())
    }

    #[tokio::test]
    async fn unpriced_line_is_rejected() -> TestResult {
        let ctx = TestContext::new().await;
        let product = create_product(&ctx, 10_000).await?;

        let result = ctx
            .orders
            .quote_cart(
                vec![CheckoutLine {
                    unit_price: 0,
                    ..line(&product, 1)
                }],
                None,
            )
            .await;

        assert!(
            matches!(
                result,
                Err(OrdersServiceError::Validation(CheckoutError::MissingUnitPrice(0)))
            ),
            "expected MissingUnitPrice, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn cash_order_claims_flash_sale_stock_and_refuses_oversell() -> TestResult {
        let ctx = TestContext::new().await;
        let customer = ctx.create_customer("Wanjiku").await?;
        let product = create_product(&ctx, 10_000).await?;
        let sale = create_flash_sale(&ctx, product.uuid, 7_500, Some(5)).await?;

        let order = ctx
            .orders
            .submit_order(
                customer.uuid,
                cash_order(&[sale_line(&sale, 4)]),
            )
            .await?;

        assert_eq!(order.status, OrderStatus::Processing);
        assert_eq!(order.amounts.subtotal, 30_000);

        let result = ctx
            .orders
            .submit_order(
                customer.uuid,
                cash_order(&[sale_line(&sale, 2)]),
            )
            .await;

        assert!(
            matches!(
                result,
                Err(OrdersServiceError::FlashSale(FlashSaleError::InsufficientQuantity {
                    requested: 2,
                    available: 1
                }))
            ),
            "expected InsufficientQuantity, got {result:?}"
        );

        let sale = ctx.flash_sales.get_flash_sale(sale.uuid).await?;

        assert_eq!(sale.sale.sold_quantity, 4);
        assert_eq!(ctx.orders.list_orders(customer.uuid).await?.len(), 1);

        Ok(())
    }

    #[tokio::test]
    async fn merged_lines_are_checked_against_sale_together() -> TestResult {
        let ctx = TestContext::new().await;
        let customer = ctx.create_customer("Wanjiku").await?;
        let product = create_product(&ctx, 10_000).await?;
        let sale = create_flash_sale(&ctx, product.uuid, 7_500, Some(3)).await?;

        let result = ctx
            .orders
            .submit_order(
                customer.uuid,
                cash_order(&[sale_line(&sale, 2), sale_line(&sale, 2)]),
            )
            .await;

        assert!(
            result.as_ref().is_err_and(OrdersServiceError::is_capacity),
            "expected a capacity error, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn out_of_stock_product_is_rejected() -> TestResult {
        let ctx = TestContext::new().await;
        let customer = ctx.create_customer("Wanjiku").await?;
        let product = create_product(&ctx, 10_000).await?;

        ctx.products
            .update_product(
                product.uuid,
                ProductUpdate {
                    name: product.name.clone(),
                    category: product.category.clone(),
                    price: product.price,
                    original_price: None,
                    in_stock: false,
                },
            )
            .await?;

        let result = ctx
            .orders
            .submit_order(customer.uuid, cash_order(&[line(&product, 1)]))
            .await;

        assert!(
            matches!(
                result,
                Err(OrdersServiceError::Validation(CheckoutError::OutOfStock(uuid))) if uuid == product.uuid
            ),
            "expected OutOfStock, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn cancel_twice_is_already_processed() -> TestResult {
        let ctx = TestContext::new().await;
        let customer = ctx.create_customer("Wanjiku").await?;
        let admin = ctx.create_admin("Otieno").await?;
        let product = create_product(&ctx, 10_000).await?;

        let order = ctx
            .orders
            .submit_order(customer.uuid, mobile_order(&[line(&product, 1)])?)
            .await?;

        let cancelled = ctx.orders.cancel_order(customer.uuid, order.uuid).await?;

        assert_eq!(cancelled.status, OrderStatus::Cancelled);

        let result = ctx.orders.cancel_order(customer.uuid, order.uuid).await;

        assert!(
            matches!(
                result,
                Err(OrdersServiceError::AlreadyProcessed(OrderStatus::Cancelled))
            ),
            "expected AlreadyProcessed, got {result:?}"
        );

        let summary = ctx.payments.payment_summary(admin.uuid).await?;

        assert_eq!(summary.pending, 0);
        assert_eq!(summary.rejected, 1);

        Ok(())
    }

    #[tokio::test]
    async fn other_users_order_is_not_found() -> TestResult {
        let ctx = TestContext::new().await;
        let owner = ctx.create_customer("Wanjiku").await?;
        let stranger = ctx.create_customer("Kamau").await?;
        let product = create_product(&ctx, 10_000).await?;

        let order = ctx
            .orders
            .submit_order(owner.uuid, mobile_order(&[line(&product, 1)])?)
            .await?;

        let result = ctx.orders.cancel_order(stranger.uuid, order.uuid).await;

        assert!(
            matches!(result, Err(OrdersServiceError::NotFound)),
            "expected NotFound, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn fulfilment_follows_status_table() -> TestResult {
        let ctx = TestContext::new().await;
        let customer = ctx.create_customer("Wanjiku").await?;
        let admin = ctx.create_admin("Otieno").await?;
        let product = create_product(&ctx, 10_000).await?;

        let order = ctx
            .orders
            .submit_order(customer.uuid, cash_order(&[line(&product, 1)]))
            .await?;

        let result = ctx
            .orders
            .advance_fulfilment(customer.uuid, order.uuid, OrderStatus::Shipped)
            .await;

        assert!(
            matches!(result, Err(OrdersServiceError::Permission)),
            "expected Permission, got {result:?}"
        );

        let result = ctx
            .orders
            .advance_fulfilment(admin.uuid, order.uuid, OrderStatus::Delivered)
            .await;

        assert!(
            matches!(
                result,
                Err(OrdersServiceError::InvalidTransition {
                    from: OrderStatus::Processing,
                    to: OrderStatus::Delivered
                })
            ),
            "expected InvalidTransition, got {result:?}"
        );

        let shipped = ctx
            .orders
            .advance_fulfilment(admin.uuid, order.uuid, OrderStatus::Shipped)
            .await?;

        assert_eq!(shipped.status, OrderStatus::Shipped);

        let delivered = ctx
            .orders
            .advance_fulfilment(admin.uuid, order.uuid, OrderStatus::Delivered)
            .await?;

        assert_eq!(delivered.status, OrderStatus::Delivered);

        Ok(())
    }

    #[tokio::test]
    async fn empty_cart_is_rejected() -> TestResult {
        let ctx = TestContext::new().await;
        let customer = ctx.create_customer("Wanjiku").await?;

        let result = ctx.orders.submit_order(customer.uuid, cash_order(&[])).await;

        assert!(
            matches!(
                result,
                Err(OrdersServiceError::Validation(CheckoutError::EmptyCart))
            ),
            "expected EmptyCart, got {result:?}"
        );

        Ok(())
    }
}
