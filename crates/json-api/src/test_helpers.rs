//! Test helpers.

use std::sync::Arc;

use jiff::Timestamp;
use salvo::{affix_state::inject, prelude::*};
use soko::{
    orders::{OrderStatus, PaymentMethodKind},
    payments::{PaymentChannel, PaymentStatus},
    pricing::Quote,
};
use soko_app::{
    auth::{MockAuthService, UserUuid},
    context::AppContext,
    domain::{
        flash_sales::MockFlashSalesService,
        orders::{
            MockOrdersService,
            records::{CustomerContact, OrderLineRecord, OrderLineUuid, OrderRecord, OrderUuid},
        },
        payments::{
            MockPaymentsService,
            records::{PaymentRecord, PaymentUuid},
        },
        products::{
            MockProductsService,
            records::{ProductRecord, ProductUuid},
        },
        vouchers::MockVouchersService,
    },
};
use uuid::Uuid;

use crate::{extensions::*, state::State};

pub(crate) const TEST_USER_UUID: UserUuid = UserUuid::from_uuid(Uuid::nil());

#[salvo::handler]
pub(crate) async fn inject_user(
    req: &mut Request,
    depot: &mut Depot,
    res: &mut Response,
    ctrl: &mut FlowCtrl,
) {
    depot.insert_user_uuid(TEST_USER_UUID);
    ctrl.call_next(req, depot, res).await;
}

/// One mock per service. A mock without expectations fails any call made to it.
#[derive(Default)]
pub(crate) struct TestServices {
    pub(crate) products: MockProductsService,
    pub(crate) vouchers: MockVouchersService,
    pub(crate) flash_sales: MockFlashSalesService,
    pub(crate) orders: MockOrdersService,
    pub(crate) payments: MockPaymentsService,
    pub(crate) auth: MockAuthService,
}

impl TestServices {
    pub(crate) fn into_state(self) -> Arc<State> {
        State::from_app_context(AppContext {
            products: Arc::new(self.products),
            vouchers: Arc::new(self.vouchers),
            flash_sales: Arc::new(self.flash_sales),
            orders: Arc::new(self.orders),
            payments: Arc::new(self.payments),
            auth: Arc::new(self.auth),
        })
    }

    /// Serve `route` as [`TEST_USER_UUID`], skipping bearer authentication.
    pub(crate) fn service(self, route: Router) -> Service {
        Service::new(
            Router::new()
                .hoop(inject(self.into_state()))
                .hoop(inject_user)
                .push(route),
        )
    }
}

pub(crate) fn make_product(uuid: ProductUuid, price: u64) -> ProductRecord {
    ProductRecord {
        uuid,
        name: "Wireless Earbuds".to_string(),
        category: "audio".to_string(),
        price,
        original_price: None,
        in_stock: true,
        created_at: Timestamp::UNIX_EPOCH,
        updated_at: Timestamp::UNIX_EPOCH,
    }
}

/// A 10,000 order with default rates and no voucher.
pub(crate) fn make_order(uuid: OrderUuid, status: OrderStatus) -> OrderRecord {
    let product = ProductUuid::new();

    OrderRecord {
        uuid,
        user_uuid: TEST_USER_UUID,
        customer: CustomerContact {
            name: "Wanjiku Kamau".to_string(),
            email: "wanjiku@example.com".to_string(),
            phone: Some("0712345678".to_string()),
        },
        shipping_address: "Moi Avenue, Nairobi".to_string(),
        payment_method: PaymentMethodKind::MobileMoney,
        voucher_uuid: None,
        amounts: Quote {
            subtotal: 10_000,
            shipping_fee: 1_500,
            tax: 1_600,
            voucher_discount: 0,
            total: 13_100,
        },
        status,
        lines: vec![OrderLineRecord {
            uuid: OrderLineUuid::new(),
            order_uuid: uuid,
            product_uuid: product,
            flash_sale_uuid: None,
            quantity: 2,
            unit_price: 5_000,
            line_total: 10_000,
        }],
        created_at: Timestamp::UNIX_EPOCH,
        updated_at: Timestamp::UNIX_EPOCH,
    }
}

pub(crate) fn make_payment(
    uuid: PaymentUuid,
    order: OrderUuid,
    status: PaymentStatus,
) -> PaymentRecord {
    PaymentRecord {
        uuid,
        order_uuid: order,
        message: "QGH7XK2M9P Confirmed. Ksh131.00 sent to SOKO".to_string(),
        transaction_code: Some("QGH7XK2M9P".to_string()),
        phone: Some("0712345678".to_string()),
        channel: PaymentChannel::Mpesa,
        amount: 13_100,
        status,
        confirmed_by: None,
        confirmed_at: None,
        created_at: Timestamp::UNIX_EPOCH,
        updated_at: Timestamp::UNIX_EPOCH,
    }
}
