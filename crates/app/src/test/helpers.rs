//! Test Helpers

use jiff::{Timestamp, ToSpan};
use soko::orders::{PaymentConfirmation, PaymentMethod, PaymentMethodError};

use crate::{
    domain::{
        flash_sales::{
            FlashSalesService, FlashSalesServiceError,
            data::NewFlashSale,
            records::{FlashSaleRecord, FlashSaleUuid},
        },
        orders::{
            data::{CheckoutLine, NewOrder},
            records::{CustomerContact, OrderUuid},
        },
        products::{
            ProductsService, ProductsServiceError,
            data::NewProduct,
            records::{ProductRecord, ProductUuid},
        },
    },
    test::TestContext,
};

/// Message a customer pastes after paying by mobile money.
pub(crate) const PAYMENT_MESSAGE: &str =
    "QGH7XK2M9P Confirmed. Ksh13,100.00 sent to SOKO STORE on 19/10/26 at 10:04 AM.";

pub(crate) async fn create_product(
    ctx: &TestContext,
    price: u64,
) -> Result<ProductRecord, ProductsServiceError> {
    ctx.products
        .create_product(NewProduct {
            uuid: ProductUuid::new(),
            name: "HP EliteBook 840".to_string(),
            category: "laptops".to_string(),
            price,
            original_price: None,
            in_stock: true,
        })
        .await
}

/// A sale that started an hour ago and runs for three more.
pub(crate) async fn create_flash_sale(
    ctx: &TestContext,
    product: ProductUuid,
    sale_price: u64,
    quantity_limit: Option<u32>,
) -> Result<FlashSaleRecord, FlashSalesServiceError> {
    let now = Timestamp::now();

    ctx.flash_sales
        .create_flash_sale(NewFlashSale {
            uuid: FlashSaleUuid::new(),
            product,
            sale_price,
            starts_at: now - 1.hour(),
            ends_at: now + 3.hours(),
            quantity_limit,
            active: true,
        })
        .await
}

/// A line for `product` at the price it carries right now.
pub(crate) fn line(product: &ProductRecord, quantity: u32) -> CheckoutLine {
    CheckoutLine {
        product: product.uuid,
        flash_sale: None,
        quantity,
        unit_price: product.price,
    }
}

/// A line bought under `sale` at its sale price.
pub(crate) fn sale_line(sale: &FlashSaleRecord, quantity: u32) -> CheckoutLine {
    CheckoutLine {
        product: sale.product_uuid(),
        flash_sale: Some(sale.uuid),
        quantity,
        unit_price: sale.sale.sale_price,
    }
}

fn new_order(lines: &[CheckoutLine], method: PaymentMethod) -> NewOrder {
    NewOrder {
        uuid: OrderUuid::new(),
        lines: lines.to_vec(),
        customer: CustomerContact {
            name: "Wanjiku Kamau".to_string(),
            email: "wanjiku@example.com".to_string(),
            phone: Some("0712345678".to_string()),
        },
        shipping_address: "Moi Avenue, Nairobi".to_string(),
        voucher_code: None,
        payment_method: method,
    }
}

pub(crate) fn cash_order(lines: &[CheckoutLine]) -> NewOrder {
    new_order(lines, PaymentMethod::CashOnDelivery)
}

pub(crate) fn mobile_order(lines: &[CheckoutLine]) -> Result<NewOrder, PaymentMethodError> {
    let confirmation = PaymentConfirmation::new(PAYMENT_MESSAGE, Some("0712345678"))?;

    Ok(new_order(lines, PaymentMethod::MobileMoney(confirmation)))
}
