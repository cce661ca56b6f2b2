//! Soko prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    cart::{Cart, CartError, CartLine},
    flash_sales::{Countdown, FlashSale, FlashSaleError},
    lifecycle::{Lifecycle, TransitionError},
    money::{AmountError, STORE_CURRENCY, format_amount},
    orders::{
        OrderStatus, PaymentConfirmation, PaymentMethod, PaymentMethodError, PaymentMethodKind,
        UnknownStatus,
    },
    payments::{
        PaymentChannel, PaymentChannelKind, PaymentStatus, TransactionCode,
        extract_transaction_code,
    },
    pricing::{PricingConfig, PricingError, Quote, quote},
    vouchers::{Voucher, VoucherCode, VoucherDiscount, VoucherError},
};
