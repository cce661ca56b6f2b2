//! App Router

use salvo::Router;

use crate::{auth, flash_sales, orders, payments, products, vouchers};

/// Every authenticated route. Catalog, voucher and flash sale administration
/// sits behind the admin hoop; payment decisions and fulfilment check the
/// role in their services.
pub(crate) fn app_router() -> Router {
    Router::new()
        .hoop(auth::middleware::handler)
        .push(
            Router::with_path("products")
                .get(products::index::handler)
                .push(Router::with_path("{product}").get(products::get::handler)),
        )
        .push(Router::with_path("quotes").post(orders::quote::handler))
        .push(
            Router::with_path("orders")
                .get(orders::index::handler)
                .post(orders::submit::handler)
                .push(
                    Router::with_path("{order}")
                        .get(orders::get::handler)
                        .push(Router::with_path("cancel").post(orders::cancel::handler))
                        .push(
                            Router::with_path("payments")
                                .get(payments::order_index::handler)
                                .post(payments::submit::handler),
                        ),
                ),
        )
        .push(
            Router::with_path("flash-sales")
                .get(flash_sales::live::handler)
                .push(
                    Router::with_path("{sale}")
                        .get(flash_sales::get::handler)
                        .push(
                            Router::with_path("availability")
                                .get(flash_sales::availability::handler),
                        ),
                ),
        )
        .push(admin_router())
}

fn admin_router() -> Router {
    Router::with_path("admin")
        .push(
            Router::with_path("payments")
                .get(payments::index::handler)
                .push(Router::with_path("summary").get(payments::summary::handler))
                .push(
                    Router::with_path("{payment}")
                        .push(Router::with_path("confirm").post(payments::confirm::handler))
                        .push(Router::with_path("reject").post(payments::reject::handler)),
                ),
        )
        .push(
            Router::with_path("orders/{order}/fulfilment").post(orders::fulfil::handler),
        )
        .push(
            Router::new()
                .hoop(auth::middleware::require_admin)
                .push(
                    Router::with_path("products")
                        .post(products::create::handler)
                        .push(Router::with_path("{product}").put(products::update::handler)),
                )
                .push(
                    Router::with_path("vouchers")
                        .get(vouchers::index::handler)
                        .post(vouchers::create::handler)
                        .push(
                            Router::with_path("{voucher}")
                                .push(Router::with_path("active").put(vouchers::activate::handler))
                                .push(Router::with_path("usages").get(vouchers::usages::handler)),
                        ),
                )
                .push(Router::with_path("flash-sales").post(flash_sales::create::handler)),
        )
}
