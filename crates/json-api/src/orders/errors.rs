//! Order Errors

use salvo::http::StatusError;
use soko_app::domain::orders::OrdersServiceError;
use tracing::error;

pub(crate) fn into_status_error(error: OrdersServiceError) -> StatusError {
    if error.is_capacity() {
        return StatusError::conflict().brief(error.to_string());
    }

    match error {
        OrdersServiceError::Validation(_)
        | OrdersServiceError::Voucher(_)
        | OrdersServiceError::FlashSale(_)
        | OrdersServiceError::Pricing(_) => StatusError::bad_request().brief(error.to_string()),
        OrdersServiceError::NotFound => StatusError::not_found().brief("Order not found"),
        OrdersServiceError::AlreadyProcessed(_)
        | OrdersServiceError::InvalidTransition { .. }
        | OrdersServiceError::VoucherExhausted
        | OrdersServiceError::FlashSaleSoldOut(_) => StatusError::conflict().brief(error.to_string()),
        OrdersServiceError::AlreadyExists => StatusError::conflict().brief("Order already exists"),
        OrdersServiceError::Permission => StatusError::forbidden().brief("Admin role required"),
        OrdersServiceError::InvalidReference
        | OrdersServiceError::MissingRequiredData
        | OrdersServiceError::InvalidData => {
            StatusError::bad_request().brief("Invalid order payload")
        }
        OrdersServiceError::Sql(source) => {
            error!("order storage error: {source}");

            StatusError::internal_server_error()
        }
    }
}
