//! Flash Sale Errors

use salvo::http::StatusError;
use soko_app::domain::flash_sales::FlashSalesServiceError;
use tracing::error;

pub(crate) fn into_status_error(error: FlashSalesServiceError) -> StatusError {
    match error {
        FlashSalesServiceError::AlreadyExists => {
            StatusError::conflict().brief("Flash sale already exists")
        }
        FlashSalesServiceError::NotFound => StatusError::not_found().brief("Flash sale not found"),
        FlashSalesServiceError::Guard(reason) if reason.is_capacity() => {
            StatusError::conflict().brief(reason.to_string())
        }
        FlashSalesServiceError::Guard(reason) => {
            StatusError::bad_request().brief(reason.to_string())
        }
        FlashSalesServiceError::InvalidReference => {
            StatusError::bad_request().brief("Product does not exist")
        }
        FlashSalesServiceError::MissingRequiredData | FlashSalesServiceError::InvalidData => {
            StatusError::bad_request().brief("Invalid flash sale payload")
        }
        FlashSalesServiceError::Sql(source) => {
            error!("flash sale storage error: {source}");

            StatusError::internal_server_error()
        }
    }
}
