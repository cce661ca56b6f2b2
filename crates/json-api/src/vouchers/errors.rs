//! Voucher Errors

use salvo::http::StatusError;
use soko_app::domain::vouchers::VouchersServiceError;
use tracing::error;

pub(crate) fn into_status_error(error: VouchersServiceError) -> StatusError {
    match error {
        VouchersServiceError::AlreadyExists => {
            StatusError::conflict().brief("Voucher code already exists")
        }
        VouchersServiceError::NotFound => StatusError::not_found().brief("Voucher not found"),
        VouchersServiceError::Validation(reason) => {
            StatusError::bad_request().brief(reason.to_string())
        }
        VouchersServiceError::InvalidReference
        | VouchersServiceError::MissingRequiredData
        | VouchersServiceError::InvalidData => {
            StatusError::bad_request().brief("Invalid voucher payload")
        }
        VouchersServiceError::Sql(source) => {
            error!("voucher storage error: {source}");

            StatusError::internal_server_error()
        }
    }
}
