//! Payment Errors

use salvo::http::StatusError;
use soko_app::domain::payments::PaymentsServiceError;
use tracing::error;

pub(crate) fn into_status_error(error: PaymentsServiceError) -> StatusError {
    match error {
        PaymentsServiceError::MissingConfirmation(_)
        | PaymentsServiceError::InvalidAmount
        | PaymentsServiceError::NotMobileMoney => StatusError::bad_request().brief(error.to_string()),
        PaymentsServiceError::OrderNotPending(_)
        | PaymentsServiceError::AlreadyProcessed(_)
        | PaymentsServiceError::InvalidTransition { .. }
        | PaymentsServiceError::FlashSaleSoldOut(_) => {
            StatusError::conflict().brief(error.to_string())
        }
        PaymentsServiceError::NotFound => StatusError::not_found().brief("Payment not found"),
        PaymentsServiceError::Permission => StatusError::forbidden().brief("Admin role required"),
        PaymentsServiceError::AlreadyExists => {
            StatusError::conflict().brief("Payment already exists")
        }
        PaymentsServiceError::InvalidReference
        | PaymentsServiceError::MissingRequiredData
        | PaymentsServiceError::InvalidData => {
            StatusError::bad_request().brief("Invalid payment payload")
        }
        PaymentsServiceError::Sql(source) => {
            error!("payment storage error: {source}");

            StatusError::internal_server_error()
        }
    }
}

#[cfg(test)]
mod tests {
    use salvo::http::StatusCode;
    use soko::{
        orders::{OrderStatus, PaymentMethodError},
        payments::PaymentStatus,
    };

    use super::*;

    fn status(error: PaymentsServiceError) -> StatusCode {
        into_status_error(error).code
    }

    #[test]
    fn taxonomy_maps_to_http_statuses() {
        assert_eq!(
            status(PaymentsServiceError::MissingConfirmation(
                PaymentMethodError::MissingConfirmation
            )),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(status(PaymentsServiceError::InvalidAmount), StatusCode::BAD_REQUEST);
        assert_eq!(
            status(PaymentsServiceError::OrderNotPending(OrderStatus::Cancelled)),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status(PaymentsServiceError::AlreadyProcessed(PaymentStatus::Confirmed)),
            StatusCode::CONFLICT
        );
        assert_eq!(status(PaymentsServiceError::NotFound), StatusCode::NOT_FOUND);
        assert_eq!(status(PaymentsServiceError::Permission), StatusCode::FORBIDDEN);
    }
}
