//! Payments service.

use std::sync::Arc;

use async_trait::async_trait;
use mockall::automock;
use soko::{
    lifecycle::Lifecycle,
    orders::{OrderStatus, PaymentConfirmation, PaymentMethodKind},
    payments::PaymentStatus,
};
use sqlx::{Postgres, Transaction};
use tracing::info;

use crate::{
    auth::{PgAuthRepository, Role, UserUuid},
    database::Db,
    domain::{
        flash_sales::repository::PgFlashSalesRepository,
        orders::{
            records::{OrderRecord, OrderUuid},
            repository::PgOrdersRepository,
        },
        payments::{
            PaymentsServiceError,
            data::{PaymentFilter, PaymentSubmission},
            records::{PaymentRecord, PaymentSummary, PaymentUuid},
            repository::PgPaymentsRepository,
        },
    },
    notifications::{Notification, Notifier, dispatch},
};

#[derive(Clone)]
pub struct PgPaymentsService {
    db: Db,
    notifier: Arc<dyn Notifier>,
    payments: PgPaymentsRepository,
    orders: PgOrdersRepository,
    flash_sales: PgFlashSalesRepository,
    auth: PgAuthRepository,
}

impl PgPaymentsService {
    #[must_use]
    pub fn new(db: Db, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            db,
            notifier,
            payments: PgPaymentsRepository::new(),
            orders: PgOrdersRepository::new(),
            flash_sales: PgFlashSalesRepository::new(),
            auth: PgAuthRepository::new(),
        }
    }

    async fn require_admin(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: UserUuid,
    ) -> Result<(), PaymentsServiceError> {
        if self.auth.has_role(tx, user, Role::Admin).await? {
            Ok(())
        } else {
            Err(PaymentsServiceError::Permission)
        }
    }

    /// Lock in an admin decision on a pending record.
    async fn decide(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        admin: UserUuid,
        payment: PaymentUuid,
        status: PaymentStatus,
    ) -> Result<PaymentRecord, PaymentsServiceError> {
        let current = self.payments.get_payment_record(tx, payment).await?;

        current
            .status
            .transition(status)
            .map_err(|_| PaymentsServiceError::AlreadyProcessed(current.status))?;

        match self
            .payments
            .decide_payment_record(tx, payment, status, admin)
            .await?
        {
            Some(record) => Ok(record),
            None => {
                let current = self.payments.get_payment_record(tx, payment).await?;

                Err(PaymentsServiceError::AlreadyProcessed(current.status))
            }
        }
    }

    /// Move the paid-for order out of pending.
    async fn settle_order(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: OrderUuid,
        to: OrderStatus,
    ) -> Result<OrderRecord, PaymentsServiceError> {
        let mut record = self.orders.get_order(tx, order).await?;

        let moved = self
            .orders
            .transition_order_status(tx, order, OrderStatus::Pending, to)
            .await?;

        if moved == 0 {
            let current = self.orders.get_order(tx, order).await?;

            return Err(PaymentsServiceError::InvalidTransition {
                from: current.status,
                to,
            });
        }

        record.status = to;

        Ok(record)
    }

    fn notify_decision(&self, payment: &PaymentRecord, order: &OrderRecord) {
        let (order_uuid, payment_uuid, customer_name, phone, amount) = (
            order.uuid,
            payment.uuid,
            order.customer.name.clone(),
            order.customer.phone.clone(),
            payment.amount,
        );

        let notification = match payment.status {
            PaymentStatus::Confirmed => Notification::PaymentConfirmed {
                order: order_uuid,
                payment: payment_uuid,
                customer_name,
                phone,
                amount,
            },
            PaymentStatus::Rejected => Notification::PaymentRejected {
                order: order_uuid,
                payment: payment_uuid,
                customer_name,
                phone,
                amount,
            },
            PaymentStatus::Pending => return,
        };

        dispatch(&self.notifier, notification);
    }
}

#[async_trait]
impl PaymentsService for PgPaymentsService {
    #[tracing::instrument(
        name = "payments.service.submit_payment",
        skip(self, submission),
        fields(user_uuid = %user, order_uuid = %order),
        err
    )]
    async fn submit_payment(
        &self,
        user: UserUuid,
        order: OrderUuid,
        submission: PaymentSubmission,
    ) -> Result<PaymentRecord, PaymentsServiceError> {
        let confirmation =
            PaymentConfirmation::new(&submission.message, submission.phone.as_deref())?
                .with_channel(submission.channel);

        if submission.amount == 0 {
            return Err(PaymentsServiceError::InvalidAmount);
        }

        let mut tx = self.db.begin().await?;

        let record = self.orders.get_user_order(&mut tx, user, order).await?;

        if record.payment_method != PaymentMethodKind::MobileMoney {
            return Err(PaymentsServiceError::NotMobileMoney);
        }

        if record.status != OrderStatus::Pending {
            return Err(PaymentsServiceError::OrderNotPending(record.status));
        }

        let updated = self
            .payments
            .update_pending_payment_record(&mut tx, order, &confirmation, submission.amount)
            .await?;

        let payment = match updated {
            Some(payment) => payment,
            None => {
                self.payments
                    .create_payment_record(&mut tx, order, &confirmation, submission.amount)
                    .await?
            }
        };

        tx.commit().await?;

        info!(
            payment_uuid = %payment.uuid,
            channel = %payment.channel.kind(),
            has_transaction_code = payment.transaction_code.is_some(),
            "submitted payment"
        );

        Ok(payment)
    }

    #[tracing::instrument(
        name = "payments.service.confirm_payment",
        skip(self),
        fields(admin_uuid = %admin, payment_uuid = %payment),
        err
    )]
    async fn confirm_payment(
        &self,
        admin: UserUuid,
        payment: PaymentUuid,
    ) -> Result<PaymentRecord, PaymentsServiceError> {
        let mut tx = self.db.begin().await?;

        self.require_admin(&mut tx, admin).await?;

        let record = self
            .decide(&mut tx, admin, payment, PaymentStatus::Confirmed)
            .await?;

        let order = self
            .settle_order(&mut tx, record.order_uuid, OrderStatus::Processing)
            .await?;

        for (sale, quantity) in order.flash_sale_claims() {
            let claimed = self
                .flash_sales
                .claim_flash_sale_inventory(&mut tx, sale, quantity)
                .await?;

            if claimed == 0 {
                return Err(PaymentsServiceError::FlashSaleSoldOut(sale));
            }
        }

        tx.commit().await?;

        info!(order_uuid = %order.uuid, amount = record.amount, "confirmed payment");

        self.notify_decision(&record, &order);

        Ok(record)
    }

    #[tracing::instrument(
        name = "payments.service.reject_payment",
        skip(self),
        fields(admin_uuid = %admin, payment_uuid = %payment),
        err
    )]
    async fn reject_payment(
        &self,
        admin: UserUuid,
        payment: PaymentUuid,
    ) -> Result<PaymentRecord, PaymentsServiceError> {
        let mut tx = self.db.begin().await?;

        self.require_admin(&mut tx, admin).await?;

        let record = self
            .decide(&mut tx, admin, payment, PaymentStatus::Rejected)
            .await?;

        let order = self
            .settle_order(&mut tx, record.order_uuid, OrderStatus::Cancelled)
            .await?;

        tx.commit().await?;

        info!(order_uuid = %order.uuid, "rejected payment");

        self.notify_decision(&record, &order);

        Ok(record)
    }

    async fn list_payments(
        &self,
        admin: UserUuid,
        filter: PaymentFilter,
    ) -> Result<Vec<PaymentRecord>, PaymentsServiceError> {
        let mut tx = self.db.begin().await?;

        self.require_admin(&mut tx, admin).await?;

        let payments = self.payments.list_payment_records(&mut tx, &filter).await?;

        tx.commit().await?;

        Ok(payments)
    }

    async fn list_order_payments(
        &self,
        user: UserUuid,
        order: OrderUuid,
    ) -> Result<Vec<PaymentRecord>, PaymentsServiceError> {
        let mut tx = self.db.begin().await?;

        self.orders.get_user_order(&mut tx, user, order).await?;

        let payments = self
            .payments
            .list_order_payment_records(&mut tx, order)
            .await?;

        tx.commit().await?;

        Ok(payments)
    }

    async fn payment_summary(&self, admin: UserUuid) -> Result<PaymentSummary, PaymentsServiceError> {
        let mut tx = self.db.begin().await?;

        self.require_admin(&mut tx, admin).await?;

        let summary = self.payments.count_payment_records_by_status(&mut tx).await?;

        tx.commit().await?;

        Ok(summary)
    }
}

#[automock]
#[async_trait]
pub trait PaymentsService: Send + Sync {
    /// Submit or replace the pending payment for a pending mobile-money order.
    async fn submit_payment(
        &self,
        user: UserUuid,
        order: OrderUuid,
        submission: PaymentSubmission,
    ) -> Result<PaymentRecord, PaymentsServiceError>;

    /// Confirm a pending payment, move its order to processing and claim any
    /// flash-sale stock. Nothing changes if the stock is gone. Admin only.
    async fn confirm_payment(
        &self,
        admin: UserUuid,
        payment: PaymentUuid,
    ) -> Result<PaymentRecord, PaymentsServiceError>;

    /// Reject a pending payment and cancel its order. Admin only.
    async fn reject_payment(
        &self,
        admin: UserUuid,
        payment: PaymentUuid,
    ) -> Result<PaymentRecord, PaymentsServiceError>;

    /// Payment records matching `filter`, newest first. Admin only.
    async fn list_payments(
        &self,
        admin: UserUuid,
        filter: PaymentFilter,
    ) -> Result<Vec<PaymentRecord>, PaymentsServiceError>;

    /// Payment records of one of the user's orders, newest first.
    async fn list_order_payments(
        &self,
        user: UserUuid,
        order: OrderUuid,
    ) -> Result<Vec<PaymentRecord>, PaymentsServiceError>;

    /// Count of records per status. Admin only.
    async fn payment_summary(&self, admin: UserUuid) -> Result<PaymentSummary, PaymentsServiceError>;
}
