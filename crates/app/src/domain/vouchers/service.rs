//! Vouchers service.

use async_trait::async_trait;
use mockall::automock;
use soko::vouchers::{VoucherCode, VoucherError};
use tracing::info;

use crate::{
    database::Db,
    domain::vouchers::{
        VouchersServiceError,
        data::NewVoucher,
        records::{VoucherRecord, VoucherUsageRecord, VoucherUuid},
        repository::PgVouchersRepository,
    },
};

#[derive(Debug, Clone)]
pub struct PgVouchersService {
    db: Db,
    repository: PgVouchersRepository,
}

impl PgVouchersService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            repository: PgVouchersRepository::new(),
        }
    }
}

#[async_trait]
impl VouchersService for PgVouchersService {
    #[tracing::instrument(
        name = "vouchers.service.create_voucher",
        skip(self, voucher),
        fields(voucher_uuid = %voucher.uuid, code = %voucher.code),
        err
    )]
    async fn create_voucher(
        &self,
        voucher: NewVoucher,
    ) -> Result<VoucherRecord, VouchersServiceError> {
        voucher.discount.validate()?;

        let mut tx = self.db.begin().await?;

        let record = self.repository.create_voucher(&mut tx, &voucher).await?;

        tx.commit().await?;

        info!(voucher_uuid = %record.uuid, "created voucher");

        Ok(record)
    }

    async fn find_voucher(
        &self,
        code: &VoucherCode,
    ) -> Result<VoucherRecord, VouchersServiceError> {
        let mut tx = self.db.begin().await?;

        let voucher = self
            .repository
            .find_voucher_by_code(&mut tx, code)
            .await?
            .ok_or(VoucherError::UnknownCode)?;

        tx.commit().await?;

        Ok(voucher)
    }

    async fn list_vouchers(&self) -> Result<Vec<VoucherRecord>, VouchersServiceError> {
        let mut tx = self.db.begin().await?;

        let vouchers = self.repository.list_vouchers(&mut tx).await?;

        tx.commit().await?;

        Ok(vouchers)
    }

    #[tracing::instrument(
        name = "vouchers.service.set_voucher_active",
        skip(self),
        fields(voucher_uuid = %voucher),
        err
    )]
    async fn set_voucher_active(
        &self,
        voucher: VoucherUuid,
        active: bool,
    ) -> Result<VoucherRecord, VouchersServiceError> {
        let mut tx = self.db.begin().await?;

        let record = self
            .repository
            .set_voucher_active(&mut tx, voucher, active)
            .await?;

        tx.commit().await?;

        info!(voucher_uuid = %voucher, active, "changed voucher state");

        Ok(record)
    }

    async fn list_voucher_usages(
        &self,
        voucher: VoucherUuid,
    ) -> Result<Vec<VoucherUsageRecord>, VouchersServiceError> {
        let mut tx = self.db.begin().await?;

        self.repository.get_voucher(&mut tx, voucher).await?;

        let usages = self.repository.list_voucher_usages(&mut tx, voucher).await?;

        tx.commit().await?;

        Ok(usages)
    }
}

#[automock]
#[async_trait]
pub trait VouchersService: Send + Sync {
    /// Create a voucher after checking its discount is in range.
    async fn create_voucher(
        &self,
        voucher: NewVoucher,
    ) -> Result<VoucherRecord, VouchersServiceError>;

    /// Look a voucher up by its normalized code.
    async fn find_voucher(&self, code: &VoucherCode)
    -> Result<VoucherRecord, VouchersServiceError>;

    /// Every voucher, newest first.
    async fn list_vouchers(&self) -> Result<Vec<VoucherRecord>, VouchersServiceError>;

    /// Switch a voucher on or off.
    async fn set_voucher_active(
        &self,
        voucher: VoucherUuid,
        active: bool,
    ) -> Result<VoucherRecord, VouchersServiceError>;

    /// Redemptions of a voucher, newest first.
    async fn list_voucher_usages(
        &self,
        voucher: VoucherUuid,
    ) -> Result<Vec<VoucherUsageRecord>, VouchersServiceError>;
}
