//! Voucher Handlers

pub(crate) mod activate;
pub(crate) mod create;
pub(crate) mod index;
pub(crate) mod usages;
