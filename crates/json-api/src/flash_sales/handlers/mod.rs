//! Flash Sale Handlers

pub(crate) mod availability;
pub(crate) mod create;
pub(crate) mod get;
pub(crate) mod live;
