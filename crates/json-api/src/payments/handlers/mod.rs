//! Payment Handlers

pub(crate) mod confirm;
pub(crate) mod index;
pub(crate) mod order_index;
pub(crate) mod reject;
pub(crate) mod submit;
pub(crate) mod summary;
