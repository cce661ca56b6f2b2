//! Order Handlers

pub(crate) mod cancel;
pub(crate) mod fulfil;
pub(crate) mod get;
pub(crate) mod index;
pub(crate) mod quote;
pub(crate) mod submit;
