//! Soko application services: persistence, identity and notifications for the
//! order and payment workflow.

pub mod auth;
pub mod context;
pub mod database;
pub mod domain;
pub mod notifications;

#[cfg(test)]
mod test;

mod uuids;

pub use uuids::TypedUuid;
