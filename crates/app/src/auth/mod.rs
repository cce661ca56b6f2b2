//! Authentication and authorization

pub mod data;
mod errors;
pub mod records;
mod repository;
mod service;
mod token;

pub use errors::*;
pub use records::{IssuedSession, Role, SessionRecord, SessionUuid, UserRecord, UserUuid};
pub(crate) use repository::PgAuthRepository;
pub use service::*;
pub use token::*;
