//! Identity Data

use crate::auth::records::UserUuid;

/// New User Data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub uuid: UserUuid,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
}
