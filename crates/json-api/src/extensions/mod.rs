//! Extension traits

mod depot;
mod result;
mod timestamps;

pub(crate) use depot::{DepotExt as _, UserDepotExt as _};
pub(crate) use result::ResultExt as _;
pub(crate) use timestamps::{AtQueryExt as _, parse_optional_timestamp, parse_timestamp};
