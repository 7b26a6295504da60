pub mod catalog;
pub mod links;
pub mod mapper;
mod model;
pub mod neighbors;
pub mod persist;
pub mod relevance;
pub mod stats;
pub mod table;
pub mod tags;

pub use model::*;

use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

/// Current UTC time as RFC 3339, used for `createdAt`/`updatedAt` stamps.
pub fn iso_now() -> String {
    OffsetDateTime::now_utc().format(&Rfc3339).unwrap_or_default()
}
