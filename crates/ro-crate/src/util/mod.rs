//! Utility modules: lexical validators and the dot-notation flattener.

pub mod datetime;
pub mod flatten;
pub mod uri;

pub use datetime::is_valid_iso8601_date;
pub use flatten::{DEFAULT_SEPARATOR, flatten, unflatten};
pub use uri::{is_valid_uri, is_valid_url};
