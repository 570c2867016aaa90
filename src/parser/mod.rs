//! Parsing of the download target.
//!
//! - [`TargetUrl`] - splits `http://host[:port]/path` into its parts

mod error;
mod url;

pub use error::ParseError;
pub use url::{DEFAULT_PORT, TargetUrl};
