pub mod config;
pub mod error;
pub mod model;
pub mod naming;
pub mod time;

pub use error::{DigestError, ErrorKind, Result};
