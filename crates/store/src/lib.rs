pub mod blob;
pub mod connection;

pub use blob::{ObjectName, Store};
