pub mod aggregate;
pub mod decode;
pub mod job;
pub mod report;

pub use job::{DigestJob, JobSettings};
