pub mod digest;
pub mod row;
pub mod summary;
