pub mod articles;
pub mod summary;
