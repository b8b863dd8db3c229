pub mod download;
pub mod handle;
