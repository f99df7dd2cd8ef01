pub mod cache;
pub mod config;
pub mod error;
pub mod exchange;
pub mod models;
pub mod stream;
#[cfg(test)]
pub mod test_helpers;
