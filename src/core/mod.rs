pub mod cache;
pub mod compression;
pub mod constants;
pub mod density;
pub mod driver;
pub mod error;
pub mod filter;
pub mod format;
pub mod loader;
pub mod series;
pub mod store;
pub mod table;
pub mod view;

#[cfg(test)]
pub(crate) mod testing;
