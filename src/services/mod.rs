pub mod cover;
pub mod sqlite_store;
pub mod store;
