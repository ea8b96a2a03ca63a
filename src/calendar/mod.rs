pub mod json_store;
pub mod source;
pub mod store;
