pub mod registration;
pub mod store;
