pub mod layout;
pub mod file_lock;
pub mod catalog;
pub mod table;
pub mod store;
