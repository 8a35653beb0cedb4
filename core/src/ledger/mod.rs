pub mod history_csv;
pub mod persist;
pub mod record;
pub mod store;
