pub mod json_table_store;
pub mod table;

pub use json_table_store::JsonTableStore;
pub use table::{ScanPage, StoreError, UserTable};
