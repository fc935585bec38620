// Adapters layer: concrete implementations for external systems (storage, reference table files).

pub mod builtin;
pub mod csv_tables;
pub mod storage;
