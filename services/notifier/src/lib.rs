pub mod adapters;
pub mod config;
pub mod error;
pub mod routine_table;
pub mod state;
