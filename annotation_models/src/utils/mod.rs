//! Utilities shared across the crate
//!
//! Naming conventions and logging setup.

pub mod logging;
pub mod naming;

pub use naming::{
    capitalize, get_foreign_key_name, get_index_name, model_name, quote_identifier,
    root_model_name, root_table_name, table_name, truncate_identifier, ROOT_MODEL_NAME,
};
