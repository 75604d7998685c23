//! Database module
//!
//! DDL rendering for generated models and the connection used to apply it.

pub mod connection;
pub mod ddl;
pub mod executor;

pub use connection::DatabaseConnection;
pub use ddl::DdlGenerator;
pub use executor::SqlExecutor;
