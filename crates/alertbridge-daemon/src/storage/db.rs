//! Database connection and initialization.

pub use alertbridge_core::db::DatabaseError;

alertbridge_core::define_database!(Database, "Mapping store migrations complete");
