pub mod unified_schema;
pub use unified_schema::*;

pub mod padded_projection;
pub use padded_projection::*;

pub mod schema_unifier;
pub use schema_unifier::*;
