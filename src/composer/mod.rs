pub mod unified_query;
pub use unified_query::*;

pub mod query_composer;
pub use query_composer::*;
