pub mod raw_query;
pub use raw_query::*;

pub mod extractor;
pub use extractor::*;

pub mod gateway;
pub use gateway::*;
