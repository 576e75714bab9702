pub mod query_parser;
pub use query_parser::*;

pub mod parse_error;
pub use parse_error::*;

pub mod word_comparer;
pub use word_comparer::*;

pub mod query_comparers;
pub use query_comparers::*;

pub mod sql_ident;

pub mod repair;
pub use repair::*;

pub mod structure;
pub use structure::*;

pub mod column_ref;
pub use column_ref::*;

pub mod parsed_query;
pub use parsed_query::*;
