pub mod glossary_entry;
pub use glossary_entry::*;

pub mod glossary_table;
pub use glossary_table::*;
