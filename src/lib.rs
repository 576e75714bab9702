pub mod parser;
pub mod ticket;
pub mod unifier;
pub mod composer;
pub mod glossary;
pub mod pipeline;

pub mod config;
pub use config::UnifierConfig;

pub mod error;
pub use error::{UnifyError, UnifyResult};

pub mod run_log;
pub use run_log::RunLog;
