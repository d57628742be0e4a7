//! Changelog parsing, file-activity ranking and range resolution for
//! reports over source-control history.

pub mod activity;
pub mod cli;
pub mod config;
pub mod error;
pub mod export;
pub mod fetch;
pub mod model;
pub mod range;
pub mod scm;
pub mod xml;

pub use error::{ChangelogError, Result};
pub use model::{ChangeFile, ChangeLogSet, ChangeSet};
