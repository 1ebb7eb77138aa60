//! Core module - fundamental types and OS plumbing shared by the utilities

pub mod archive;
pub mod config;
pub mod error;
pub mod history;
pub mod logging;
pub mod procfs;
pub mod sys;
pub mod walk;

pub use config::Config;
pub use error::{PathContext, UtilError};
