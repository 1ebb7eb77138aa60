//! unixkit: classic Unix command-line utilities
//!
//! Each utility is a `clap` record plus an executor in [`cli::commands`],
//! run by the shared runner in [`cli`]. Filesystem walks, archive codecs,
//! `/proc` parsing, syscalls, history and configuration live in [`core`].

pub mod cli;
pub mod core;
