//! The utilities, one module each, and the table the multi-call binary
//! dispatches through

use clap::CommandFactory;
use std::ffi::OsString;

use crate::cli::{start, Utility};

pub mod arch;
pub mod bang_bang;
pub mod bang_n;
pub mod cat;
pub mod cd;
pub mod clear;
pub mod cp;
pub mod date;
pub mod df;
pub mod du;
pub mod exit;
pub mod file;
pub mod find;
pub mod free;
pub mod head;
pub mod hexdump;
pub mod history;
pub mod kill;
pub mod ls;
pub mod mkdir;
pub mod nl;
pub mod ps;
pub mod pwd;
pub mod pwgen;
pub mod rm;
pub mod rmdir;
pub mod tail;
pub mod tar;
pub mod touch;
pub mod uname;
pub mod unzip;
pub mod wc;
pub mod zip;

/// A utility as the multi-call binary sees it.
pub struct Applet {
    pub name: &'static str,
    /// Other names it answers to
    pub aliases: &'static [&'static str],
    /// Run as a process over the given arguments, returning the exit status
    pub run: fn(&[OsString]) -> i32,
    pub command: fn() -> clap::Command,
}

impl Applet {
    pub fn about(&self) -> String {
        (self.command)()
            .get_about()
            .map(|a| a.to_string())
            .unwrap_or_default()
    }
}

macro_rules! applets {
    ($($args:ty $(=> [$($alias:literal),*])?),* $(,)?) => {
        /// Every utility, alphabetically.
        pub const APPLETS: &[Applet] = &[$(
            Applet {
                name: <$args as Utility>::NAME,
                aliases: &[$($($alias),*)?],
                run: start::<$args>,
                command: <$args as CommandFactory>::command,
            },
        )*];
    };
}

applets![
    arch::ArchArgs,
    cat::CatArgs,
    cd::CdArgs,
    clear::ClearArgs,
    cp::CpArgs,
    date::DateArgs,
    df::DfArgs,
    du::DuArgs,
    exit::ExitArgs,
    file::FileArgs,
    find::FindArgs,
    free::FreeArgs,
    head::HeadArgs,
    hexdump::HexdumpArgs,
    history::HistoryArgs,
    bang_bang::BangBangArgs => ["!!"],
    bang_n::BangNArgs => ["!n"],
    kill::KillArgs,
    ls::LsArgs,
    mkdir::MkdirArgs,
    nl::NlArgs,
    ps::PsArgs,
    pwd::PwdArgs,
    pwgen::PwgenArgs,
    rm::RmArgs,
    rmdir::RmdirArgs,
    tail::TailArgs,
    tar::TarArgs,
    touch::TouchArgs,
    uname::UnameArgs,
    unzip::UnzipArgs,
    wc::WcArgs,
    zip::ZipArgs,
];

/// Look a utility up by name or alias.
pub fn find(name: &str) -> Option<&'static Applet> {
    APPLETS
        .iter()
        .find(|a| a.name == name || a.aliases.contains(&name))
}
