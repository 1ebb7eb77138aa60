//! `pwgen` - generate random passwords

use clap::Parser;
use rand::Rng;

use crate::cli::args::{StdFlags, VERSION};
use crate::cli::{Ctx, Utility};
use crate::core::UtilError;

const LETTERS: &str = "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";
const DIGITS: &str = "0123456789";
const SYMBOLS: &str = "!@#$%^&*()-_=+[]{}|;:,.<>?";

const PER_ROW: usize = 8;

#[derive(Parser, Debug)]
#[command(
    name = "pwgen",
    version = VERSION,
    about = "Generate COUNT random passwords of LENGTH characters",
    disable_help_flag = true,
    disable_version_flag = true
)]
pub struct PwgenArgs {
    /// Include digits
    #[arg(short = 'n')]
    pub digits: bool,

    /// Include symbols
    #[arg(short = 's')]
    pub symbols: bool,

    /// Append one extra symbol to each password
    #[arg(short = 'y')]
    pub append_symbol: bool,

    /// Print one password per line
    #[arg(short = '1')]
    pub one_per_line: bool,

    #[arg(
        value_name = "LENGTH",
        default_value_t = 8,
        value_parser = clap::value_parser!(u16).range(1..)
    )]
    pub length: u16,

    #[arg(value_name = "COUNT", default_value_t = 160)]
    pub count: u32,

    #[command(flatten)]
    pub std: StdFlags,
}

impl PwgenArgs {
    fn charset(&self) -> Vec<char> {
        let mut set: String = LETTERS.to_string();
        if self.digits {
            set.push_str(DIGITS);
        }
        if self.symbols {
            set.push_str(SYMBOLS);
        }
        set.chars().collect()
    }
}

/// One password drawn from `charset`, plus a trailing symbol if asked.
pub fn generate(
    rng: &mut impl Rng,
    charset: &[char],
    length: usize,
    append_symbol: bool,
) -> String {
    let mut password: String = (0..length)
        .map(|_| charset[rng.random_range(0..charset.len())])
        .collect();
    if append_symbol {
        let symbols: Vec<char> = SYMBOLS.chars().collect();
        password.push(symbols[rng.random_range(0..symbols.len())]);
    }
    password
}

impl Utility for PwgenArgs {
    const NAME: &'static str = "pwgen";

    fn run(self, ctx: &mut Ctx<'_>) -> Result<(), UtilError> {
        let charset = self.charset();
        let mut rng = rand::rng();
        let passwords: Vec<String> = (0..self.count)
            .map(|_| generate(&mut rng, &charset, self.length as usize, self.append_symbol))
            .collect();

        let per_row = if self.one_per_line { 1 } else { PER_ROW };
        for row in passwords.chunks(per_row) {
            ctx.line(row.join(" "))?;
        }
        Ok(())
    }
}
