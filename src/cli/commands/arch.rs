//! `arch` - print the machine architecture

use clap::Parser;

use crate::cli::args::{HelpFlags, VERSION};
use crate::cli::{Ctx, Utility};
use crate::core::UtilError;

#[derive(Parser, Debug)]
#[command(
    name = "arch",
    version = VERSION,
    about = "Print the machine architecture",
    disable_help_flag = true,
    disable_version_flag = true
)]
pub struct ArchArgs {
    /// Also print the operating system and family
    #[arg(short = 'v')]
    pub verbose: bool,

    #[command(flatten)]
    pub std: HelpFlags,
}

impl Utility for ArchArgs {
    const NAME: &'static str = "arch";

    fn run(self, ctx: &mut Ctx<'_>) -> Result<(), UtilError> {
        use std::env::consts;

        ctx.line(format_args!("Architecture: {}", consts::ARCH))?;
        if self.verbose {
            ctx.line(format_args!("OS: {}", consts::OS))?;
            ctx.line(format_args!("Family: {}", consts::FAMILY))?;
        }
        Ok(())
    }
}
