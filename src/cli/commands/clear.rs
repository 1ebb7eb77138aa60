//! `clear` - clear the terminal screen

use clap::Parser;

use crate::cli::args::{StdFlags, VERSION};
use crate::cli::{Ctx, Utility};
use crate::core::UtilError;

/// Cursor home, then erase the whole display.
pub const CLEAR_SCREEN: &str = "\x1b[H\x1b[2J";

const ANSI_TERMS: &[&str] = &[
    "xterm", "screen", "tmux", "linux", "vt100", "vt220", "rxvt", "eterm", "ansi", "alacritty",
    "kitty", "foot", "wezterm",
];

#[derive(Parser, Debug)]
#[command(
    name = "clear",
    version = VERSION,
    about = "Clear the terminal screen",
    disable_help_flag = true,
    disable_version_flag = true
)]
pub struct ClearArgs {
    /// Clear even if TERM does not look ANSI-capable
    #[arg(short = 'f', long = "force")]
    pub force: bool,

    #[command(flatten)]
    pub std: StdFlags,
}

/// Whether `term` names a terminal family that understands ANSI escapes
/// (`xterm-256color` counts as `xterm`).
pub fn ansi_capable(term: Option<&str>) -> bool {
    let Some(term) = term.map(str::to_ascii_lowercase) else {
        return false;
    };
    ANSI_TERMS.iter().any(|known| {
        term == *known
            || term
                .strip_prefix(known)
                .is_some_and(|rest| rest.starts_with('-'))
    })
}

impl Utility for ClearArgs {
    const NAME: &'static str = "clear";

    fn run(self, ctx: &mut Ctx<'_>) -> Result<(), UtilError> {
        let term = std::env::var("TERM").ok();
        if !self.force && !ansi_capable(term.as_deref()) {
            tracing::debug!(?term, "terminal not recognised");
            return Err(UtilError::failed(
                "terminal may not support clearing the screen (use -f to force)",
            ));
        }
        ctx.write(CLEAR_SCREEN.as_bytes())?;
        ctx.flush()
    }
}
