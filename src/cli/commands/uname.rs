//! `uname` - print system information

use clap::Parser;

use crate::cli::args::{StdFlags, VERSION};
use crate::cli::{Ctx, Utility};
use crate::core::sys::{self, Uname};
use crate::core::UtilError;

#[derive(Parser, Debug)]
#[command(
    name = "uname",
    version = VERSION,
    about = "Print system information; with no option, the kernel name",
    disable_help_flag = true,
    disable_version_flag = true
)]
pub struct UnameArgs {
    /// Print all information
    #[arg(short = 'a')]
    pub all: bool,

    /// Kernel name
    #[arg(short = 's')]
    pub kernel_name: bool,

    /// Network node hostname
    #[arg(short = 'n')]
    pub nodename: bool,

    /// Kernel release
    #[arg(short = 'r')]
    pub release: bool,

    /// Machine hardware name
    #[arg(short = 'm')]
    pub machine: bool,

    #[command(flatten)]
    pub std: StdFlags,
}

impl UnameArgs {
    /// Selected fields, in the fixed `-s -n -r (version) -m` order.
    pub fn fields<'a>(&self, info: &'a Uname) -> Vec<&'a str> {
        let none = !(self.kernel_name || self.nodename || self.release || self.machine);
        let mut fields = Vec::new();
        if self.all || none || self.kernel_name {
            fields.push(info.sysname.as_str());
        }
        if self.all || self.nodename {
            fields.push(info.nodename.as_str());
        }
        if self.all || self.release {
            fields.push(info.release.as_str());
        }
        if self.all {
            fields.push(info.version.as_str());
        }
        if self.all || self.machine {
            fields.push(info.machine.as_str());
        }
        fields
    }
}

impl Utility for UnameArgs {
    const NAME: &'static str = "uname";

    fn run(self, ctx: &mut Ctx<'_>) -> Result<(), UtilError> {
        let info = sys::uname().map_err(|e| UtilError::io("uname", e))?;
        ctx.line(self.fields(&info).join(" "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::testing::run;

    fn sample() -> Uname {
        Uname {
            sysname: "Linux".into(),
            nodename: "box".into(),
            release: "6.1.0".into(),
            version: "#1 SMP".into(),
            machine: "x86_64".into(),
        }
    }

    fn fields_for(flags: &[&str]) -> String {
        let args = UnameArgs::parse_from(std::iter::once("uname").chain(flags.iter().copied()));
        args.fields(&sample()).join(" ")
    }

    #[test]
    fn test_field_selection() {
        assert_eq!(fields_for(&[]), "Linux");
        assert_eq!(fields_for(&["-n"]), "box");
        assert_eq!(fields_for(&["-mr"]), "6.1.0 x86_64");
        assert_eq!(fields_for(&["-a"]), "Linux box 6.1.0 #1 SMP x86_64");
    }

    #[test]
    fn test_live_kernel_name() {
        let out = run::<UnameArgs>(&[]);
        assert_eq!(out.code, 0);
        assert_eq!(out.stdout.trim_end(), sys::uname().unwrap().sysname);
    }

    #[test]
    fn test_operand_is_usage_error() {
        let out = run::<UnameArgs>(&["extra"]);
        assert_eq!(out.code, 1);
        assert!(out.stderr.contains("try '-h'"));
    }
}
