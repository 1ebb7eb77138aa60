//! `free` - display amount of free and used memory

use clap::Parser;
use tabled::builder::Builder;
use tabled::settings::object::Columns;
use tabled::settings::{Alignment, Style};

use crate::cli::args::{StdFlags, VERSION};
use crate::cli::{Ctx, Utility};
use crate::core::procfs::{self, MemInfo};
use crate::core::{PathContext, UtilError};

#[derive(Parser, Debug)]
#[command(
    name = "free",
    version = VERSION,
    about = "Display the amount of free and used memory and swap",
    disable_help_flag = true,
    disable_version_flag = true
)]
pub struct FreeArgs {
    /// Show output in bytes
    #[arg(short = 'b', overrides_with_all = ["kibi", "mebi", "gibi"])]
    pub bytes: bool,

    /// Show output in kibibytes
    #[arg(short = 'k', overrides_with_all = ["bytes", "mebi", "gibi"])]
    pub kibi: bool,

    /// Show output in mebibytes (default)
    #[arg(short = 'm', overrides_with_all = ["bytes", "kibi", "gibi"])]
    pub mebi: bool,

    /// Show output in gibibytes
    #[arg(short = 'g', overrides_with_all = ["bytes", "kibi", "mebi"])]
    pub gibi: bool,

    #[command(flatten)]
    pub std: StdFlags,
}

impl FreeArgs {
    fn unit(&self) -> u64 {
        if self.bytes {
            1
        } else if self.kibi {
            1 << 10
        } else if self.gibi {
            1 << 30
        } else {
            1 << 20
        }
    }
}

pub fn memory_table(info: &MemInfo, unit: u64) -> String {
    let scaled = |bytes: u64| (bytes / unit).to_string();

    let mut builder = Builder::default();
    builder.push_record(["", "total", "used", "free", "shared", "buff/cache", "available"]);
    builder.push_record([
        "Mem:".to_string(),
        scaled(info.mem_total),
        scaled(info.mem_used()),
        scaled(info.mem_free),
        scaled(info.shmem),
        scaled(info.buff_cache()),
        scaled(info.mem_available),
    ]);
    builder.push_record([
        "Swap:".to_string(),
        scaled(info.swap_total),
        scaled(info.swap_used()),
        scaled(info.swap_free),
        String::new(),
        String::new(),
        String::new(),
    ]);

    let mut table = builder.build();
    table
        .with(Style::blank())
        .modify(Columns::new(1..), Alignment::right());
    table.to_string()
}

impl Utility for FreeArgs {
    const NAME: &'static str = "free";

    fn run(self, ctx: &mut Ctx<'_>) -> Result<(), UtilError> {
        let info = procfs::meminfo().with_context(|| "/proc/meminfo".to_string())?;
        ctx.line(memory_table(&info, self.unit()))
    }
}
