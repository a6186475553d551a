use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "jblocks-rs",
    about = "Block-script converter: imports script source into a block workspace, exports it back, and runs programs in a drawing sandbox."
)]
pub struct Args {
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    #[arg(value_name = "OUTPUT")]
    pub output: Option<PathBuf>,

    #[arg(long, help = "Export a workspace document (.json/.jbb) back into script source.")]
    pub export: bool,

    #[arg(long, help = "Write a .jbb project bundle instead of a bare workspace document.")]
    pub bundle: bool,

    #[arg(long, help = "Run the program in the drawing sandbox.")]
    pub run: bool,

    #[arg(
        long,
        value_name = "PATH",
        help = "With --run, write the final stage as an SVG image to this path."
    )]
    pub stage_svg: Option<PathBuf>,

    #[arg(
        long = "key",
        value_name = "KEY",
        help = "With --run, preset a key as held down. May be repeated."
    )]
    pub keys: Vec<String>,

    #[arg(
        long,
        value_name = "WxH",
        default_value = "480x360",
        help = "Stage dimensions for --run."
    )]
    pub stage_size: String,
}
