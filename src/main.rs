use anyhow::Result;
use clap::Parser;
use jblocks_rs_core::cli::Args;

fn main() -> Result<()> {
    let args = Args::parse();
    jblocks_rs_core::run_cli(&args)
}
