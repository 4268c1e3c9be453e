//! The main entry point for the `h2fleet` command line tool.
use anyhow::Result;
use human_panic::setup_panic;

fn main() -> Result<()> {
    // Use human_panic to provide a more user friendly message in the event of a program crash
    setup_panic!();

    h2fleet::cli::run_cli()
}
