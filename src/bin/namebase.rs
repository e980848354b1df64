use std::error::Error;

use namebase::cli::run_cli;

fn main() -> Result<(), Box<dyn Error>> {
    run_cli(std::env::args().skip(1))
}
