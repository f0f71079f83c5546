use clap::Parser;

use ll1dpda::cli::{self, Cli};

fn main() {
    env_logger::init();

    let cli = Cli::parse();
    if let Err(e) = cli::run(cli) {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
