//! puml CLI - Convert PlantUML class diagrams to JSON

mod cli;

use clap::Parser;

fn main() {
    let cli_args = cli::Cli::parse();
    let app = cli::PumlApp::new();

    if let Err(e) = app.run(cli_args) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
