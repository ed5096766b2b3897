use anyhow::Result;
use clap::Parser;
use netpath::{CLIArguments, analyse_main, export_main, order_main};

fn main() -> Result<()> {
    let args = CLIArguments::parse();

    match args {
        CLIArguments::Analyse(args) => analyse_main(args),
        CLIArguments::Order(args) => order_main(args),
        CLIArguments::Export(args) => export_main(args),
    }
}
