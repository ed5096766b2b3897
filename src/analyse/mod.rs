//! Critical-path analysis and reporting.
//!
//! This module is the command-line surface over the graph engine in
//! [`graph`]. It provides two reports:
//!
//! - **[`analyse_main`]**: per circuit, the critical path, its total delay,
//!   and a per-component delay breakdown.
//! - **[`order_main`]**: the topological evaluation order of a circuit with
//!   fanin/fanout counts.
//!
//! # Workflow
//!
//! 1. Read and parse each netlist input
//! 2. Run the critical-path (or ordering) query
//! 3. Render the result as a report to stdout or a file
//!
//! Circuits are independent once parsed, so batches of inputs are analysed
//! in parallel and reported in argument order.
//!
//! # Example
//!
//! ```no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use netpath::analyse::{AnalyseArgs, analyse_main};
//!
//! let args = AnalyseArgs {
//!     inputs: vec!["circuit.ckt".into()],
//!     report: None,  // Print to stdout
//!     delays: None,  // Built-in delay table
//! };
//!
//! analyse_main(args)?;
//! # Ok(())
//! # }
//! ```

use std::{
    fs,
    io::Write,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use clap::Parser;
use itertools::Itertools;
use petgraph::Direction;
use prettytable::*;
use rayon::prelude::*;

use crate::{delay::DelayTable, read_delay_file, read_file};

pub mod graph;

use self::graph::CriticalPath;

/// Command-line arguments for the analyse command.
#[derive(Parser, Debug)]
pub struct AnalyseArgs {
    /// Netlist input files
    #[clap(required = true)]
    pub inputs: Vec<PathBuf>,

    /// Report file for analysis results (default: stdout)
    #[clap(long, short)]
    pub report: Option<PathBuf>,

    /// Delay table TOML file (default: built-in table)
    #[clap(long, short)]
    pub delays: Option<PathBuf>,
}

/// Command-line arguments for the evaluation-order command.
#[derive(Parser, Debug)]
pub struct OrderArgs {
    /// Netlist input file
    pub input: PathBuf,

    /// Report file (default: stdout)
    #[clap(long, short)]
    pub report: Option<PathBuf>,
}

/// Compute and report the critical path of each input circuit.
///
/// For every input this reports the circuit name, the critical path as a
/// `a -> b -> c` chain, the total delay to two decimals, and a
/// per-component breakdown table in path order. Inputs are analysed in
/// parallel; reports come out in argument order.
pub fn analyse_main(args: AnalyseArgs) -> Result<()> {
    let AnalyseArgs {
        inputs,
        report,
        delays,
    } = args;

    let table = match delays {
        Some(path) => read_delay_file(&path)?,
        None => DelayTable::default(),
    };

    // Create writer for output (file or stdout)
    let mut writer: Box<dyn Write> = match report {
        Some(path) => Box::new(fs::File::create(path)?),
        None => Box::new(std::io::stdout()),
    };

    let reports: Vec<Result<Vec<u8>>> = inputs
        .par_iter()
        .map(|input| circuit_report(input, &table))
        .collect();

    for report in reports {
        writer.write_all(&report?)?;
    }

    Ok(())
}

fn circuit_report(input: &Path, delays: &DelayTable) -> Result<Vec<u8>> {
    let netlist = read_file(input)?;
    let path = graph::critical_path(&netlist, delays)
        .with_context(|| format!("analysing {}", input.display()))?;

    let name = input
        .file_stem()
        .unwrap_or(input.as_os_str())
        .to_string_lossy();

    render_report(&name, &path)
}

fn render_report(name: &str, path: &CriticalPath) -> Result<Vec<u8>> {
    let mut buf = Vec::new();

    writeln!(buf, "Circuit: {}", name)?;
    writeln!(
        buf,
        "Critical path: {}",
        path.stages.iter().map(|s| s.name.as_ref()).join(" -> ")
    )?;
    writeln!(buf, "Total delay: {:.2} time units", path.total_delay)?;

    let mut table = Table::new();
    table.set_titles(row!["#", "Component", "Type", "Delay", "Arrival"]);
    table.set_format(*format::consts::FORMAT_NO_LINESEP_WITH_TITLE);
    for (i, stage) in path.stages.iter().enumerate() {
        table.add_row(row![
            i,
            stage.name,
            stage.kind,
            format!("{:.2}", stage.delay),
            format!("{:.2}", stage.arrival),
        ]);
    }
    table.print(&mut buf)?;
    writeln!(buf)?;

    Ok(buf)
}

/// Report the topological evaluation order of a circuit.
///
/// Lists every component in an order consistent with all dependency edges,
/// together with its fanin and fanout counts. Useful for scheduling and for
/// eyeballing how wide or deep a circuit is.
pub fn order_main(args: OrderArgs) -> Result<()> {
    let OrderArgs { input, report } = args;

    // Create writer for output (file or stdout)
    let mut writer: Box<dyn Write> = match report {
        Some(path) => Box::new(fs::File::create(path)?),
        None => Box::new(std::io::stdout()),
    };

    let netlist = read_file(&input)?;
    let order = graph::topological_sort(&netlist)
        .with_context(|| format!("ordering {}", input.display()))?;

    writeln!(writer, "Evaluation order ({} components):", order.len())?;

    let mut table = Table::new();
    table.set_titles(row!["#", "Component", "Type", "Fanin", "Fanout"]);
    table.set_format(*format::consts::FORMAT_NO_LINESEP_WITH_TITLE);
    for (i, &ix) in order.iter().enumerate() {
        let component = &netlist[ix];
        table.add_row(row![
            i,
            component.name(),
            component.kind(),
            netlist.edges_directed(ix, Direction::Incoming).count(),
            netlist.edges_directed(ix, Direction::Outgoing).count(),
        ]);
    }
    table.print(&mut writer)?;

    Ok(())
}
