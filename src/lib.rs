//! Netlist parsing and critical-path timing analysis library
//!
//! This library parses textual netlist descriptions of digital circuits
//! into dependency graphs and computes their critical path: the
//! source-to-sink chain of components whose cumulative propagation delay is
//! maximal.
//!
//! # Overview
//!
//! A netlist is a plain-text file with one component per line,
//! `TYPE ID [INPUT_ID ...]`. Parsing builds an immutable directed acyclic
//! graph; analysis orders it topologically and runs a longest-path
//! relaxation over per-type delays supplied by a configurable
//! [`DelayTable`]. All results are deterministic: ties are broken by
//! declaration order, so the same input always produces the same report.
//!
//! # Main Workflows
//!
//! The library supports three main operations:
//!
//! 1. **Analysis** ([`analyse`]): Compute the critical path and a
//!    per-component delay breakdown for one or more circuits.
//! 2. **Ordering** ([`analyse::order_main`]): Report the topological
//!    evaluation order of a circuit.
//! 3. **Export** ([`export`]): Emit the graph as Graphviz DOT, optionally
//!    with the critical path highlighted, for an external renderer.
//!
//! # Usage Example
//!
//! ```no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use netpath::{DelayTable, critical_path, read_file};
//! use std::path::Path;
//!
//! // Read a netlist from a file
//! let netlist = read_file(Path::new("circuit.ckt"))?;
//!
//! // Price it with the built-in delay table
//! let path = critical_path(&netlist, &DelayTable::default())?;
//!
//! println!("total delay: {:.2} time units", path.total_delay);
//! # Ok(())
//! # }
//! ```
//!
//! # Modules
//!
//! - **[`netlist`]**: Parsing and representation of netlist graphs
//! - **[`delay`]**: Injectable component-delay configuration
//! - **[`analyse`]**: Topological ordering, critical-path computation, and
//!   report generation
//! - **[`export`]**: DOT output for external rendering
//!
//! # Re-exports
//!
//! Commonly used types and functions are re-exported at the crate root:
//! the [`Netlist`] graph and its [`Component`]/[`ComponentKind`] weights,
//! the [`Symbol`] name type, [`parse`], the graph queries
//! [`topological_sort`] and [`critical_path`], and the error types.

use anyhow::Result;
use clap::Parser;
use std::{fs, path::Path};

pub mod analyse;
pub mod delay;
pub mod export;
pub mod netlist;

// Re-export the main types and functions for easy access
pub use analyse::graph::{
    CriticalPath, PathStage, TimingError, critical_path, topological_sort,
};
pub use analyse::{AnalyseArgs, OrderArgs, analyse_main, order_main};
pub use delay::DelayTable;
pub use export::{ExportArgs, export_main, write_dot};
pub use netlist::{
    Component, ComponentKind, Netlist, ParseError, Symbol, declared_inputs, parse,
    sink_nodes, source_nodes,
};

/// Reads and parses a netlist from a file.
///
/// This is a convenience function around [`netlist::parse`]; the parser
/// itself consumes text, so all file I/O lives here at the edge.
///
/// # Example
///
/// ```no_run
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// use netpath::read_file;
/// use std::path::Path;
///
/// let netlist = read_file(Path::new("circuit.ckt"))?;
/// # Ok(())
/// # }
/// ```
pub fn read_file(file_name: &Path) -> Result<Netlist> {
    let file = fs::read_to_string(file_name)?;
    Ok(netlist::parse(&file)?)
}

/// Reads and parses a delay table from a TOML file.
pub fn read_delay_file(file_name: &Path) -> Result<DelayTable> {
    let file = fs::read_to_string(file_name)?;
    DelayTable::from_toml(&file)
}

/// Command-line interface arguments for the netpath tools.
///
/// This enum defines the main commands available:
/// - `Analyse`: Compute critical paths and per-component delay reports
/// - `Order`: Report the topological evaluation order
/// - `Export`: Emit a Graphviz DOT graph for external rendering
#[derive(Debug, Parser)]
#[clap(
    name = "Netpath Tools",
    about = "Netlist critical-path timing analysis tools"
)]
pub enum CLIArguments {
    /// Compute the critical path and per-component delays of each circuit.
    Analyse(AnalyseArgs),
    /// Report the topological evaluation order of a circuit.
    Order(OrderArgs),
    /// Export a circuit as a Graphviz DOT graph, optionally highlighting
    /// the critical path.
    Export(ExportArgs),
}
