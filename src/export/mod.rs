//! Graphviz export of parsed netlists.
//!
//! Rendering itself is out of scope for this crate; [`export_main`] writes
//! the graph in DOT format for whatever renderer sits downstream. The
//! export carries everything a drawing needs: every component with its name
//! and type, every dependency edge, and optionally the critical path marked
//! in red for highlighting.
//!
//! # Example
//!
//! ```no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use netpath::export::{ExportArgs, export_main};
//!
//! let args = ExportArgs {
//!     input: "circuit.ckt".into(),
//!     output: Some("circuit.dot".into()),
//!     critical: true,
//!     delays: None,
//! };
//!
//! export_main(args)?;
//! # Ok(())
//! # }
//! ```

use std::{
    collections::HashSet,
    fs,
    io::{self, Write},
    path::PathBuf,
};

use anyhow::{Context, Result};
use clap::Parser;
use itertools::Itertools;
use lazy_static::*;
use petgraph::graph::NodeIndex;
use regex::Regex;

use crate::{
    analyse::graph::{CriticalPath, critical_path},
    delay::DelayTable,
    netlist::Netlist,
    read_delay_file, read_file,
};

/// Command-line arguments for the export command.
#[derive(Parser, Debug)]
pub struct ExportArgs {
    /// Netlist input file
    pub input: PathBuf,

    /// DOT output file (default: stdout)
    #[clap(long, short)]
    pub output: Option<PathBuf>,

    /// Highlight the critical path in the exported graph
    #[clap(long)]
    pub critical: bool,

    /// Delay table TOML file used for critical-path highlighting
    #[clap(long, short)]
    pub delays: Option<PathBuf>,
}

/// Export a netlist as a Graphviz digraph.
pub fn export_main(args: ExportArgs) -> Result<()> {
    let ExportArgs {
        input,
        output,
        critical,
        delays,
    } = args;

    let netlist = read_file(&input)?;

    let highlight = if critical {
        let table = match delays {
            Some(path) => read_delay_file(&path)?,
            None => DelayTable::default(),
        };
        Some(
            critical_path(&netlist, &table)
                .with_context(|| format!("analysing {}", input.display()))?,
        )
    } else {
        None
    };

    let mut writer: Box<dyn Write> = match output {
        Some(path) => Box::new(fs::File::create(path)?),
        None => Box::new(std::io::stdout()),
    };
    write_dot(&mut writer, &netlist, highlight.as_ref())?;

    Ok(())
}

fn dot_escape(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}

// Netlist identifiers like `x[0]` are valid here but not bare DOT ids.
fn dot_id(name: &str) -> String {
    lazy_static! {
        static ref BARE_ID_RE: Regex = Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").unwrap();
    }

    if BARE_ID_RE.is_match(name) {
        name.to_string()
    } else {
        format!("\"{}\"", dot_escape(name))
    }
}

/// Write the netlist as a Graphviz digraph.
///
/// Components flow left to right; `INPUT` and `OUTPUT` components are drawn
/// as ellipses and everything else as boxes, labelled with the component
/// name over its type. When a critical path is given, its components and
/// edges are coloured red.
pub fn write_dot<W: Write>(
    writer: &mut W,
    netlist: &Netlist,
    highlight: Option<&CriticalPath>,
) -> io::Result<()> {
    let path_nodes: HashSet<NodeIndex> = highlight
        .map(|path| path.nodes.iter().copied().collect())
        .unwrap_or_default();
    let path_edges: HashSet<(NodeIndex, NodeIndex)> = highlight
        .map(|path| path.nodes.iter().copied().tuple_windows().collect())
        .unwrap_or_default();

    writeln!(writer, "digraph netlist {{")?;
    writeln!(writer, "    rankdir=LR;")?;

    for ix in netlist.node_indices() {
        let component = &netlist[ix];
        let shape = if component.kind().is_port() {
            "ellipse"
        } else {
            "box"
        };
        let colour = if path_nodes.contains(&ix) {
            ", color=red"
        } else {
            ""
        };
        writeln!(
            writer,
            "    {} [label=\"{}\\n{}\", shape={}{}];",
            dot_id(component.name().as_ref()),
            dot_escape(component.name().as_ref()),
            dot_escape(component.kind().token()),
            shape,
            colour,
        )?;
    }

    for ie in netlist.edge_indices() {
        let (u, v) = netlist
            .edge_endpoints(ie)
            .expect("edge should have valid endpoints");
        let colour = if path_edges.contains(&(u, v)) {
            " [color=red]"
        } else {
            ""
        };
        writeln!(
            writer,
            "    {} -> {}{};",
            dot_id(netlist[u].name().as_ref()),
            dot_id(netlist[v].name().as_ref()),
            colour,
        )?;
    }

    writeln!(writer, "}}")
}
