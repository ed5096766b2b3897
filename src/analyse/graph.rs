//! Graph algorithms for netlist timing analysis.
//!
//! This module owns the two queries a parsed [`Netlist`] answers:
//!
//! - **Topological ordering** ([`topological_sort`]): Kahn's algorithm with
//!   a declaration-order ready queue, so the result is a total order that is
//!   stable across runs.
//! - **Critical path** ([`critical_path`]): longest-path relaxation over the
//!   topological order. Each component's arrival time is its own delay plus
//!   the latest arrival among its declared inputs; the critical path is the
//!   predecessor chain of the latest-arriving sink.
//!
//! Both queries are read-only over the graph and run in O(V + E). The cycle
//! check always runs first; the relaxation may assume a DAG.

use std::{
    cmp::Reverse,
    collections::{BinaryHeap, HashSet},
    error::Error,
    fmt,
};

use ordered_float::OrderedFloat;
use petgraph::{
    Direction,
    graph::NodeIndex,
    visit::{EdgeRef, NodeIndexable},
};

use crate::{
    delay::DelayTable,
    netlist::{ComponentKind, Netlist, Symbol, declared_inputs, sink_nodes},
};

/// Error response of the graph queries.
#[derive(Debug, PartialEq)]
pub enum TimingError {
    /// A component transitively depends on itself; names one component on
    /// the cycle.
    Cycle(Symbol),
    /// The delay table prices neither this component's type nor a default.
    UnknownComponentType { kind: Symbol, node: Symbol },
    /// The circuit has no source-to-sink path to measure.
    NoPath,
}

impl fmt::Display for TimingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimingError::Cycle(name) => write!(f, "Dependency cycle through \"{}\"", name),
            TimingError::UnknownComponentType { kind, node } => {
                write!(f, "Unknown component type {} on \"{}\"", kind, node)
            }
            TimingError::NoPath => {
                write!(f, "No source-to-sink path exists in the circuit")
            }
        }
    }
}

impl Error for TimingError {}

/// One component on a critical path.
#[derive(Debug, Clone, PartialEq)]
pub struct PathStage {
    pub name: Symbol,
    pub kind: ComponentKind,
    /// Propagation delay of this component alone.
    pub delay: f64,
    /// Cumulative delay up to and including this component.
    pub arrival: f64,
}

/// Result of a critical-path query.
#[derive(Debug, Clone, PartialEq)]
pub struct CriticalPath {
    /// Nodes on the path, source first, sink last.
    pub nodes: Vec<NodeIndex>,
    /// Per-component breakdown in path order.
    pub stages: Vec<PathStage>,
    /// Arrival time at the terminal sink, at full precision. Rounding is
    /// left to the presentation layer.
    pub total_delay: f64,
}

/// Order the netlist so every component appears after all of its declared
/// inputs.
///
/// Components with no mutual ordering constraint come out in declaration
/// order, so repeated runs over the same input yield identical output.
/// Fails with [`TimingError::Cycle`] when the dependency relation is not
/// acyclic.
pub fn topological_sort(netlist: &Netlist) -> Result<Vec<NodeIndex>, TimingError> {
    let mut in_degree = vec![0usize; netlist.node_bound()];
    for ix in netlist.node_indices() {
        in_degree[ix.index()] = netlist.edges_directed(ix, Direction::Incoming).count();
    }

    let mut ready: BinaryHeap<Reverse<NodeIndex>> = netlist
        .node_indices()
        .filter(|ix| in_degree[ix.index()] == 0)
        .map(Reverse)
        .collect();

    let mut order = Vec::with_capacity(netlist.node_count());
    while let Some(Reverse(ix)) = ready.pop() {
        order.push(ix);
        for edge in netlist.edges_directed(ix, Direction::Outgoing) {
            let next = edge.target();
            in_degree[next.index()] -= 1;
            if in_degree[next.index()] == 0 {
                ready.push(Reverse(next));
            }
        }
    }

    if order.len() != netlist.node_count() {
        return Err(TimingError::Cycle(cycle_witness(netlist, &in_degree)));
    }
    Ok(order)
}

// Walks unresolved dependencies backwards until a component repeats; the
// repeated component lies on a cycle. Residual in-degree only counts edges
// from other unresolved components, so the walk can always continue.
fn cycle_witness(netlist: &Netlist, in_degree: &[usize]) -> Symbol {
    let start = netlist
        .node_indices()
        .find(|ix| in_degree[ix.index()] > 0)
        .expect("a cyclic graph leaves at least one unresolved component");

    let mut seen = HashSet::new();
    let mut current = start;
    loop {
        if !seen.insert(current) {
            return netlist[current].name().clone();
        }
        current = netlist
            .edges_directed(current, Direction::Incoming)
            .map(|e| e.source())
            .find(|src| in_degree[src.index()] > 0)
            .expect("an unresolved component depends on another unresolved component");
    }
}

/// Compute the critical path: the source-to-sink path with maximal
/// cumulative delay.
///
/// The relaxation visits components in topological order, so every declared
/// input is settled before its consumer. Ties are broken toward the first
/// declared input and the earliest-declared sink, keeping the result
/// deterministic. Delay sums are kept at full precision throughout.
pub fn critical_path(
    netlist: &Netlist,
    delays: &DelayTable,
) -> Result<CriticalPath, TimingError> {
    let order = topological_sort(netlist)?;

    let sinks = sink_nodes(netlist);
    if order.is_empty() || sinks.is_empty() {
        return Err(TimingError::NoPath);
    }

    let mut arrival = vec![0.0f64; netlist.node_bound()];
    let mut cost = vec![0.0f64; netlist.node_bound()];
    let mut predecessor: Vec<Option<NodeIndex>> = vec![None; netlist.node_bound()];

    for &ix in order.iter() {
        let component = &netlist[ix];
        let delay = delays.delay_of(component.kind()).ok_or_else(|| {
            TimingError::UnknownComponentType {
                kind: Symbol::from(component.kind().token()),
                node: component.name().clone(),
            }
        })?;

        let mut best: Option<(f64, NodeIndex)> = None;
        for input in declared_inputs(netlist, ix) {
            let candidate = arrival[input.index()];
            // Strict comparison keeps the first declared input on ties.
            if best.map_or(true, |(latest, _)| candidate > latest) {
                best = Some((candidate, input));
            }
        }

        cost[ix.index()] = delay;
        arrival[ix.index()] = best.map_or(0.0, |(latest, _)| latest) + delay;
        predecessor[ix.index()] = best.map(|(_, input)| input);
    }

    let terminal = sinks
        .into_iter()
        .max_by_key(|ix| (OrderedFloat(arrival[ix.index()]), Reverse(*ix)))
        .expect("sink set checked non-empty above");

    let mut nodes = Vec::new();
    let mut current = Some(terminal);
    while let Some(ix) = current {
        nodes.push(ix);
        current = predecessor[ix.index()];
    }
    nodes.reverse();

    let stages = nodes
        .iter()
        .map(|&ix| PathStage {
            name: netlist[ix].name().clone(),
            kind: netlist[ix].kind().clone(),
            delay: cost[ix.index()],
            arrival: arrival[ix.index()],
        })
        .collect();

    Ok(CriticalPath {
        total_delay: arrival[terminal.index()],
        nodes,
        stages,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::netlist::parse;
    use std::collections::HashMap;

    fn arith_table() -> DelayTable {
        let mut table = DelayTable::new(None);
        table.insert("INPUT", 0.0);
        table.insert("OUTPUT", 0.5);
        table.insert("ADD", 1.0);
        table.insert("MUL", 0.2);
        table.insert("REG", 0.2);
        table
    }

    #[test]
    fn sort_respects_dependencies() {
        let g = parse("INPUT a\nINPUT b\nADD c a b\nMUL d c a\nOUTPUT e d").unwrap();
        let order = topological_sort(&g).unwrap();

        assert_eq!(order.len(), g.node_count());
        let position: HashMap<NodeIndex, usize> =
            order.iter().enumerate().map(|(i, ix)| (*ix, i)).collect();
        assert_eq!(position.len(), order.len(), "no duplicates in the order");

        for ie in g.edge_indices() {
            let (u, v) = g.edge_endpoints(ie).unwrap();
            assert!(position[&u] < position[&v]);
        }
    }

    #[test]
    fn sort_breaks_ties_by_declaration_order() {
        let g = parse("INPUT z\nINPUT a\nINPUT m\nOUTPUT y z a m").unwrap();
        let order = topological_sort(&g).unwrap();
        let names: Vec<String> = order.iter().map(|ix| g[*ix].name().to_string()).collect();
        assert_eq!(names, vec!["z", "a", "m", "y"]);
    }

    #[test]
    fn sort_is_deterministic() {
        let input = "INPUT a\nINPUT b\nADD c a b\nADD d b a\nMUL e c d\nOUTPUT f e";
        let reference: Vec<String> = {
            let g = parse(input).unwrap();
            topological_sort(&g)
                .unwrap()
                .iter()
                .map(|ix| g[*ix].name().to_string())
                .collect()
        };
        for _ in 0..10 {
            let g = parse(input).unwrap();
            let names: Vec<String> = topological_sort(&g)
                .unwrap()
                .iter()
                .map(|ix| g[*ix].name().to_string())
                .collect();
            assert_eq!(names, reference);
        }
    }

    #[test]
    fn self_dependency_is_a_cycle() {
        let g = parse("REG r r").unwrap();
        match topological_sort(&g) {
            Err(TimingError::Cycle(name)) => assert_eq!(name.as_ref(), "r"),
            other => panic!("expected cycle error, got {:?}", other),
        }
    }

    #[test]
    fn mutual_dependency_is_a_cycle() {
        let g = parse("INPUT i\nADD a b i\nADD b a i\nOUTPUT y b").unwrap();
        match critical_path(&g, &DelayTable::default()) {
            Err(TimingError::Cycle(name)) => {
                assert!(name.as_ref() == "a" || name.as_ref() == "b");
            }
            other => panic!("expected cycle error, got {:?}", other),
        }
    }

    #[test]
    fn arithmetic_example_critical_path() {
        let g = parse("INPUT A\nINPUT B\nADD C A B\nMUL D C A\nOUTPUT E D").unwrap();
        let path = critical_path(&g, &arith_table()).unwrap();

        let names: Vec<String> = path.stages.iter().map(|s| s.name.to_string()).collect();
        assert_eq!(names, vec!["A", "C", "D", "E"]);
        assert_eq!(path.total_delay, 1.7);

        let delays: Vec<f64> = path.stages.iter().map(|s| s.delay).collect();
        assert_eq!(delays, vec![0.0, 1.0, 0.2, 0.5]);
    }

    #[test]
    fn total_delay_equals_stage_sum() {
        let g = parse("INPUT A\nINPUT B\nADD C A B\nMUL D C A\nOUTPUT E D").unwrap();
        let path = critical_path(&g, &arith_table()).unwrap();
        let sum: f64 = path.stages.iter().map(|s| s.delay).sum();
        assert_eq!(path.total_delay, sum);
    }

    #[test]
    fn register_chain_total_delay() {
        let g = parse("INPUT A\nINPUT B\nADD C A B\nREG D C\nOUTPUT E D").unwrap();
        let path = critical_path(&g, &arith_table()).unwrap();
        assert_eq!(path.total_delay, 1.7);
    }

    #[test]
    fn equal_arrivals_prefer_first_declared_input() {
        let g = parse("INPUT a\nINPUT b\nADD c b a\nOUTPUT y c").unwrap();
        let path = critical_path(&g, &arith_table()).unwrap();
        let names: Vec<String> = path.stages.iter().map(|s| s.name.to_string()).collect();
        assert_eq!(names, vec!["b", "c", "y"]);
    }

    #[test]
    fn equal_sinks_prefer_first_declared() {
        let g = parse("INPUT a\nOUTPUT y1 a\nOUTPUT y2 a").unwrap();
        let path = critical_path(&g, &arith_table()).unwrap();
        assert_eq!(path.stages.last().unwrap().name.as_ref(), "y1");
    }

    #[test]
    fn path_runs_from_source_to_sink() {
        let input = "INPUT x1\nINPUT x2\nINPUT x3\nADD add1 x1 x2\nMUL mul1 add1 x3\n\
                     REG reg1 mul1\nADD add2 reg1 x1\nMUL mul2 add2 x2\nOUTPUT y mul2";
        let g = parse(input).unwrap();
        let path = critical_path(&g, &arith_table()).unwrap();

        let first = path.nodes[0];
        assert!(declared_inputs(&g, first).is_empty());
        assert_eq!(g[*path.nodes.last().unwrap()].kind(), &ComponentKind::Output);
    }

    #[test]
    fn single_component_circuit() {
        let g = parse("INPUT a").unwrap();
        let path = critical_path(&g, &arith_table()).unwrap();
        assert_eq!(path.nodes.len(), 1);
        assert_eq!(path.total_delay, 0.0);
    }

    #[test]
    fn empty_circuit_has_no_path() {
        let g = parse("# only comments\n").unwrap();
        assert!(matches!(
            critical_path(&g, &DelayTable::default()),
            Err(TimingError::NoPath)
        ));
    }

    #[test]
    fn missing_delay_entry_is_reported() {
        let g = parse("INPUT a\nFOO f a\nOUTPUT y f").unwrap();
        let mut table = DelayTable::new(None);
        table.insert("INPUT", 0.0);
        table.insert("OUTPUT", 0.5);
        match critical_path(&g, &table) {
            Err(TimingError::UnknownComponentType { kind, node }) => {
                assert_eq!(kind.as_ref(), "FOO");
                assert_eq!(node.as_ref(), "f");
            }
            other => panic!("expected unknown component type error, got {:?}", other),
        }
    }

    #[test]
    fn default_delay_covers_custom_types() {
        let g = parse("INPUT a\nFOO f a\nOUTPUT y f").unwrap();
        let path = critical_path(&g, &DelayTable::default()).unwrap();
        assert_eq!(path.total_delay, 0.0 + 0.5 + 0.5);
    }
}
