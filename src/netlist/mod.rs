//! Parsing and representation of netlist component graphs.
//!
//! A netlist is described one statement per line, `TYPE ID [INPUT_ID ...]`,
//! with whitespace-separated tokens. Blank lines and lines whose first
//! non-blank character is `#` are ignored:
//!
//! ```text
//! # Simple Arithmetic Circuit
//! INPUT a
//! INPUT b
//! ADD add1 a b
//! MUL mul1 add1 b
//! OUTPUT out1 mul1
//! ```
//!
//! [`parse`] turns such a description into a [`Netlist`]: a directed graph
//! whose edges run from each component to its consumers. Statements may
//! reference components defined later in the file; references are resolved
//! only after the whole input has been read. Parsing validates eagerly and
//! never returns a partially built graph.

mod ast;

use petgraph::{Direction, graph::NodeIndex, stable_graph::StableGraph, visit::EdgeRef};
use std::{collections::HashMap, error::Error, fmt};
use string_cache::DefaultAtom;

pub type Symbol = DefaultAtom;

/// Kind tag of a netlist component.
///
/// The common arithmetic kinds are closed variants; anything else is carried
/// verbatim as [`ComponentKind::Other`] and priced through the delay table
/// like every other kind.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ComponentKind {
    Input,
    Output,
    Add,
    Mul,
    Mux,
    Reg,
    Other(Symbol),
}

impl ComponentKind {
    pub fn from_token(token: &str) -> ComponentKind {
        match token {
            "INPUT" => ComponentKind::Input,
            "OUTPUT" => ComponentKind::Output,
            "ADD" => ComponentKind::Add,
            "MUL" => ComponentKind::Mul,
            "MUX" => ComponentKind::Mux,
            "REG" => ComponentKind::Reg,
            _ => ComponentKind::Other(token.into()),
        }
    }

    /// The type token as written in a netlist file.
    pub fn token(&self) -> &str {
        match self {
            ComponentKind::Input => "INPUT",
            ComponentKind::Output => "OUTPUT",
            ComponentKind::Add => "ADD",
            ComponentKind::Mul => "MUL",
            ComponentKind::Mux => "MUX",
            ComponentKind::Reg => "REG",
            ComponentKind::Other(token) => token.as_ref(),
        }
    }

    /// Whether this kind marks a circuit boundary (`INPUT` or `OUTPUT`).
    pub fn is_port(&self) -> bool {
        matches!(self, ComponentKind::Input | ComponentKind::Output)
    }
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// A single circuit component: identity plus kind tag.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Component {
    name: Symbol,
    kind: ComponentKind,
}

impl Component {
    pub fn new(kind: ComponentKind, name: Symbol) -> Component {
        Component { name, kind }
    }

    pub fn name(&self) -> &Symbol {
        &self.name
    }

    pub fn kind(&self) -> &ComponentKind {
        &self.kind
    }
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} \"{}\"", self.kind, self.name)
    }
}

/// Dependency graph of a circuit.
///
/// Edges run from a component to each consumer that lists it as an input;
/// the edge weight is the position of that input in the consumer's
/// declaration, so declared input order survives into the graph. Node
/// insertion order equals file order, making node indices usable as
/// declaration order. The graph is built once per parse and never mutated
/// afterwards.
pub type Netlist = StableGraph<Component, usize>;

/// Error response of [`parse`].
#[derive(Debug, PartialEq, Eq)]
pub enum ParseError {
    MalformedLine { line: usize, text: String },
    DuplicateNode { name: Symbol, first: usize, second: usize },
    UndefinedReference { name: Symbol, referrer: Symbol },
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::MalformedLine { line, text } => {
                write!(f, "Malformed line {}: {:?}", line, text)
            }
            ParseError::DuplicateNode {
                name,
                first,
                second,
            } => write!(
                f,
                "Duplicate definition of \"{}\" on line {}, first defined on line {}",
                name, second, first
            ),
            ParseError::UndefinedReference { name, referrer } => {
                write!(f, "Undefined reference to \"{}\" from \"{}\"", name, referrer)
            }
        }
    }
}

impl Error for ParseError {}

/// Parse a netlist description into a [`Netlist`].
pub fn parse(input: &str) -> Result<Netlist, ParseError> {
    let statements = ast::scan(input)?;

    let mut graph = Netlist::with_capacity(statements.len(), statements.len());
    let mut lut: HashMap<Symbol, (NodeIndex, usize)> = HashMap::new();
    let mut adjacency: Vec<(NodeIndex, Vec<Symbol>)> = Vec::with_capacity(statements.len());

    for ast::Statement {
        kind,
        name,
        inputs,
        line,
    } in statements.into_iter()
    {
        let ni = graph.add_node(Component::new(kind, name.clone()));
        if let Some((_, first)) = lut.insert(name.clone(), (ni, line)) {
            return Err(ParseError::DuplicateNode {
                name,
                first,
                second: line,
            });
        }
        adjacency.push((ni, inputs));
    }

    for (ni, inputs) in adjacency.into_iter() {
        for (slot, name) in inputs.into_iter().enumerate() {
            if let Some((si, _)) = lut.get(&name) {
                graph.add_edge(*si, ni, slot);
            } else {
                return Err(ParseError::UndefinedReference {
                    name,
                    referrer: graph[ni].name().clone(),
                });
            }
        }
    }

    Ok(graph)
}

/// Components with no declared inputs, in declaration order.
pub fn source_nodes(netlist: &Netlist) -> Vec<NodeIndex> {
    netlist
        .node_indices()
        .filter(|ix| {
            netlist
                .edges_directed(*ix, Direction::Incoming)
                .next()
                .is_none()
        })
        .collect()
}

/// Designated sink components, in declaration order.
///
/// Components explicitly typed `OUTPUT` are the authoritative sink set when
/// at least one exists; otherwise any component never consumed by another
/// counts as a sink.
pub fn sink_nodes(netlist: &Netlist) -> Vec<NodeIndex> {
    let declared: Vec<NodeIndex> = netlist
        .node_indices()
        .filter(|ix| *netlist[*ix].kind() == ComponentKind::Output)
        .collect();
    if !declared.is_empty() {
        return declared;
    }

    netlist
        .node_indices()
        .filter(|ix| {
            netlist
                .edges_directed(*ix, Direction::Outgoing)
                .next()
                .is_none()
        })
        .collect()
}

/// Declared inputs of a component, in declaration order.
pub fn declared_inputs(netlist: &Netlist, node: NodeIndex) -> Vec<NodeIndex> {
    let mut inputs: Vec<(usize, NodeIndex)> = netlist
        .edges_directed(node, Direction::Incoming)
        .map(|e| (*e.weight(), e.source()))
        .collect();
    inputs.sort_unstable_by_key(|(slot, _)| *slot);
    inputs.into_iter().map(|(_, ix)| ix).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_valid() {
        let input = r#"
            # Simple Arithmetic Circuit
            INPUT a
            INPUT b
            ADD add1 a b
            MUL mul1 add1 b
            OUTPUT out1 mul1
            "#;
        let result = parse(input);
        assert!(matches!(result, Ok(_)));

        let g = result.unwrap();
        assert_eq!(g.node_count(), 5);
        assert_eq!(g.edge_count(), 5);
    }

    #[test]
    fn parse_forward_reference() {
        let input = r#"
            OUTPUT out1 mul1
            MUL mul1 a a
            INPUT a
            "#;
        let g = parse(input).expect("forward references resolve after the full read");
        assert_eq!(g.node_count(), 3);
        assert_eq!(g.edge_count(), 3);
    }

    #[test]
    fn parse_err_malformed() {
        let result = parse("INPUT a\nADD\n");
        assert!(matches!(
            result,
            Err(ParseError::MalformedLine { line: 2, .. })
        ));
    }

    #[test]
    fn parse_err_duplicate() {
        let input = "INPUT a\nINPUT b\nADD a b b";
        match parse(input) {
            Err(ParseError::DuplicateNode {
                name,
                first,
                second,
            }) => {
                assert_eq!(name.as_ref(), "a");
                assert_eq!((first, second), (1, 3));
            }
            other => panic!("expected duplicate node error, got {:?}", other),
        }
    }

    #[test]
    fn parse_err_undefined() {
        let input = "INPUT a\nADD s a ghost";
        match parse(input) {
            Err(ParseError::UndefinedReference { name, referrer }) => {
                assert_eq!(name.as_ref(), "ghost");
                assert_eq!(referrer.as_ref(), "s");
            }
            other => panic!("expected undefined reference error, got {:?}", other),
        }
    }

    #[test]
    fn comments_and_blanks_are_skipped() {
        let input = "\n  # comment\nINPUT a\n\t# indented comment\nOUTPUT y a\n\n";
        let g = parse(input).unwrap();
        assert_eq!(g.node_count(), 2);
        assert_eq!(g.edge_count(), 1);
    }

    #[test]
    fn declared_input_order_is_preserved() {
        let g = parse("INPUT a\nINPUT b\nMUX m b a b").unwrap();
        let m = g
            .node_indices()
            .find(|ix| g[*ix].name().as_ref() == "m")
            .unwrap();
        let names: Vec<String> = declared_inputs(&g, m)
            .iter()
            .map(|ix| g[*ix].name().to_string())
            .collect();
        assert_eq!(names, vec!["b", "a", "b"]);
    }

    #[test]
    fn source_nodes_have_no_inputs() {
        let g = parse("INPUT a\nINPUT b\nADD s a b\nOUTPUT y s").unwrap();
        let names: Vec<String> = source_nodes(&g)
            .iter()
            .map(|ix| g[*ix].name().to_string())
            .collect();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[test]
    fn sink_convention_prefers_output_components() {
        // With an explicit OUTPUT present, an unconsumed component is not a sink.
        let g = parse("INPUT a\nADD dangling a\nOUTPUT y a").unwrap();
        let sinks = sink_nodes(&g);
        assert_eq!(sinks.len(), 1);
        assert_eq!(g[sinks[0]].name().as_ref(), "y");

        // Without one, fall back to no-consumer detection.
        let g = parse("INPUT a\nADD s a\nMUL t s").unwrap();
        let names: Vec<String> = sink_nodes(&g)
            .iter()
            .map(|ix| g[*ix].name().to_string())
            .collect();
        assert_eq!(names, vec!["t"]);
    }

    #[test]
    fn custom_kinds_are_preserved() {
        let g = parse("INPUT a\nXOR x a a").unwrap();
        let x = g
            .node_indices()
            .find(|ix| g[*ix].name().as_ref() == "x")
            .unwrap();
        assert_eq!(g[x].kind().token(), "XOR");
        assert!(!g[x].kind().is_port());
    }
}
