//! Component-delay configuration.
//!
//! Propagation delays are not hard-coded into the analysis: a [`DelayTable`]
//! maps component type tokens to delay values and is passed into the graph
//! engine by the caller. A table may carry a fallback delay for types it
//! does not name; without one, pricing an unlisted type is an error.
//!
//! Tables can be loaded from a TOML file:
//!
//! ```toml
//! default = 0.5
//!
//! [delays]
//! INPUT = 0.0
//! ADD = 1.0
//! REG = 0.2
//! ```

use anyhow::{Result, bail};
use serde::Deserialize;
use std::collections::HashMap;

use crate::netlist::ComponentKind;

/// Mapping from component type to propagation delay, in abstract time units.
#[derive(Debug, Clone, PartialEq)]
pub struct DelayTable {
    delays: HashMap<String, f64>,
    default_delay: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct DelayFile {
    #[serde(default)]
    default: Option<f64>,
    #[serde(default)]
    delays: HashMap<String, f64>,
}

impl DelayTable {
    /// An empty table with an optional fallback delay for unlisted types.
    pub fn new(default_delay: Option<f64>) -> DelayTable {
        DelayTable {
            delays: HashMap::new(),
            default_delay,
        }
    }

    /// Register the delay of a component type, replacing any earlier entry.
    pub fn insert(&mut self, kind: &str, delay: f64) {
        self.delays.insert(kind.to_string(), delay);
    }

    /// Delay of the given component kind.
    ///
    /// Falls back to the table's default entry when the kind is not named;
    /// `None` means the kind cannot be priced at all.
    pub fn delay_of(&self, kind: &ComponentKind) -> Option<f64> {
        self.delays.get(kind.token()).copied().or(self.default_delay)
    }

    /// Parse a delay table from its TOML representation.
    ///
    /// Delays model signal propagation and must be non-negative.
    pub fn from_toml(input: &str) -> Result<DelayTable> {
        let DelayFile { default, delays } = toml::from_str(input)?;

        for (kind, delay) in delays.iter() {
            if *delay < 0.0 {
                bail!("negative delay {} for component type {}", delay, kind);
            }
        }
        if let Some(delay) = default {
            if delay < 0.0 {
                bail!("negative default delay {}", delay);
            }
        }

        Ok(DelayTable {
            delays,
            default_delay: default,
        })
    }
}

impl Default for DelayTable {
    fn default() -> DelayTable {
        let mut table = DelayTable::new(Some(0.5));
        for (kind, delay) in [
            ("INPUT", 0.0),
            ("OUTPUT", 0.5),
            ("ADD", 1.0),
            ("MUL", 1.0),
            ("MUX", 1.0),
            ("REG", 0.2),
        ] {
            table.insert(kind, delay);
        }
        table
    }
}
