// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Data-flow graph declared by the pipeline's tasks.
//!
//! Tasks declare the store keys they read (in-ports) and write (out-ports)
//! while configuring. At start the whole graph is validated in one go:
//!
//! 1. every edge has at most one producer
//! 2. every edge is declared with a single kind
//! 3. every in-port has a producer
//! 4. the consumer→producer graph is acyclic
//!
//! Problems from the first three checks are accumulated, and cycle detection
//! only runs on a structurally sound graph. Components and edges are always
//! enumerated by name, so diagnostics and exports are deterministic.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use serde::Serialize;

use crate::config::tarjan;
use crate::config::value::Kind;
use crate::errors::{Direction, Error, PortRef, Result, ValidationError};

#[derive(Debug, Default, Clone)]
pub struct Node {
    pub ins: BTreeMap<String, Kind>,
    pub outs: BTreeMap<String, Kind>,
}

#[derive(Debug, Default)]
pub struct DataFlow {
    nodes: BTreeMap<String, Node>,
}

impl DataFlow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_in(&mut self, component: &str, port: &str, kind: Kind) -> Result<()> {
        let node = self.nodes.entry(component.to_string()).or_default();
        if node.ins.contains_key(port) {
            return Err(Error::DuplicatePort {
                component: component.to_string(),
                port: port.to_string(),
                direction: "in",
            });
        }
        node.ins.insert(port.to_string(), kind);
        Ok(())
    }

    pub fn add_out(&mut self, component: &str, port: &str, kind: Kind) -> Result<()> {
        let node = self.nodes.entry(component.to_string()).or_default();
        if node.outs.contains_key(port) {
            return Err(Error::DuplicatePort {
                component: component.to_string(),
                port: port.to_string(),
                direction: "out",
            });
        }
        node.outs.insert(port.to_string(), kind);
        Ok(())
    }

    pub fn nodes(&self) -> &BTreeMap<String, Node> {
        &self.nodes
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
    }

    /// Every edge name with the kind of its first declaration, sorted by name.
    pub fn edges(&self) -> BTreeMap<String, Kind> {
        let mut edges = BTreeMap::new();
        for node in self.nodes.values() {
            for (name, kind) in node.outs.iter().chain(node.ins.iter()) {
                edges.entry(name.clone()).or_insert_with(|| kind.clone());
            }
        }
        edges
    }

    /// Names of every produced edge: the keys of the per-event store.
    pub fn store_keys(&self) -> Vec<String> {
        self.producers().into_keys().collect()
    }

    /// Edge name to its producers, both sorted.
    fn producers(&self) -> BTreeMap<String, Vec<(&str, &Kind)>> {
        let mut producers: BTreeMap<String, Vec<(&str, &Kind)>> = BTreeMap::new();
        for (component, node) in &self.nodes {
            for (port, kind) in &node.outs {
                producers
                    .entry(port.clone())
                    .or_default()
                    .push((component.as_str(), kind));
            }
        }
        producers
    }

    pub fn validate(&self) -> std::result::Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();
        let producers = self.producers();

        for (port, owners) in &producers {
            let (first, first_kind) = owners[0];
            for &(second, second_kind) in &owners[1..] {
                errors.push(ValidationError::DuplicateProducer {
                    port: port.clone(),
                    first: first.to_string(),
                    first_kind: first_kind.clone(),
                    second: second.to_string(),
                    second_kind: second_kind.clone(),
                });
            }
        }

        errors.extend(self.kind_mismatches());

        for (component, node) in &self.nodes {
            for port in node.ins.keys() {
                if !producers.contains_key(port) {
                    errors.push(ValidationError::MissingProducer {
                        component: component.clone(),
                        port: port.clone(),
                    });
                }
            }
        }

        if errors.is_empty() {
            errors.extend(self.cycles(&producers));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    fn kind_mismatches(&self) -> Vec<ValidationError> {
        let mut refs: BTreeMap<&str, Vec<PortRef>> = BTreeMap::new();
        for (component, node) in &self.nodes {
            let ins = node.ins.iter().map(|(p, k)| (p, k, Direction::In));
            let outs = node.outs.iter().map(|(p, k)| (p, k, Direction::Out));
            for (port, kind, direction) in ins.chain(outs) {
                refs.entry(port.as_str()).or_default().push(PortRef {
                    component: component.clone(),
                    direction,
                    kind: kind.clone(),
                });
            }
        }

        refs.into_iter()
            .filter(|(_, refs)| refs.iter().any(|r| r.kind != refs[0].kind))
            .map(|(port, refs)| ValidationError::KindMismatch {
                port: port.to_string(),
                refs,
            })
            .collect()
    }

    fn cycles(&self, producers: &BTreeMap<String, Vec<(&str, &Kind)>>) -> Vec<ValidationError> {
        let names: Vec<&String> = self.nodes.keys().collect();
        let position: BTreeMap<&str, usize> = names
            .iter()
            .enumerate()
            .map(|(i, name)| (name.as_str(), i))
            .collect();

        // consumer -> producer
        let adjacency: Vec<Vec<usize>> = self
            .nodes
            .iter()
            .map(|(consumer, node)| {
                let mut targets: Vec<usize> = node
                    .ins
                    .keys()
                    .filter_map(|port| producers.get(port))
                    .flatten()
                    .filter(|(producer, _)| *producer != consumer.as_str())
                    .filter_map(|(producer, _)| position.get(producer).copied())
                    .collect();
                targets.sort_unstable();
                targets.dedup();
                targets
            })
            .collect();

        let mut cycles: Vec<Vec<String>> = tarjan::components(&adjacency)
            .into_iter()
            .filter(|scc| scc.len() > 1)
            .map(|scc| {
                let mut members: Vec<String> = scc.into_iter().map(|i| names[i].clone()).collect();
                members.sort();
                members
            })
            .collect();
        cycles.sort();

        cycles
            .into_iter()
            .map(|members| ValidationError::Cycle { members })
            .collect()
    }

    /// Graphviz description of the bipartite edge/task graph.
    pub fn to_dot(&self) -> String {
        let mut out = String::from("digraph dataflow {\n");
        for (name, kind) in self.edges() {
            let _ = writeln!(out, "\t{:?} [node=\"data\", type={:?}];", name, kind.to_string());
        }
        for name in self.nodes.keys() {
            let _ = writeln!(out, "\t{name:?} [node=\"task\", shape=\"component\"];");
        }
        for (name, node) in &self.nodes {
            for port in node.ins.keys() {
                let _ = writeln!(out, "\t{port:?} -> {name:?};");
            }
            for port in node.outs.keys() {
                let _ = writeln!(out, "\t{name:?} -> {port:?};");
            }
        }
        out.push_str("}\n");
        out
    }

    /// JSON description of the same graph as [`DataFlow::to_dot`].
    pub fn to_json(&self) -> Result<String> {
        #[derive(Serialize)]
        struct Edge {
            name: String,
            kind: Kind,
        }

        #[derive(Serialize)]
        struct Task<'a> {
            name: &'a str,
            inputs: Vec<&'a str>,
            outputs: Vec<&'a str>,
        }

        #[derive(Serialize)]
        struct Graph<'a> {
            data: Vec<Edge>,
            tasks: Vec<Task<'a>>,
        }

        let graph = Graph {
            data: self
                .edges()
                .into_iter()
                .map(|(name, kind)| Edge { name, kind })
                .collect(),
            tasks: self
                .nodes
                .iter()
                .map(|(name, node)| Task {
                    name,
                    inputs: node.ins.keys().map(String::as_str).collect(),
                    outputs: node.outs.keys().map(String::as_str).collect(),
                })
                .collect(),
        };
        Ok(serde_json::to_string_pretty(&graph)?)
    }
}
