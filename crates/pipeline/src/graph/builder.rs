//! Graph assembly and compile-time validation.

use std::collections::{HashMap, HashSet, VecDeque};

use crate::errors::GraphError;

use super::compiled::{CompiledGraph, Transition};
use super::node::{Node, Router};
use super::{DEFAULT_RECURSION_LIMIT, END, START};

struct ConditionalEdge<S> {
    from: String,
    router: Box<dyn Router<S>>,
    path_map: HashMap<String, String>,
}

/// Mutable graph under construction.
///
/// Errors found while adding nodes (empty or duplicate ids) are recorded and
/// reported by [`StateGraph::compile`], so assembly code can chain calls
/// without checking each one.
pub struct StateGraph<S> {
    nodes: HashMap<String, Box<dyn Node<S>>>,
    /// Registration order; makes validation errors deterministic.
    order: Vec<String>,
    edges: Vec<(String, String)>,
    conditional: Vec<ConditionalEdge<S>>,
    deferred: Vec<GraphError>,
    recursion_limit: usize,
}

impl<S> Default for StateGraph<S>
where
    S: Send + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<S> StateGraph<S>
where
    S: Send + 'static,
{
    /// Creates an empty graph.
    pub fn new() -> Self {
        Self {
            nodes: HashMap::new(),
            order: Vec::new(),
            edges: Vec::new(),
            conditional: Vec::new(),
            deferred: Vec::new(),
            recursion_limit: DEFAULT_RECURSION_LIMIT,
        }
    }

    /// Caps the number of node executions per invocation.
    pub fn with_recursion_limit(mut self, limit: usize) -> Self {
        self.recursion_limit = limit;
        self
    }

    /// Registers a node under `id`.
    pub fn add_node(&mut self, id: impl Into<String>, node: Box<dyn Node<S>>) -> &mut Self {
        let id = id.into();
        if id.trim().is_empty() || id == START || id == END {
            self.deferred.push(GraphError::EmptyNodeId);
        } else if self.nodes.contains_key(&id) {
            self.deferred.push(GraphError::DuplicateNode(id));
        } else {
            self.order.push(id.clone());
            self.nodes.insert(id, node);
        }
        self
    }

    /// Adds an unconditional edge. `from` may be [`START`]; `to` may be [`END`].
    pub fn add_edge(&mut self, from: impl Into<String>, to: impl Into<String>) -> &mut Self {
        self.edges.push((from.into(), to.into()));
        self
    }

    /// Adds a conditional edge leaving `from`.
    ///
    /// After `from` runs, `router` picks a label and `path_map` maps it to the
    /// next node (or [`END`]). The path map must cover every label the router
    /// declares, and nothing else.
    pub fn add_conditional_edges<I, L, T>(
        &mut self,
        from: impl Into<String>,
        router: Box<dyn Router<S>>,
        path_map: I,
    ) -> &mut Self
    where
        I: IntoIterator<Item = (L, T)>,
        L: Into<String>,
        T: Into<String>,
    {
        self.conditional.push(ConditionalEdge {
            from: from.into(),
            router,
            path_map: path_map
                .into_iter()
                .map(|(l, t)| (l.into(), t.into()))
                .collect(),
        });
        self
    }

    /// Validates the graph and freezes it.
    ///
    /// Rejects, in order: node registration errors; a missing or ambiguous
    /// entry; edges touching unknown nodes; conditional edges whose path map
    /// omits or invents labels; nodes with zero or several outgoing
    /// transitions; nodes unreachable from [`START`].
    pub fn compile(self) -> Result<CompiledGraph<S>, GraphError> {
        if let Some(err) = self.deferred.first() {
            return Err(err.clone());
        }

        let entries: Vec<&String> = self
            .edges
            .iter()
            .filter(|(from, _)| from == START)
            .map(|(_, to)| to)
            .collect();
        let entry = match entries.as_slice() {
            [] => return Err(GraphError::MissingEntry),
            [only] => (*only).clone(),
            _ => return Err(GraphError::ConflictingEdges(START.to_string())),
        };

        let known = |id: &str| self.nodes.contains_key(id);

        for (from, to) in &self.edges {
            if from != START && !known(from.as_str()) {
                return Err(GraphError::UnknownNode {
                    node: from.clone(),
                    referenced_by: format!("edge to '{to}'"),
                });
            }
            if to != END && !known(to.as_str()) {
                return Err(GraphError::UnknownNode {
                    node: to.clone(),
                    referenced_by: format!("edge from '{from}'"),
                });
            }
        }

        for edge in &self.conditional {
            if !known(edge.from.as_str()) {
                return Err(GraphError::UnknownNode {
                    node: edge.from.clone(),
                    referenced_by: "conditional edge".to_string(),
                });
            }
            for label in edge.router.labels() {
                if !edge.path_map.contains_key(*label) {
                    return Err(GraphError::MissingBranchTarget {
                        from: edge.from.clone(),
                        label: (*label).to_string(),
                    });
                }
            }
            let mut mapped: Vec<(&String, &String)> = edge.path_map.iter().collect();
            mapped.sort();
            for (label, target) in mapped {
                if !edge.router.labels().iter().any(|l| *l == label.as_str()) {
                    return Err(GraphError::UnknownBranchLabel {
                        from: edge.from.clone(),
                        label: label.clone(),
                    });
                }
                if target != END && !known(target.as_str()) {
                    return Err(GraphError::UnknownNode {
                        node: target.clone(),
                        referenced_by: format!("conditional edge from '{}'", edge.from),
                    });
                }
            }
        }

        for id in &self.order {
            let outgoing = self.edges.iter().filter(|(from, _)| from == id).count()
                + self.conditional.iter().filter(|c| &c.from == id).count();
            match outgoing {
                0 => return Err(GraphError::DanglingNode(id.clone())),
                1 => {}
                _ => return Err(GraphError::ConflictingEdges(id.clone())),
            }
        }

        let reachable = self.reachable_from(&entry);
        if let Some(id) = self.order.iter().find(|id| !reachable.contains(id.as_str())) {
            return Err(GraphError::UnreachableNode(id.clone()));
        }

        let mut transitions = HashMap::new();
        for (from, to) in self.edges {
            if from != START {
                transitions.insert(from, Transition::Direct(to));
            }
        }
        for edge in self.conditional {
            transitions.insert(
                edge.from,
                Transition::Conditional {
                    router: edge.router,
                    path_map: edge.path_map,
                },
            );
        }

        Ok(CompiledGraph {
            nodes: self.nodes,
            order: self.order,
            transitions,
            entry,
            recursion_limit: self.recursion_limit,
        })
    }

    fn reachable_from(&self, entry: &str) -> HashSet<String> {
        let mut seen = HashSet::new();
        let mut queue = VecDeque::from([entry.to_string()]);
        while let Some(id) = queue.pop_front() {
            if id == END || !seen.insert(id.clone()) {
                continue;
            }
            for (from, to) in &self.edges {
                if *from == id {
                    queue.push_back(to.clone());
                }
            }
            for edge in self.conditional.iter().filter(|c| c.from == id) {
                queue.extend(edge.path_map.values().cloned());
            }
        }
        seen
    }
}
