//! Compiled graph: immutable, supports invoke only.

use std::collections::HashMap;
use std::time::Instant;

use tracing::{debug, info_span, Instrument};

use crate::errors::PipelineError;

use super::node::{Node, Router};
use super::END;

pub(super) enum Transition<S> {
    Direct(String),
    Conditional {
        router: Box<dyn Router<S>>,
        path_map: HashMap<String, String>,
    },
}

/// Result of [`CompiledGraph::invoke_traced`]: the final state plus the ids
/// of the nodes that ran, in order.
#[derive(Debug, Clone)]
pub struct GraphRun<S> {
    pub state: S,
    pub visited: Vec<String>,
}

/// A validated, executable graph.
///
/// Created by [`super::StateGraph::compile`]. Runs from the entry node,
/// following plain edges directly and asking routers at conditional edges,
/// until [`END`]. Node errors are returned untouched.
pub struct CompiledGraph<S> {
    pub(super) nodes: HashMap<String, Box<dyn Node<S>>>,
    pub(super) order: Vec<String>,
    pub(super) transitions: HashMap<String, Transition<S>>,
    pub(super) entry: String,
    pub(super) recursion_limit: usize,
}

impl<S> std::fmt::Debug for CompiledGraph<S>
where
    S: Send + 'static,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompiledGraph")
            .field("nodes", &self.order)
            .field("entry", &self.entry)
            .field("recursion_limit", &self.recursion_limit)
            .finish()
    }
}

impl<S> CompiledGraph<S>
where
    S: Send + 'static,
{
    /// Node ids in registration order.
    pub fn node_ids(&self) -> &[String] {
        &self.order
    }

    /// The node `START` leads to (or [`END`] for an empty pipeline).
    pub fn entry(&self) -> &str {
        &self.entry
    }

    /// Every possible successor of `node`, sorted, or `None` if `node` is unknown.
    pub fn successors(&self, node: &str) -> Option<Vec<&str>> {
        let mut next: Vec<&str> = match self.transitions.get(node)? {
            Transition::Direct(to) => vec![to.as_str()],
            Transition::Conditional { path_map, .. } => {
                path_map.values().map(String::as_str).collect()
            }
        };
        next.sort_unstable();
        next.dedup();
        Some(next)
    }

    /// Every `(from, to)` transition, sorted. Conditional edges contribute one
    /// pair per distinct target.
    pub fn edges(&self) -> Vec<(&str, &str)> {
        let mut edges: Vec<(&str, &str)> = self
            .transitions
            .keys()
            .flat_map(|from| {
                self.successors(from)
                    .unwrap_or_default()
                    .into_iter()
                    .map(move |to| (from.as_str(), to))
            })
            .collect();
        edges.sort_unstable();
        edges
    }

    /// Runs the graph to completion and returns the final state.
    pub async fn invoke(&self, state: S) -> Result<S, PipelineError> {
        self.invoke_traced(state).await.map(|run| run.state)
    }

    /// Runs the graph to completion, also reporting which nodes ran.
    pub async fn invoke_traced(&self, state: S) -> Result<GraphRun<S>, PipelineError> {
        let mut state = state;
        let mut visited = Vec::new();
        let mut current = self.entry.clone();

        while current != END {
            if visited.len() >= self.recursion_limit {
                return Err(PipelineError::RecursionLimit {
                    limit: self.recursion_limit,
                });
            }

            let (Some(node), Some(transition)) =
                (self.nodes.get(&current), self.transitions.get(&current))
            else {
                return Err(PipelineError::Routing {
                    node: visited.last().cloned().unwrap_or_default(),
                    label: current,
                });
            };

            let step = visited.len() + 1;
            let started = Instant::now();
            state = node
                .run(state)
                .instrument(info_span!("node", node = %current, step))
                .await?;
            debug!(
                node = %current,
                step,
                elapsed_ms = started.elapsed().as_millis() as u64,
                "Node complete"
            );

            let next = match transition {
                Transition::Direct(to) => to.clone(),
                Transition::Conditional { router, path_map } => {
                    let label = router.route(&state);
                    match path_map.get(label) {
                        Some(target) => target.clone(),
                        None => {
                            return Err(PipelineError::Routing {
                                node: current,
                                label: label.to_string(),
                            })
                        }
                    }
                }
            };

            visited.push(current);
            current = next;
        }

        Ok(GraphRun { state, visited })
    }
}
