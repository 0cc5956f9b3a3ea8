//! Plugin dependency resolution using topological sort.
//!
//! Ensures plugins are initialized in the correct order based on their
//! declared requirements. Uses a depth-first walk with a path stack so a
//! cycle can be reported as the exact loop that closes it.

use std::collections::HashMap;

use thiserror::Error;

/// Errors raised while building or ordering a [`DependencyGraph`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    /// An edge endpoint names a node that was never added.
    #[error("cannot make '{dependent}' depend on '{dependency}': '{missing}' was never registered")]
    UnknownNode {
        dependent: String,
        dependency: String,
        missing: String,
    },

    /// The graph contains a cycle. `path` starts and ends on the same node.
    #[error("dependency cycle detected: {}", .path.join(" -> "))]
    Cycle { path: Vec<String> },
}

#[derive(Debug, Clone)]
struct Node {
    name: String,
    /// Nodes this one must run after, in declaration order.
    depends_on: Vec<usize>,
    /// Nodes that must run after this one.
    dependents: Vec<usize>,
}

/// Directed graph over named nodes.
///
/// Node insertion order is remembered and used as the tie-break for nodes
/// with no ordering constraint between them, so the same sequence of calls
/// always yields the same order.
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    nodes: Vec<Node>,
    index: HashMap<String, usize>,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    Unvisited,
    OnPath,
    Done,
}

impl DependencyGraph {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a node. Adding an existing name is a no-op.
    pub fn add_node(&mut self, name: &str) {
        if self.index.contains_key(name) {
            return;
        }
        self.index.insert(name.to_string(), self.nodes.len());
        self.nodes.push(Node {
            name: name.to_string(),
            depends_on: Vec::new(),
            dependents: Vec::new(),
        });
    }

    /// Record that `name` must run after `depends_on`.
    ///
    /// Both nodes must already exist. On error the graph is left unchanged.
    pub fn add_dependency(&mut self, name: &str, depends_on: &str) -> Result<(), GraphError> {
        let unknown = |missing: &str| GraphError::UnknownNode {
            dependent: name.to_string(),
            dependency: depends_on.to_string(),
            missing: missing.to_string(),
        };
        let Some(&to) = self.index.get(name) else {
            return Err(unknown(name));
        };
        let Some(&from) = self.index.get(depends_on) else {
            return Err(unknown(depends_on));
        };

        if from == to {
            return Err(GraphError::Cycle {
                path: vec![name.to_string(), name.to_string()],
            });
        }

        if !self.nodes[to].depends_on.contains(&from) {
            self.nodes[to].depends_on.push(from);
            self.nodes[from].dependents.push(to);
        }
        Ok(())
    }

    /// Return every node name, each placed after all of its dependencies.
    pub fn topological_order(&self) -> Result<Vec<String>, GraphError> {
        let mut marks = vec![Mark::Unvisited; self.nodes.len()];
        let mut path = Vec::new();
        let mut order = Vec::with_capacity(self.nodes.len());

        for start in 0..self.nodes.len() {
            if marks[start] == Mark::Unvisited {
                self.visit(start, &mut marks, &mut path, &mut order)?;
            }
        }

        Ok(order)
    }

    fn visit(
        &self,
        node: usize,
        marks: &mut [Mark],
        path: &mut Vec<usize>,
        order: &mut Vec<String>,
    ) -> Result<(), GraphError> {
        match marks[node] {
            Mark::Done => return Ok(()),
            Mark::OnPath => {
                // The loop starts where this node was first pushed.
                let start = path.iter().position(|&n| n == node).unwrap_or(0);
                let mut cycle: Vec<String> = path[start..]
                    .iter()
                    .map(|&n| self.nodes[n].name.clone())
                    .collect();
                cycle.push(self.nodes[node].name.clone());
                return Err(GraphError::Cycle { path: cycle });
            }
            Mark::Unvisited => {}
        }

        marks[node] = Mark::OnPath;
        path.push(node);

        for &dep in &self.nodes[node].depends_on {
            self.visit(dep, marks, path, order)?;
        }

        path.pop();
        marks[node] = Mark::Done;
        order.push(self.nodes[node].name.clone());
        Ok(())
    }

    /// Check whether a node exists.
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True when no nodes have been added.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Node names in insertion order.
    pub fn node_names(&self) -> impl Iterator<Item = &str> {
        self.nodes.iter().map(|n| n.name.as_str())
    }

    /// Direct dependencies of a node, in declaration order.
    ///
    /// Returns an empty list for unknown nodes.
    pub fn dependencies_of(&self, name: &str) -> Vec<&str> {
        self.index
            .get(name)
            .map(|&i| {
                self.nodes[i]
                    .depends_on
                    .iter()
                    .map(|&d| self.nodes[d].name.as_str())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Nodes that directly depend on `name`.
    pub fn dependents_of(&self, name: &str) -> Vec<&str> {
        self.index
            .get(name)
            .map(|&i| {
                self.nodes[i]
                    .dependents
                    .iter()
                    .map(|&d| self.nodes[d].name.as_str())
                    .collect()
            })
            .unwrap_or_default()
    }
}
