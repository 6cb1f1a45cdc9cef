//! Transform dependency graph and execution ordering
//!
//! Each transform writes exactly one table and reads any number of tables.
//! An edge runs from the transform that writes a table to every transform
//! that reads it, so a topological order always populates a table before
//! anything joins against it. Tables no transform writes (staging tables)
//! are external inputs and add no edges.

use crate::error::{CoreError, CoreResult};
use crate::table_name::TableName;
use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap, HashSet};

/// A directed acyclic graph of transforms, keyed by the table each one writes
#[derive(Debug)]
pub struct TransformDag {
    /// The underlying graph; node indices follow declaration order
    graph: DiGraph<TableName, ()>,

    /// Map from written table to node index
    node_map: HashMap<TableName, NodeIndex>,
}

impl TransformDag {
    /// Build the DAG from `(written table, read tables)` declarations.
    ///
    /// Fails if a table name is invalid, if two declarations write the same
    /// table, or if the declarations form a cycle.
    pub fn build<'a, I, R>(declarations: I) -> CoreResult<Self>
    where
        I: IntoIterator<Item = (&'a str, R)>,
        R: IntoIterator<Item = &'a str>,
    {
        let mut graph = DiGraph::new();
        let mut node_map = HashMap::new();
        let mut reads: Vec<(NodeIndex, Vec<TableName>)> = Vec::new();

        for (target, sources) in declarations {
            let target = parse_table(target, "transform target")?;
            if node_map.contains_key(&target) {
                return Err(CoreError::DuplicateWriter {
                    table: target.into_inner(),
                });
            }
            let idx = graph.add_node(target.clone());
            node_map.insert(target, idx);

            let sources = sources
                .into_iter()
                .map(|s| parse_table(s, "transform input"))
                .collect::<CoreResult<Vec<_>>>()?;
            reads.push((idx, sources));
        }

        for (reader, sources) in reads {
            for source in sources {
                if let Some(&writer) = node_map.get(&source) {
                    // Edge goes from writer to reader so writers sort first
                    graph.update_edge(writer, reader, ());
                }
            }
        }

        let dag = Self { graph, node_map };
        dag.validate()?;
        Ok(dag)
    }

    /// Validate the DAG has no cycles
    pub fn validate(&self) -> CoreResult<()> {
        match toposort(&self.graph, None) {
            Ok(_) => Ok(()),
            Err(cycle) => Err(CoreError::CircularDependency {
                cycle: self.find_cycle_path(cycle.node_id()),
            }),
        }
    }

    /// Find a cycle path starting from a node for error reporting
    fn find_cycle_path(&self, start: NodeIndex) -> String {
        let mut path: Vec<String> = vec![self.graph[start].to_string()];
        let mut current = start;
        let mut visited = HashSet::new();
        visited.insert(current);

        while let Some(edge) = self.graph.edges(current).next() {
            let target = edge.target();
            path.push(self.graph[target].to_string());

            if target == start || visited.contains(&target) {
                break;
            }

            visited.insert(target);
            current = target;
        }

        path.join(" -> ")
    }

    /// Written tables in execution order.
    ///
    /// Kahn's algorithm over a min-heap of node indices: among transforms whose
    /// inputs are all ready, the one declared first runs first, so the order is
    /// stable for a given declaration list.
    pub fn execution_order(&self) -> CoreResult<Vec<TableName>> {
        let mut in_degree: Vec<usize> = self
            .graph
            .node_indices()
            .map(|idx| {
                self.graph
                    .edges_directed(idx, Direction::Incoming)
                    .count()
            })
            .collect();

        let mut ready: BinaryHeap<Reverse<usize>> = in_degree
            .iter()
            .enumerate()
            .filter(|(_, d)| **d == 0)
            .map(|(i, _)| Reverse(i))
            .collect();

        let mut order = Vec::with_capacity(self.graph.node_count());
        while let Some(Reverse(i)) = ready.pop() {
            let idx = NodeIndex::new(i);
            order.push(self.graph[idx].clone());
            for edge in self.graph.edges_directed(idx, Direction::Outgoing) {
                let next = edge.target().index();
                in_degree[next] -= 1;
                if in_degree[next] == 0 {
                    ready.push(Reverse(next));
                }
            }
        }

        if order.len() != self.graph.node_count() {
            let stuck = in_degree
                .iter()
                .position(|&d| d > 0)
                .map(NodeIndex::new)
                .unwrap_or_else(|| NodeIndex::new(0));
            return Err(CoreError::CircularDependency {
                cycle: self.find_cycle_path(stuck),
            });
        }
        Ok(order)
    }

    /// Tables written by other transforms that `table`'s transform reads
    pub fn dependencies(&self, table: &str) -> Vec<String> {
        let Some(&idx) = self.node_map.get(table) else {
            return Vec::new();
        };
        let mut names: Vec<String> = self
            .graph
            .edges_directed(idx, Direction::Incoming)
            .map(|e| self.graph[e.source()].to_string())
            .collect();
        names.sort();
        names
    }
}

fn parse_table(name: &str, context: &str) -> CoreResult<TableName> {
    if name.is_empty() {
        return Err(CoreError::EmptyName {
            context: context.to_string(),
        });
    }
    TableName::try_new(name).ok_or_else(|| CoreError::ConfigInvalid {
        message: format!("invalid table name '{name}' in {context}"),
    })
}

#[cfg(test)]
#[path = "dag_test.rs"]
mod tests;
