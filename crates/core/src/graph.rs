//! Reference graph over template names.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

/// Directed graph where an edge `a -> b` means template `a` references `b`.
#[derive(Debug, Clone, Default)]
pub struct ReferenceGraph {
    names: Vec<String>,
    index: BTreeMap<String, usize>,
    /// Outgoing edges (dependencies) per node.
    edges: Vec<BTreeSet<usize>>,
}

impl ReferenceGraph {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut graph = Self::default();
        for name in names {
            graph.add_node(name);
        }
        graph
    }

    pub fn add_node(&mut self, name: impl Into<String>) -> usize {
        let name = name.into();
        if let Some(&id) = self.index.get(&name) {
            return id;
        }
        let id = self.names.len();
        self.index.insert(name.clone(), id);
        self.names.push(name);
        self.edges.push(BTreeSet::new());
        id
    }

    /// Record that `from` references `to`. Unknown names are added as nodes.
    pub fn add_edge(&mut self, from: &str, to: &str) {
        let from = self.add_node(from);
        let to = self.add_node(to);
        self.edges[from].insert(to);
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Direct references of `name`, ordered by when each node was added to
    /// the graph (not by position in the definition).
    pub fn dependencies(&self, name: &str) -> Vec<&str> {
        self.index
            .get(name)
            .map(|&id| self.edges[id].iter().map(|&dep| self.names[dep].as_str()).collect())
            .unwrap_or_default()
    }

    /// Order nodes so every template comes after the templates it references.
    ///
    /// On a cycle, returns the names along one cycle, starting and ending with
    /// the same name.
    pub fn topological_order(&self) -> Result<Vec<&str>, Vec<String>> {
        let count = self.names.len();
        let mut remaining: Vec<usize> = self.edges.iter().map(BTreeSet::len).collect();
        let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); count];
        for (from, deps) in self.edges.iter().enumerate() {
            for &to in deps {
                dependents[to].push(from);
            }
        }

        // Kahn's algorithm, seeded in insertion order for deterministic output.
        let mut queue: VecDeque<usize> = (0..count).filter(|&id| remaining[id] == 0).collect();
        let mut order = Vec::with_capacity(count);
        while let Some(id) = queue.pop_front() {
            order.push(id);
            for &dependent in &dependents[id] {
                remaining[dependent] -= 1;
                if remaining[dependent] == 0 {
                    queue.push_back(dependent);
                }
            }
        }

        if order.len() == count {
            return Ok(order.into_iter().map(|id| self.names[id].as_str()).collect());
        }

        let unresolved: BTreeSet<usize> = (0..count).filter(|&id| remaining[id] > 0).collect();
        Err(self.find_cycle(&unresolved))
    }

    /// Every unresolved node has a dependency that is itself unresolved, so
    /// walking those edges must revisit a node.
    fn find_cycle(&self, unresolved: &BTreeSet<usize>) -> Vec<String> {
        let Some(&start) = unresolved.iter().next() else {
            return Vec::new();
        };
        let mut path = vec![start];
        let mut current = start;
        loop {
            let Some(&next) = self.edges[current].iter().find(|dep| unresolved.contains(dep))
            else {
                return path.iter().map(|&id| self.names[id].clone()).collect();
            };
            if let Some(pos) = path.iter().position(|&id| id == next) {
                let mut chain: Vec<String> =
                    path[pos..].iter().map(|&id| self.names[id].clone()).collect();
                chain.push(self.names[next].clone());
                return chain;
            }
            path.push(next);
            current = next;
        }
    }
}
