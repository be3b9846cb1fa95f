//! Module graph construction and traversal.

use std::collections::{HashMap, HashSet, VecDeque};

use gemgraph_core::module::Module;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;

/// A node in the module graph.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ModuleNode {
    pub name: String,
    pub version: String,
}

impl std::fmt::Display for ModuleNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.version.is_empty() {
            f.write_str(&self.name)
        } else {
            write!(f, "{} v{}", self.name, self.version)
        }
    }
}

/// The resolved modules as a petgraph digraph, one node per gem name.
pub struct ModuleGraph {
    graph: DiGraph<ModuleNode, ()>,
    index: HashMap<String, NodeIndex>,
    pub root: Option<NodeIndex>,
}

impl ModuleGraph {
    pub fn new() -> Self {
        Self {
            graph: DiGraph::new(),
            index: HashMap::new(),
            root: None,
        }
    }

    /// Build from a flat module list, using each module's child map as its
    /// outgoing edges. The first module flagged `root` becomes the root.
    pub fn from_modules(modules: &[Module]) -> Self {
        let mut graph = Self::new();
        for module in modules {
            let idx = graph.add_node(module);
            if module.root && graph.root.is_none() {
                graph.root = Some(idx);
            }
        }
        for module in modules {
            let Some(from) = graph.find(&module.name) else {
                continue;
            };
            for child in module.modules.values() {
                let to = graph.add_node(child);
                graph.add_edge(from, to);
            }
        }
        graph
    }

    /// Add or retrieve the node for a module name.
    fn add_node(&mut self, module: &Module) -> NodeIndex {
        if let Some(&idx) = self.index.get(&module.name) {
            return idx;
        }
        let idx = self.graph.add_node(ModuleNode {
            name: module.name.clone(),
            version: module.version.clone(),
        });
        self.index.insert(module.name.clone(), idx);
        idx
    }

    fn add_edge(&mut self, from: NodeIndex, to: NodeIndex) {
        if !self.graph.edges(from).any(|e| e.target() == to) {
            self.graph.add_edge(from, to, ());
        }
    }

    pub fn find(&self, name: &str) -> Option<NodeIndex> {
        self.index.get(name).copied()
    }

    pub fn node(&self, idx: NodeIndex) -> &ModuleNode {
        &self.graph[idx]
    }

    /// Direct dependencies of a node, sorted by name.
    pub fn dependencies_of(&self, idx: NodeIndex) -> Vec<NodeIndex> {
        let mut deps: Vec<NodeIndex> = self
            .graph
            .edges_directed(idx, Direction::Outgoing)
            .map(|e| e.target())
            .collect();
        deps.sort_by(|a, b| self.graph[*a].name.cmp(&self.graph[*b].name));
        deps
    }

    /// Shortest number of edges from the root to `name`.
    pub fn depth_of(&self, name: &str) -> Option<usize> {
        self.depths().get(&self.find(name)?).copied()
    }

    /// The largest shortest-path depth of any module reachable from the root.
    pub fn max_depth(&self) -> usize {
        self.depths().into_values().max().unwrap_or(0)
    }

    fn depths(&self) -> HashMap<NodeIndex, usize> {
        let mut depths = HashMap::new();
        let Some(root) = self.root else {
            return depths;
        };
        depths.insert(root, 0);
        let mut queue = VecDeque::from([root]);
        while let Some(idx) = queue.pop_front() {
            let depth = depths[&idx];
            for child in self.graph.neighbors_directed(idx, Direction::Outgoing) {
                if let std::collections::hash_map::Entry::Vacant(e) = depths.entry(child) {
                    e.insert(depth + 1);
                    queue.push_back(child);
                }
            }
        }
        depths
    }

    /// Render the dependency tree. Repeated subtrees are printed once per
    /// path but never recurse into themselves.
    pub fn print_tree(&self) -> String {
        let mut output = String::new();
        let Some(root) = self.root else {
            return output;
        };
        output.push_str(&format!("{}\n", self.graph[root]));

        let mut visited = HashSet::new();
        visited.insert(root);
        let deps = self.dependencies_of(root);
        let count = deps.len();
        for (i, idx) in deps.into_iter().enumerate() {
            let is_last = i == count - 1;
            self.print_subtree(&mut output, idx, "", is_last, &mut visited);
        }
        output
    }

    fn print_subtree(
        &self,
        output: &mut String,
        idx: NodeIndex,
        prefix: &str,
        is_last: bool,
        visited: &mut HashSet<NodeIndex>,
    ) {
        let connector = if is_last { "└── " } else { "├── " };
        let node = &self.graph[idx];
        output.push_str(&format!("{prefix}{connector}{node}\n"));

        if !visited.insert(idx) {
            return;
        }

        let child_prefix = format!("{prefix}{}", if is_last { "    " } else { "│   " });
        let deps = self.dependencies_of(idx);
        let count = deps.len();
        for (i, child) in deps.into_iter().enumerate() {
            let is_last = i == count - 1;
            self.print_subtree(output, child, &child_prefix, is_last, visited);
        }

        visited.remove(&idx);
    }

    /// Path from the root to the module called `name`, root first.
    pub fn find_path(&self, name: &str) -> Option<Vec<&ModuleNode>> {
        let root = self.root?;
        let target = self.find(name)?;
        let mut path = Vec::new();
        let mut visited = HashSet::new();
        if self.dfs_path(root, target, &mut path, &mut visited) {
            Some(path.iter().map(|&idx| &self.graph[idx]).collect())
        } else {
            None
        }
    }

    fn dfs_path(
        &self,
        current: NodeIndex,
        target: NodeIndex,
        path: &mut Vec<NodeIndex>,
        visited: &mut HashSet<NodeIndex>,
    ) -> bool {
        path.push(current);
        if current == target {
            return true;
        }
        if !visited.insert(current) {
            path.pop();
            return false;
        }
        for child in self.dependencies_of(current) {
            if self.dfs_path(child, target, path, visited) {
                return true;
            }
        }
        path.pop();
        false
    }

    /// Number of nodes (excluding root).
    pub fn len(&self) -> usize {
        let total = self.graph.node_count();
        if self.root.is_some() {
            total.saturating_sub(1)
        } else {
            total
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for ModuleGraph {
    fn default() -> Self {
        Self::new()
    }
}
