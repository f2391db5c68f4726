/*
 * Exploded Graph
 *
 * Node cache over (program point, state equivalence class). The state's
 * forgetful equality — bindings, constraints, top of stack — is the
 * interning key, so paths differing only in consumed operands or visit
 * counts share a node. Re-enqueuing an existing node with the same
 * exit-path flag is a no-op; this is the core deduplication mechanism.
 */

use rustc_hash::FxHashMap;

use crate::features::program_state::state::ProgramState;
use crate::shared::models::cfg::ProgramPoint;

/// Index of a node in the graph
pub type NodeId = usize;

#[derive(Debug, Clone)]
pub struct Node {
    pub point: ProgramPoint,
    pub state: ProgramState,
    /// Set while the path traverses finally blocks on an exceptional or
    /// early-exit route
    pub exit_path: bool,
}

#[derive(Debug, Default)]
pub struct ExplodedGraph {
    index: FxHashMap<(ProgramPoint, ProgramState), NodeId>,
    nodes: Vec<Node>,
}

impl ExplodedGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Intern (point, state); the flag tells whether the node is new
    pub fn node(&mut self, point: ProgramPoint, state: ProgramState) -> (NodeId, bool) {
        if let Some(&id) = self.index.get(&(point, state.clone())) {
            return (id, false);
        }
        let id = self.nodes.len();
        self.nodes.push(Node {
            point,
            state: state.clone(),
            exit_path: false,
        });
        self.index.insert((point, state), id);
        (id, true)
    }

    pub fn get(&self, id: NodeId) -> &Node {
        &self.nodes[id]
    }

    pub fn exit_path(&self, id: NodeId) -> bool {
        self.nodes[id].exit_path
    }

    pub fn set_exit_path(&mut self, id: NodeId, exit_path: bool) {
        self.nodes[id].exit_path = exit_path;
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::symbolic_values::value::{ValueFactory, ValueKind};
    use crate::shared::models::cfg::BlockId;

    #[test]
    fn test_equal_states_intern_to_one_node() {
        let mut factory = ValueFactory::new();
        let below_a = factory.fresh(ValueKind::Plain);
        let below_b = factory.fresh(ValueKind::Plain);
        let top = factory.fresh(ValueKind::Plain);

        let mut graph = ExplodedGraph::new();
        let point = ProgramPoint::new(BlockId(0), 1);

        // same bindings/constraints/top, different consumed operands
        let s1 = ProgramState::new().stack_value(below_a).stack_value(top);
        let s2 = ProgramState::new().stack_value(below_b).stack_value(top);

        let (n1, new1) = graph.node(point, s1);
        let (n2, new2) = graph.node(point, s2);
        assert!(new1);
        assert!(!new2);
        assert_eq!(n1, n2);
        assert_eq!(graph.len(), 1);
    }

    #[test]
    fn test_distinct_points_make_distinct_nodes() {
        let mut graph = ExplodedGraph::new();
        let state = ProgramState::new();
        let (n1, _) = graph.node(ProgramPoint::new(BlockId(0), 0), state.clone());
        let (n2, _) = graph.node(ProgramPoint::new(BlockId(0), 1), state);
        assert_ne!(n1, n2);
    }

    #[test]
    fn test_exit_path_flag_is_mutable() {
        let mut graph = ExplodedGraph::new();
        let (id, _) = graph.node(ProgramPoint::new(BlockId(0), 0), ProgramState::new());
        assert!(!graph.exit_path(id));
        graph.set_exit_path(id, true);
        assert!(graph.exit_path(id));
    }
}
