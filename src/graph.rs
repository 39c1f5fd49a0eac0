//! Formula dependency graph of one sheet.
//!
//! Every grid coordinate gets a node, blank cells included, so any reference
//! that survived extraction has somewhere to land. Edges point from a formula
//! cell to the cells it `uses`; the reverse direction is kept as `used_by`.
//!
//! Metrics per node:
//! - `weight(c) = Σ_{u ∈ uses(c)} (1 + weight(u))`, so a cell reachable over
//!   two paths is counted twice.
//! - `rank(c) = 0` without uses, else `1 + max rank(u)`.

use crate::cell_ref::cell_name;
use crate::error::{MapError, Result};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DependencyNode {
    /// Referenced coordinates (row, col) in formula order, duplicates kept
    pub uses: Vec<(u32, u32)>,
    /// Formula cells referencing this one
    pub used_by: Vec<(u32, u32)>,
    pub weight: u64,
    pub rank: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    Unvisited,
    OnStack,
    Done,
}

#[derive(Debug, Clone)]
pub struct DependencyGraph {
    sheet: String,
    max_row: u32,
    max_col: u32,
    /// Row-major, `max_row * max_col` entries
    nodes: Vec<DependencyNode>,
}

impl DependencyGraph {
    /// Build the graph of a `max_row` x `max_col` grid from the references of
    /// each formula cell.
    ///
    /// A reference outside the grid means extraction let a foreign
    /// coordinate through and is reported as [`MapError::Internal`].
    pub fn build<I>(sheet: &str, max_row: u32, max_col: u32, formulas: I) -> Result<Self>
    where
        I: IntoIterator<Item = ((u32, u32), Vec<(u32, u32)>)>,
    {
        let size = (max_row as usize).saturating_mul(max_col as usize);
        let mut graph = Self {
            sheet: sheet.to_string(),
            max_row,
            max_col,
            nodes: vec![DependencyNode::default(); size],
        };

        for (cell, uses) in formulas {
            for &used in &uses {
                let node = graph.node_mut(used).ok_or_else(|| {
                    MapError::Internal(format!(
                        "{}!{} references {} outside the {}x{} grid",
                        sheet,
                        cell_name(cell.0, cell.1),
                        cell_name(used.0, used.1),
                        max_row,
                        max_col
                    ))
                })?;
                node.used_by.push(cell);
            }
            let node = graph.node_mut(cell).ok_or_else(|| {
                MapError::Internal(format!(
                    "formula cell {sheet}!{} outside the grid",
                    cell_name(cell.0, cell.1)
                ))
            })?;
            node.uses = uses;
        }

        Ok(graph)
    }

    fn index_of(&self, (row, col): (u32, u32)) -> Option<usize> {
        if row >= self.max_row || col >= self.max_col {
            return None;
        }
        Some(row as usize * self.max_col as usize + col as usize)
    }

    pub fn node(&self, pos: (u32, u32)) -> Option<&DependencyNode> {
        self.index_of(pos).and_then(|i| self.nodes.get(i))
    }

    fn node_mut(&mut self, pos: (u32, u32)) -> Option<&mut DependencyNode> {
        self.index_of(pos).and_then(|i| self.nodes.get_mut(i))
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Number of `uses` edges in the graph
    pub fn edge_count(&self) -> usize {
        self.nodes.iter().map(|n| n.uses.len()).sum()
    }

    /// Fill in `weight` and `rank` of every node.
    ///
    /// Depth-first with an explicit stack, so long reference chains cannot
    /// overflow the call stack. Each node is finished once. Meeting a node
    /// that is still on the stack means the graph has a cycle; the error
    /// names the cell that closes it.
    pub fn compute_metrics(&mut self) -> Result<()> {
        let mut marks = vec![Mark::Unvisited; self.nodes.len()];
        // (node index, position of the next `uses` entry to visit)
        let mut stack: Vec<(usize, usize)> = Vec::new();

        for root in 0..self.nodes.len() {
            if marks.get(root) != Some(&Mark::Unvisited) {
                continue;
            }
            set_mark(&mut marks, root, Mark::OnStack);
            stack.push((root, 0));

            while let Some(&(node, next)) = stack.last() {
                let child = self
                    .nodes
                    .get(node)
                    .and_then(|n| n.uses.get(next))
                    .copied();

                match child {
                    Some(pos) => {
                        if let Some(top) = stack.last_mut() {
                            top.1 += 1;
                        }
                        let child_idx = self.index_of(pos).ok_or_else(|| {
                            MapError::Internal(format!(
                                "{}!{} is not a graph node",
                                self.sheet,
                                cell_name(pos.0, pos.1)
                            ))
                        })?;
                        match marks.get(child_idx) {
                            Some(Mark::Unvisited) => {
                                set_mark(&mut marks, child_idx, Mark::OnStack);
                                stack.push((child_idx, 0));
                            }
                            Some(Mark::OnStack) => {
                                return Err(MapError::CyclicDependency {
                                    sheet: self.sheet.clone(),
                                    cell: cell_name(pos.0, pos.1),
                                });
                            }
                            _ => {}
                        }
                    }
                    None => {
                        self.finish(node);
                        set_mark(&mut marks, node, Mark::Done);
                        stack.pop();
                    }
                }
            }
        }
        Ok(())
    }

    /// Compute a node's metrics from its (already finished) uses
    fn finish(&mut self, idx: usize) {
        let Some(node) = self.nodes.get(idx) else {
            return;
        };
        let mut weight: u64 = 0;
        let mut rank: Option<u64> = None;
        for &pos in &node.uses {
            if let Some(used) = self.node(pos) {
                weight = weight.saturating_add(used.weight.saturating_add(1));
                rank = Some(rank.map_or(used.rank, |r| r.max(used.rank)));
            }
        }
        if let Some(node) = self.nodes.get_mut(idx) {
            node.weight = weight;
            node.rank = rank.map_or(0, |r| r.saturating_add(1));
        }
    }
}

fn set_mark(marks: &mut [Mark], idx: usize, mark: Mark) {
    if let Some(slot) = marks.get_mut(idx) {
        *slot = mark;
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::panic
)]
mod tests {
    use super::*;

    // (row, col) shorthands for column A..D of row 0
    const A1: (u32, u32) = (0, 0);
    const B1: (u32, u32) = (0, 1);
    const C1: (u32, u32) = (0, 2);
    const D1: (u32, u32) = (0, 3);

    fn metrics(graph: &DependencyGraph, pos: (u32, u32)) -> (u64, u64) {
        let node = graph.node(pos).unwrap();
        (node.weight, node.rank)
    }

    #[test]
    fn test_chain() {
        // B1 = A1*2, C1 = B1+1
        let mut graph =
            DependencyGraph::build("Sheet0", 1, 3, vec![(B1, vec![A1]), (C1, vec![B1])]).unwrap();
        graph.compute_metrics().unwrap();

        assert_eq!(metrics(&graph, A1), (0, 0));
        assert_eq!(metrics(&graph, B1), (1, 1));
        assert_eq!(metrics(&graph, C1), (2, 2));
        assert_eq!(graph.node(A1).unwrap().used_by, vec![B1]);
    }

    #[test]
    fn test_diamond_counts_shared_ancestor_twice() {
        // B1 = A1, C1 = A1, D1 = B1 + C1
        let mut graph = DependencyGraph::build(
            "Sheet0",
            1,
            4,
            vec![(B1, vec![A1]), (C1, vec![A1]), (D1, vec![B1, C1])],
        )
        .unwrap();
        graph.compute_metrics().unwrap();

        assert_eq!(metrics(&graph, D1), (4, 2));
        assert_eq!(graph.node(A1).unwrap().used_by, vec![B1, C1]);
    }

    #[test]
    fn test_duplicate_uses_counted() {
        let mut graph =
            DependencyGraph::build("Sheet0", 1, 2, vec![(B1, vec![A1, A1])]).unwrap();
        graph.compute_metrics().unwrap();
        assert_eq!(metrics(&graph, B1), (2, 1));
        assert_eq!(graph.edge_count(), 2);
    }

    #[test]
    fn test_nodes_for_every_coordinate() {
        let graph = DependencyGraph::build("Sheet0", 3, 4, Vec::new()).unwrap();
        assert_eq!(graph.len(), 12);
        assert!(graph.node((2, 3)).is_some());
        assert!(graph.node((3, 0)).is_none());
    }

    #[test]
    fn test_reference_outside_grid_is_internal_error() {
        let err = DependencyGraph::build("Sheet0", 1, 2, vec![(B1, vec![(5, 5)])]).unwrap_err();
        assert!(matches!(err, MapError::Internal(_)));
    }

    #[test]
    fn test_cycle_detected() {
        // A1 = B1, B1 = C1, C1 = A1
        let mut graph = DependencyGraph::build(
            "Sheet0",
            1,
            3,
            vec![(A1, vec![B1]), (B1, vec![C1]), (C1, vec![A1])],
        )
        .unwrap();
        match graph.compute_metrics() {
            Err(MapError::CyclicDependency { sheet, cell }) => {
                assert_eq!(sheet, "Sheet0");
                assert_eq!(cell, "A1");
            }
            other => panic!("expected cycle, got {other:?}"),
        }
    }

    #[test]
    fn test_self_reference_is_cycle() {
        let mut graph = DependencyGraph::build("Sheet0", 1, 1, vec![(A1, vec![A1])]).unwrap();
        assert!(matches!(
            graph.compute_metrics(),
            Err(MapError::CyclicDependency { .. })
        ));
    }

    #[test]
    fn test_long_chain_does_not_recurse() {
        let rows = 50_000u32;
        let formulas: Vec<_> = (1..rows).map(|r| ((r, 0), vec![(r - 1, 0)])).collect();
        let mut graph = DependencyGraph::build("Sheet0", rows, 1, formulas).unwrap();
        graph.compute_metrics().unwrap();
        let last = u64::from(rows - 1);
        assert_eq!(metrics(&graph, (rows - 1, 0)), (last, last));
    }
}
