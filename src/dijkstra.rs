//! Generic single-source best-path search.
//!
//! The engine never sees the graph: callers [`Dijkstra::pop`] a node, work out its neighbours,
//! and [`Dijkstra::link`] each one back with the edge cost. The same engine can _maximise_ the
//! accumulated cost by flipping every edge cost about [`MINMAX_OFFSET`].
use crate::*;
use std::{
    cmp::{Ordering, Reverse},
    collections::BinaryHeap,
    hash::Hash,
};

/// The ceiling on edge costs when maximising.
///
/// In max mode an edge cost `c` is searched as `MINMAX_OFFSET - c`, so **edge costs above this
/// value are not representable** and must be clamped by the caller.
pub const MINMAX_OFFSET: u32 = 134_217_727;

/// Default number of queue entries and edge records reserved up front.
pub const DEFAULT_RESERVE: usize = 20_000;

/// Best known predecessor and accumulated (adjusted) cost of a node.
#[derive(Copy, Clone, Debug)]
struct Edge<N> {
    node: N,
    parent: N,
    value: u32,
}

/// A queue entry. May be stale if the edge was relaxed after this was pushed.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
struct Entry {
    value: u32,
    edge: usize,
}

impl Ord for Entry {
    fn cmp(&self, other: &Self) -> Ordering {
        self.value
            .cmp(&other.value)
            .then_with(|| self.edge.cmp(&other.edge))
    }
}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Dijkstra search over nodes of type `N`.
///
/// Edge records live in an arena that is reused across [`restart`](Self::restart)s; a node maps
/// to its record through a hash index. Decrease-key is done by pushing a fresh queue entry, stale
/// entries are dropped when they surface.
#[derive(Clone, Debug)]
pub struct Dijkstra<N> {
    edges: Vec<Edge<N>>,
    index: HashMap<N, usize>,
    queue: BinaryHeap<Reverse<Entry>>,
    current: Option<usize>,
    minimise: bool,
}

impl<N> Dijkstra<N>
where
    N: Copy + Eq + Hash,
{
    /// An empty search. `minimise = false` searches for the maximum accumulated cost.
    pub fn new(minimise: bool) -> Self {
        Self::with_capacity(minimise, DEFAULT_RESERVE)
    }

    pub fn with_capacity(minimise: bool, reserve: usize) -> Self {
        let mut x = Self {
            edges: Vec::new(),
            index: HashMap::default(),
            queue: BinaryHeap::new(),
            current: None,
            minimise,
        };
        x.reserve(reserve);
        x
    }

    /// A search seeded with `node`.
    pub fn starting_at(node: N, minimise: bool) -> Self {
        let mut x = Self::new(minimise);
        x.push(node, node, 0);
        x
    }

    /// Reserve space for at least `size` more nodes.
    pub fn reserve(&mut self, size: usize) {
        self.edges.reserve(size);
        self.index.reserve(size);
        self.queue.reserve(size);
    }

    /// Reset as if constructed afresh, seeded with `node` at zero cost.
    pub fn restart(&mut self, node: N) {
        self.clear();
        self.push(node, node, 0);
    }

    /// Drop all search state. Allocations are kept for the next search.
    pub fn clear(&mut self) {
        self.edges.clear();
        self.index.clear();
        self.queue.clear();
        self.current = None;
    }

    pub fn is_minimising(&self) -> bool {
        self.minimise
    }

    /// No more nodes to search.
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Number of queue entries, including stale entries not yet discarded.
    pub fn queue_size(&self) -> usize {
        self.queue.len()
    }

    /// Take the node with the lowest adjusted cost off the frontier.
    ///
    /// The returned node becomes the _current_ node which subsequent [`link`](Self::link)s
    /// extend. Returns `None` once the frontier is exhausted.
    pub fn pop(&mut self) -> Option<N> {
        self.discard_stale();
        let Reverse(Entry { edge, .. }) = self.queue.pop()?;
        self.current = Some(edge);
        // a queue of only stale entries is exhausted
        self.discard_stale();
        Some(self.edges[edge].node)
    }

    /// Propose a path to `node` through `parent` (the last popped node) with an additional
    /// `edge_value`.
    ///
    /// The proposal replaces the node's record only if it is strictly cheaper, otherwise it is
    /// dropped.
    pub fn link(&mut self, node: N, parent: N, edge_value: u32) {
        debug_assert!(
            self.current.map(|i| self.edges[i].node) == Some(parent),
            "link() requires parent to be the last popped node"
        );
        debug_assert!(
            self.minimise || edge_value <= MINMAX_OFFSET,
            "edge value exceeds MINMAX_OFFSET"
        );

        let base = self.current.map(|i| self.edges[i].value).unwrap_or(0);
        let value = base.saturating_add(self.adjust_edge_value(edge_value));
        self.push(node, parent, value);
    }

    /// Best predecessor found so far, or `node` itself if it has not been reached.
    pub fn get_predecessor(&self, node: N) -> N {
        self.index
            .get(&node)
            .map(|&i| self.edges[i].parent)
            .unwrap_or(node)
    }

    /// Best adjusted accumulated cost found so far.
    ///
    /// When maximising this is the sum of `MINMAX_OFFSET - c` along the path.
    pub fn value(&self, node: N) -> Option<u32> {
        self.index.get(&node).map(|&i| self.edges[i].value)
    }

    /// Walk predecessors back to the seed. The seed is first, `node` last.
    ///
    /// An unreached node returns a path of only itself.
    pub fn path_to(&self, node: N) -> Vec<N> {
        let mut path = vec![node];
        let mut n = node;
        // bounded by the record count
        for _ in 0..self.edges.len() {
            let p = self.get_predecessor(n);
            if p == n {
                break;
            }
            path.push(p);
            n = p;
        }
        path.reverse();
        path
    }

    /// Edge value flipped when searching for a maximum. Result is always a metric to minimise.
    fn adjust_edge_value(&self, edge_value: u32) -> u32 {
        if self.minimise {
            edge_value
        } else {
            MINMAX_OFFSET.saturating_sub(edge_value)
        }
    }

    fn push(&mut self, node: N, parent: N, value: u32) {
        let edge = match self.index.get(&node) {
            None => {
                let i = self.edges.len();
                self.edges.push(Edge {
                    node,
                    parent,
                    value,
                });
                self.index.insert(node, i);
                i
            }
            Some(&i) if value < self.edges[i].value => {
                self.edges[i].parent = parent;
                self.edges[i].value = value;
                i
            }
            // higher or equal, don't use this leg
            Some(_) => return,
        };

        self.queue.push(Reverse(Entry { value, edge }));
    }

    fn discard_stale(&mut self) {
        while let Some(Reverse(top)) = self.queue.peek() {
            if self.edges[top.edge].value < top.value {
                self.queue.pop();
            } else {
                break;
            }
        }
    }
}

impl<N> Default for Dijkstra<N>
where
    N: Copy + Eq + Hash,
{
    fn default() -> Self {
        Self::new(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quickcheck::{Arbitrary, Gen, TestResult};

    /// Small directed graph with non-negative edges. Node 0 is the seed.
    #[derive(Clone, Debug)]
    struct Graph {
        n: u8,
        edges: Vec<(u8, u8, u16)>,
    }

    impl Arbitrary for Graph {
        fn arbitrary(g: &mut Gen) -> Self {
            let n = u8::arbitrary(g) % 12 + 1;
            let count = usize::arbitrary(g) % 40;
            let edges = std::iter::repeat_with(|| {
                (
                    u8::arbitrary(g) % n,
                    u8::arbitrary(g) % n,
                    u16::arbitrary(g) % 1000,
                )
            })
            .take(count)
            .collect();
            Self { n, edges }
        }
    }

    impl Graph {
        fn neighbours(&self, node: u8) -> impl Iterator<Item = (u8, u16)> + '_ {
            self.edges
                .iter()
                .filter(move |(a, _, _)| *a == node)
                .map(|&(_, b, c)| (b, c))
        }

        /// Run the engine to exhaustion, returning the popped order with costs.
        fn search(&self, minimise: bool, flip: bool) -> (Dijkstra<u8>, Vec<(u8, u32)>) {
            let mut d = Dijkstra::with_capacity(minimise, 16);
            d.restart(0);
            let mut popped = Vec::new();
            let mut done = vec![false; self.n as usize];
            while let Some(node) = d.pop() {
                popped.push((node, d.value(node).unwrap()));
                done[node as usize] = true;
                for (next, c) in self.neighbours(node) {
                    if done[next as usize] {
                        continue;
                    }
                    let c = if flip { MINMAX_OFFSET - c as u32 } else { c as u32 };
                    d.link(next, node, c);
                }
            }
            (d, popped)
        }

        /// Bellman-Ford shortest distances.
        fn shortest(&self) -> Vec<Option<u32>> {
            let mut dist = vec![None; self.n as usize];
            dist[0] = Some(0u32);
            for _ in 0..self.n {
                for &(a, b, c) in &self.edges {
                    if let Some(da) = dist[a as usize] {
                        let nd = da + c as u32;
                        if dist[b as usize].map_or(true, |db| nd < db) {
                            dist[b as usize] = Some(nd);
                        }
                    }
                }
            }
            dist
        }
    }

    #[quickcheck]
    fn popped_costs_are_optimal(g: Graph) -> bool {
        let (_, popped) = g.search(true, false);
        let best = g.shortest();
        popped
            .iter()
            .all(|&(node, cost)| best[node as usize] == Some(cost))
    }

    #[quickcheck]
    fn popped_costs_never_decrease(g: Graph) -> bool {
        let (_, popped) = g.search(true, false);
        popped.windows(2).all(|w| w[0].1 <= w[1].1)
    }

    #[quickcheck]
    fn each_node_popped_once(g: Graph) -> TestResult {
        let (_, popped) = g.search(true, false);
        let mut seen = vec![false; g.n as usize];
        for (node, _) in popped {
            if seen[node as usize] {
                return TestResult::failed();
            }
            seen[node as usize] = true;
        }
        TestResult::passed()
    }

    #[quickcheck]
    fn max_mode_mirrors_min_mode_on_flipped_costs(g: Graph) -> bool {
        // max-mode on {c} vs min-mode on {OFFSET - c}
        let (dmax, pmax) = g.search(false, false);
        let (dmin, pmin) = g.search(true, true);

        pmax == pmin && (0..g.n).all(|n| dmax.get_predecessor(n) == dmin.get_predecessor(n))
    }

    #[test]
    fn finds_shortest_path() {
        // 0 -> 1 (5), 0 -> 2 (1), 2 -> 1 (1), 1 -> 3 (1)
        let g = Graph {
            n: 4,
            edges: vec![(0, 1, 5), (0, 2, 1), (2, 1, 1), (1, 3, 1)],
        };
        let (d, popped) = g.search(true, false);
        assert_eq!(popped, vec![(0, 0), (2, 1), (1, 2), (3, 3)]);
        assert_eq!(d.get_predecessor(1), 2);
        assert_eq!(d.path_to(3), vec![0, 2, 1, 3]);
        assert!(d.is_empty());
    }

    #[test]
    fn maximise_prefers_long_edges() {
        // two routes to 3: 0-1-3 total 10+10, 0-2-3 total 1+1
        let g = Graph {
            n: 4,
            edges: vec![(0, 1, 10), (0, 2, 1), (1, 3, 10), (2, 3, 1)],
        };
        let (d, _) = g.search(false, false);
        assert_eq!(d.path_to(3), vec![0, 1, 3]);
    }

    #[test]
    fn link_drops_worse_or_equal_proposals() {
        let mut d = Dijkstra::new(true);
        d.restart('a');
        assert_eq!(d.pop(), Some('a'));
        d.link('b', 'a', 5);
        d.link('b', 'a', 5);
        d.link('b', 'a', 7);
        assert_eq!(d.queue_size(), 1);
        assert_eq!(d.value('b'), Some(5));

        d.link('b', 'a', 3);
        assert_eq!(d.queue_size(), 2); // stale entry retained until it surfaces
        assert_eq!(d.value('b'), Some(3));

        assert_eq!(d.pop(), Some('b'));
        assert!(d.is_empty()); // stale 5-entry discarded
        assert_eq!(d.pop(), None);
    }

    #[test]
    fn predecessor_is_stable_until_next_link() {
        let mut d = Dijkstra::new(true);
        d.restart(0u32);
        let n = d.pop().unwrap();
        d.link(1, n, 4);
        d.link(2, n, 9);
        let first = (d.get_predecessor(1), d.get_predecessor(2));
        for _ in 0..3 {
            assert_eq!((d.get_predecessor(1), d.get_predecessor(2)), first);
        }

        let n = d.pop().unwrap();
        assert_eq!(n, 1);
        d.link(2, n, 1);
        assert_eq!(d.get_predecessor(2), 1);
    }

    #[test]
    fn unvisited_node_is_its_own_predecessor() {
        let d = Dijkstra::starting_at(10i32, true);
        assert_eq!(d.get_predecessor(42), 42);
        assert_eq!(d.get_predecessor(10), 10);
        assert_eq!(d.path_to(42), vec![42]);
    }

    #[test]
    fn restart_clears_state() {
        let mut d = Dijkstra::new(true);
        d.restart(1u8);
        let n = d.pop().unwrap();
        d.link(2, n, 1);
        d.restart(5);
        assert_eq!(d.get_predecessor(2), 2);
        assert_eq!(d.queue_size(), 1);
        assert_eq!(d.pop(), Some(5));
    }
}
