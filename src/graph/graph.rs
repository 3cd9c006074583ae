/// An unweighted, undirected block adjacency graph in compressed sparse row format.
#[derive(Debug, Default, Clone)]
pub(crate) struct Graph {
    size: usize,
    offsets: Vec<u32>,
    edges: Vec<u32>,
}

impl Graph {
    /// Construct a graph from adjacency lists.
    pub(crate) fn new(num_nodes: usize, edges: &[Vec<u32>]) -> Self {
        assert!(edges.len() == num_nodes, "edges.len() must equal num_nodes");
        edges.iter().enumerate().for_each(|(i, list)| {
            assert!(list.iter().all(|&v| (v as usize) < num_nodes), "edges[{i}] references a node out of range");
        });

        Self {
            size: num_nodes,
            offsets: std::iter::once(0u32).chain(
                edges.iter()
                    .map(|v| v.len() as u32)
                    .scan(0u32, |acc, len| {*acc += len; Some(*acc)})
            ).collect::<Vec<u32>>(),
            edges: edges.iter().flatten().copied().collect(),
        }
    }

    /// Build a symmetric graph from undirected pairs.
    ///
    /// Self-loops and duplicate pairs are dropped and every neighbor list is sorted
    /// ascending, so iteration order depends only on the node numbering.
    pub(crate) fn from_pairs(num_nodes: usize, pairs: impl IntoIterator<Item = (u32, u32)>) -> Self {
        let mut lists = vec![Vec::new(); num_nodes];
        for (a, b) in pairs.into_iter().filter(|(a, b)| a != b) {
            lists[a as usize].push(b);
            lists[b as usize].push(a);
        }
        for list in &mut lists {
            list.sort_unstable();
            list.dedup();
        }
        Self::new(num_nodes, &lists)
    }

    /// Get the number of nodes in the graph.
    #[inline] pub(crate) fn node_count(&self) -> usize { self.size }

    /// Get the number of directed edge entries (twice the undirected edge count).
    #[inline] pub(crate) fn edge_count(&self) -> usize { self.edges.len() }

    /// Get the range of edges for a given node.
    #[inline]
    fn range(&self, node: usize) -> std::ops::Range<usize> {
        self.offsets[node] as usize .. self.offsets[node + 1] as usize
    }

    /// Get an iterator over the neighbors of a given node.
    #[inline]
    pub(crate) fn edges(&self, node: usize) -> impl Iterator<Item = usize> + '_ {
        self.range(node).map(move |v| self.edges[v] as usize)
    }
}
