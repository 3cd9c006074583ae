use ahash::AHashMap;
use anyhow::{Context, Result, bail, ensure};
use geo::Coord;
use smallvec::SmallVec;

use crate::{graph::Graph, region::{BlockRecord, CensusBlock, TargetSize, Watershed, WatershedRecord}};

/// An immutable region: the watershed tree, its census blocks and their adjacency.
///
/// Watersheds and blocks live in arenas indexed in ascending external id order.
#[derive(Clone, Debug)]
pub struct Region {
    name: String,
    watersheds: Vec<Watershed>,
    blocks: Vec<CensusBlock>,
    graph: Graph,
    root: usize,
    total_population: i64,
    district_size: i64,
}

/// Map external ids to arena indices, assigned in ascending id order.
fn index_ids(ids: impl Iterator<Item = i64>, what: &str) -> Result<AHashMap<i64, usize>> {
    let mut sorted = ids.collect::<Vec<_>>();
    sorted.sort_unstable();
    if let Some(pair) = sorted.windows(2).find(|pair| pair[0] == pair[1]) {
        bail!("[region] duplicate {what} id {}", pair[0]);
    }
    Ok(sorted.into_iter().enumerate().map(|(index, id)| (id, index)).collect())
}

impl Region {
    /// Build and validate a region from raw records.
    pub fn new(
        name: impl Into<String>,
        target: TargetSize,
        watershed_records: &[WatershedRecord],
        block_records: &[BlockRecord],
        adjacency: &[(i64, i64)],
    ) -> Result<Self> {
        let name = name.into();
        ensure!(!watershed_records.is_empty(), "[region] region '{name}' has no watersheds");

        let ws_index = index_ids(watershed_records.iter().map(|r| r.id), "watershed")?;
        let block_index = index_ids(block_records.iter().map(|r| r.id), "block")?;

        let mut watersheds = vec![None; watershed_records.len()];
        for record in watershed_records {
            ensure!(record.x.is_finite() && record.y.is_finite(),
                "[region] watershed {} has a non-finite exit point", record.id);
            let parent = record.parent
                .map(|p| ws_index.get(&p).copied()
                    .with_context(|| format!("[region] watershed {} references unknown parent {p}", record.id)))
                .transpose()?;
            watersheds[ws_index[&record.id]] = Some(Watershed {
                id: record.id,
                parent,
                children: SmallVec::new(),
                boundary: record.boundary,
                exit: Coord { x: record.x, y: record.y },
                population: 0,
                blocks: Vec::new(),
            });
        }
        let mut watersheds = watersheds.into_iter().flatten().collect::<Vec<_>>();

        // Children keep input row order.
        for record in watershed_records {
            if let Some(parent) = watersheds[ws_index[&record.id]].parent {
                watersheds[parent].children.push(ws_index[&record.id]);
            }
        }

        let roots = watersheds.iter().enumerate()
            .filter(|(_, ws)| ws.parent.is_none())
            .map(|(i, _)| i)
            .collect::<Vec<_>>();
        ensure!(roots.len() == 1, "[region] expected exactly one root watershed, found {}", roots.len());
        let root = roots[0];

        let mut blocks = vec![None; block_records.len()];
        for record in block_records {
            let watershed = ws_index.get(&record.watershed).copied()
                .with_context(|| format!("[region] block {} references unknown watershed {}", record.id, record.watershed))?;
            ensure!(record.population >= 0, "[region] block {} has negative population", record.id);
            ensure!(record.area >= 0.0, "[region] block {} has negative area", record.id);
            ensure!(record.x.is_finite() && record.y.is_finite() && record.area.is_finite(),
                "[region] block {} has non-finite geometry", record.id);
            blocks[block_index[&record.id]] = Some(CensusBlock {
                id: record.id,
                population: record.population,
                boundary: record.boundary,
                centroid: Coord { x: record.x, y: record.y },
                area: record.area,
                watershed,
            });
        }
        let blocks = blocks.into_iter().flatten().collect::<Vec<_>>();

        // Blocks are visited in index order, so each owned list comes out ascending.
        for (index, block) in blocks.iter().enumerate() {
            let ws = &mut watersheds[block.watershed];
            ws.blocks.push(index);
            ws.population += block.population;
        }

        let pairs = adjacency.iter()
            .map(|&(a, b)| {
                let a = block_index.get(&a).copied()
                    .with_context(|| format!("[region] adjacency references unknown block {a}"))?;
                let b = block_index.get(&b).copied()
                    .with_context(|| format!("[region] adjacency references unknown block {b}"))?;
                Ok((a as u32, b as u32))
            })
            .collect::<Result<Vec<_>>>()?;
        let graph = Graph::from_pairs(blocks.len(), pairs);

        let total_population = blocks.iter().map(|b| b.population).sum::<i64>();
        let district_size = target.resolve(total_population)
            .with_context(|| format!("[region] invalid district size for region '{name}'"))?;

        let region = Self { name, watersheds, blocks, graph, root, total_population, district_size };

        let reachable = region.descend(root, |_| true).len();
        ensure!(reachable == region.watersheds.len(),
            "[region] {} watersheds are not reachable from the root (cycle in parent links)",
            region.watersheds.len() - reachable);

        Ok(region)
    }

    #[inline] pub fn name(&self) -> &str { &self.name }

    /// Population quota of one district.
    #[inline] pub fn district_size(&self) -> i64 { self.district_size }

    #[inline] pub fn total_population(&self) -> i64 { self.total_population }

    /// Arena index of the root watershed.
    #[inline] pub fn root(&self) -> usize { self.root }

    #[inline] pub fn watersheds(&self) -> &[Watershed] { &self.watersheds }

    #[inline] pub fn blocks(&self) -> &[CensusBlock] { &self.blocks }

    #[inline] pub fn watershed(&self, ws: usize) -> &Watershed { &self.watersheds[ws] }

    #[inline] pub fn block(&self, block: usize) -> &CensusBlock { &self.blocks[block] }

    /// Number of undirected adjacency links.
    #[inline] pub fn edge_count(&self) -> usize { self.graph.edge_count() / 2 }

    #[inline] pub(crate) fn graph(&self) -> &Graph { &self.graph }

    #[inline] pub(crate) fn parent(&self, ws: usize) -> Option<usize> { self.watersheds[ws].parent }

    #[inline] pub(crate) fn children(&self, ws: usize) -> &[usize] { &self.watersheds[ws].children }

    #[inline] pub(crate) fn exit(&self, ws: usize) -> Coord<f64> { self.watersheds[ws].exit }

    #[inline] pub(crate) fn centroid(&self, block: usize) -> Coord<f64> { self.blocks[block].centroid }

    /// Arena index of the block with external id `id`.
    pub fn block_index(&self, id: i64) -> Option<usize> {
        self.blocks.binary_search_by_key(&id, |b| b.id).ok()
    }

    /// Arena index of the watershed with external id `id`.
    pub fn watershed_index(&self, id: i64) -> Option<usize> {
        self.watersheds.binary_search_by_key(&id, |ws| ws.id).ok()
    }

    /// Pre-order walk of the subtree at `from`, in child order.
    ///
    /// Nodes rejected by `keep` are skipped together with their subtrees.
    pub(crate) fn descend(&self, from: usize, mut keep: impl FnMut(usize) -> bool) -> Vec<usize> {
        let mut order = Vec::new();
        let mut stack = vec![from];
        let mut visited = vec![false; self.watersheds.len()];
        while let Some(ws) = stack.pop() {
            if visited[ws] || !keep(ws) { continue }
            visited[ws] = true;
            order.push(ws);
            stack.extend(self.children(ws).iter().rev());
        }
        order
    }

    /// Number of levels in the watershed tree.
    pub fn depth(&self) -> usize {
        let mut depth = vec![0usize; self.watersheds.len()];
        let order = self.descend(self.root, |_| true);
        for &ws in &order {
            depth[ws] = self.parent(ws).map_or(1, |p| depth[p] + 1);
        }
        order.iter().map(|&ws| depth[ws]).max().unwrap_or(0)
    }
}
