use crate::carve::Carver;

impl Carver<'_> {
    /// Bottom-up pass computing the unassigned population under every open watershed.
    pub(super) fn initialize_branches(&mut self) {
        let region = self.region;
        let order = region.descend(region.root(), |ws| !self.closed[ws]);
        for &ws in order.iter().rev() {
            let below = region.children(ws).iter()
                .filter(|&&child| !self.closed[child])
                .map(|&child| self.branch_population[child])
                .sum::<i64>();
            self.branch_population[ws] = region.watershed(ws).population() + below;
        }
    }

    /// Add `delta` to every branch population from `from` up to and including
    /// `stop` (or the root when `stop` is `None`).
    pub(super) fn propagate(&mut self, from: Option<usize>, stop: Option<usize>, delta: i64) {
        let mut current = from;
        while let Some(ws) = current {
            self.branch_population[ws] += delta;
            if Some(ws) == stop { break }
            current = self.region.parent(ws);
        }
    }

    /// Assign an unassigned block to `district`, propagating its population up to `stop`.
    pub(super) fn assign_block(&mut self, block: usize, district: u32, stop: Option<usize>) {
        assert!(self.assignments[block] == 0, "[carve::ledger] block {block} is already assigned");
        let region = self.region;
        let census = region.block(block);

        self.assignments[block] = district;
        let target = self.district_mut(district);
        target.blocks.insert(block);
        target.population += census.population();
        target.centroid.add(census.centroid(), census.area());
        self.open_blocks[census.watershed()] -= 1;

        if census.population() > 0 {
            self.propagate(Some(census.watershed()), stop, -census.population());
        }
    }

    /// Return a block to the unassigned pool, reopening every closed ancestor.
    pub(super) fn unassign_block(&mut self, block: usize, stop: Option<usize>) {
        let district = self.assignments[block];
        if district == 0 { return }
        let region = self.region;
        let census = region.block(block);

        self.assignments[block] = 0;
        let source = self.district_mut(district);
        source.blocks.remove(&block);
        source.edge_blocks.remove(&block);
        source.population -= census.population();
        source.centroid.remove(census.centroid(), census.area());
        self.open_blocks[census.watershed()] += 1;

        let mut current = Some(census.watershed());
        while let Some(ws) = current {
            if !self.closed[ws] { break }
            self.closed[ws] = false;
            current = region.parent(ws);
        }

        if census.population() > 0 {
            self.propagate(Some(census.watershed()), stop, census.population());
        }
    }

    /// Recompute closed flags below `ws` and report whether `ws` is closed.
    ///
    /// A closed subtree is never re-entered; only an unassignment reopens it.
    pub(super) fn close_watersheds(&mut self, ws: usize) -> bool {
        if self.closed[ws] { return true }
        let region = self.region;
        let order = region.descend(ws, |w| !self.closed[w]);
        for &w in order.iter().rev() {
            self.closed[w] = self.open_blocks[w] == 0
                && region.children(w).iter().all(|&child| self.closed[child]);
        }
        self.closed[ws]
    }

    /// Label every open watershed below `ws` (inclusive) with branch root `ws`.
    pub(super) fn label_branch(&mut self, ws: usize) {
        for w in self.region.descend(ws, |w| !self.closed[w]) {
            self.branch_root[w] = Some(ws);
        }
    }

    /// Assigned plus unassigned population must equal the region total.
    pub(super) fn verify_conservation(&self) {
        let assigned = self.districts.iter().map(|d| d.population).sum::<i64>();
        assert_eq!(
            assigned + self.unassigned_population(),
            self.region.total_population(),
            "[carve::ledger] population conservation violated"
        );
    }

    /// Every district must form a single connected component.
    pub(super) fn verify_contiguity(&self) {
        for district in &self.districts {
            let components = self.collect_groups(district.blocks.iter().copied(), None, district.id);
            assert!(components.len() <= 1, "[carve::ledger] district {} is not contiguous", district.id);
        }
    }
}
