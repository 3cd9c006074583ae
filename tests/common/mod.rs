#![allow(dead_code)]

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use districtor::{BlockRecord, Plan, Region, TargetSize, WatershedRecord};

#[derive(Default)]
pub struct Fixture {
    pub watersheds: Vec<WatershedRecord>,
    pub blocks: Vec<BlockRecord>,
    pub adjacency: Vec<(i64, i64)>,
}

impl Fixture {
    pub fn watershed(mut self, id: i64, parent: Option<i64>, boundary: bool, exit: (f64, f64)) -> Self {
        self.watersheds.push(WatershedRecord { id, parent, boundary, x: exit.0, y: exit.1 });
        self
    }

    pub fn block(mut self, id: i64, watershed: i64, population: i64, boundary: bool, at: (f64, f64)) -> Self {
        self.blocks.push(BlockRecord { id, watershed, population, boundary, x: at.0, y: at.1, area: 1.0 });
        self
    }

    pub fn link(mut self, a: i64, b: i64) -> Self {
        self.adjacency.push((a, b));
        self
    }

    pub fn region(&self, name: &str, size: i64) -> Region {
        Region::new(name, TargetSize::Population(size), &self.watersheds, &self.blocks, &self.adjacency).unwrap()
    }
}

/// One watershed draining at x = -1 with `n` blocks of population 10 at x = 0..n in a row.
pub fn line(n: i64) -> Fixture {
    let mut fixture = Fixture::default().watershed(1, None, true, (-1.0, 0.0));
    for i in 0..n {
        fixture = fixture.block(i, 1, 10, i == 0 || i == n - 1, (i as f64, 0.0));
    }
    for i in 1..n {
        fixture = fixture.link(i - 1, i);
    }
    fixture
}

/// A `side` x `side` grid of population-10 blocks split over a small watershed tree:
/// the root drains the bottom row, two children drain the left and right halves above it.
pub fn grid(side: i64) -> Fixture {
    let mut fixture = Fixture::default()
        .watershed(1, None, true, (-1.0, -1.0))
        .watershed(2, Some(1), true, (0.0, 1.0))
        .watershed(3, Some(1), true, (side as f64 - 1.0, 1.0));
    for y in 0..side {
        for x in 0..side {
            let id = y * side + x;
            let ws = if y == 0 { 1 } else if x < side / 2 { 2 } else { 3 };
            let edge = x == 0 || y == 0 || x == side - 1 || y == side - 1;
            fixture = fixture.block(id, ws, 10, edge, (x as f64, y as f64));
            if x > 0 { fixture = fixture.link(id - 1, id) }
            if y > 0 { fixture = fixture.link(id - side, id) }
        }
    }
    fixture
}

/// Whether every district's member blocks form one connected component.
pub fn districts_are_contiguous(fixture: &Fixture, plan: &Plan) -> bool {
    let mut neighbors: BTreeMap<i64, Vec<i64>> = BTreeMap::new();
    for &(a, b) in &fixture.adjacency {
        neighbors.entry(a).or_default().push(b);
        neighbors.entry(b).or_default().push(a);
    }

    plan.districts().iter().all(|district| {
        let members = district.blocks.iter().copied().collect::<BTreeSet<_>>();
        let Some(&start) = members.iter().next() else { return true };
        let mut seen = BTreeSet::from([start]);
        let mut queue = VecDeque::from([start]);
        while let Some(block) = queue.pop_front() {
            for &next in neighbors.get(&block).into_iter().flatten() {
                if members.contains(&next) && seen.insert(next) {
                    queue.push_back(next);
                }
            }
        }
        seen == members
    })
}
