use std::collections::{BTreeMap, BTreeSet};

use ahash::AHashMap;
use geo::Coord;
use tracing::{debug, info, warn};

use crate::{
    carve::{BlockGroup, Carver},
    geom::{EdgeVector, Rotation, argmax_by, argmin_by, distance},
    plan::DistrictEvent,
};

/// Fixed inputs shared by every growth attempt for one district.
struct BuildContext<'g> {
    branch: usize,
    group: &'g BlockGroup,
    target_population: i64,
    boundary_target: Option<usize>,
}

/// How a growth front is started.
#[derive(Clone, Copy, Debug)]
enum Start {
    /// From the group block farthest from the target outflow, heading for it.
    Centered { seed: usize, target: usize },
    /// Along the region boundary, from one boundary outflow towards another.
    Boundary { source: usize, target: usize },
}

/// A front sweeping across a block group.
#[derive(Debug)]
struct Front {
    blocks: BTreeSet<usize>,
    population: i64,
    prospects: BTreeMap<usize, f64>,  // Frontier blocks with their current scores
    vector: EdgeVector,
    source: Option<usize>,
    target: usize,
    boundary_mode: bool,
    last_block: Option<usize>,
}

/// The outcome of one growth attempt.
#[derive(Debug)]
struct Growth {
    blocks: BTreeSet<usize>,
    edge: BTreeMap<usize, f64>,
    edge_length: Option<f64>,
    vector: EdgeVector,
    target: usize,
    last_block: Option<usize>,
}

impl Carver<'_> {
    /// Climb from `ws` while the branch holds less than `threshold` people and `keep` accepts the parent.
    fn climb_while_short(&self, ws: usize, threshold: i64, keep: impl Fn(usize) -> bool) -> usize {
        let mut current = ws;
        while let Some(parent) = self.region.parent(current) {
            if self.branch_population[current] >= threshold || !keep(parent) { break }
            current = parent;
        }
        current
    }

    /// Boundary watershed under `branch` that is farthest (by the supplied
    /// distances) among those owning blocks of the group.
    fn farthest_boundary_watershed(&self, branch: usize, group_watersheds: &BTreeMap<usize, f64>) -> Option<usize> {
        let region = self.region;
        let order = region.descend(branch, |ws| !self.closed[ws] && region.watershed(ws).is_boundary());

        let mut best: AHashMap<usize, Option<usize>> = AHashMap::with_capacity(order.len());
        for &ws in order.iter().rev() {
            let mut result = group_watersheds.contains_key(&ws).then_some(ws);
            for child in region.children(ws) {
                let candidate = best.get(child).copied().flatten();
                let better = match (result, candidate) {
                    (None, _) => true,
                    (Some(current), Some(candidate)) => group_watersheds[&candidate] > group_watersheds[&current],
                    (Some(_), None) => false,
                };
                if better { result = candidate }
            }
            best.insert(ws, result);
        }
        best.get(&branch).copied().flatten()
    }

    /// Whether the boundary path climbing from `ws` reaches `branch`.
    fn boundary_path_reaches(&self, ws: usize, branch: usize) -> bool {
        let region = self.region;
        let mut current = ws;
        while current != branch && region.watershed(current).is_boundary() {
            match region.parent(current) {
                Some(parent) => current = parent,
                None => break,
            }
        }
        current == branch
    }

    /// Carve one new district out of `group`, rooted at `branch`.
    pub(super) fn build_district(&mut self, branch: usize, last: bool, group: &BlockGroup) {
        let region = self.region;
        let size = self.size();
        let target_population = if last { group.population } else { size };
        let threshold = target_population + size;
        let boundary = |ws: usize| region.watershed(ws).is_boundary();

        let centred_target = if boundary(branch) { branch } else {
            self.climb_while_short(branch, threshold, |_| true)
        };
        let mut boundary_target = boundary(branch)
            .then(|| self.climb_while_short(branch, threshold, boundary));

        let reference = region.exit(boundary_target.unwrap_or(centred_target));
        let group_watersheds = group.blocks.iter()
            .map(|&block| region.block(block).watershed())
            .map(|ws| (ws, distance(reference, region.exit(ws))))
            .collect::<BTreeMap<_, _>>();
        let mut boundary_source = self.farthest_boundary_watershed(branch, &group_watersheds);

        if let (Some(source), Some(target)) = (boundary_source, boundary_target) {
            if source == target {
                // Step far enough up for a whole extra district to fit in between.
                let surplus = self.branch_population[target] - target_population + 1;
                let next_target_population = (surplus as f64 / size as f64).ceil() as i64 * size + target_population;
                boundary_target = Some(self.climb_while_short(target, next_target_population, boundary));
            }
        }
        if boundary_source.is_some() && boundary_source == boundary_target {
            boundary_source = None;
            boundary_target = None;
        }

        let Some((seed, _)) = argmax_by(group.blocks.iter()
            .map(|&block| (block, distance(region.centroid(block), region.exit(centred_target)))))
        else {
            warn!(region = region.name(), branch = region.watershed(branch).id(), "cannot build from an empty group");
            return;
        };

        let context = BuildContext { branch, group, target_population, boundary_target };
        let centred = self.grow(&context, Start::Centered { seed, target: centred_target });
        let growth = match (boundary_source, boundary_target) {
            (Some(source), Some(target)) => {
                let along = self.grow(&context, Start::Boundary { source, target });
                let centred_length = centred.edge_length.unwrap_or(0.0);
                let along_length = along.edge_length.unwrap_or(0.0);
                debug!(centred_length, along_length, "compared centred and boundary candidates");
                if centred_length < along_length { centred } else { along }
            }
            _ => centred,
        };
        if growth.blocks.is_empty() {
            warn!(region = region.name(), branch = region.watershed(branch).id(), "growth produced no blocks");
            return;
        }

        let Growth { blocks, edge, target, last_block, mut vector, .. } = growth;
        let edge_target = match last_block {
            Some(block) if vector.score(region.centroid(block)) > vector.score(region.exit(branch)) => target,
            _ => branch,
        };

        // A pivoting edge is handed on from its far end, sweeping the other way.
        if let Some(rotation) = vector.pivot {
            if let Some((far, _)) = argmax_by(edge.keys().map(|&b| (b, distance(region.centroid(b), vector.origin)))) {
                vector.pivot = Some(rotation.reversed());
                vector.origin = region.centroid(far);
            }
        }

        let anchor = argmin_by(edge.keys().map(|&b| (b, distance(region.exit(edge_target), region.centroid(b)))));

        let id = self.open_district(branch);
        let district = self.district_mut(id);
        district.vector = vector;
        district.edge_blocks = anchor.into_iter().map(|(b, _)| (b, vector.score(region.centroid(b)))).collect();

        for &block in &blocks {
            self.assign_block(block, id, Some(branch));
        }
        let population = self.district(id).population;
        self.propagate(region.parent(branch), None, -population);

        self.evict_fragments(id);
        self.close_watersheds(branch);

        let event = DistrictEvent {
            district: id,
            branch_root: region.watershed(branch).id(),
            population: self.district(id).population,
        };
        info!(
            region = region.name(),
            district = event.district,
            branch_root = event.branch_root,
            population = event.population,
            blocks = self.district(id).blocks.len(),
            "carved district"
        );
        self.events.push(event);
    }

    /// Sweep a front across the group until taking the next block would move
    /// the population further from the target than stopping.
    fn grow(&self, context: &BuildContext, start: Start) -> Growth {
        let region = self.region;
        let centroid = |block: usize| region.centroid(block);

        let mut front = match start {
            Start::Centered { seed, target } => Front {
                blocks: BTreeSet::new(),
                population: 0,
                prospects: BTreeMap::from([(seed, 0.0)]),
                vector: EdgeVector::towards(centroid(seed), region.exit(target)),
                source: None,
                target,
                boundary_mode: false,
                last_block: None,
            },
            Start::Boundary { source, target } => {
                let vector = EdgeVector::towards(region.exit(source), region.exit(target));
                let seed = argmin_by(context.group.blocks.iter()
                    .map(|&b| (b, vector.perpendicular_distance(centroid(b)))));
                Front {
                    blocks: BTreeSet::new(),
                    population: 0,
                    prospects: seed.map(|(b, _)| (b, 0.0)).into_iter().collect(),
                    vector,
                    source: Some(source),
                    target,
                    boundary_mode: true,
                    last_block: None,
                }
            }
        };

        let mut stalls = 0;
        let mut edge = BTreeMap::new();
        let mut edge_length = None;

        while let Some((next, score)) = argmin_by(front.prospects.iter().map(|(&b, &s)| (b, s))) {
            if score <= 0.0 {
                stalls = 0;
                let population = region.block(next).population();
                let target = context.target_population;
                if !front.blocks.is_empty()
                    && (front.population - target).abs() < (front.population + population - target).abs()
                {
                    let vector = front.vector;
                    edge = self.front_edge(&front, |p| vector.score(p));
                    edge_length = vector.edge_length(edge.keys().map(|&b| centroid(b)));
                    break;
                }

                front.blocks.insert(next);
                front.population += population;
                front.prospects.remove(&next);
                front.last_block = Some(next);
                for neighbor in region.graph().edges(next) {
                    if context.group.blocks.contains(&neighbor)
                        && !front.blocks.contains(&neighbor)
                        && !front.prospects.contains_key(&neighbor)
                    {
                        front.prospects.insert(neighbor, front.vector.score(centroid(neighbor)));
                    }
                }

                let ws = region.block(next).watershed();
                if !front.boundary_mode && region.block(next).is_boundary() {
                    if let Some(boundary_target) = context.boundary_target {
                        if self.boundary_path_reaches(ws, context.branch) {
                            front.boundary_mode = true;
                            front.source = Some(ws);
                            front.target = boundary_target;
                        }
                    }
                }
                continue;
            }

            stalls += 1;
            self.unstick(context, &mut front, next, stalls);
        }

        Growth {
            blocks: front.blocks,
            edge,
            edge_length,
            vector: front.vector,
            target: front.target,
            last_block: front.last_block,
        }
    }

    /// Turn a front whose best prospect `next` lies ahead of the edge, then rescore
    /// its prospects. After too many turns in a row the edge jumps onto `next`.
    fn unstick(&self, context: &BuildContext, front: &mut Front, next: usize, stalls: usize) {
        let region = self.region;
        if stalls > region.watersheds().len() + 4 {
            warn!(region = region.name(), block = region.block(next).id(), "growth front stalled; forcing next block");
            front.vector = EdgeVector::new(region.centroid(next), front.vector.direction);
        } else if front.vector.pivot.is_some() {
            front.vector.pivot = None;
        } else {
            self.redirect(context, front, next);
        }
        let vector = front.vector;
        for (&block, value) in front.prospects.iter_mut() {
            *value = vector.score(region.centroid(block));
        }
    }

    /// Members of the front adjacent to one of its prospects, scored by `score`.
    fn front_edge(&self, front: &Front, score: impl Fn(Coord<f64>) -> f64) -> BTreeMap<usize, f64> {
        let region = self.region;
        let mut edge = BTreeMap::new();
        for &prospect in front.prospects.keys() {
            for neighbor in region.graph().edges(prospect) {
                if front.blocks.contains(&neighbor) {
                    edge.insert(neighbor, score(region.centroid(neighbor)));
                }
            }
        }
        edge
    }

    /// Re-derive the vector of a front whose every prospect lies ahead of the edge.
    fn redirect(&self, context: &BuildContext, front: &mut Front, next: usize) {
        let region = self.region;
        let size = self.size();
        let exit = |ws: usize| region.exit(ws);
        let centroid = |block: usize| region.centroid(block);

        let shifted = front.vector.with_origin(centroid(next));
        let surplus = self.branch_population[front.target] - context.target_population + 1;
        let next_target_population = (surplus as f64 / size as f64).ceil() as i64 * size + context.target_population;
        let next_target = self.climb_while_short(front.target, next_target_population, |_| true);
        let last_vector = front.vector;

        if front.boundary_mode {
            if shifted.perpendicular_distance(exit(front.target)) <= 0.0 || front.source == Some(front.target) {
                front.source = Some(front.target);
                front.target = next_target;
            }
            if Some(front.target) == context.boundary_target {
                let mut current = front.source;
                while let Some(ws) = current {
                    if ws == front.target { break }
                    if shifted.perpendicular_distance(exit(ws)) <= 0.0 { front.source = Some(ws) }
                    current = region.parent(ws);
                }
            }

            match front.source {
                Some(source) if source != front.target => {
                    front.vector = EdgeVector::new(exit(front.target), exit(front.target) - exit(source));
                    let vector = front.vector;
                    for (&block, value) in front.prospects.iter_mut() {
                        *value = vector.perpendicular_distance(centroid(block));
                    }
                    let floor = front.prospects.values().copied().fold(f64::INFINITY, f64::min);

                    // Anchor on the closest outflow above the source that is still ahead of every prospect.
                    let stop = region.parent(front.target);
                    let mut ranked = Vec::new();
                    let mut current = region.parent(source);
                    while let Some(ws) = current {
                        if Some(ws) == stop { break }
                        let reach = vector.perpendicular_distance(exit(ws));
                        if reach > floor { ranked.push((ws, reach)) }
                        current = region.parent(ws);
                    }
                    if let Some((ws, _)) = argmin_by(ranked) {
                        front.vector.origin = exit(ws);
                    }
                }
                _ => {
                    let vector = front.vector;
                    if let Some((far, _)) = argmax_by(context.group.blocks.iter()
                        .map(|&b| (b, vector.perpendicular_distance(centroid(b)))))
                    {
                        front.vector.origin = centroid(far);
                    }
                }
            }
        } else {
            if shifted.perpendicular_distance(exit(front.target)) <= 0.0 {
                front.target = next_target;
            }

            // Sweep sideways, then aim from the middle of the frontier at the target.
            front.vector = front.vector.rotated();
            let vector = front.vector;
            for (&block, value) in front.prospects.iter_mut() {
                *value = vector.perpendicular_distance(centroid(block));
            }
            let low = front.prospects.values().copied().fold(f64::INFINITY, f64::min);
            let high = front.prospects.values().copied().fold(f64::NEG_INFINITY, f64::max);
            let middle = (low + high) / 2.0;
            if let Some((centre, _)) = argmin_by(front.prospects.iter().map(|(&b, &s)| (b, (s - middle).abs()))) {
                front.vector = EdgeVector::towards(centroid(centre), exit(front.target));
            }
        }

        // Pivot on the leading edge block when some prospect sits no farther out than it.
        let vector = front.vector;
        let edge = self.front_edge(front, |p| vector.perpendicular_distance(p));
        if let Some((anchor, reach)) = argmax_by(edge.iter().map(|(&b, &s)| (b, s))) {
            if front.prospects.keys().any(|&b| vector.perpendicular_distance(centroid(b)) <= reach) {
                front.vector.origin = centroid(anchor);
                front.vector.pivot = Some(Rotation::from_angle(last_vector.angle_to(front.vector.direction)));
            }
        }
        debug!(
            target = region.watershed(front.target).id(),
            boundary = front.boundary_mode,
            pivot = ?front.vector.pivot,
            "redirected growth front"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{carve::CarveOptions, region::testing::RegionBuilder};

    fn row(n: i64, size: i64) -> crate::region::Region {
        let mut builder = RegionBuilder::new().watershed(1, None, (0.0, 0.0));
        for i in 0..n {
            builder = builder.block(i, 1, 10, (i as f64, 0.0));
        }
        builder.chain(&(0..n).collect::<Vec<_>>()).build(size)
    }

    #[test]
    fn grows_from_the_far_end_towards_the_outflow() {
        let region = row(5, 20);
        let mut carver = Carver::new(&region, &CarveOptions::default());
        carver.label_branch(0);
        let group = carver.build_groups(0).remove(0);

        carver.build_district(0, false, &group);

        let district = carver.district(1);
        assert_eq!(district.blocks, BTreeSet::from([3, 4]));
        assert_eq!(district.population, 20);
        assert_eq!(district.edge_blocks.keys().copied().collect::<Vec<_>>(), vec![3]);
        assert_eq!(carver.unassigned_population(), 30);
        assert_eq!(carver.events.len(), 1);
        carver.verify_conservation();
    }

    #[test]
    fn first_block_is_taken_even_when_over_quota() {
        let region = RegionBuilder::new()
            .watershed(1, None, (-1.0, 0.0))
            .block(1, 1, 50, (1.0, 0.0))
            .block(2, 1, 5, (0.0, 0.0))
            .link(1, 2)
            .build(10);
        let mut carver = Carver::new(&region, &CarveOptions::default());
        carver.label_branch(0);
        let group = carver.build_groups(0).remove(0);

        carver.build_district(0, false, &group);

        assert_eq!(carver.district(1).blocks, BTreeSet::from([0]));
        assert_eq!(carver.district(1).population, 50);
    }

    #[test]
    fn boundary_path_requires_boundary_ancestors() {
        let region = RegionBuilder::new()
            .boundary_watershed(1, None, (0.0, 0.0))
            .watershed(2, Some(1), (1.0, 0.0))
            .boundary_watershed(3, Some(2), (2.0, 0.0))
            .boundary_watershed(4, Some(1), (3.0, 0.0))
            .block(1, 3, 1, (2.0, 0.0))
            .build(1);
        let carver = Carver::new(&region, &CarveOptions::default());

        assert!(carver.boundary_path_reaches(3, 0));
        assert!(!carver.boundary_path_reaches(2, 0));
        assert!(carver.boundary_path_reaches(2, 1));
    }

    fn stuck_front(vector: EdgeVector) -> Front {
        Front {
            blocks: BTreeSet::from([0]),
            population: 10,
            prospects: BTreeMap::from([(1, 4.0)]),
            vector,
            source: None,
            target: 0,
            boundary_mode: false,
            last_block: Some(0),
        }
    }

    #[test]
    fn repeated_stalls_move_the_edge_onto_the_next_block() {
        let region = row(3, 20);
        let mut carver = Carver::new(&region, &CarveOptions::default());
        carver.label_branch(0);
        let group = carver.build_groups(0).remove(0);
        let context = BuildContext { branch: 0, group: &group, target_population: 20, boundary_target: None };
        let mut front = stuck_front(EdgeVector::new((-3.0, 0.0).into(), (1.0, 0.0).into()));

        carver.unstick(&context, &mut front, 1, region.watersheds().len() + 5);

        assert_eq!(front.vector.origin, (1.0, 0.0).into());
        assert_eq!(front.vector.direction, (1.0, 0.0).into());
        assert_eq!(front.prospects[&1], 0.0);
    }

    #[test]
    fn stalled_pivot_falls_back_to_a_straight_edge() {
        let region = row(3, 20);
        let mut carver = Carver::new(&region, &CarveOptions::default());
        carver.label_branch(0);
        let group = carver.build_groups(0).remove(0);
        let context = BuildContext { branch: 0, group: &group, target_population: 20, boundary_target: None };
        let mut vector = EdgeVector::new((-3.0, 0.0).into(), (1.0, 0.0).into());
        vector.pivot = Some(Rotation::Clockwise);
        let mut front = stuck_front(vector);

        carver.unstick(&context, &mut front, 1, 1);

        assert_eq!(front.vector.pivot, None);
        assert_eq!(front.vector.origin, (-3.0, 0.0).into());
        assert_eq!(front.prospects[&1], 4.0);
    }
}
