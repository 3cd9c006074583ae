use std::collections::BTreeMap;

use tracing::{info, warn};

use crate::{
    carve::{CarveOptions, District},
    plan::{DistrictEvent, DistrictSummary, Plan},
    region::Region,
};

/// All mutable state of one carving run over a region.
///
/// Districts are numbered from 1 in creation order; 0 marks an unassigned block.
#[derive(Debug)]
pub(crate) struct Carver<'a> {
    pub(super) region: &'a Region,
    pub(super) options: CarveOptions,
    pub(super) branch_population: Vec<i64>,       // Unassigned population of each subtree
    pub(super) closed: Vec<bool>,                 // Subtree fully assigned
    pub(super) open_blocks: Vec<u32>,             // Unassigned blocks owned directly by each watershed
    pub(super) branch_root: Vec<Option<usize>>,   // Most recent branch label of each watershed
    pub(super) assignments: Vec<u32>,             // District of each block (0 = unassigned)
    pub(super) districts: Vec<District>,
    pub(super) events: Vec<DistrictEvent>,
}

impl<'a> Carver<'a> {
    pub(crate) fn new(region: &'a Region, options: &CarveOptions) -> Self {
        let num_watersheds = region.watersheds().len();
        let mut carver = Self {
            region,
            options: options.clone(),
            branch_population: vec![0; num_watersheds],
            closed: vec![false; num_watersheds],
            open_blocks: region.watersheds().iter().map(|ws| ws.blocks().len() as u32).collect(),
            branch_root: vec![None; num_watersheds],
            assignments: vec![0; region.graph().node_count()],
            districts: Vec::new(),
            events: Vec::new(),
        };
        carver.initialize_branches();
        carver
    }

    /// District size of the region being carved.
    #[inline] pub(super) fn size(&self) -> i64 { self.region.district_size() }

    /// Population not yet assigned to any district.
    #[inline] pub(crate) fn unassigned_population(&self) -> i64 { self.branch_population[self.region.root()] }

    #[inline] pub(crate) fn num_districts(&self) -> usize { self.districts.len() }

    #[inline] pub(crate) fn assignment(&self, block: usize) -> u32 { self.assignments[block] }

    #[inline] pub(crate) fn district(&self, id: u32) -> &District { &self.districts[id as usize - 1] }

    #[inline] pub(super) fn district_mut(&mut self, id: u32) -> &mut District { &mut self.districts[id as usize - 1] }

    /// Start an empty district rooted at `branch` and return its id.
    pub(super) fn open_district(&mut self, branch: usize) -> u32 {
        let id = self.districts.len() as u32 + 1;
        self.districts.push(District::new(id, branch));
        id
    }

    /// Carve passes until no unassigned population remains, or a pass makes no progress.
    pub(crate) fn run(&mut self) {
        let mut pass = 1;
        while self.unassigned_population() > 0 {
            info!(region = self.region.name(), pass, remaining = self.unassigned_population(), "starting pass");
            let before = (self.num_districts(), self.unassigned_population());

            self.carve_pass();
            if self.options.verify_invariants { self.verify_conservation() }

            if (self.num_districts(), self.unassigned_population()) == before {
                warn!(
                    region = self.region.name(),
                    pass,
                    remaining = self.unassigned_population(),
                    "pass made no progress; leaving remaining population unassigned"
                );
                break;
            }
            pass += 1;
        }
        if self.options.verify_invariants { self.verify_contiguity() }
    }

    /// Freeze the run into a [`Plan`].
    pub(crate) fn into_plan(self) -> Plan {
        let region = self.region;

        let assignments = self.assignments.iter().enumerate()
            .filter(|&(_, &district)| district != 0)
            .map(|(block, &district)| (region.block(block).id(), district))
            .collect::<BTreeMap<_, _>>();

        let districts = self.districts.iter()
            .map(|district| DistrictSummary {
                id: district.id,
                branch_root: region.watershed(district.branch_root).id(),
                population: district.population,
                centroid: [district.centroid.point().x, district.centroid.point().y],
                area: district.centroid.area(),
                blocks: district.blocks.iter().map(|&b| region.block(b).id()).collect(),
            })
            .collect();

        Plan {
            region: region.name().to_string(),
            district_size: region.district_size(),
            total_population: region.total_population(),
            unassigned_population: self.unassigned_population(),
            unassigned_blocks: self.assignments.iter().filter(|&&d| d == 0).count(),
            assignments,
            districts,
            events: self.events,
        }
    }
}
