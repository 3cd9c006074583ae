mod common;

use districtor::{CarveOptions, carve, carve_regions};

use common::{Fixture, districts_are_contiguous, grid, line};

#[test]
fn five_block_line_splits_into_two_full_districts_and_a_remainder() {
    let region = line(5).region("line5", 20);
    let plan = carve(&region, &CarveOptions::default());

    assert_eq!(plan.populations(), vec![20, 20, 10]);
    assert_eq!(plan.unassigned_population(), 0);
    assert_eq!(plan.assignment(4), Some(1));
    assert_eq!(plan.assignment(3), Some(1));
    assert_eq!(plan.assignment(0), Some(3));
}

#[test]
fn seven_block_line_carves_from_the_far_end() {
    let fixture = line(7);
    let plan = carve(&fixture.region("line7", 20), &CarveOptions::default());

    assert_eq!(plan.populations(), vec![20, 20, 20, 10]);
    assert_eq!(plan.districts()[0].blocks, vec![5, 6]);
    assert_eq!(plan.districts()[1].blocks, vec![3, 4]);
    assert_eq!(plan.districts()[2].blocks, vec![1, 2]);
    assert_eq!(plan.districts()[3].blocks, vec![0]);
    assert!(districts_are_contiguous(&fixture, &plan));
}

#[test]
fn events_follow_creation_order() {
    let plan = carve(&line(5).region("line5", 20), &CarveOptions::default());
    let events = plan.events().iter().map(|e| (e.district, e.branch_root, e.population)).collect::<Vec<_>>();
    assert_eq!(events, vec![(1, 1, 20), (2, 1, 20), (3, 1, 10)]);
}

#[test]
fn grid_plan_conserves_population_and_stays_contiguous() {
    let fixture = grid(6);
    let region = fixture.region("grid", 60);
    let plan = carve(&region, &CarveOptions::default());

    let assigned = plan.populations().iter().sum::<i64>();
    assert_eq!(assigned + plan.unassigned_population(), region.total_population());
    assert_eq!(plan.assignments().len() + plan.unassigned_blocks(), region.blocks().len());
    assert!(plan.num_districts() >= 2);
    assert!(districts_are_contiguous(&fixture, &plan));

    let populations = plan.populations();
    for &population in &populations[..populations.len() - 1] {
        assert!((population - region.district_size()).abs() <= 10, "district of {population}");
    }

    let listed = plan.districts().iter().map(|d| d.blocks.len()).sum::<usize>();
    assert_eq!(listed, plan.assignments().len());
}

#[test]
fn carving_is_deterministic() {
    let region = grid(6).region("grid", 45);
    let first = carve(&region, &CarveOptions::default());
    let second = carve(&region, &CarveOptions::default());

    assert_eq!(first.assignments(), second.assignments());
    assert_eq!(first.events(), second.events());
}

#[test]
fn parallel_regions_match_sequential_runs() {
    let regions = vec![line(5).region("a", 20), grid(4).region("b", 40), line(7).region("c", 20)];
    let options = CarveOptions::default();

    let plans = carve_regions(&regions, &options);

    assert_eq!(plans.iter().map(|p| p.region()).collect::<Vec<_>>(), vec!["a", "b", "c"]);
    for (region, plan) in regions.iter().zip(&plans) {
        assert_eq!(plan.assignments(), carve(region, &options).assignments());
    }
}

#[test]
fn child_too_fragmented_for_a_district_is_carved_from_its_parent() {
    // Child 2 holds a full district's worth of people, but its two blocks only meet through block 3.
    let fixture = Fixture::default()
        .watershed(1, None, false, (0.0, -2.0))
        .watershed(2, Some(1), false, (0.0, -1.0))
        .block(1, 2, 10, false, (-1.0, 0.0))
        .block(2, 2, 10, false, (1.0, 0.0))
        .block(3, 1, 10, false, (0.0, 0.0))
        .link(1, 3)
        .link(3, 2);
    let plan = carve(&fixture.region("split", 20), &CarveOptions::default());

    assert_eq!(plan.events()[0].branch_root, 1);
    assert_eq!(plan.populations().iter().sum::<i64>(), 30);
    assert_eq!(plan.unassigned_population(), 0);
    assert!(districts_are_contiguous(&fixture, &plan));
}
