//! Integration tests for the walker engine
//!
//! Whole runs through `Simulation`, checking the properties that must hold
//! for every trajectory:
//! - trajectories are one point longer than the step count
//! - teleporters, blockers and capture zones constrain accepted positions
//! - slow zones shrink steps, sinks pull walkers in

use rand::SeedableRng;
use walkabout::core::config::MotionParams;
use walkabout::core::types::{Point, Point2, Point3, SimRng};
use walkabout::simulation::Simulation;
use walkabout::walker::{MovementType, SpeedState};
use walkabout::world::{
    Blocker, CaptureZone, FeatureSet, GravitationalSink, SlowZone, SlowZonePolicy, Teleporter,
};

fn sim2(features: FeatureSet<2>, seed: u64) -> Simulation<2> {
    Simulation::new(features, MotionParams::for_dimension(2), SimRng::seed_from_u64(seed)).unwrap()
}

fn sim3(features: FeatureSet<3>, seed: u64) -> Simulation<3> {
    Simulation::new(features, MotionParams::for_dimension(3), SimRng::seed_from_u64(seed)).unwrap()
}

// ============================================================================
// Trajectory shape
// ============================================================================

#[test]
fn test_isotropic_hundred_steps_gives_101_points() {
    let mut sim = sim2(FeatureSet::new(), 1);
    sim.add_walker(MovementType::Isotropic, false);
    let trajectories = sim.run(100);
    assert_eq!(trajectories.len(), 1);
    assert_eq!(trajectories[0].len(), 101);

    // unit steps
    for pair in trajectories[0].points.windows(2) {
        assert!((pair[0].distance(&pair[1]) - 1.0).abs() < 1e-9);
    }
}

#[test]
fn test_every_movement_type_every_dimension() {
    for movement in MovementType::ALL {
        for restart in [false, true] {
            let mut planar = sim2(FeatureSet::new(), movement.code() as u64);
            planar.spawn_walkers(3, movement, restart);
            assert!(planar.run(40).iter().all(|t| t.len() == 41));

            let mut spatial = sim3(FeatureSet::new(), movement.code() as u64);
            spatial.spawn_walkers(3, movement, restart);
            assert!(spatial.run(40).iter().all(|t| t.len() == 41));
        }
    }
}

#[test]
fn test_restart_returns_to_origin_sometimes() {
    let mut sim = sim2(FeatureSet::new(), 17);
    sim.add_walker(MovementType::Isotropic, true);
    let trajectory = sim.run(300).remove(0);
    let restarts = trajectory.points[1..]
        .iter()
        .filter(|p| **p == Point2::origin())
        .count();
    // about 30 expected at 10%
    assert!(restarts > 5, "only {} restarts", restarts);
}

// ============================================================================
// Feature effects
// ============================================================================

#[test]
fn test_teleporter_sends_walker_to_exit() {
    // a portal covering the walker's whole neighbourhood
    let features = FeatureSet::new()
        .with(Teleporter::new(Point2::new([5.0, 5.0]), 40.0, Point2::new([-50.0, -50.0])).unwrap());
    let mut sim = sim2(features, 3);
    sim.add_walker(MovementType::Isotropic, false);
    let trajectory = sim.run(1).remove(0);
    assert_eq!(trajectory.points[1], Point2::new([-50.0, -50.0]));
}

#[test]
fn test_blocked_walker_never_enters_obstacle() {
    // origin sits on the obstacle's edge: the walker may stay, or step out to -x
    let obstacle = Blocker::new(Point2::new([1.0, 0.0]), 2.0).unwrap();
    let features = FeatureSet::new().with(obstacle.clone());
    let mut sim = sim2(features, 5);
    sim.spawn_walkers(5, MovementType::AxisAligned, false);

    for trajectory in sim.run(200) {
        for pair in trajectory.points.windows(2) {
            assert!(
                pair[1] == pair[0] || !obstacle.contains(&pair[1]),
                "moved into the obstacle at {:?}",
                pair[1]
            );
        }
    }
}

#[test]
fn test_captured_walker_stays_inside() {
    let trap = CaptureZone::new(Point3::origin(), 3.0).unwrap();
    let features = FeatureSet::new().with(trap.clone());
    let mut sim = sim3(features, 11);
    sim.spawn_walkers(4, MovementType::Levy, false);

    for trajectory in sim.run(150) {
        let first_inside = trajectory.points.iter().position(|p| trap.contains(p));
        if let Some(start) = first_inside {
            assert!(trajectory.points[start..].iter().all(|p| trap.contains(p)));
        }
    }
}

#[test]
fn test_overlapping_traps_never_release_a_walker() {
    // the trap listed first sits beside the origin trap and overlaps it
    let beside = CaptureZone::new(Point2::new([3.0, 0.0]), 2.0).unwrap();
    let home = CaptureZone::new(Point2::origin(), 2.0).unwrap();
    for seed in 0..20 {
        let features = FeatureSet::new().with(beside.clone()).with(home.clone());
        let mut sim = sim2(features, seed);
        sim.spawn_walkers(3, MovementType::AxisAligned, false);

        for trajectory in sim.run(100) {
            assert!(
                trajectory.points.iter().all(|p| home.contains(p)),
                "seed {}: walker left the origin trap",
                seed
            );
        }
    }
}

#[test]
fn test_trapped_walker_slows_inside_slow_zone() {
    let trap = CaptureZone::new(Point2::origin(), 5.0).unwrap();
    let features = FeatureSet::new()
        .with(trap.clone())
        .with(SlowZone::new(Point2::origin(), 50.0).unwrap());
    let mut sim = sim2(features, 1);
    let id = sim.add_walker(MovementType::Isotropic, false);
    let trajectory = sim.run(20).remove(0);

    assert!(trajectory.points.iter().all(|p| trap.contains(p)));
    assert!((trajectory.points[0].distance(&trajectory.points[1]) - 1.0).abs() < 1e-9);
    // half steps from then on, or none when the trap holds the walker back
    let steps: Vec<f64> = trajectory.points[1..]
        .windows(2)
        .map(|pair| pair[0].distance(&pair[1]))
        .collect();
    assert!(steps.iter().all(|d| d.abs() < 1e-9 || (d - 0.5).abs() < 1e-9), "{:?}", steps);
    assert!(steps.iter().any(|d| (d - 0.5).abs() < 1e-9));
    assert_eq!(sim.walker(id).unwrap().speed(), SpeedState::Slowed);
}

#[test]
fn test_slow_zone_halves_planar_steps() {
    let features = FeatureSet::new().with(SlowZone::new(Point2::origin(), 1000.0).unwrap());
    let mut sim = sim2(features, 8);
    let id = sim.add_walker(MovementType::Isotropic, false);
    let trajectory = sim.run(30).remove(0);

    // the first step is taken at normal speed, the zone slows the walker from then on
    assert!((trajectory.points[0].distance(&trajectory.points[1]) - 1.0).abs() < 1e-9);
    for pair in trajectory.points[1..].windows(2) {
        assert!((pair[0].distance(&pair[1]) - 0.5).abs() < 1e-9);
    }
    assert_eq!(sim.walker(id).unwrap().speed(), SpeedState::Slowed);
}

#[test]
fn test_slow_zone_quarters_spatial_steps() {
    let features = FeatureSet::new().with(SlowZone::new(Point3::origin(), 1000.0).unwrap());
    let mut sim = sim3(features, 9);
    sim.add_walker(MovementType::AxisAligned, false);
    let trajectory = sim.run(10).remove(0);
    assert!((trajectory.points[0].distance(&trajectory.points[1]) - 1.0).abs() < 1e-9);
    for pair in trajectory.points[1..].windows(2) {
        assert!((pair[0].distance(&pair[1]) - 0.25).abs() < 1e-9);
    }
}

#[test]
fn test_walker_regains_speed_outside_slow_zone() {
    // tiny zone around the origin: one slowed step, then free again
    let features = FeatureSet::new().with(SlowZone::new(Point2::origin(), 0.1).unwrap());
    let mut sim = sim2(features, 10);
    let id = sim.add_walker(MovementType::Isotropic, false);
    sim.tick();
    assert_eq!(sim.walker(id).unwrap().speed(), SpeedState::Slowed);
    sim.tick();
    assert_eq!(sim.walker(id).unwrap().speed(), SpeedState::Normal);
}

#[test]
fn test_sink_swallows_nearby_walker() {
    let center = Point3::new([4.0, 0.0, 0.0]);
    let features = FeatureSet::new().with(GravitationalSink::new(center).unwrap());
    let mut sim = sim3(features, 12);
    sim.add_walker(MovementType::Isotropic, false);
    let trajectory = sim.run(10).remove(0);

    // four unit pulls, then pinned at the center
    for (i, expected) in [4.0, 3.0, 2.0, 1.0, 0.0].iter().enumerate() {
        assert!((trajectory.points[i].distance(&center) - expected).abs() < 1e-6);
    }
    assert!(trajectory.points[4..].iter().all(|p| p.distance(&center) < 1e-6));
}

#[test]
fn test_passthrough_lets_sink_act_inside_slow_zone() {
    let build = |policy: SlowZonePolicy| {
        let features = FeatureSet::new()
            .with(SlowZone::new(Point3::origin(), 50.0).unwrap())
            .with(GravitationalSink::new(Point3::new([5.0, 0.0, 0.0])).unwrap());
        let mut sim = sim3(features, 13).with_slow_zone_policy(policy);
        sim.add_walker(MovementType::Isotropic, false);
        sim.run(12).remove(0)
    };

    let center = Point3::new([5.0, 0.0, 0.0]);
    let pulled = build(SlowZonePolicy::Passthrough);
    assert!(pulled.final_position().unwrap().distance(&center) < 1e-6);

    // resident walkers skip the sink and wander at quarter speed
    let wandering = build(SlowZonePolicy::StopWhenResident);
    let end = wandering.final_position().unwrap();
    assert!(end.distance(&center) > 1.0);
}

#[test]
fn test_reset_then_rerun() {
    let mut sim = sim2(FeatureSet::new(), 14);
    sim.spawn_walkers(2, MovementType::VariableRange, false);
    sim.run(20);
    sim.reset();
    let again = sim.run(20);
    for t in &again {
        assert_eq!(t.points[0], Point::origin());
        assert_eq!(t.len(), 21);
    }
    assert!(sim.walkers().iter().all(|w| w.history().len() == 40));
}
