//! Greedy sortie planning: subset selection per drone, then an outer loop
//! that flies the best sortie and repeats until nothing more can be served.
//!
//! The planner is deliberately a deterministic greedy heuristic, not an
//! optimiser. Candidates are walked in ascending dispatch id and choices
//! are irrevocable; ties between drones go to the first in fleet order.

use crate::eligibility::{can_serve, is_available};
use crate::models::{
    DeliveryPath, DispatchPlan, DispatchRecord, Drone, DronePath, FleetSnapshot, Position,
    ServicePoint,
};
use crate::pathfinder::find_path;
use serde::Serialize;
use std::collections::HashSet;

/// Sentinel delivery id for the return-to-base leg.
pub const RETURN_LEG_ID: i64 = -1;

/// Largest subset of `remaining` one sortie of `drone` can serve, walking
/// candidates in ascending dispatch id under the capacity, move-budget and
/// per-delivery cost-cap constraints.
///
/// The return leg is costed tentatively at every step: accepting a
/// candidate locks in its forward moves only, so the budget always reflects
/// "could still fly home from here".
pub fn find_max_subset<'a>(
    drone: &Drone,
    home: &ServicePoint,
    remaining: &[&'a DispatchRecord],
    snapshot: &FleetSnapshot,
) -> Vec<&'a DispatchRecord> {
    let Some(capability) = &drone.capability else {
        return Vec::new();
    };

    let mut candidates: Vec<&DispatchRecord> = remaining
        .iter()
        .copied()
        .filter(|record| {
            can_serve(drone, record)
                && is_available(&drone.id, &record.date, &record.time, snapshot)
        })
        .collect();
    candidates.sort_by_key(|record| record.id);

    let mut chosen: Vec<&DispatchRecord> = Vec::new();
    let mut used_capacity = 0.0_f64;
    let mut used_moves = 0u32;
    let mut current = home.location;
    let mut tightest_cap = f64::INFINITY;

    for record in candidates {
        let Some(requirements) = &record.requirements else {
            continue;
        };

        let load = requirements.capacity.unwrap_or(0.0);
        if used_capacity + load > capability.capacity {
            continue;
        }

        let forward = find_path(current, record.delivery, &snapshot.regions);
        if forward.is_empty() {
            continue;
        }
        let back = find_path(record.delivery, home.location, &snapshot.regions);
        if back.is_empty() {
            continue;
        }

        let forward_moves = (forward.len() - 1) as u32;
        let return_moves = (back.len() - 1) as u32;
        let moves_if_included = used_moves + forward_moves + return_moves;
        if moves_if_included > capability.max_moves {
            continue;
        }

        // maxCost <= 0 is the "no constraint" sentinel.
        let cap_request = requirements.max_cost.filter(|cap| *cap > 0.0);
        let tightened = tightest_cap.min(cap_request.unwrap_or(f64::INFINITY));
        if tightened < f64::INFINITY {
            let flight_cost = capability.cost_initial
                + f64::from(moves_if_included) * capability.cost_per_move
                + capability.cost_final;
            let per_delivery = flight_cost / (chosen.len() + 1) as f64;
            if per_delivery > tightened {
                continue;
            }
        }

        chosen.push(record);
        used_capacity += load;
        used_moves += forward_moves;
        current = record.delivery;
        tightest_cap = tightened;
    }

    chosen
}

/// Concrete step-by-step path for one sortie: one hover-terminated leg per
/// delivery in ascending id order, then the return leg (`delivery_id` -1).
/// Returns the path together with its move count; a leg that cannot be
/// routed aborts the build, keeping what was already flown.
pub fn build_drone_path(
    drone_id: &str,
    home: &ServicePoint,
    subset: &[&DispatchRecord],
    snapshot: &FleetSnapshot,
) -> (DronePath, u32) {
    let mut ordered: Vec<&DispatchRecord> = subset.to_vec();
    ordered.sort_by_key(|record| record.id);

    let mut deliveries: Vec<DeliveryPath> = Vec::new();
    let mut moves = 0u32;
    let mut current = home.location;

    for record in ordered {
        let Some(leg) = routed_leg(current, record.delivery, snapshot, &mut moves) else {
            return (
                DronePath {
                    drone_id: drone_id.to_string(),
                    deliveries,
                },
                moves,
            );
        };
        current = leg.touchdown;
        deliveries.push(DeliveryPath {
            delivery_id: record.id,
            flight_path: leg.flight_path,
        });
    }

    if let Some(leg) = routed_leg(current, home.location, snapshot, &mut moves) {
        deliveries.push(DeliveryPath {
            delivery_id: RETURN_LEG_ID,
            flight_path: leg.flight_path,
        });
    }

    (
        DronePath {
            drone_id: drone_id.to_string(),
            deliveries,
        },
        moves,
    )
}

struct RoutedLeg {
    flight_path: Vec<Position>,
    touchdown: Position,
}

/// One A* leg with the hover duplicate appended. The hover is not a move;
/// a raw leg of n nodes contributes n - 1 moves.
fn routed_leg(
    from: Position,
    to: Position,
    snapshot: &FleetSnapshot,
    moves: &mut u32,
) -> Option<RoutedLeg> {
    let mut leg = find_path(from, to, &snapshot.regions);
    let touchdown = *leg.last()?;
    *moves += (leg.len() - 1) as u32;
    leg.push(touchdown);
    Some(RoutedLeg {
        flight_path: leg,
        touchdown,
    })
}

/// Plan the whole batch: repeatedly fly the sortie serving the most
/// deliveries until the batch is exhausted or nothing more can be served.
pub fn plan_dispatch(snapshot: &FleetSnapshot, records: &[DispatchRecord]) -> DispatchPlan {
    let mut remaining: Vec<&DispatchRecord> = records.iter().collect();
    let mut plan = DispatchPlan::default();

    while !remaining.is_empty() {
        let mut best: Option<(&Drone, &ServicePoint, Vec<&DispatchRecord>)> = None;
        for drone in &snapshot.drones {
            let Some(home) = snapshot.home_service_point(&drone.id) else {
                continue;
            };
            let subset = find_max_subset(drone, home, &remaining, snapshot);
            if subset.len() > best.as_ref().map_or(0, |(_, _, s)| s.len()) {
                best = Some((drone, home, subset));
            }
        }

        let Some((drone, home, subset)) = best else {
            break;
        };
        // find_max_subset never selects a drone without a capability record
        let Some(capability) = &drone.capability else {
            break;
        };

        let (drone_path, moves) = build_drone_path(&drone.id, home, &subset, snapshot);
        let cost = capability.cost_initial
            + f64::from(moves) * capability.cost_per_move
            + capability.cost_final;

        plan.total_moves += moves;
        plan.total_cost += cost;
        plan.drone_paths.push(drone_path);

        let served: HashSet<i64> = subset.iter().map(|record| record.id).collect();
        remaining.retain(|record| !served.contains(&record.id));
    }

    plan
}

#[derive(Serialize)]
struct LineString {
    #[serde(rename = "type")]
    kind: &'static str,
    coordinates: Vec<[f64; 2]>,
}

/// Flight path of the whole batch as one GeoJSON LineString, flown by the
/// first single drone whose best sortie covers every record. No such drone,
/// an empty batch, or missing fleet data all yield the empty LineString.
pub fn plan_geojson(snapshot: &FleetSnapshot, records: &[DispatchRecord]) -> String {
    let mut coordinates: Vec<[f64; 2]> = Vec::new();

    if !records.is_empty() {
        let remaining: Vec<&DispatchRecord> = records.iter().collect();
        for drone in &snapshot.drones {
            let Some(home) = snapshot.home_service_point(&drone.id) else {
                continue;
            };
            let subset = find_max_subset(drone, home, &remaining, snapshot);
            if subset.len() != records.len() {
                continue;
            }
            let (drone_path, _) = build_drone_path(&drone.id, home, &subset, snapshot);
            coordinates = drone_path
                .deliveries
                .iter()
                .flat_map(|leg| leg.flight_path.iter())
                .map(|position| [position.lng, position.lat])
                .collect();
            break;
        }
    }

    let line = LineString {
        kind: "LineString",
        coordinates,
    };
    serde_json::to_string(&line).expect("LineString serialises")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::STEP;
    use crate::models::{
        AvailabilityWindow, DayOfWeek, DispatchRequirements, DroneCapability, Position, Region,
        RosteredDrone, ServicePointRoster,
    };
    use chrono::NaiveTime;

    fn capability(cooling: bool) -> DroneCapability {
        DroneCapability {
            cooling,
            heating: false,
            capacity: 5.0,
            max_moves: 2000,
            cost_per_move: 1.0,
            cost_initial: 50.0,
            cost_final: 10.0,
        }
    }

    fn drone(id: &str, capability_record: Option<DroneCapability>) -> Drone {
        Drone {
            id: id.to_string(),
            name: id.to_string(),
            capability: capability_record,
        }
    }

    fn snapshot_with(drones: Vec<Drone>) -> FleetSnapshot {
        let roster = drones
            .iter()
            .map(|d| RosteredDrone {
                id: d.id.clone(),
                availability: vec![AvailabilityWindow {
                    day_of_week: DayOfWeek::Monday,
                    from: NaiveTime::from_hms_opt(8, 0, 0).unwrap(),
                    until: NaiveTime::from_hms_opt(18, 0, 0).unwrap(),
                }],
            })
            .collect();
        FleetSnapshot {
            drones,
            service_points: vec![ServicePoint {
                id: 1,
                name: "Central Depot".to_string(),
                location: Position::new(0.0, 0.0),
            }],
            availability: vec![ServicePointRoster {
                service_point_id: 1,
                drones: roster,
            }],
            regions: Vec::new(),
        }
    }

    /// Monday delivery a few grid steps east of the depot.
    fn record(id: i64, steps_east: f64, requirements: DispatchRequirements) -> DispatchRecord {
        DispatchRecord {
            id,
            date: "2025-01-20".to_string(),
            time: "10:00".to_string(),
            delivery: Position::new(steps_east * STEP, 0.0),
            requirements: Some(requirements),
        }
    }

    fn assert_leg_invariants(plan: &DispatchPlan) {
        let mut step_total = 0u32;
        for path in &plan.drone_paths {
            for leg in &path.deliveries {
                assert!(leg.flight_path.len() >= 2);
                let n = leg.flight_path.len();
                assert_eq!(leg.flight_path[n - 1], leg.flight_path[n - 2], "hover");
                step_total += (n - 2) as u32;
            }
        }
        assert_eq!(plan.total_moves, step_total);
    }

    #[test]
    fn empty_input_yields_empty_plan() {
        let snapshot = snapshot_with(vec![drone("MED-001", Some(capability(false)))]);
        let plan = plan_dispatch(&snapshot, &[]);
        assert!(plan.drone_paths.is_empty());
        assert_eq!(plan.total_moves, 0);
        assert_eq!(plan.total_cost, 0.0);
    }

    #[test]
    fn missing_fleet_data_yields_empty_plan() {
        let snapshot = FleetSnapshot::default();
        let recs = vec![record(1, 4.0, DispatchRequirements::default())];
        let plan = plan_dispatch(&snapshot, &recs);
        assert!(plan.drone_paths.is_empty());
    }

    #[test]
    fn cooling_request_picks_the_cooled_drone() {
        let snapshot = snapshot_with(vec![
            drone("BASIC-001", Some(capability(false))),
            drone("COOL-001", Some(capability(true))),
        ]);
        let recs = vec![record(
            1,
            4.0,
            DispatchRequirements {
                cooling: Some(true),
                capacity: Some(5.0),
                ..Default::default()
            },
        )];

        let plan = plan_dispatch(&snapshot, &recs);
        assert_eq!(plan.drone_paths.len(), 1);
        assert_eq!(plan.drone_paths[0].drone_id, "COOL-001");
        // Delivery leg plus the return leg.
        assert_eq!(plan.drone_paths[0].deliveries.len(), 2);
        assert_eq!(plan.drone_paths[0].deliveries[0].delivery_id, 1);
        assert_eq!(plan.drone_paths[0].deliveries[1].delivery_id, RETURN_LEG_ID);
        assert_leg_invariants(&plan);

        // Four steps out, four steps back.
        assert_eq!(plan.total_moves, 8);
        assert_eq!(plan.total_cost, 50.0 + 8.0 + 10.0);
    }

    #[test]
    fn capacity_overflow_serves_nothing() {
        let snapshot = snapshot_with(vec![drone("MED-001", Some(capability(false)))]);
        let recs = vec![record(
            1,
            4.0,
            DispatchRequirements {
                capacity: Some(10.0),
                ..Default::default()
            },
        )];
        let plan = plan_dispatch(&snapshot, &recs);
        assert!(plan.drone_paths.is_empty());
        assert_eq!(plan.total_moves, 0);
    }

    #[test]
    fn capacity_splits_batch_into_two_sorties() {
        let snapshot = snapshot_with(vec![drone("MED-001", Some(capability(false)))]);
        let half_load = DispatchRequirements {
            capacity: Some(3.0),
            ..Default::default()
        };
        let recs = vec![record(1, 2.0, half_load.clone()), record(2, 3.0, half_load)];

        let plan = plan_dispatch(&snapshot, &recs);
        assert_eq!(plan.drone_paths.len(), 2);
        assert_eq!(plan.drone_paths[0].deliveries[0].delivery_id, 1);
        assert_eq!(plan.drone_paths[1].deliveries[0].delivery_id, 2);
        assert_leg_invariants(&plan);
    }

    #[test]
    fn move_budget_excludes_far_deliveries() {
        let mut short_range = capability(false);
        short_range.max_moves = 6;
        let snapshot = snapshot_with(vec![drone("MED-001", Some(short_range))]);
        // Four steps out needs eight moves round trip.
        let recs = vec![record(1, 4.0, DispatchRequirements::default())];
        let plan = plan_dispatch(&snapshot, &recs);
        assert!(plan.drone_paths.is_empty());
    }

    #[test]
    fn subset_walks_candidates_in_id_order() {
        let snapshot = snapshot_with(vec![drone("MED-001", Some(capability(false)))]);
        let recs = vec![
            record(7, 3.0, DispatchRequirements::default()),
            record(2, 2.0, DispatchRequirements::default()),
        ];
        let refs: Vec<&DispatchRecord> = recs.iter().collect();
        let home = snapshot.home_service_point("MED-001").unwrap();
        let subset = find_max_subset(&snapshot.drones[0], home, &refs, &snapshot);
        let ids: Vec<i64> = subset.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![2, 7]);
    }

    #[test]
    fn amortised_cost_cap_blocks_later_deliveries() {
        let mut lean = capability(false);
        lean.cost_initial = 0.0;
        lean.cost_final = 0.0;
        let snapshot = snapshot_with(vec![drone("MED-001", Some(lean))]);

        let capped = DispatchRequirements {
            max_cost: Some(4.9),
            ..Default::default()
        };
        // Record 1: 2 steps out, 4 moves round trip, 4.0 per delivery - fits.
        // Record 2: 6 more steps out, 16 tentative moves, 8.0 per delivery
        // against the cap of 4.9 carried over from record 1 - blocked.
        let recs = vec![
            record(1, 2.0, capped),
            record(2, 8.0, DispatchRequirements::default()),
        ];
        let refs: Vec<&DispatchRecord> = recs.iter().collect();
        let home = snapshot.home_service_point("MED-001").unwrap();

        let subset = find_max_subset(&snapshot.drones[0], home, &refs, &snapshot);
        assert_eq!(subset.iter().map(|r| r.id).collect::<Vec<_>>(), vec![1]);

        // Without the cap both fit in one sortie.
        let uncapped = vec![
            record(1, 2.0, DispatchRequirements::default()),
            record(2, 8.0, DispatchRequirements::default()),
        ];
        let refs: Vec<&DispatchRecord> = uncapped.iter().collect();
        let subset = find_max_subset(&snapshot.drones[0], home, &refs, &snapshot);
        assert_eq!(subset.len(), 2);
    }

    #[test]
    fn non_positive_max_cost_means_no_constraint() {
        let snapshot = snapshot_with(vec![drone("MED-001", Some(capability(false)))]);
        let recs = vec![record(
            1,
            4.0,
            DispatchRequirements {
                max_cost: Some(0.0),
                ..Default::default()
            },
        )];
        let plan = plan_dispatch(&snapshot, &recs);
        assert_eq!(plan.drone_paths.len(), 1);
    }

    #[test]
    fn planning_terminates_within_batch_size_iterations() {
        let snapshot = snapshot_with(vec![drone("MED-001", Some(capability(false)))]);
        let one_each = DispatchRequirements {
            capacity: Some(5.0),
            ..Default::default()
        };
        let recs: Vec<DispatchRecord> = (1..=4)
            .map(|id| record(id, id as f64, one_each.clone()))
            .collect();
        let plan = plan_dispatch(&snapshot, &recs);
        // Full capacity per delivery forces one sortie per record.
        assert_eq!(plan.drone_paths.len(), 4);
        assert_leg_invariants(&plan);
    }

    #[test]
    fn sortie_detours_around_restricted_areas() {
        let mut snapshot = snapshot_with(vec![drone("MED-001", Some(capability(false)))]);
        // Wall between the depot and the delivery point.
        let wall = Region {
            name: "hospital helipad".to_string(),
            vertices: vec![
                Position::new(3.0 * STEP, -1.5 * STEP),
                Position::new(5.0 * STEP, -1.5 * STEP),
                Position::new(5.0 * STEP, 1.5 * STEP),
                Position::new(3.0 * STEP, 1.5 * STEP),
                Position::new(3.0 * STEP, -1.5 * STEP),
            ],
        };
        snapshot.regions.push(wall);

        let recs = vec![record(1, 8.0, DispatchRequirements::default())];
        let plan = plan_dispatch(&snapshot, &recs);
        assert_eq!(plan.drone_paths.len(), 1);
        assert_leg_invariants(&plan);

        // The straight line is blocked, so the sortie pays a detour.
        assert!(plan.total_moves > 16);
        for leg in &plan.drone_paths[0].deliveries {
            for pair in leg.flight_path.windows(2) {
                if pair[0] == pair[1] {
                    continue; // hover
                }
                assert!(crate::geo::is_valid_move(pair[0], pair[1], &snapshot.regions));
            }
        }
    }

    #[test]
    fn geojson_empty_batch_is_the_empty_linestring() {
        let snapshot = snapshot_with(vec![drone("MED-001", Some(capability(false)))]);
        assert_eq!(
            plan_geojson(&snapshot, &[]),
            r#"{"type":"LineString","coordinates":[]}"#
        );
    }

    #[test]
    fn geojson_single_sortie_concatenates_legs() {
        let snapshot = snapshot_with(vec![drone("MED-001", Some(capability(false)))]);
        let recs = vec![record(1, 2.0, DispatchRequirements::default())];
        let geojson = plan_geojson(&snapshot, &recs);
        assert!(geojson.starts_with(r#"{"type":"LineString","coordinates":[["#));
        // 3 nodes + hover out, 3 nodes + hover back.
        let parsed: serde_json::Value = serde_json::from_str(&geojson).unwrap();
        assert_eq!(parsed["coordinates"].as_array().unwrap().len(), 8);
    }

    #[test]
    fn geojson_unservable_batch_is_empty() {
        let snapshot = snapshot_with(vec![drone("MED-001", Some(capability(false)))]);
        let recs = vec![record(
            1,
            2.0,
            DispatchRequirements {
                capacity: Some(50.0),
                ..Default::default()
            },
        )];
        assert_eq!(
            plan_geojson(&snapshot, &recs),
            r#"{"type":"LineString","coordinates":[]}"#
        );
    }
}
