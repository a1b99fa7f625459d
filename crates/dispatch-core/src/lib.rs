//! Dispatch Core - Pure logic for delivery planning and pathfinding
//!
//! This crate contains the domain models and planning logic
//! with NO networking dependencies.

pub mod eligibility;
pub mod geo;
pub mod models;
pub mod pathfinder;
pub mod planner;
pub mod query;

pub use models::{
    AvailabilityWindow, DayOfWeek, DeliveryPath, DispatchPlan, DispatchRecord,
    DispatchRequirements, Drone, DroneCapability, DronePath, FleetSnapshot, Position, Region,
    ServicePoint, ServicePointRoster,
};
pub use planner::{build_drone_path, find_max_subset, plan_dispatch, plan_geojson};
