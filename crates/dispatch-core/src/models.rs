//! Core data models for the dispatch planner.

use chrono::{NaiveTime, Weekday};
use serde::{Deserialize, Serialize};

/// A point on the plane-projected (lng, lat) grid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub lng: f64,
    pub lat: f64,
}

impl Position {
    pub fn new(lng: f64, lat: f64) -> Self {
        Self { lng, lat }
    }

    /// A position is valid iff both components are finite and inside
    /// lng ∈ [-180, 180], lat ∈ [-90, 90].
    pub fn is_valid(&self) -> bool {
        self.lng.is_finite()
            && self.lat.is_finite()
            && (-180.0..=180.0).contains(&self.lng)
            && (-90.0..=90.0).contains(&self.lat)
    }
}

/// A restricted area: a closed polygon no flight path may enter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Region {
    #[serde(default)]
    pub name: String,
    pub vertices: Vec<Position>,
}

impl Region {
    /// Well-formed iff the ring is explicitly closed (first == last) and has
    /// at least three distinct corners plus the closing repeat.
    pub fn is_well_formed(&self) -> bool {
        self.vertices.len() >= 4 && self.vertices.first() == self.vertices.last()
    }
}

/// A drone in the fleet. `capability` is absent when the upstream platform
/// has no capability record for this airframe.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Drone {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub capability: Option<DroneCapability>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DroneCapability {
    pub cooling: bool,
    pub heating: bool,
    pub capacity: f64,
    pub max_moves: u32,
    pub cost_per_move: f64,
    pub cost_initial: f64,
    pub cost_final: f64,
}

/// Home base for one or more drones; takeoff and landing location.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServicePoint {
    pub id: i64,
    pub name: String,
    pub location: Position,
}

/// Day-of-week as the upstream platform spells it: uppercase English,
/// nothing else accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DayOfWeek {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl From<Weekday> for DayOfWeek {
    fn from(weekday: Weekday) -> Self {
        match weekday {
            Weekday::Mon => Self::Monday,
            Weekday::Tue => Self::Tuesday,
            Weekday::Wed => Self::Wednesday,
            Weekday::Thu => Self::Thursday,
            Weekday::Fri => Self::Friday,
            Weekday::Sat => Self::Saturday,
            Weekday::Sun => Self::Sunday,
        }
    }
}

/// A weekly flying window for a drone at a service point.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityWindow {
    pub day_of_week: DayOfWeek,
    #[serde(with = "flex_time")]
    pub from: NaiveTime,
    #[serde(with = "flex_time")]
    pub until: NaiveTime,
}

/// One entry of the drones-for-service-points table. The same drone id may
/// appear under multiple service points; windows accumulate across entries,
/// while the first listing determines the drone's home base.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServicePointRoster {
    pub service_point_id: i64,
    pub drones: Vec<RosteredDrone>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RosteredDrone {
    pub id: String,
    #[serde(default)]
    pub availability: Vec<AvailabilityWindow>,
}

/// A single delivery request. `date`/`time` stay raw strings so that an
/// unparsable value disqualifies inside the eligibility engine rather than
/// failing deserialisation of the whole batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchRecord {
    pub id: i64,
    pub date: String,
    pub time: String,
    pub delivery: Position,
    #[serde(default)]
    pub requirements: Option<DispatchRequirements>,
}

/// Per-delivery constraints; an absent field means "no constraint".
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DispatchRequirements {
    #[serde(default)]
    pub cooling: Option<bool>,
    #[serde(default)]
    pub heating: Option<bool>,
    #[serde(default)]
    pub capacity: Option<f64>,
    #[serde(default)]
    pub max_cost: Option<f64>,
}

/// One flight-path leg. `delivery_id` is -1 for the return-to-base leg.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryPath {
    pub delivery_id: i64,
    pub flight_path: Vec<Position>,
}

/// The sortie flown by one drone: one leg per delivery plus the return leg.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DronePath {
    pub drone_id: String,
    pub deliveries: Vec<DeliveryPath>,
}

/// Overall planning result.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DispatchPlan {
    pub drone_paths: Vec<DronePath>,
    pub total_moves: u32,
    pub total_cost: f64,
}

/// Read-only snapshot of the fleet data fetched from the upstream platform
/// for the duration of one planning call. Missing collections are empty.
#[derive(Debug, Clone, Default)]
pub struct FleetSnapshot {
    pub drones: Vec<Drone>,
    pub service_points: Vec<ServicePoint>,
    pub availability: Vec<ServicePointRoster>,
    pub regions: Vec<Region>,
}

impl FleetSnapshot {
    /// A drone's home base: the first roster entry that lists it.
    pub fn home_service_point(&self, drone_id: &str) -> Option<&ServicePoint> {
        let roster = self
            .availability
            .iter()
            .find(|entry| entry.drones.iter().any(|d| d.id == drone_id))?;
        self.service_points
            .iter()
            .find(|sp| sp.id == roster.service_point_id)
    }

    /// All availability windows for a drone, accumulated across every
    /// service point that rosters it, in table order.
    pub fn windows_for(&self, drone_id: &str) -> Vec<&AvailabilityWindow> {
        self.availability
            .iter()
            .flat_map(|entry| entry.drones.iter())
            .filter(|d| d.id == drone_id)
            .flat_map(|d| d.availability.iter())
            .collect()
    }
}

/// Availability window times arrive as either `HH:MM` or `HH:MM:SS`;
/// parse both, store canonicalised.
mod flex_time {
    use chrono::NaiveTime;
    use serde::{self, Deserialize, Deserializer, Serializer};

    pub fn parse(s: &str) -> Option<NaiveTime> {
        NaiveTime::parse_from_str(s, "%H:%M:%S")
            .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M"))
            .ok()
    }

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&time.format("%H:%M").to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).ok_or_else(|| serde::de::Error::custom(format!("invalid time '{}'", raw)))
    }
}

/// Parse a wall-clock time accepting both `HH:MM` and `HH:MM:SS`.
pub fn parse_time_flexible(s: &str) -> Option<NaiveTime> {
    flex_time::parse(s)
}
