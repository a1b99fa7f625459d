//! Capability and availability checks for matching drones to dispatches.

use crate::models::{
    parse_time_flexible, DayOfWeek, DispatchRecord, Drone, FleetSnapshot,
};
use chrono::{Datelike, NaiveDate};

/// Whether a drone's recorded capability covers a dispatch's requirements.
///
/// Both sides must carry their record; a drone with no capability entry or
/// a dispatch with no requirements block serves nothing. A requirement of
/// `cooling: false` imposes no constraint — only `true` demands the
/// feature. The per-delivery cost cap is deliberately not checked here;
/// it belongs to the sortie planner.
pub fn can_serve(drone: &Drone, record: &DispatchRecord) -> bool {
    let Some(capability) = &drone.capability else {
        return false;
    };
    let Some(requirements) = &record.requirements else {
        return false;
    };

    if let Some(needed) = requirements.capacity {
        if capability.capacity < needed {
            return false;
        }
    }
    if requirements.cooling == Some(true) && !capability.cooling {
        return false;
    }
    if requirements.heating == Some(true) && !capability.heating {
        return false;
    }
    true
}

/// Whether a drone may fly at the given date and time.
///
/// Windows accumulate across every service point that rosters the drone.
/// Both window boundaries are exclusive: a dispatch at exactly the opening
/// or closing time is rejected. An unparsable date or time disqualifies.
pub fn is_available(drone_id: &str, date: &str, time: &str, snapshot: &FleetSnapshot) -> bool {
    let Ok(date) = NaiveDate::parse_from_str(date, "%Y-%m-%d") else {
        return false;
    };
    let Some(time) = parse_time_flexible(time) else {
        return false;
    };
    let day: DayOfWeek = date.weekday().into();

    snapshot
        .windows_for(drone_id)
        .iter()
        .any(|window| window.day_of_week == day && window.from < time && time < window.until)
}

/// Drones that can serve and are available for every record in the batch.
pub fn drones_serving_all<'a>(
    snapshot: &'a FleetSnapshot,
    records: &[DispatchRecord],
) -> Vec<&'a Drone> {
    snapshot
        .drones
        .iter()
        .filter(|drone| {
            records.iter().all(|record| {
                can_serve(drone, record)
                    && is_available(&drone.id, &record.date, &record.time, snapshot)
            })
        })
        .collect()
}
