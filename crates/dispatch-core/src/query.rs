//! Typed predicate language over drone records.
//!
//! Two entry points: a single-attribute equality match (the path-parameter
//! form) and a structured multi-query match. Queries with a blank field are
//! dropped before matching; queries whose fields are present but unknown or
//! ill-typed evaluate to false. Both halves of that split are contractual.

use crate::models::Drone;
use serde::{Deserialize, Serialize};

/// One structured predicate as it arrives on the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryAttribute {
    pub attribute: String,
    pub operator: String,
    pub value: String,
}

impl QueryAttribute {
    /// Valid iff all three fields are present and non-blank. Invalid
    /// queries are silently dropped, never failed.
    pub fn is_valid(&self) -> bool {
        !self.attribute.trim().is_empty()
            && !self.operator.trim().is_empty()
            && !self.value.trim().is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Operator {
    Eq,
    NotEq,
    Less,
    Greater,
}

impl Operator {
    fn parse(raw: &str) -> Option<Self> {
        match raw {
            "=" => Some(Self::Eq),
            "!=" => Some(Self::NotEq),
            "<" => Some(Self::Less),
            ">" => Some(Self::Greater),
            _ => None,
        }
    }
}

/// The queryable attribute universe, partitioned by type: text attributes
/// and flags accept only `=`; numeric attributes accept all four operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Attribute {
    Id,
    Name,
    Cooling,
    Heating,
    Capacity,
    MaxMoves,
    CostPerMove,
    CostInitial,
    CostFinal,
}

impl Attribute {
    fn parse(raw: &str) -> Option<Self> {
        match raw {
            "id" => Some(Self::Id),
            "name" => Some(Self::Name),
            "cooling" => Some(Self::Cooling),
            "heating" => Some(Self::Heating),
            "capacity" => Some(Self::Capacity),
            "maxMoves" => Some(Self::MaxMoves),
            "costPerMove" => Some(Self::CostPerMove),
            "costInitial" => Some(Self::CostInitial),
            "costFinal" => Some(Self::CostFinal),
            _ => None,
        }
    }
}

/// What a drone actually holds for one attribute. A drone with no
/// capability record reads as `false` for the flags and as absent for the
/// numeric attributes.
enum AttributeValue<'a> {
    Text(&'a str),
    Flag(bool),
    Numeric(Option<f64>),
}

fn attribute_value<'a>(drone: &'a Drone, attribute: Attribute) -> AttributeValue<'a> {
    let capability = drone.capability.as_ref();
    match attribute {
        Attribute::Id => AttributeValue::Text(&drone.id),
        Attribute::Name => AttributeValue::Text(&drone.name),
        Attribute::Cooling => AttributeValue::Flag(capability.is_some_and(|c| c.cooling)),
        Attribute::Heating => AttributeValue::Flag(capability.is_some_and(|c| c.heating)),
        Attribute::Capacity => AttributeValue::Numeric(capability.map(|c| c.capacity)),
        Attribute::MaxMoves => {
            AttributeValue::Numeric(capability.map(|c| f64::from(c.max_moves)))
        }
        Attribute::CostPerMove => AttributeValue::Numeric(capability.map(|c| c.cost_per_move)),
        Attribute::CostInitial => AttributeValue::Numeric(capability.map(|c| c.cost_initial)),
        Attribute::CostFinal => AttributeValue::Numeric(capability.map(|c| c.cost_final)),
    }
}

/// Single-attribute equality match, the `/{attribute}/{value}` form.
/// Unknown attributes and unparsable values match nothing.
pub fn matches_attribute(drone: &Drone, attribute: &str, value: &str) -> bool {
    let Some(attribute) = Attribute::parse(attribute) else {
        return false;
    };
    evaluate(drone, attribute, Operator::Eq, value)
}

/// One structured query against one drone. Assumes the query passed
/// `is_valid`; unknown attribute/operator or a type mismatch is false.
pub fn matches_query(drone: &Drone, query: &QueryAttribute) -> bool {
    let Some(attribute) = Attribute::parse(&query.attribute) else {
        return false;
    };
    let Some(operator) = Operator::parse(&query.operator) else {
        return false;
    };
    evaluate(drone, attribute, operator, &query.value)
}

/// Logical AND over the surviving (valid) queries. An all-invalid or empty
/// input matches every drone — vacuous truth.
pub fn matches_all(drone: &Drone, queries: &[QueryAttribute]) -> bool {
    queries
        .iter()
        .filter(|q| q.is_valid())
        .all(|q| matches_query(drone, q))
}

fn evaluate(drone: &Drone, attribute: Attribute, operator: Operator, value: &str) -> bool {
    match attribute_value(drone, attribute) {
        AttributeValue::Text(actual) => operator == Operator::Eq && actual == value,
        AttributeValue::Flag(actual) => {
            operator == Operator::Eq
                && value.parse::<bool>().map(|v| v == actual).unwrap_or(false)
        }
        AttributeValue::Numeric(actual) => {
            let (Some(actual), Ok(wanted)) = (actual, value.parse::<f64>()) else {
                return false;
            };
            match operator {
                Operator::Eq => actual == wanted,
                Operator::NotEq => actual != wanted,
                Operator::Less => actual < wanted,
                Operator::Greater => actual > wanted,
            }
        }
    }
}
