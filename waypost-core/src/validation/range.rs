use crate::validation::{Field, ValidationReport};

#[derive(Debug, Clone)]
pub struct RangeConstraint<T> {
    pub min: T,
    pub max: T,
    pub label: &'static str,
    pub units: Option<&'static str>,
}

pub const IP_RESTRICTION_DEPTH: RangeConstraint<i64> = RangeConstraint {
    min: 0,
    max: 30,
    label: "ipRestriction.depth",
    units: Some(" hops"),
};

pub fn validate_range<T>(
    value: T,
    constraint: &RangeConstraint<T>,
    report: &mut ValidationReport,
    field: Field,
) where
    T: PartialOrd + std::fmt::Display,
{
    if value < constraint.min || value > constraint.max {
        let units = constraint.units.unwrap_or("");
        report.error(
            field,
            format!(
                "invalid {}: {}{} (must be between {}{} and {}{})",
                constraint.label, value, units, constraint.min, units, constraint.max, units
            ),
            None,
        );
    }
}
