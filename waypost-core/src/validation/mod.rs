mod field;
mod range;
mod report;
mod validate;

pub use field::Field;
pub use range::{IP_RESTRICTION_DEPTH, RangeConstraint, validate_range};
pub use report::*;
pub use validate::validate_route;
