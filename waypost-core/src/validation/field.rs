use serde::Serialize;
use std::fmt;

/// Location of a validation issue inside a [`crate::route::RouteDescription`].
///
/// List entries carry their position in the submitted list so the form can
/// put the message next to the right slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(tag = "field", content = "index", rename_all = "camelCase")]
pub enum Field {
    Name,
    Domain,
    Backend,
    Header(usize),
    BasicAuth(usize),
    IpRestrictionDepth,
    IpRestriction(usize),
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Field::Name => f.write_str("name"),
            Field::Domain => f.write_str("domain"),
            Field::Backend => f.write_str("backend.url"),
            Field::Header(i) => write!(f, "headers[{}]", i),
            Field::BasicAuth(i) => write!(f, "basicAuth[{}]", i),
            Field::IpRestrictionDepth => f.write_str("ipRestriction.depth"),
            Field::IpRestriction(i) => write!(f, "ipRestriction.ips[{}]", i),
        }
    }
}
