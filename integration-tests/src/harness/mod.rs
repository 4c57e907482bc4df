mod fleet;
pub mod tracing;
pub mod upstream;

pub use fleet::{TestFleet, fixture, route};
pub use tracing::{CapturedEvent, capture_events};
pub use upstream::start_upstream;
