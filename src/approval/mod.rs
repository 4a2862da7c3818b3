pub mod display;
pub mod types;

pub use display::{format_timestamp, location_label};
pub use types::*;
