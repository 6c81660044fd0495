pub mod time;

pub use time::{TimeFormatter, TimezoneConfig};
