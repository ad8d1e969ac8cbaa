//! Constants

use lazy_static::lazy_static;
use regex::Regex;
use std::time::Duration;

lazy_static! {
    pub(crate) static ref RE_USERNAME: Regex = Regex::new(r"^[a-zA-Z0-9\.\-_]+$").unwrap();
    pub(crate) static ref RE_PASSWORD: Regex =
        Regex::new(r"^[a-zA-Z0-9]*[0-9][a-zA-Z0-9]*$").unwrap();
}

// for authorized sessions
pub(crate) const SESSION_KEY_PREFIX: &str = "session:";
pub(crate) const SESSION_DURATION_SECS: u64 = 1209600;

// for the reminder sweep
pub(crate) const SWEEP_INTERVAL: Duration = Duration::from_secs(30 * 60);
pub(crate) const REMINDER_NEAR_MINS: i64 = 120;
pub(crate) const REMINDER_FAR_MINS: i64 = 180;

// broadcast buffer for realtime notices; lagging receivers drop older entries
pub(crate) const NOTICE_CHANNEL_CAPACITY: usize = 256;
