// Helpers for timestamps and blind waits
//
// Austin Shafer - 2020
use std::time::{Duration, SystemTime, UNIX_EPOCH};

pub fn get_current_time() -> Duration {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or(Duration::ZERO)
}

// Helper to get the current time in milliseconds
pub fn get_current_millis() -> u32 {
    get_current_time().as_millis() as u32
}

/// Block the calling thread for `delay`
///
/// This is a blind wait, not an event wait. A zero delay returns
/// immediately so tests can skip settling entirely.
pub fn settle(delay: Duration) {
    if delay.is_zero() {
        return;
    }
    std::thread::sleep(delay);
}
