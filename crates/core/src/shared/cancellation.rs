use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

/// Granularity of the cancellation check while waiting.
const STOP_CHECK_INTERVAL: Duration = Duration::from_millis(100);

/// Sleeps for `duration` in short slices. Returns `false` if `cancelled` was
/// set meanwhile.
pub fn wait_unless_cancelled(duration: Duration, cancelled: &AtomicBool) -> bool {
    let deadline = Instant::now() + duration;
    loop {
        if cancelled.load(Ordering::Relaxed) {
            return false;
        }
        let now = Instant::now();
        if now >= deadline {
            return true;
        }
        thread::sleep(STOP_CHECK_INTERVAL.min(deadline - now));
    }
}
