use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

/// Local alert mute. Purely client-side; expiry is checked against the
/// caller's clock.
#[derive(Clone, Copy, Debug, Default)]
pub struct MuteTimer {
    until: Option<Instant>,
}

impl MuteTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mutes for `duration` from `now`, replacing any running mute.
    pub fn mute(&mut self, now: Instant, duration: Duration) {
        self.until = Some(now + duration);
    }

    pub fn unmute(&mut self) {
        self.until = None;
    }

    pub fn is_active(&self, now: Instant) -> bool {
        self.until.is_some_and(|until| now < until)
    }

    /// Zero once expired or when not muted.
    pub fn remaining(&self, now: Instant) -> Duration {
        self.until
            .map(|until| until.saturating_duration_since(now))
            .unwrap_or_default()
    }
}

/// A `MuteTimer` shared between the live loop and the front end. Clones
/// see the same mute.
#[derive(Clone, Debug, Default)]
pub struct SharedMute(Arc<Mutex<MuteTimer>>);

impl SharedMute {
    pub fn new() -> Self {
        Self::default()
    }

    fn timer(&self) -> MutexGuard<'_, MuteTimer> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn mute(&self, duration: Duration) {
        self.timer().mute(Instant::now(), duration);
    }

    pub fn unmute(&self) {
        self.timer().unmute();
    }

    pub fn is_active(&self) -> bool {
        self.timer().is_active(Instant::now())
    }

    pub fn remaining(&self) -> Duration {
        self.timer().remaining(Instant::now())
    }

    pub fn snapshot(&self) -> MuteTimer {
        *self.timer()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_muted_by_default() {
        let timer = MuteTimer::new();
        assert!(!timer.is_active(Instant::now()));
        assert_eq!(timer.remaining(Instant::now()), Duration::ZERO);
    }

    #[test]
    fn test_expires_after_duration() {
        let start = Instant::now();
        let mut timer = MuteTimer::new();
        timer.mute(start, Duration::from_secs(300));

        assert!(timer.is_active(start));
        assert!(timer.is_active(start + Duration::from_secs(299)));
        assert_eq!(
            timer.remaining(start + Duration::from_secs(100)),
            Duration::from_secs(200)
        );
        assert!(!timer.is_active(start + Duration::from_secs(300)));
        assert_eq!(
            timer.remaining(start + Duration::from_secs(400)),
            Duration::ZERO
        );
    }

    #[test]
    fn test_unmute_is_immediate() {
        let start = Instant::now();
        let mut timer = MuteTimer::new();
        timer.mute(start, Duration::from_secs(60));
        timer.unmute();
        assert!(!timer.is_active(start));
    }

    #[test]
    fn test_mute_again_extends() {
        let start = Instant::now();
        let mut timer = MuteTimer::new();
        timer.mute(start, Duration::from_secs(10));
        timer.mute(start + Duration::from_secs(5), Duration::from_secs(10));
        assert!(timer.is_active(start + Duration::from_secs(12)));
    }

    #[test]
    fn test_shared_mute_is_seen_by_clones() {
        let front = SharedMute::new();
        let worker = front.clone();

        front.mute(Duration::from_secs(60));
        assert!(worker.is_active());
        assert!(worker.remaining() > Duration::from_secs(55));
        assert!(worker.snapshot().is_active(Instant::now()));

        worker.unmute();
        assert!(!front.is_active());
        assert_eq!(front.remaining(), Duration::ZERO);
    }
}
