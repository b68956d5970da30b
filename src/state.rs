use std::fmt;
use std::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackState {
    #[default]
    Stopped,
    Playing,
    Paused,
}

impl fmt::Display for PlaybackState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PlaybackState::Stopped => "stopped",
            PlaybackState::Playing => "playing",
            PlaybackState::Paused => "paused",
        };
        f.write_str(name)
    }
}

/// Playback state plus the bookkeeping behind the virtual performance clock.
///
/// Virtual time runs from `started_at` and excludes every paused interval:
/// resuming moves `started_at` forward by the length of the pause.
#[derive(Debug, Default)]
pub struct Transport {
    state: PlaybackState,
    started_at: Option<Instant>,
    paused_at: Option<Instant>,
    run: u64,
}

impl Transport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    /// Identifier of the most recent run, bumped by every successful `start`
    pub fn run(&self) -> u64 {
        self.run
    }

    /// Stopped -> Playing. Returns the new run id, or `None` if already active.
    pub fn start(&mut self, now: Instant) -> Option<u64> {
        if self.state != PlaybackState::Stopped {
            return None;
        }
        self.state = PlaybackState::Playing;
        self.started_at = Some(now);
        self.paused_at = None;
        self.run += 1;
        Some(self.run)
    }

    pub fn pause(&mut self, now: Instant) -> bool {
        if self.state != PlaybackState::Playing {
            return false;
        }
        self.state = PlaybackState::Paused;
        self.paused_at = Some(now);
        true
    }

    pub fn resume(&mut self, now: Instant) -> bool {
        if self.state != PlaybackState::Paused {
            return false;
        }
        if let (Some(started_at), Some(paused_at)) = (self.started_at, self.paused_at.take()) {
            self.started_at = Some(started_at + now.saturating_duration_since(paused_at));
        }
        self.state = PlaybackState::Playing;
        true
    }

    /// Any state -> Stopped. Returns whether playback was active.
    pub fn stop(&mut self) -> bool {
        let was_active = self.state != PlaybackState::Stopped;
        self.state = PlaybackState::Stopped;
        self.started_at = None;
        self.paused_at = None;
        was_active
    }

    /// Marks `run` as finished; ignored if a newer run has started since
    pub fn finish(&mut self, run: u64) -> bool {
        if run != self.run {
            return false;
        }
        self.stop()
    }

    /// Elapsed virtual seconds at `now`
    pub fn current_time(&self, now: Instant) -> f64 {
        match (self.state, self.started_at) {
            (PlaybackState::Stopped, _) | (_, None) => 0.0,
            (PlaybackState::Paused, Some(started_at)) => self
                .paused_at
                .unwrap_or(now)
                .saturating_duration_since(started_at)
                .as_secs_f64(),
            (PlaybackState::Playing, Some(started_at)) => {
                now.saturating_duration_since(started_at).as_secs_f64()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_default_is_stopped() {
        let transport = Transport::new();
        assert_eq!(transport.state(), PlaybackState::Stopped);
        assert_eq!(transport.current_time(Instant::now()), 0.0);
    }

    #[test]
    fn test_start_only_from_stopped() {
        let mut transport = Transport::new();
        let t0 = Instant::now();
        assert_eq!(transport.start(t0), Some(1));
        assert_eq!(transport.start(t0), None);
        transport.pause(t0);
        assert_eq!(transport.start(t0), None);
        transport.stop();
        assert_eq!(transport.start(t0), Some(2));
    }

    #[test]
    fn test_pause_freezes_clock() {
        let mut transport = Transport::new();
        let t0 = Instant::now();
        transport.start(t0);
        assert!(transport.pause(t0 + Duration::from_secs(2)));
        assert_eq!(transport.current_time(t0 + Duration::from_secs(5)), 2.0);
        assert_eq!(transport.current_time(t0 + Duration::from_secs(50)), 2.0);
    }

    #[test]
    fn test_resume_excludes_paused_interval() {
        let mut transport = Transport::new();
        let t0 = Instant::now();
        transport.start(t0);
        transport.pause(t0 + Duration::from_secs(2));
        assert!(transport.resume(t0 + Duration::from_secs(7)));
        assert_eq!(transport.state(), PlaybackState::Playing);
        assert_eq!(transport.current_time(t0 + Duration::from_secs(7)), 2.0);
        assert_eq!(transport.current_time(t0 + Duration::from_secs(8)), 3.0);
    }

    #[test]
    fn test_pause_and_resume_guards() {
        let mut transport = Transport::new();
        let t0 = Instant::now();
        assert!(!transport.pause(t0));
        assert!(!transport.resume(t0));
        transport.start(t0);
        assert!(!transport.resume(t0));
        assert!(transport.pause(t0));
        assert!(!transport.pause(t0));
    }

    #[test]
    fn test_finish_ignores_stale_run() {
        let mut transport = Transport::new();
        let t0 = Instant::now();
        let first = transport.start(t0).unwrap();
        transport.stop();
        let second = transport.start(t0).unwrap();
        assert!(!transport.finish(first));
        assert_eq!(transport.state(), PlaybackState::Playing);
        assert!(transport.finish(second));
        assert_eq!(transport.state(), PlaybackState::Stopped);
    }
}
