use std::time::{Duration, Instant};

/// Collapses a burst of viewport resizes into one refit that fires after
/// the size has been stable for `quiet`.
#[derive(Clone, Debug)]
pub struct ResizeDebouncer {
    quiet: Duration,
    pending: Option<((f32, f32), Instant)>,
    settled: Option<(f32, f32)>,
}

impl ResizeDebouncer {
    pub fn new(quiet: Duration) -> Self {
        Self {
            quiet,
            pending: None,
            settled: None,
        }
    }

    /// Record the size seen at `now`. Repeating the settled size is a no-op.
    pub fn note(&mut self, size: (f32, f32), now: Instant) {
        match self.pending {
            Some((pending, _)) if pending == size => {}
            _ if self.pending.is_none() && self.settled == Some(size) => {}
            _ => self.pending = Some((size, now)),
        }
    }

    /// Size to apply, once the quiet period since the last change is over.
    pub fn poll(&mut self, now: Instant) -> Option<(f32, f32)> {
        let (size, since) = self.pending?;
        if now.duration_since(since) < self.quiet {
            return None;
        }
        self.pending = None;
        self.settled = Some(size);
        Some(size)
    }

    /// Time left until a pending resize fires.
    pub fn remaining(&self, now: Instant) -> Option<Duration> {
        self.pending
            .map(|(_, since)| self.quiet.saturating_sub(now.duration_since(since)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const QUIET: Duration = Duration::from_millis(50);

    #[test]
    fn burst_fires_once_with_last_size() {
        let start = Instant::now();
        let mut d = ResizeDebouncer::new(QUIET);
        for (i, w) in [800.0, 810.0, 820.0, 830.0].into_iter().enumerate() {
            d.note((w, 600.0), start + Duration::from_millis(10 * i as u64));
            assert_eq!(d.poll(start + Duration::from_millis(10 * i as u64 + 5)), None);
        }
        let t = start + Duration::from_millis(30);
        assert_eq!(d.poll(t + Duration::from_millis(49)), None);
        assert_eq!(d.poll(t + QUIET), Some((830.0, 600.0)));
        assert_eq!(d.poll(t + QUIET * 3), None);
    }

    #[test]
    fn stable_size_does_not_refire() {
        let start = Instant::now();
        let mut d = ResizeDebouncer::new(QUIET);
        d.note((100.0, 100.0), start);
        assert_eq!(d.poll(start + QUIET), Some((100.0, 100.0)));

        d.note((100.0, 100.0), start + QUIET * 2);
        assert_eq!(d.poll(start + QUIET * 4), None);
        assert_eq!(d.remaining(start + QUIET * 4), None);
    }

    #[test]
    fn unchanged_size_keeps_original_deadline() {
        let start = Instant::now();
        let mut d = ResizeDebouncer::new(QUIET);
        d.note((100.0, 100.0), start);
        d.note((100.0, 100.0), start + Duration::from_millis(40));
        assert_eq!(d.remaining(start + Duration::from_millis(40)), Some(Duration::from_millis(10)));
        assert_eq!(d.poll(start + QUIET), Some((100.0, 100.0)));
    }
}
