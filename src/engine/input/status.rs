// Per-input edge detection

/// Logical state of a single physical input for the current frame
///
/// Transitions only follow `Up -> Pressed -> Down -> Released -> Up`.
/// `Pressed` and `Released` last exactly one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Status {
    #[default]
    Up,
    Pressed,
    Down,
    Released,
}

impl Status {
    /// True for `Pressed` and `Down`
    pub fn is_engaged(self) -> bool {
        matches!(self, Status::Pressed | Status::Down)
    }
}

/// Advance a status by one frame given the raw sample
pub fn sample(raw_down: bool, previous: Status) -> Status {
    if raw_down {
        match previous {
            Status::Up | Status::Released => Status::Pressed,
            Status::Pressed | Status::Down => Status::Down,
        }
    } else {
        match previous {
            Status::Pressed | Status::Down => Status::Released,
            Status::Up | Status::Released => Status::Up,
        }
    }
}

/// Raw boolean plus the derived frame status for one physical input
///
/// Events only write `raw`; `status` moves once per frame in `advance`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EdgeTracker {
    raw: bool,
    status: Status,
}

impl EdgeTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the latest raw sample (from an event or a poll)
    pub fn set_raw(&mut self, down: bool) {
        self.raw = down;
    }

    pub fn raw(&self) -> bool {
        self.raw
    }

    pub fn status(&self) -> Status {
        self.status
    }

    /// Run the edge transition for this frame
    pub fn advance(&mut self) -> Status {
        self.status = sample(self.raw, self.status);
        self.status
    }

    /// Feed a raw sample and advance in one step
    pub fn feed(&mut self, down: bool) -> Status {
        self.raw = down;
        self.advance()
    }

    /// True when the tracker carries no information worth keeping
    pub fn is_idle(&self) -> bool {
        !self.raw && self.status == Status::Up
    }

    pub fn reset(&mut self) {
        self.raw = false;
        self.status = Status::Up;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edge_sequence() {
        let mut tracker = EdgeTracker::new();
        let samples = [false, true, true, true, false, false];
        let statuses: Vec<Status> = samples.iter().map(|&s| tracker.feed(s)).collect();

        assert_eq!(
            statuses,
            vec![
                Status::Up,
                Status::Pressed,
                Status::Down,
                Status::Down,
                Status::Released,
                Status::Up
            ]
        );
    }

    #[test]
    fn test_sample_from_released() {
        assert_eq!(sample(true, Status::Released), Status::Pressed);
        assert_eq!(sample(false, Status::Released), Status::Up);
    }

    #[test]
    fn test_sample_from_pressed() {
        assert_eq!(sample(true, Status::Pressed), Status::Down);
        assert_eq!(sample(false, Status::Pressed), Status::Released);
    }

    #[test]
    fn test_quick_tap_spans_two_frames() {
        let mut tracker = EdgeTracker::new();
        tracker.set_raw(true);
        assert_eq!(tracker.advance(), Status::Pressed);
        tracker.set_raw(false);
        assert_eq!(tracker.advance(), Status::Released);
        assert_eq!(tracker.advance(), Status::Up);
        assert!(tracker.is_idle());
    }

    #[test]
    fn test_status_is_engaged() {
        assert!(Status::Pressed.is_engaged());
        assert!(Status::Down.is_engaged());
        assert!(!Status::Released.is_engaged());
        assert!(!Status::Up.is_engaged());
    }

    #[test]
    fn test_reset() {
        let mut tracker = EdgeTracker::new();
        tracker.feed(true);
        tracker.reset();
        assert_eq!(tracker.status(), Status::Up);
        assert!(!tracker.raw());
    }
}
