// Joystick state, calibration and axis direction tracking

use super::status::{EdgeTracker, Status};
use log::{debug, info};

/// Maximum number of joysticks tracked at once
pub const JOYSTICK_COUNT: usize = 8;

/// Maximum number of buttons per joystick
pub const BUTTON_COUNT: usize = 32;

/// Raw axis positions are reported in `-AXIS_RANGE..=AXIS_RANGE`
pub const AXIS_RANGE: f32 = 100.0;

/// Default magnitude under which an axis is considered idle
pub const DEFAULT_DEAD_ZONE: f32 = 10.0;

/// Default magnitude above which an axis direction counts as pushed
pub const DEFAULT_AXIS_THRESHOLD: f32 = 50.0;

/// Physical joystick axes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum JoystickAxis {
    X,
    Y,
    Z,
    R,
    U,
    V,
    PovX,
    PovY,
}

impl JoystickAxis {
    pub const ALL: [JoystickAxis; 8] = [
        JoystickAxis::X,
        JoystickAxis::Y,
        JoystickAxis::Z,
        JoystickAxis::R,
        JoystickAxis::U,
        JoystickAxis::V,
        JoystickAxis::PovX,
        JoystickAxis::PovY,
    ];

    pub const COUNT: usize = Self::ALL.len();

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::X => "X",
            Self::Y => "Y",
            Self::Z => "Z",
            Self::R => "R",
            Self::U => "U",
            Self::V => "V",
            Self::PovX => "PovX",
            Self::PovY => "PovY",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|axis| axis.name() == name)
    }
}

/// Which part of an axis a bind listens to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AxisDirection {
    Positive,
    Negative,
    Full,
}

impl AxisDirection {
    pub const ALL: [AxisDirection; 3] = [
        AxisDirection::Positive,
        AxisDirection::Negative,
        AxisDirection::Full,
    ];

    fn index(self) -> usize {
        self as usize
    }

    /// Whether an effective value counts as pushed in this direction
    pub fn is_engaged(self, effective: f32, threshold: f32) -> bool {
        match self {
            Self::Positive => effective >= threshold,
            Self::Negative => effective <= -threshold,
            Self::Full => effective.abs() >= threshold,
        }
    }

    /// Direction a deflection points to
    pub fn of(effective: f32) -> Self {
        if effective < 0.0 {
            Self::Negative
        } else {
            Self::Positive
        }
    }
}

/// Identification supplied by the device enumerator on connect
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct JoystickInfo {
    pub name: String,
    pub vendor_id: u32,
    pub product_id: u32,
    pub button_count: u8,
    pub axis_count: u8,
}

impl JoystickInfo {
    /// Same physical product (calibration stays valid)
    pub fn same_product(&self, other: &JoystickInfo) -> bool {
        self.vendor_id == other.vendor_id && self.product_id == other.product_id
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct AxisState {
    /// Latest raw position
    raw: Option<f32>,
    /// Idle position, captured on the first sample
    baseline: Option<f32>,
    directions: [EdgeTracker; 3],
}

impl AxisState {
    fn effective(&self) -> f32 {
        match (self.raw, self.baseline) {
            (Some(raw), Some(baseline)) => raw - baseline,
            _ => 0.0,
        }
    }
}

/// Everything known about one joystick slot
#[derive(Debug, Clone)]
pub struct JoystickState {
    id: usize,
    info: Option<JoystickInfo>,
    connected: bool,
    dead_zone: f32,
    threshold: f32,
    buttons: [EdgeTracker; BUTTON_COUNT],
    axes: [AxisState; JoystickAxis::COUNT],
}

impl JoystickState {
    /// Empty, disconnected slot
    pub fn new(id: usize) -> Self {
        Self {
            id,
            info: None,
            connected: false,
            dead_zone: DEFAULT_DEAD_ZONE,
            threshold: DEFAULT_AXIS_THRESHOLD,
            buttons: [EdgeTracker::new(); BUTTON_COUNT],
            axes: [AxisState::default(); JoystickAxis::COUNT],
        }
    }

    /// Slot index
    pub fn id(&self) -> usize {
        self.id
    }

    /// Handle a connect notification
    ///
    /// Reconnecting the same product keeps the calibration; a different
    /// product replaces the identification and recalibrates lazily.
    pub fn connect(&mut self, info: JoystickInfo) {
        let same = self
            .info
            .as_ref()
            .is_some_and(|current| current.same_product(&info));

        if !same {
            for axis in &mut self.axes {
                axis.baseline = None;
            }
        }

        info!("Joystick connected - {} (ID : {})", info.name, self.id);
        self.info = Some(info);
        self.connected = true;
        self.reset_trackers();
    }

    /// Handle a disconnect notification, keeping calibration
    pub fn disconnect(&mut self) {
        if self.connected {
            info!("Joystick disconnected - {} (ID : {})", self.name(), self.id);
        }
        self.connected = false;
        self.reset_trackers();
    }

    /// Whether a device currently sits in this slot
    pub fn is_connected(&self) -> bool {
        self.connected
    }

    /// Identification of the last device seen in this slot
    pub fn info(&self) -> Option<&JoystickInfo> {
        self.info.as_ref()
    }

    /// Device name, empty when never connected
    pub fn name(&self) -> &str {
        self.info.as_ref().map(|i| i.name.as_str()).unwrap_or("")
    }

    /// Buttons the device reports, 0 when unknown
    pub fn button_count(&self) -> u8 {
        self.info.as_ref().map(|i| i.button_count).unwrap_or(0)
    }

    /// Axes the device reports, 0 when unknown
    pub fn axis_count(&self) -> u8 {
        self.info.as_ref().map(|i| i.axis_count).unwrap_or(0)
    }

    /// Distance from the baseline treated as idle
    pub fn dead_zone(&self) -> f32 {
        self.dead_zone
    }

    /// Sign is ignored
    pub fn set_dead_zone(&mut self, dead_zone: f32) {
        self.dead_zone = dead_zone.abs();
    }

    /// Distance from the baseline an axis must reach to count as pushed
    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    /// Sign is ignored
    pub fn set_threshold(&mut self, threshold: f32) {
        self.threshold = threshold.abs();
    }

    /// Record a raw button sample
    pub fn set_button(&mut self, button: usize, down: bool) {
        if let Some(tracker) = self.buttons.get_mut(button) {
            tracker.set_raw(down);
        }
    }

    /// `Up` for buttons outside the tracked range
    pub fn button_status(&self, button: usize) -> Status {
        self.buttons
            .get(button)
            .map(EdgeTracker::status)
            .unwrap_or(Status::Up)
    }

    /// Capture the idle value of an axis if none is recorded yet
    pub fn calibrate(&mut self, axis: JoystickAxis, raw: f32) {
        let state = &mut self.axes[axis.index()];
        if state.baseline.is_none() {
            state.baseline = Some(raw);
            debug!(
                " > Joystick {} axis {} default value : {}",
                self.id,
                axis.name(),
                raw
            );
        }
    }

    /// Record a raw axis sample, calibrating on first sight
    pub fn set_axis(&mut self, axis: JoystickAxis, raw: f32) {
        self.calibrate(axis, raw);
        self.axes[axis.index()].raw = Some(raw);
    }

    /// Idle position, `None` until the axis is first sampled
    pub fn baseline(&self, axis: JoystickAxis) -> Option<f32> {
        self.axes[axis.index()].baseline
    }

    /// Latest raw sample, 0 before any
    pub fn raw_axis(&self, axis: JoystickAxis) -> f32 {
        self.axes[axis.index()].raw.unwrap_or(0.0)
    }

    /// Position relative to the calibrated baseline
    pub fn effective_axis(&self, axis: JoystickAxis) -> f32 {
        self.axes[axis.index()].effective()
    }

    /// Effective value a raw sample would produce, without recording it
    pub fn effective_for(&self, axis: JoystickAxis, raw: f32) -> f32 {
        raw - self.baseline(axis).unwrap_or(raw)
    }

    /// Effective value, or zero inside the dead zone
    pub fn live_axis(&self, axis: JoystickAxis) -> f32 {
        let effective = self.effective_axis(axis);
        if effective.abs() <= self.dead_zone {
            0.0
        } else {
            effective
        }
    }

    /// Whether the axis sits inside the dead zone
    pub fn axis_stopped(&self, axis: JoystickAxis) -> bool {
        self.live_axis(axis) == 0.0
    }

    /// Edge status of one direction of an axis
    pub fn axis_status(&self, axis: JoystickAxis, direction: AxisDirection) -> Status {
        self.axes[axis.index()].directions[direction.index()].status()
    }

    /// Whether any button was pressed this frame
    pub fn any_button_pressed(&self) -> bool {
        self.buttons.iter().any(|b| b.status() == Status::Pressed)
    }

    /// Whether any axis sits outside the dead zone
    pub fn any_axis_moved(&self) -> bool {
        JoystickAxis::ALL.into_iter().any(|a| !self.axis_stopped(a))
    }

    /// First button pressed this frame
    pub fn first_pressed_button(&self) -> Option<usize> {
        self.buttons.iter().position(|b| b.status() == Status::Pressed)
    }

    /// Run one frame of edge detection for buttons and axis directions
    pub fn update(&mut self) {
        if !self.connected {
            return;
        }

        for button in &mut self.buttons {
            button.advance();
        }

        let dead_zone = self.dead_zone;
        let threshold = self.threshold;
        for axis in &mut self.axes {
            let effective = axis.effective();
            let idle = effective.abs() <= dead_zone;
            for direction in AxisDirection::ALL {
                let engaged = !idle && direction.is_engaged(effective, threshold);
                axis.directions[direction.index()].feed(engaged);
            }
        }
    }

    /// Forget held buttons and raw samples, keeping baselines
    pub fn reset_trackers(&mut self) {
        for button in &mut self.buttons {
            button.reset();
        }
        for axis in &mut self.axes {
            axis.raw = None;
            for direction in &mut axis.directions {
                direction.reset();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn pad() -> JoystickInfo {
        JoystickInfo {
            name: "Test Pad".to_string(),
            vendor_id: 0x045e,
            product_id: 0x028e,
            button_count: 12,
            axis_count: 6,
        }
    }

    fn connected() -> JoystickState {
        let mut joystick = JoystickState::new(0);
        joystick.connect(pad());
        joystick
    }

    #[test]
    fn test_axis_names() {
        for axis in JoystickAxis::ALL {
            assert_eq!(JoystickAxis::from_name(axis.name()), Some(axis));
        }
        assert_eq!(JoystickAxis::from_name("W"), None);
    }

    #[test]
    fn test_first_sample_becomes_baseline() {
        let mut joystick = connected();
        joystick.set_axis(JoystickAxis::Z, -100.0);
        assert_eq!(joystick.baseline(JoystickAxis::Z), Some(-100.0));
        assert_relative_eq!(joystick.effective_axis(JoystickAxis::Z), 0.0);

        joystick.set_axis(JoystickAxis::Z, -40.0);
        assert_relative_eq!(joystick.effective_axis(JoystickAxis::Z), 60.0);
    }

    #[test]
    fn test_dead_zone_reports_up_everywhere() {
        let mut joystick = connected();
        joystick.set_axis(JoystickAxis::X, 0.0);
        for raw in [5.0, -9.0, 10.0, -10.0, 0.0] {
            joystick.set_axis(JoystickAxis::X, raw);
            joystick.update();
            for direction in AxisDirection::ALL {
                assert_eq!(joystick.axis_status(JoystickAxis::X, direction), Status::Up);
            }
        }
    }

    #[test]
    fn test_positive_push_edges() {
        let mut joystick = connected();
        joystick.set_axis(JoystickAxis::X, 0.0);
        joystick.update();

        joystick.set_axis(JoystickAxis::X, DEFAULT_AXIS_THRESHOLD + 0.5);
        joystick.update();
        assert_eq!(
            joystick.axis_status(JoystickAxis::X, AxisDirection::Positive),
            Status::Pressed
        );
        assert_eq!(
            joystick.axis_status(JoystickAxis::X, AxisDirection::Full),
            Status::Pressed
        );
        assert_eq!(
            joystick.axis_status(JoystickAxis::X, AxisDirection::Negative),
            Status::Up
        );

        joystick.update();
        assert_eq!(
            joystick.axis_status(JoystickAxis::X, AxisDirection::Positive),
            Status::Down
        );
        assert_eq!(
            joystick.axis_status(JoystickAxis::X, AxisDirection::Negative),
            Status::Up
        );
    }

    #[test]
    fn test_between_dead_zone_and_threshold_is_not_engaged() {
        let mut joystick = connected();
        joystick.set_axis(JoystickAxis::Y, 0.0);
        joystick.set_axis(JoystickAxis::Y, -30.0);
        joystick.update();
        assert_eq!(
            joystick.axis_status(JoystickAxis::Y, AxisDirection::Negative),
            Status::Up
        );
        assert!(!joystick.axis_stopped(JoystickAxis::Y));
    }

    #[test]
    fn test_button_edges() {
        let mut joystick = connected();
        joystick.set_button(3, true);
        joystick.update();
        assert_eq!(joystick.button_status(3), Status::Pressed);
        assert_eq!(joystick.first_pressed_button(), Some(3));
        joystick.set_button(3, false);
        joystick.update();
        assert_eq!(joystick.button_status(3), Status::Released);
    }

    #[test]
    fn test_out_of_range_button_ignored() {
        let mut joystick = connected();
        joystick.set_button(BUTTON_COUNT + 4, true);
        assert_eq!(joystick.button_status(BUTTON_COUNT + 4), Status::Up);
    }

    #[test]
    fn test_reconnect_same_product_keeps_calibration() {
        let mut joystick = connected();
        joystick.set_axis(JoystickAxis::Z, -100.0);
        joystick.disconnect();
        joystick.connect(pad());
        assert_eq!(joystick.baseline(JoystickAxis::Z), Some(-100.0));
    }

    #[test]
    fn test_reconnect_other_product_recalibrates() {
        let mut joystick = connected();
        joystick.set_axis(JoystickAxis::Z, -100.0);
        joystick.disconnect();
        joystick.connect(JoystickInfo {
            product_id: 0x1234,
            ..pad()
        });
        assert_eq!(joystick.baseline(JoystickAxis::Z), None);
        assert_eq!(joystick.info().map(|i| i.product_id), Some(0x1234));
    }

    #[test]
    fn test_disconnected_joystick_does_not_update() {
        let mut joystick = JoystickState::new(1);
        joystick.set_button(0, true);
        joystick.update();
        assert_eq!(joystick.button_status(0), Status::Up);
    }
}
