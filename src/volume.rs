//! Volume model for the two managed outputs.
//!
//! The primary output follows the knob directly.  The secondary output
//! follows the primary plus a signed offset, except that a muted primary
//! always mutes the secondary.
//!
//! [`target_volume`] is the only place that maps `(volume, offset, role)` to
//! a level; every push to a speaker goes through it.

use core::fmt;

/// Upper bound of a speaker volume (lower bound is 0).
pub const VOLUME_MAX: u8 = 100;
/// Most negative secondary offset.
pub const OFFSET_MIN: i8 = -50;
/// Most positive secondary offset.
pub const OFFSET_MAX: i8 = 50;

/// Which of the two managed outputs a value is meant for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputRole {
    Primary,
    Secondary,
}

impl OutputRole {
    /// Both outputs in push order.
    pub const ALL: [OutputRole; 2] = [OutputRole::Primary, OutputRole::Secondary];
}

impl fmt::Display for OutputRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Primary => write!(f, "primary"),
            Self::Secondary => write!(f, "secondary"),
        }
    }
}

/// Volume to apply to `role` given the primary volume and secondary offset.
///
/// Pure: the result depends on the arguments only.
pub fn target_volume(primary: u8, offset: i8, role: OutputRole) -> u8 {
    let primary = primary.min(VOLUME_MAX);
    match role {
        OutputRole::Primary => primary,
        OutputRole::Secondary if primary == 0 => 0,
        OutputRole::Secondary => {
            (i16::from(primary) + i16::from(offset)).clamp(0, i16::from(VOLUME_MAX)) as u8
        }
    }
}

/// Primary volume plus secondary offset, always within bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VolumeState {
    primary: u8,
    offset: i8,
}

impl VolumeState {
    /// Start from a volume read back from the primary speaker.
    /// Out-of-range input is clamped; the offset starts at 0.
    pub fn new(initial_primary: u8) -> Self {
        Self {
            primary: initial_primary.min(VOLUME_MAX),
            offset: 0,
        }
    }

    pub fn primary(&self) -> u8 {
        self.primary
    }

    pub fn offset(&self) -> i8 {
        self.offset
    }

    /// Move the primary volume by `delta`, clamped to `0..=100`.
    ///
    /// Reaching 0 clears the offset in the same step.
    pub fn nudge_primary(&mut self, delta: i16) -> u8 {
        self.primary = (i16::from(self.primary) + delta).clamp(0, i16::from(VOLUME_MAX)) as u8;
        if self.primary == 0 {
            self.offset = 0;
        }
        self.primary
    }

    /// Move the secondary offset by `delta`, clamped to `-50..=50`.
    pub fn nudge_offset(&mut self, delta: i16) -> i8 {
        self.offset =
            (i16::from(self.offset) + delta).clamp(i16::from(OFFSET_MIN), i16::from(OFFSET_MAX)) as i8;
        self.offset
    }

    /// Level to send to `role` for the current state.
    pub fn target(&self, role: OutputRole) -> u8 {
        target_volume(self.primary, self.offset, role)
    }
}
