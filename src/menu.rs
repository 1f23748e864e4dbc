//! Fixed on-device menu.
//!
//! The menu is a compile-time table; the cursor never wraps.

use core::fmt;

/// One entry of the menu, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuItem {
    PlayPause,
    Stations,
    Unassigned,
    /// Leaves the menu without doing anything.
    Exit,
}

impl MenuItem {
    /// Number of entries in the menu.
    pub const COUNT: usize = 4;

    /// All entries in display order.
    pub const ALL: [MenuItem; Self::COUNT] = [
        MenuItem::PlayPause,
        MenuItem::Stations,
        MenuItem::Unassigned,
        MenuItem::Exit,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::PlayPause => "Play/Pause",
            Self::Stations => "Stations",
            Self::Unassigned => "None",
            Self::Exit => "Exit",
        }
    }

    /// Whether selecting this entry has a side effect.
    pub fn is_action(self) -> bool {
        self != Self::Exit
    }
}

impl fmt::Display for MenuItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Index of the highlighted entry, always in `0..MenuItem::COUNT`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MenuCursor {
    index: usize,
}

impl MenuCursor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn selected(&self) -> MenuItem {
        MenuItem::ALL[self.index]
    }

    /// Move by `delta` rows, stopping at the first and last entry.
    pub fn step(&mut self, delta: i8) {
        let last = (MenuItem::COUNT - 1) as isize;
        self.index = (self.index as isize + isize::from(delta)).clamp(0, last) as usize;
    }

    pub fn reset(&mut self) {
        self.index = 0;
    }
}
