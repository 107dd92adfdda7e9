//! Home position accessor.
//!
//! The rally selector only ever reads home; it never owns or updates it.
//! The attitude/position subsystem that tracks home implements
//! `HomeSource`.

use core::cell::Cell;

use crate::navigation::Location;

/// Read access to the vehicle's current absolute home position
pub trait HomeSource {
    /// Current home location (absolute altitude in meters)
    fn home_location(&self) -> Location;
}

impl<T: HomeSource + ?Sized> HomeSource for &T {
    fn home_location(&self) -> Location {
        (**self).home_location()
    }
}

impl HomeSource for fn() -> Location {
    fn home_location(&self) -> Location {
        self()
    }
}

// ============================================================================
// Mock Implementation (always available for testing)
// ============================================================================

/// Home source with a settable position.
///
/// # Example
///
/// ```
/// use pico_rally_core::navigation::Location;
/// use pico_rally_core::traits::{HomeSource, MockHome};
///
/// let home = MockHome::new(Location::new(350000000, 1390000000, 100.0));
/// assert_eq!(home.home_location().alt, 100.0);
///
/// home.set(Location::new(350000000, 1390000000, 12.5));
/// assert_eq!(home.home_location().alt, 12.5);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MockHome {
    home: Cell<Location>,
}

impl MockHome {
    /// Create a mock home at `home`
    pub fn new(home: Location) -> Self {
        Self {
            home: Cell::new(home),
        }
    }

    /// Move home (e.g. re-arming at a new site)
    pub fn set(&self, home: Location) {
        self.home.set(home);
    }
}

impl HomeSource for MockHome {
    fn home_location(&self) -> Location {
        self.home.get()
    }
}
