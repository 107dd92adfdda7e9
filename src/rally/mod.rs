//! Rally point integration
//!
//! Wires the core rally table to Flash storage and the parameter store, and
//! logs return-to-launch target decisions.

pub mod flash_storage;

pub use flash_storage::{
    FlashRallyStorage, BANK_HEADER_SIZE, MAX_BLOCK_SIZE, RALLY_FLASH_BASE, RALLY_FLASH_SIZE,
};

use crate::{log_info, log_warn};
use pico_rally_core::navigation::Location;
use pico_rally_core::parameters::{ParameterStore, RallyParams};
use pico_rally_core::rally::{Rally, RallyConfig, RallyError, TargetSource};
use pico_rally_core::traits::{HomeSource, RallyStorage};

/// Rally table stored in Flash
pub type FlashRally<F, H> = Rally<FlashRallyStorage<F>, H>;

/// Build the rally table at boot
///
/// Registers `RALLY_TOTAL` and `RALLY_LIMIT_KM` with their defaults (values
/// already loaded from Flash are kept) and creates the table from them.
pub fn init_rally<S: RallyStorage, H: HomeSource>(
    storage: S,
    home: H,
    config: RallyConfig,
    store: &mut ParameterStore,
) -> Result<Rally<S, H>, RallyError> {
    RallyParams::register_defaults(store)?;
    let params = RallyParams::from_store(store);

    let rally = Rally::new(storage, home, config, params)?;

    if params.total > rally.total() {
        log_warn!(
            "Rally: stored count {} exceeds capacity {}, clamped",
            params.total,
            rally.capacity()
        );
    }
    log_info!(
        "Rally: {} of {} points, limit {} km",
        rally.total(),
        rally.capacity(),
        rally.limit_km()
    );

    Ok(rally)
}

/// Return-to-launch target for the current position
///
/// Same as `Rally::best_location`, with the decision logged.
pub fn select_rtl_target<S: RallyStorage, H: HomeSource>(
    rally: &mut Rally<S, H>,
    current: &Location,
    rtl_home_alt: f32,
) -> Location {
    let target = rally.select_target(current, rtl_home_alt);

    match target.source {
        TargetSource::Rally { index, distance_m } => {
            log_info!("RTL: rally point {} at {} m", index, distance_m);
        }
        TargetSource::HomeNoRallyPoints => {
            log_info!("RTL: no rally points, returning home");
        }
        TargetSource::HomeBeyondLimit { index, distance_m } => {
            log_info!(
                "RTL: rally point {} at {} m beyond {} km limit, returning home",
                index,
                distance_m,
                rally.limit_km()
            );
        }
    }

    target.location
}
