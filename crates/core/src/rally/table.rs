//! Rally point table
//!
//! Fixed-capacity array of packed records inside a persistent region.
//! Records are addressed by slot index; slot `i` lives at
//! `start_byte + i * RALLY_WP_SIZE`. Nothing is cached: every `get` reads the
//! medium and every `set` writes it.
//!
//! The number of valid slots is the `RALLY_TOTAL` parameter, persisted
//! separately from the slot array. Adding a point is two independent writes:
//! `set(total, point)` then `set_total(total + 1)`.

use super::error::RallyError;
use super::location::{RallyLocation, RALLY_WP_SIZE};
use crate::parameters::rally::sanitize_limit;
use crate::parameters::{ParamValue, ParameterStore, RallyParams, RALLY_LIMIT_KM, RALLY_TOTAL};
use crate::traits::{HomeSource, RallyStorage};

/// Hard ceiling on rally table capacity
pub const MAX_RALLY_POINTS: u8 = 100;

/// Construction-time rally table configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RallyConfig {
    /// Requested number of slots (further bounded by region size and
    /// `MAX_RALLY_POINTS`)
    pub max_points: u8,
    /// Offset of slot 0 within the storage region
    pub start_byte: u32,
}

impl Default for RallyConfig {
    fn default() -> Self {
        Self {
            max_points: 10,
            start_byte: 0,
        }
    }
}

/// Rally point table with nearest-point selection
///
/// Owns the storage region and a home source. All calls are synchronous and
/// expect a single caller; storage access needs `&mut self`.
pub struct Rally<S: RallyStorage, H: HomeSource> {
    pub(super) storage: S,
    pub(super) home: H,
    capacity: u8,
    start_byte: u32,
    pub(super) params: RallyParams,
}

impl<S: RallyStorage, H: HomeSource> Rally<S, H> {
    /// Create a rally table over `storage`
    ///
    /// Capacity is the smallest of `config.max_points`, the number of whole
    /// slots between `start_byte` and the end of the region, and
    /// `MAX_RALLY_POINTS`. A persisted count larger than the capacity is
    /// clamped.
    ///
    /// # Errors
    ///
    /// Returns `RallyError::InvalidConfig` if `start_byte` lies beyond the
    /// storage region.
    pub fn new(
        storage: S,
        home: H,
        config: RallyConfig,
        params: RallyParams,
    ) -> Result<Self, RallyError> {
        let size = storage.size();
        if config.start_byte > size {
            return Err(RallyError::InvalidConfig);
        }

        let slots = (size - config.start_byte) / RALLY_WP_SIZE as u32;
        let capacity = slots
            .min(u32::from(config.max_points))
            .min(u32::from(MAX_RALLY_POINTS)) as u8;

        let mut rally = Self {
            storage,
            home,
            capacity,
            start_byte: config.start_byte,
            params: RallyParams::default(),
        };
        rally.apply_params(params);
        Ok(rally)
    }

    /// Number of slots in the table
    pub fn capacity(&self) -> u8 {
        self.capacity
    }

    /// Number of valid rally points
    pub fn total(&self) -> u8 {
        self.params.total
    }

    /// Rally distance limit in kilometers (0 = no limit)
    pub fn limit_km(&self) -> f32 {
        self.params.limit_km
    }

    /// Currently applied rally parameters
    pub fn params(&self) -> &RallyParams {
        &self.params
    }

    /// Storage region
    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Home source
    pub fn home(&self) -> &H {
        &self.home
    }

    fn slot_offset(&self, index: u8) -> u32 {
        self.start_byte + u32::from(index) * RALLY_WP_SIZE as u32
    }

    /// Read the rally point at `index`
    ///
    /// # Errors
    ///
    /// - `IndexOutOfRange` if `index >= total()`, even when the slot exists
    /// - `Storage` if the medium read fails
    pub fn get(&mut self, index: u8) -> Result<RallyLocation, RallyError> {
        if index >= self.total() {
            return Err(RallyError::IndexOutOfRange {
                index,
                limit: self.total(),
            });
        }

        let mut buf = [0u8; RALLY_WP_SIZE];
        self.storage.read(self.slot_offset(index), &mut buf)?;
        Ok(RallyLocation::from_bytes(&buf))
    }

    /// Write `rally` into slot `index`
    ///
    /// Any slot below capacity may be written; `total()` is not changed.
    ///
    /// # Errors
    ///
    /// - `IndexOutOfRange` if `index >= capacity()`
    /// - `Storage` if the medium write fails
    pub fn set(&mut self, index: u8, rally: &RallyLocation) -> Result<(), RallyError> {
        if index >= self.capacity {
            return Err(RallyError::IndexOutOfRange {
                index,
                limit: self.capacity,
            });
        }

        self.storage.write(self.slot_offset(index), &rally.to_bytes())?;
        Ok(())
    }

    /// Update the number of valid rally points
    ///
    /// Writes `RALLY_TOTAL` to `store`; the table only changes once the
    /// store accepted it.
    pub fn set_total(&mut self, total: u8, store: &mut ParameterStore) -> Result<(), RallyError> {
        if total > self.capacity {
            return Err(RallyError::TotalExceedsCapacity {
                total,
                capacity: self.capacity,
            });
        }

        store.set(RALLY_TOTAL, ParamValue::Int(i32::from(total)))?;
        self.params.total = total;
        Ok(())
    }

    /// Store `rally` in the next free slot and count it
    ///
    /// Returns the slot index used.
    pub fn append(
        &mut self,
        rally: &RallyLocation,
        store: &mut ParameterStore,
    ) -> Result<u8, RallyError> {
        let index = self.total();
        self.set(index, rally)?;
        self.set_total(index + 1, store)?;
        Ok(index)
    }

    /// Forget all rally points
    ///
    /// Slot contents stay on the medium until overwritten.
    pub fn clear(&mut self, store: &mut ParameterStore) -> Result<(), RallyError> {
        self.set_total(0, store)
    }

    /// Update the rally distance limit
    ///
    /// # Errors
    ///
    /// `InvalidConfig` for negative or non-finite values.
    pub fn set_limit_km(
        &mut self,
        limit_km: f32,
        store: &mut ParameterStore,
    ) -> Result<(), RallyError> {
        if !limit_km.is_finite() || limit_km < 0.0 {
            return Err(RallyError::InvalidConfig);
        }

        store.set(RALLY_LIMIT_KM, ParamValue::Float(limit_km))?;
        self.params.limit_km = limit_km;
        Ok(())
    }

    /// Re-read rally parameters after they changed in the store
    /// (e.g. a GCS PARAM_SET)
    pub fn reload_params(&mut self, store: &ParameterStore) {
        self.apply_params(RallyParams::from_store(store));
    }

    fn apply_params(&mut self, params: RallyParams) {
        self.params = RallyParams {
            total: params.total.min(self.capacity),
            limit_km: sanitize_limit(params.limit_km),
        };
    }
}
