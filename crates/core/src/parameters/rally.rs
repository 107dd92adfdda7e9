//! Rally Point Parameter Definitions
//!
//! # Parameters
//!
//! - `RALLY_TOTAL` - Number of stored rally points (**visible in GCS**)
//! - `RALLY_LIMIT_KM` - Maximum distance to a rally point before RTL goes
//!   home instead, 0 disables the check (**visible in GCS**)
//!
//! # ArduPilot Compatibility
//!
//! These parameters match ArduPilot's rally point parameters:
//! - https://ardupilot.org/plane/docs/parameters.html#rally-parameters

use super::error::ParameterError;
use super::storage::{ParamFlags, ParamValue, ParameterStore};

/// Parameter name of the persisted rally point count
pub const RALLY_TOTAL: &str = "RALLY_TOTAL";

/// Parameter name of the rally distance limit
pub const RALLY_LIMIT_KM: &str = "RALLY_LIMIT_KM";

/// Default rally distance limit in kilometers
const DEFAULT_LIMIT_KM: f32 = 5.0;

/// Rally parameters loaded from parameter store
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RallyParams {
    /// Number of valid rally points
    pub total: u8,
    /// Rally distance limit in kilometers (0 = no limit)
    pub limit_km: f32,
}

impl Default for RallyParams {
    fn default() -> Self {
        Self {
            total: 0,
            limit_km: DEFAULT_LIMIT_KM,
        }
    }
}

impl RallyParams {
    /// Register rally parameters with default values
    ///
    /// # Arguments
    ///
    /// * `store` - Parameter store to register parameters in
    pub fn register_defaults(store: &mut ParameterStore) -> Result<(), ParameterError> {
        store.register(RALLY_TOTAL, ParamValue::Int(0), ParamFlags::empty())?;
        store.register(
            RALLY_LIMIT_KM,
            ParamValue::Float(DEFAULT_LIMIT_KM),
            ParamFlags::empty(),
        )?;
        Ok(())
    }

    /// Load rally parameters from parameter store
    ///
    /// Out-of-range values are clamped: the count to `0..=255`, the limit to
    /// a finite non-negative value (anything else disables the limit).
    pub fn from_store(store: &ParameterStore) -> Self {
        let total = match store.get(RALLY_TOTAL) {
            Some(ParamValue::Int(v)) => v.clamp(0, u8::MAX as i32) as u8,
            Some(ParamValue::Float(v)) => v.clamp(0.0, u8::MAX as f32) as u8,
            None => 0,
        };

        let limit_km = match store.get(RALLY_LIMIT_KM) {
            Some(ParamValue::Float(v)) => sanitize_limit(v),
            Some(ParamValue::Int(v)) => sanitize_limit(v as f32),
            None => DEFAULT_LIMIT_KM,
        };

        Self { total, limit_km }
    }

    /// Whether the distance limit is active
    pub fn limit_enabled(&self) -> bool {
        self.limit_km > 0.0
    }

    /// Distance limit in meters, if enabled
    pub fn limit_m(&self) -> Option<f64> {
        self.limit_enabled().then(|| f64::from(self.limit_km) * 1000.0)
    }
}

/// Clamp a configured limit to a usable value
pub(crate) fn sanitize_limit(limit_km: f32) -> f32 {
    if limit_km.is_finite() && limit_km > 0.0 {
        limit_km
    } else {
        0.0
    }
}
