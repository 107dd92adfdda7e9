//! Parameter Store
//!
//! In-memory name/value table for GCS-visible configuration. Persisting the
//! table is the job of the platform's parameter saver, which watches the
//! dirty flag.

use super::error::ParameterError;
use bitflags::bitflags;
use heapless::index_map::FnvIndexMap;
use heapless::String;

/// Maximum parameter name length (MAVLink PARAM_ID)
pub const PARAM_NAME_LEN: usize = 16;

/// Maximum number of parameters (must be a power of two)
pub const MAX_PARAMS: usize = 16;

bitflags! {
    /// Parameter flags
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ParamFlags: u8 {
        /// Parameter is read-only (cannot be modified via MAVLink)
        const READ_ONLY = 0b00000001;
    }
}

/// Parameter value types
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParamValue {
    /// 32-bit signed integer
    Int(i32),
    /// 32-bit floating point
    Float(f32),
}

#[derive(Debug, Clone, Copy)]
struct ParamEntry {
    value: ParamValue,
    flags: ParamFlags,
}

/// Parameter store for configuration management
pub struct ParameterStore {
    entries: FnvIndexMap<String<PARAM_NAME_LEN>, ParamEntry, MAX_PARAMS>,
    /// Dirty flag (needs Flash write)
    dirty: bool,
}

impl ParameterStore {
    /// Create a new empty parameter store
    pub fn new() -> Self {
        Self {
            entries: FnvIndexMap::new(),
            dirty: false,
        }
    }

    fn key(name: &str) -> Result<String<PARAM_NAME_LEN>, ParameterError> {
        let mut key = String::new();
        key.push_str(name)
            .map_err(|_| ParameterError::InvalidConfig)?;
        Ok(key)
    }

    /// Get parameter value
    pub fn get(&self, name: &str) -> Option<ParamValue> {
        let key = Self::key(name).ok()?;
        self.entries.get(&key).map(|entry| entry.value)
    }

    /// Set parameter value
    ///
    /// The parameter must already be registered. Marks the store as dirty.
    pub fn set(&mut self, name: &str, value: ParamValue) -> Result<(), ParameterError> {
        let key = Self::key(name)?;
        let entry = self
            .entries
            .get_mut(&key)
            .ok_or(ParameterError::InvalidConfig)?;

        if entry.flags.contains(ParamFlags::READ_ONLY) {
            return Err(ParameterError::ReadOnly);
        }

        entry.value = value;
        self.dirty = true;
        Ok(())
    }

    /// Register a new parameter with default value and flags
    ///
    /// If the parameter already exists, this is a no-op (idempotent), so
    /// values restored from Flash before registration are kept.
    pub fn register(
        &mut self,
        name: &str,
        default_value: ParamValue,
        flags: ParamFlags,
    ) -> Result<(), ParameterError> {
        let key = Self::key(name)?;
        if self.entries.contains_key(&key) {
            return Ok(());
        }

        self.entries
            .insert(
                key,
                ParamEntry {
                    value: default_value,
                    flags,
                },
            )
            .map_err(|_| ParameterError::StoreFull)?;
        self.dirty = true;
        Ok(())
    }

    /// Check if store has unsaved changes
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Clear dirty flag (called after successful flash save)
    pub fn clear_dirty(&mut self) {
        self.dirty = false;
    }

    /// Number of registered parameters
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the store is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for ParameterStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parameter_store_new() {
        let store = ParameterStore::new();
        assert!(store.is_empty());
        assert!(!store.is_dirty());
    }

    #[test]
    fn test_parameter_store_register_and_get() {
        let mut store = ParameterStore::new();
        store
            .register("TEST", ParamValue::Int(42), ParamFlags::empty())
            .unwrap();
        assert_eq!(store.get("TEST"), Some(ParamValue::Int(42)));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_parameter_store_set() {
        let mut store = ParameterStore::new();
        store
            .register("TEST", ParamValue::Float(1.5), ParamFlags::empty())
            .unwrap();
        store.clear_dirty();

        store.set("TEST", ParamValue::Float(2.5)).unwrap();
        assert_eq!(store.get("TEST"), Some(ParamValue::Float(2.5)));
        assert!(store.is_dirty());
    }

    #[test]
    fn test_parameter_store_set_unknown() {
        let mut store = ParameterStore::new();
        assert_eq!(
            store.set("UNKNOWN", ParamValue::Int(1)),
            Err(ParameterError::InvalidConfig)
        );
    }

    #[test]
    fn test_parameter_store_name_too_long() {
        let mut store = ParameterStore::new();
        assert_eq!(
            store.register(
                "THIS_NAME_IS_TOO_LONG",
                ParamValue::Int(0),
                ParamFlags::empty()
            ),
            Err(ParameterError::InvalidConfig)
        );
        assert_eq!(store.get("THIS_NAME_IS_TOO_LONG"), None);
    }

    #[test]
    fn test_parameter_store_register_idempotent() {
        let mut store = ParameterStore::new();
        store
            .register("TEST", ParamValue::Int(42), ParamFlags::empty())
            .unwrap();
        store.set("TEST", ParamValue::Int(100)).unwrap();
        // Re-register should not overwrite
        store
            .register("TEST", ParamValue::Int(42), ParamFlags::empty())
            .unwrap();
        assert_eq!(store.get("TEST"), Some(ParamValue::Int(100)));
    }

    #[test]
    fn test_parameter_read_only() {
        let mut store = ParameterStore::new();
        store
            .register("READONLY", ParamValue::Int(42), ParamFlags::READ_ONLY)
            .unwrap();
        assert_eq!(
            store.set("READONLY", ParamValue::Int(100)),
            Err(ParameterError::ReadOnly)
        );
        assert_eq!(store.get("READONLY"), Some(ParamValue::Int(42)));
    }

    #[test]
    fn test_parameter_store_full() {
        let mut store = ParameterStore::new();
        let names = [
            "P0", "P1", "P2", "P3", "P4", "P5", "P6", "P7", "P8", "P9", "P10", "P11", "P12",
            "P13", "P14", "P15",
        ];
        for name in names {
            store
                .register(name, ParamValue::Int(0), ParamFlags::empty())
                .unwrap();
        }
        assert_eq!(
            store.register("P16", ParamValue::Int(0), ParamFlags::empty()),
            Err(ParameterError::StoreFull)
        );
    }
}
