//! Parameter management types
//!
//! This module provides the in-memory parameter store and the rally
//! parameter block. Flash persistence of the store is handled by the
//! platform's parameter saver.

pub mod error;
pub mod rally;
pub mod storage;

pub use error::ParameterError;
pub use rally::{RallyParams, RALLY_LIMIT_KM, RALLY_TOTAL};
pub use storage::{ParamFlags, ParamValue, ParameterStore, MAX_PARAMS, PARAM_NAME_LEN};
