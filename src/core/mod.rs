//! Core firmware services shared by all subsystems

pub mod logging;
