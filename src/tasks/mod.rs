//! Background Tasks Module
//!
//! Contains the background tasks spawned by the tracking components.
//!
//! # Tasks
//! - Debounce timer: fires once after a quiet period unless re-armed

mod debounce;

pub use debounce::spawn_debounce_timer;
