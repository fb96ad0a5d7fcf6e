//! Placement Module
//!
//! Resolves which ads to render for a placement.

mod resolver;


pub use resolver::{
    resolve_general, resolve_placement, PlacementResolver, DEFAULT_LIMIT, UNBOUNDED_LIMIT,
};
