//! Foundation module - Core utilities and types
//!
//! This module provides fundamental utilities used throughout the engine:
//! - Math types and operations
//! - Axis-aligned rectangle geometry
//! - Logging utilities

pub mod aabb;
pub mod logging;
pub mod math;

pub use aabb::Aabb2;
