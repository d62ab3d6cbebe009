//! HTTP handlers for all web routes.

pub mod predict;
pub mod predictions;
pub mod statistics;
pub mod system;
