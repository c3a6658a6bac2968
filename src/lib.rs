//! Parent report dispatcher: generates per-student performance reports and
//! delivers them through an external notification backend, tracking every
//! single-send attempt in an in-memory log.

pub mod analytics;
pub mod backend;
pub mod config;
pub mod dispatch;
pub mod model;
pub mod report;
pub mod roster;
