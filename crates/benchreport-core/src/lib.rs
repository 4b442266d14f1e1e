pub mod chart;
pub mod config;
pub mod data;
pub mod error;
pub mod merge;
pub mod report;
pub mod stats;

pub use error::ReportError;
