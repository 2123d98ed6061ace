//! Domain models for the diagnosis service.

pub mod diagnosis;

pub use diagnosis::DiagnosisReport;
