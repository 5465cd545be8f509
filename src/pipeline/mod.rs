// Batch pipeline: artifact handling, per-stage transforms, and local blob stores

pub mod artifact;
pub mod processing;
pub mod storage;
pub mod stages;
