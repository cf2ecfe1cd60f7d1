// src/output/mod.rs
pub mod report;
pub mod sink;
