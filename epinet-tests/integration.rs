//! Integration tests for epinet
//!
//! Exercise the simulator on generated networks and the batch pipeline from
//! sweep configuration to files on disk.

#[path = "integration/generated_networks.rs"]
mod generated_networks;
#[path = "integration/batch_pipeline.rs"]
mod batch_pipeline;
