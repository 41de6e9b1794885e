//! DAO deployment orchestrator.
//!
//! This module provides:
//! - `core`: DaoDeployer struct and the immutable per-phase context
//! - `contract`: single-contract deploy/send/query primitives
//! - `phases`: bootstrap, factories, extensions, adapters, utils, tests and the pipeline
//! - `access`: DAO and extension access wiring
//! - `offchain`: optional off-chain voting installer
//! - `tests`: Unit tests for the phases

pub mod access;
pub mod contract;
pub mod core;
pub mod offchain;
pub mod phases;

pub use core::{DaoDeployer, DeployContext};
