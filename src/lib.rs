//! Replicated Key-Value Store Library
//!
//! This library crate defines the core modules of the cluster. It serves as
//! the foundation for the binary executable (`main.rs`), which runs either
//! node role.
//!
//! ## Architecture Modules
//! The system is composed of two node roles plus shared plumbing:
//!
//! - **`controller`**: The cluster coordination layer. Owns the worker
//!   registry, the deterministic partition mapping, the heartbeat-driven
//!   failure detector, and the recovery dispatcher that restores the
//!   replication factor after a worker goes down.
//! - **`worker`**: The storage layer. Each worker keeps a durable
//!   file-per-key store, coordinates quorum writes with asynchronous tail
//!   replication, receives replica pushes, answers pull instructions, and
//!   heartbeats the controller.
//! - **`config`**, **`error`**, **`net`**: environment configuration, the
//!   shared error taxonomy, and retrying outbound HTTP helpers.

pub mod config;
pub mod controller;
pub mod error;
pub mod net;
pub mod worker;
