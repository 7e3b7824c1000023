//! Gantry Core
//!
//! Core types for the Gantry distributed job execution system.
//!
//! This crate contains:
//! - Domain types: run status, job payloads, nodes and their log sinks
//! - Protocol types: the messages workers and the Master exchange over TCP

pub mod domain;
pub mod proto;
