//! Core domain models.
//!
//! This module contains the task record and the lifecycle rules applied to it.

pub mod tasks;

pub use tasks::*;
