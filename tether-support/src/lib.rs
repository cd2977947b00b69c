//! # Tether Support
//!
//! Shared utilities for the tether object-graph builder.
//!
//! This crate provides:
//! - A parser for struct-tag style dependency metadata (`inject:"db" singleton:"true"`)
//! - Text rendering for error messages and graph trees

pub mod rendering;
pub mod tag;
