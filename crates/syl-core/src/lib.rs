//! # syl-core
//!
//! Core types for syllabus lifecycle management.
//!
//! This crate provides the foundational types shared across all syllabus crates:
//! - Entity structs for syllabi, versions, workflow actions, file assets, and
//!   reference data (users, subjects, programs, subscriptions, feedback)
//! - The five-state workflow status lattice and the six fixed roles
//! - The closed transition table mapping `(from, to)` to allowed roles
//! - Narrow repository and blob-store traits consumed by the workflow engine
//! - Cross-cutting error types

pub mod blob;
pub mod entities;
pub mod enums;
pub mod errors;
pub mod identity;
pub mod lattice;
pub mod repository;
pub mod transitions;
