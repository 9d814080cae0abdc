//! Duplicate detection module.
//!
//! This module provides functionality for:
//! - Size-based file grouping (Stage A)
//! - Content digest grouping (Stage B)
//! - Keep-oldest selection of removable copies

pub mod groups;
pub mod selector;

pub use groups::{
    group_by_digest, group_by_size, DigestStats, DuplicateGroup, GroupingStats, SizeGroup,
};
pub use selector::{select_removals, RemovalEntry, RemovalPlan};
