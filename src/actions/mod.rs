//! File actions module.
//!
//! The delete module removes planned copies with:
//! - Move to system trash (default, recoverable)
//! - Permanent deletion (explicit mode)
//! - Verification against the scan before each deletion
//!
//! ```no_run
//! use dupsweep::actions::delete::{delete_file, DeletionMode};
//! use std::path::Path;
//!
//! let result = delete_file(Path::new("/path/to/duplicate.txt"), DeletionMode::Recoverable);
//! ```

pub mod delete;

pub use delete::{
    delete_file, delete_to_trash, permanent_delete, remove_planned, verify_entry, DeleteConfig,
    DeleteError, DeleteResult, DeletionMode, RemovalOutcome,
};
