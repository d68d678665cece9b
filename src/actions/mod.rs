//! File actions module.
//!
//! The [`delete`] module removes the files named in a JSON deletion list,
//! either unlinking them or moving them to the system trash.
//!
//! ```no_run
//! use dupfind::actions::{delete_batch, DeleteConfig, DeleteList};
//! use std::path::Path;
//!
//! let list = DeleteList::parse(r#"{"items": ["/tmp/copy.txt"]}"#).unwrap();
//! let result = delete_batch(list.items(), &DeleteConfig::default().with_trash(true));
//! ```

pub mod delete;

// Re-export commonly used types
pub use delete::{
    delete_batch, delete_file, BatchDeleteResult, DeleteConfig, DeleteError, DeleteList,
    DeleteListError, DeleteResult,
};
