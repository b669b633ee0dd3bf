//! Vault module: the configuration tree and the operations over it.
//!
//! This module provides:
//! - Slash-delimited path helpers (`path`)
//! - The `Vault` tree node and its wire format (`model`)
//! - Non-mutating merge of vault configurations (`merge`)
//! - Path resolution and path enumeration over a tree (`tree`)
//! - The storage boundary and a plain JSON file store (`store`)

pub mod merge;
pub mod model;
pub mod path;
pub mod store;
pub mod tree;

// Re-export the most commonly used items.
pub use merge::{combine_all, merge_from};
pub use model::Vault;
pub use path::{join_path, split_path, validate_var_name, validate_vault_name};
pub use store::{FileStore, Store};
pub use tree::{enumerate_paths, resolve, resolve_path};
