// src/lib.rs
pub use acl::{ACL_EA_VERSION, Acl};
pub use error::AclError;
pub use traits::{AttributeStore, StatInfo};
pub use types::{AclKind, ENTRY_SIZE, Entry, Permission, Tag, TagKind, UNDEFINED_ID};

#[cfg(all(unix, feature = "xattr"))]
pub use store::XattrStore;

mod acl;
mod error;
#[cfg(all(unix, feature = "xattr"))]
mod store;
mod traits;
mod types;
