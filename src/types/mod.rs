//! Value types for ACL entries.
//!
//! Wire layout of one entry (little-endian):
//! - bytes 0..2: tag
//! - bytes 2..4: permission, low three bits significant
//! - bytes 4..8: uid/gid qualifier, `0xFFFFFFFF` when unused

mod entry;
mod kind;
mod permission;
mod tag;

pub use entry::{ENTRY_SIZE, Entry, UNDEFINED_ID};
pub use kind::AclKind;
pub use permission::Permission;
pub use tag::{Tag, TagKind};
