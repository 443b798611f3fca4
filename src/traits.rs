use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::types::AclKind;

/// Ownership and mode bits of a filesystem object, as reported by `stat(2)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatInfo {
    pub uid: u32,
    pub gid: u32,
    /// Permission bits; anything above `0o777` is ignored.
    pub mode: u32,
}

/// Storage for the raw ACL extended attributes of filesystem objects.
///
/// Implementations only move bytes; encoding and decoding happen in
/// [`Acl`](crate::Acl). Errors are handed back to the caller untouched.
pub trait AttributeStore {
    /// Read the payload stored under `kind`. `Ok(None)` means the object has
    /// no such attribute, which callers treat differently from a failure.
    fn read(&self, path: &Path, kind: AclKind) -> io::Result<Option<Vec<u8>>>;

    /// Replace the payload stored under `kind`.
    fn write(&self, path: &Path, kind: AclKind, value: &[u8]) -> io::Result<()>;

    /// Owner, group and mode of `path`, used when no ACL attribute exists.
    fn stat(&self, path: &Path) -> io::Result<StatInfo>;
}
