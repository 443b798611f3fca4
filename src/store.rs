//! Filesystem-backed [`AttributeStore`] built on the `xattr` crate.

use std::io;
use std::os::unix::fs::MetadataExt;
use std::path::Path;

use crate::traits::{AttributeStore, StatInfo};
use crate::types::AclKind;

/// Reads and writes `system.posix_acl_*` attributes directly on disk.
#[derive(Debug, Clone, Copy, Default)]
pub struct XattrStore;

impl AttributeStore for XattrStore {
    fn read(&self, path: &Path, kind: AclKind) -> io::Result<Option<Vec<u8>>> {
        xattr::get(path, kind.attr_name())
    }

    fn write(&self, path: &Path, kind: AclKind, value: &[u8]) -> io::Result<()> {
        xattr::set(path, kind.attr_name(), value)
    }

    fn stat(&self, path: &Path) -> io::Result<StatInfo> {
        let meta = std::fs::metadata(path)?;
        Ok(StatInfo {
            uid: meta.uid(),
            gid: meta.gid(),
            mode: meta.mode() & 0o7777,
        })
    }
}
