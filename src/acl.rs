use std::fmt::{Display, Formatter, Result as FmtResult};
use std::path::Path;

use itertools::Itertools;
use serde::{Deserialize, Deserializer, Serialize};
use tracing::debug;
use utoipa::ToSchema;

use crate::error::AclError;
use crate::traits::{AttributeStore, StatInfo};
use crate::types::{AclKind, ENTRY_SIZE, Entry, Permission, Tag, UNDEFINED_ID};

/// Version written by the Linux kernel for POSIX ACL xattrs.
pub const ACL_EA_VERSION: u32 = 2;

const HEADER_SIZE: usize = 4;

/// A POSIX ACL: a format version plus a set of entries unique by `(tag, id)`.
///
/// Entries keep insertion order until the ACL is serialized, at which point
/// they are stably sorted by tag code as the kernel requires. Equality
/// compares the entry sets and ignores order entirely.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Acl {
    version: u32,
    entries: Vec<Entry>,
}

/// Deserialization goes through `add_entry` so duplicate keys collapse.
#[derive(Deserialize)]
struct AclRepr {
    version: u32,
    entries: Vec<Entry>,
}

impl<'de> Deserialize<'de> for Acl {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let repr = AclRepr::deserialize(deserializer)?;
        let mut acl = Acl::with_version(repr.version);
        acl.extend(repr.entries);
        Ok(acl)
    }
}

impl Default for Acl {
    fn default() -> Self {
        Acl::with_version(ACL_EA_VERSION)
    }
}

impl Acl {
    /// An empty ACL with the kernel's current format version.
    pub fn new() -> Self {
        Acl::default()
    }

    pub fn with_version(version: u32) -> Self {
        Acl {
            version,
            entries: Vec::new(),
        }
    }

    /// The ACL equivalent of plain `rwxrwxrwx` mode bits: owner, owning
    /// group, a full mask and other.
    pub fn from_stat(stat: &StatInfo) -> Self {
        let bits = |shift: u32| Permission::from_bits(((stat.mode >> shift) & 0o7) as u16);
        Acl {
            version: ACL_EA_VERSION,
            entries: vec![
                Entry::new(Tag::USER_OBJ, stat.uid, bits(6)),
                Entry::new(Tag::GROUP_OBJ, stat.gid, bits(3)),
                Entry::new(Tag::MASK, UNDEFINED_ID, Permission::ALL),
                Entry::new(Tag::OTHER, UNDEFINED_ID, bits(0)),
            ],
        }
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn set_version(&mut self, version: u32) {
        self.version = version;
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in their current stored order.
    pub fn iter(&self) -> std::slice::Iter<'_, Entry> {
        self.entries.iter()
    }

    /// An owned copy of the entries; changing it does not affect the ACL.
    pub fn entries(&self) -> Vec<Entry> {
        self.entries.clone()
    }

    /// Position of the stored entry with the same `(tag, id)` as `key`.
    pub fn entry_position(&self, key: &Entry) -> Option<usize> {
        self.entries.iter().position(|e| e.key_eq(key))
    }

    /// The stored entry with the same `(tag, id)` as `key`.
    pub fn get_entry(&self, key: &Entry) -> Option<Entry> {
        self.entry_position(key).map(|pos| self.entries[pos])
    }

    /// Insert `entry`, replacing (not merging with) any stored entry of the
    /// same `(tag, id)`. The replaced entry is returned.
    pub fn add_entry(&mut self, entry: Entry) -> Option<Entry> {
        let replaced = self.delete_entry(&entry);
        if let Some(previous) = &replaced {
            debug!(
                event = "AclEntry",
                phase = "Replaced",
                previous = previous.to_string(),
                replacement = entry.to_string()
            );
        }
        self.entries.push(entry);
        replaced
    }

    /// Remove and return the entry matching `key` by `(tag, id)`; the
    /// permission of `key` is ignored.
    pub fn delete_entry(&mut self, key: &Entry) -> Option<Entry> {
        let pos = self.entry_position(key)?;
        Some(self.entries.remove(pos))
    }

    /// Stable sort of the stored entries by tag code.
    pub fn canonicalize(&mut self) {
        self.entries.sort_by_key(|e| e.tag());
    }

    /// Entries in canonical order without touching the stored order.
    fn canonical_entries(&self) -> impl Iterator<Item = &Entry> {
        self.entries.iter().sorted_by_key(|e| e.tag())
    }

    /// Entries fully ordered by `(tag, id, permission)`, so that equal sets
    /// line up regardless of insertion order.
    fn comparison_view(&self) -> impl Iterator<Item = &Entry> {
        self.entries
            .iter()
            .sorted_by_key(|e| (e.tag(), e.id(), e.permission().bits()))
    }

    /// Decode an xattr payload: a 4-byte version followed by 8-byte entry
    /// records up to the end of the buffer.
    pub fn parse(bytes: &[u8]) -> Result<Acl, AclError> {
        let Some((header, mut rest)) = bytes.split_first_chunk::<HEADER_SIZE>() else {
            return Err(AclError::TruncatedHeader { len: bytes.len() });
        };

        let mut acl = Acl::with_version(u32::from_le_bytes(*header));
        acl.entries.reserve(rest.len() / ENTRY_SIZE);
        while !rest.is_empty() {
            let (entry, tail) = Entry::parse(rest)?;
            acl.entries.push(entry);
            rest = tail;
        }

        debug!(
            event = "AclParse",
            version = acl.version,
            entries = acl.entries.len()
        );
        Ok(acl)
    }

    /// Canonicalize the stored order, then append the xattr payload to `out`.
    pub fn write_to(&mut self, out: &mut Vec<u8>) {
        self.canonicalize();
        out.reserve(HEADER_SIZE + self.entries.len() * ENTRY_SIZE);
        out.extend_from_slice(&self.version.to_le_bytes());
        for entry in &self.entries {
            entry.write_to(out);
        }
    }

    pub fn to_bytes(&mut self) -> Vec<u8> {
        let mut out = Vec::new();
        self.write_to(&mut out);
        out
    }

    /// Canonicalize the stored order, then render the human-readable listing.
    /// The text is the same as `Display`, which leaves stored order alone.
    pub fn render(&mut self) -> String {
        self.canonicalize();
        self.to_string()
    }

    /// Read the `kind` ACL of `path`. Objects without the attribute get the
    /// ACL derived from their mode bits.
    pub fn load<S>(store: &S, path: &Path, kind: AclKind) -> Result<Acl, AclError>
    where
        S: AttributeStore + ?Sized,
    {
        match store.read(path, kind)? {
            Some(bytes) => {
                debug!(
                    event = "AclLoad",
                    phase = "Attribute",
                    path = %path.display(),
                    attr = kind.attr_name(),
                    len = bytes.len()
                );
                Acl::parse(&bytes)
            }
            None => {
                let stat = store.stat(path)?;
                debug!(
                    event = "AclLoad",
                    phase = "Bootstrap",
                    path = %path.display(),
                    attr = kind.attr_name(),
                    mode = format!("{:o}", stat.mode & 0o777)
                );
                Ok(Acl::from_stat(&stat))
            }
        }
    }

    /// Serialize and store this ACL as the `kind` attribute of `path`.
    pub fn apply<S>(&mut self, store: &S, path: &Path, kind: AclKind) -> Result<(), AclError>
    where
        S: AttributeStore + ?Sized,
    {
        let bytes = self.to_bytes();
        debug!(
            event = "AclApply",
            path = %path.display(),
            attr = kind.attr_name(),
            entries = self.entries.len()
        );
        store.write(path, kind, &bytes)?;
        Ok(())
    }
}

impl PartialEq for Acl {
    fn eq(&self, other: &Self) -> bool {
        self.version == other.version
            && self.entries.len() == other.entries.len()
            && self.comparison_view().eq(other.comparison_view())
    }
}

impl Eq for Acl {}

impl Display for Acl {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        writeln!(f, "Version: {}", self.version)?;
        writeln!(f, "Entries:")?;
        for entry in self.canonical_entries() {
            writeln!(f, "{entry}")?;
        }
        Ok(())
    }
}

impl TryFrom<&[u8]> for Acl {
    type Error = AclError;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        Acl::parse(bytes)
    }
}

impl Extend<Entry> for Acl {
    fn extend<I: IntoIterator<Item = Entry>>(&mut self, iter: I) {
        for entry in iter {
            self.add_entry(entry);
        }
    }
}

impl FromIterator<Entry> for Acl {
    fn from_iter<I: IntoIterator<Item = Entry>>(iter: I) -> Self {
        let mut acl = Acl::new();
        acl.extend(iter);
        acl
    }
}

impl<'a> IntoIterator for &'a Acl {
    type Item = &'a Entry;
    type IntoIter = std::slice::Iter<'a, Entry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests;
