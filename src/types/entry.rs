//! A single ACL entry and its 8-byte wire record.

use std::fmt::{Display, Formatter, Result as FmtResult};

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::AclError;

use super::permission::Permission;
use super::tag::Tag;

/// Size of one encoded entry: tag (u16), permission (u16), id (u32).
pub const ENTRY_SIZE: usize = 8;

/// Qualifier carried by entries that do not name a principal.
pub const UNDEFINED_ID: u32 = u32::MAX;

/// One `(tag, id, permission)` record.
///
/// Entries are plain values. `==` compares all three fields; use
/// [`Entry::key_eq`] to compare only the `(tag, id)` key that an [`Acl`]
/// keeps unique.
///
/// [`Acl`]: crate::Acl
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub struct Entry {
    tag: Tag,
    id: u32,
    permission: Permission,
}

impl Entry {
    pub fn new(tag: impl Into<Tag>, id: u32, permission: Permission) -> Self {
        Entry {
            tag: tag.into(),
            id,
            permission,
        }
    }

    pub fn user_obj(permission: Permission) -> Self {
        Entry::new(Tag::USER_OBJ, UNDEFINED_ID, permission)
    }

    pub fn user(uid: u32, permission: Permission) -> Self {
        Entry::new(Tag::USER, uid, permission)
    }

    pub fn group_obj(permission: Permission) -> Self {
        Entry::new(Tag::GROUP_OBJ, UNDEFINED_ID, permission)
    }

    pub fn group(gid: u32, permission: Permission) -> Self {
        Entry::new(Tag::GROUP, gid, permission)
    }

    pub fn mask(permission: Permission) -> Self {
        Entry::new(Tag::MASK, UNDEFINED_ID, permission)
    }

    pub fn other(permission: Permission) -> Self {
        Entry::new(Tag::OTHER, UNDEFINED_ID, permission)
    }

    pub fn everyone(permission: Permission) -> Self {
        Entry::new(Tag::EVERYONE, UNDEFINED_ID, permission)
    }

    pub fn tag(&self) -> Tag {
        self.tag
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn permission(&self) -> Permission {
        self.permission
    }

    /// Same tag and id, permission ignored.
    pub fn key_eq(&self, other: &Entry) -> bool {
        self.tag == other.tag && self.id == other.id
    }

    pub fn has_permission(&self, bits: Permission) -> bool {
        self.permission.contains(bits)
    }

    /// Copy of this entry with `permission` replacing the current bits.
    pub fn with_permission(self, permission: Permission) -> Self {
        Entry { permission, ..self }
    }

    pub fn with_added_permission(self, bits: Permission) -> Self {
        self.with_permission(self.permission | bits)
    }

    pub fn with_removed_permission(self, bits: Permission) -> Self {
        self.with_permission(self.permission & !bits)
    }

    /// Decode one record from the front of `bytes`, returning the entry and
    /// the unconsumed tail.
    pub fn parse(bytes: &[u8]) -> Result<(Entry, &[u8]), AclError> {
        let Some((record, rest)) = bytes.split_first_chunk::<ENTRY_SIZE>() else {
            return Err(AclError::MalformedData {
                remaining: bytes.len(),
            });
        };

        let entry = Entry {
            tag: Tag::from_code(u16::from_le_bytes([record[0], record[1]])),
            permission: Permission::from_bits(u16::from_le_bytes([record[2], record[3]])),
            id: u32::from_le_bytes([record[4], record[5], record[6], record[7]]),
        };
        Ok((entry, rest))
    }

    /// The little-endian wire record for this entry.
    pub fn to_bytes(&self) -> [u8; ENTRY_SIZE] {
        let mut record = [0u8; ENTRY_SIZE];
        record[0..2].copy_from_slice(&self.tag.code().to_le_bytes());
        record[2..4].copy_from_slice(&self.permission.bits().to_le_bytes());
        record[4..8].copy_from_slice(&self.id.to_le_bytes());
        record
    }

    pub fn write_to(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.to_bytes());
    }
}

impl Display for Entry {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(
            f,
            "Tag: {:>10} ({:>2}), ID: {:>10}, Perm: {} ({})",
            self.tag,
            self.tag.code(),
            self.id,
            self.permission,
            self.permission.bits()
        )
    }
}
