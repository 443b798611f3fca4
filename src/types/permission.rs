//! Permission bits of an ACL entry and their `rwx` text form.

use std::fmt::{Display, Formatter, Result as FmtResult};
use std::ops::{BitAnd, BitOr, Not};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::AclError;

/// Read/write/execute bits as stored in the 16-bit permission field of an entry.
///
/// Only the low three bits carry meaning. The full wire value is kept so that
/// a parsed record serializes back to the exact same bytes.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema,
)]
#[serde(transparent)]
pub struct Permission(u16);

impl Permission {
    pub const NONE: Permission = Permission(0x0);
    pub const EXECUTE: Permission = Permission(0x1);
    pub const WRITE: Permission = Permission(0x2);
    pub const READ: Permission = Permission(0x4);
    pub const ALL: Permission = Permission(0x7);

    pub const fn from_bits(bits: u16) -> Self {
        Permission(bits)
    }

    pub const fn bits(self) -> u16 {
        self.0
    }

    /// True if every bit of `other` is set. `NONE` is always contained.
    pub const fn contains(self, other: Permission) -> bool {
        self.0 & other.0 == other.0
    }
}

impl From<u16> for Permission {
    fn from(bits: u16) -> Self {
        Permission(bits)
    }
}

impl BitOr for Permission {
    type Output = Permission;

    fn bitor(self, rhs: Permission) -> Permission {
        Permission(self.0 | rhs.0)
    }
}

impl BitAnd for Permission {
    type Output = Permission;

    fn bitand(self, rhs: Permission) -> Permission {
        Permission(self.0 & rhs.0)
    }
}

impl Not for Permission {
    type Output = Permission;

    fn not(self) -> Permission {
        Permission(!self.0)
    }
}

/// Renders exactly three characters, `-` for each cleared bit. Bits above
/// execute/write/read are not shown.
impl Display for Permission {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        let flag = |bit: Permission, c: char| if self.contains(bit) { c } else { '-' };
        let rwx: String = [
            flag(Permission::READ, 'r'),
            flag(Permission::WRITE, 'w'),
            flag(Permission::EXECUTE, 'x'),
        ]
        .into_iter()
        .collect();
        f.pad(&rwx)
    }
}

/// Parses `rwx`-style strings. Any character other than the expected letter
/// leaves that bit cleared; only the length is validated.
impl FromStr for Permission {
    type Err = AclError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let [r, w, x] = <[u8; 3]>::try_from(s.as_bytes()).map_err(|_| {
            AclError::InvalidFormat(format!(
                "permission string '{s}' must be exactly 3 characters (expected format: rwx)"
            ))
        })?;

        let mut perm = Permission::NONE;
        if r == b'r' {
            perm = perm | Permission::READ;
        }
        if w == b'w' {
            perm = perm | Permission::WRITE;
        }
        if x == b'x' {
            perm = perm | Permission::EXECUTE;
        }
        Ok(perm)
    }
}
