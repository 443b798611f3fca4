//! Entry tags: who an ACL entry applies to.

use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strum::{EnumIter, EnumString, FromRepr, IntoStaticStr};
use utoipa::ToSchema;

use crate::error::AclError;

/// The tag values the kernel and NFSv4 bridges know about.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, FromRepr, EnumIter, EnumString,
    IntoStaticStr,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[repr(u16)]
pub enum TagKind {
    Undefined = 0x00,
    /// The owning user of the file.
    UserObj = 0x01,
    /// A named user, qualified by uid.
    User = 0x02,
    /// The owning group of the file.
    GroupObj = 0x04,
    /// A named group, qualified by gid.
    Group = 0x08,
    /// Upper bound for the group class.
    Mask = 0x10,
    Other = 0x20,
    /// NFSv4 `EVERYONE@`.
    Everyone = 0x40,
}

impl TagKind {
    /// Whether entries of this kind carry a meaningful uid/gid qualifier.
    pub fn is_qualified(self) -> bool {
        matches!(self, TagKind::User | TagKind::Group)
    }
}

/// The raw 16-bit tag of an entry.
///
/// Codes outside [`TagKind`] are kept as-is so foreign payloads survive a
/// parse/serialize cycle; they display as their number.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    ToSchema,
)]
#[serde(transparent)]
pub struct Tag(u16);

impl Tag {
    pub const UNDEFINED: Tag = Tag::from_kind(TagKind::Undefined);
    pub const USER_OBJ: Tag = Tag::from_kind(TagKind::UserObj);
    pub const USER: Tag = Tag::from_kind(TagKind::User);
    pub const GROUP_OBJ: Tag = Tag::from_kind(TagKind::GroupObj);
    pub const GROUP: Tag = Tag::from_kind(TagKind::Group);
    pub const MASK: Tag = Tag::from_kind(TagKind::Mask);
    pub const OTHER: Tag = Tag::from_kind(TagKind::Other);
    pub const EVERYONE: Tag = Tag::from_kind(TagKind::Everyone);

    pub const fn from_code(code: u16) -> Self {
        Tag(code)
    }

    pub const fn from_kind(kind: TagKind) -> Self {
        Tag(kind as u16)
    }

    pub const fn code(self) -> u16 {
        self.0
    }

    /// The known variant for this code, if any.
    pub fn kind(self) -> Option<TagKind> {
        TagKind::from_repr(self.0)
    }

    /// Static name of a known tag, e.g. `USER_OBJ`.
    pub fn name(self) -> Option<&'static str> {
        self.kind().map(<&'static str>::from)
    }
}

impl From<TagKind> for Tag {
    fn from(kind: TagKind) -> Self {
        Tag::from_kind(kind)
    }
}

impl From<u16> for Tag {
    fn from(code: u16) -> Self {
        Tag(code)
    }
}

impl Display for Tag {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self.name() {
            Some(name) => f.pad(name),
            None => f.pad(&self.0.to_string()),
        }
    }
}

/// Accepts a tag name (`GROUP_OBJ`) or a decimal code.
impl FromStr for Tag {
    type Err = AclError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Ok(kind) = TagKind::from_str(s) {
            return Ok(kind.into());
        }
        s.parse::<u16>().map(Tag).map_err(|_| {
            AclError::InvalidFormat(format!(
                "unknown tag '{s}' (expected a tag name such as USER_OBJ or a numeric code)"
            ))
        })
    }
}
