//! Which of a file's two POSIX ACLs an attribute holds.

use serde::{Deserialize, Serialize};
use strum::{EnumIter, EnumString, IntoStaticStr};
use utoipa::ToSchema;

/// The extended attribute an ACL payload is stored under.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    ToSchema,
    IntoStaticStr,
    EnumString,
    EnumIter,
)]
#[serde(rename_all = "lowercase")]
pub enum AclKind {
    /// Checked on every access to the object.
    #[strum(serialize = "system.posix_acl_access")]
    Access,
    /// Inherited by objects created inside a directory.
    #[strum(serialize = "system.posix_acl_default")]
    Default,
}

impl AclKind {
    /// The xattr name, e.g. `system.posix_acl_access`.
    pub fn attr_name(self) -> &'static str {
        self.into()
    }
}
