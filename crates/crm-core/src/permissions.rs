//! Permissions collaborator.
//!
//! Route guards consult a [`Permissions`] value. While permissions are still
//! loading the host passes a dummy set, which allows every route so that no
//! Forbidden page flashes before the real permissions arrive.

use std::collections::{HashMap, HashSet};

use serde::Deserialize;

/// What route guards may ask about the current user.
pub trait Permissions {
    /// Permissions have not been loaded yet.
    fn is_dummy(&self) -> bool;

    /// Whether the user holds `perm`.
    fn has_perm(&self, perm: &str) -> bool;

    /// Whether the user may access a codeholder `field` with every access
    /// flag in `flags` (e.g. `"r"`, `"rw"`).
    fn has_codeholder_field(&self, field: &str, flags: &str) -> bool;
}

/// A concrete permission set.
///
/// Granted permissions may end in `.*` to cover a whole namespace; a lone
/// `*` grants everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PermissionSet {
    #[serde(skip)]
    dummy: bool,
    #[serde(default)]
    perms: HashSet<String>,
    #[serde(default, rename = "fields")]
    codeholder_fields: HashMap<String, String>,
}

impl PermissionSet {
    /// An empty, loaded permission set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Placeholder used until the real permissions are loaded.
    pub fn dummy() -> Self {
        Self {
            dummy: true,
            ..Self::default()
        }
    }

    /// Grant a permission.
    pub fn with_perm(mut self, perm: impl Into<String>) -> Self {
        self.perms.insert(perm.into());
        self
    }

    /// Grant access flags on a codeholder field.
    pub fn with_field(mut self, field: impl Into<String>, flags: impl Into<String>) -> Self {
        self.codeholder_fields.insert(field.into(), flags.into());
        self
    }
}

impl<S: Into<String>> FromIterator<S> for PermissionSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            perms: iter.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }
}

impl Permissions for PermissionSet {
    fn is_dummy(&self) -> bool {
        self.dummy
    }

    fn has_perm(&self, perm: &str) -> bool {
        if self.perms.contains(perm) || self.perms.contains("*") {
            return true;
        }

        // Walk up the namespace: "codeholders.read" is covered by "codeholders.*"
        let mut prefix = perm;
        while let Some((parent, _)) = prefix.rsplit_once('.') {
            if self.perms.contains(&format!("{}.*", parent)) {
                return true;
            }
            prefix = parent;
        }
        false
    }

    fn has_codeholder_field(&self, field: &str, flags: &str) -> bool {
        self.codeholder_fields
            .get(field)
            .is_some_and(|granted| flags.chars().all(|flag| granted.contains(flag)))
    }
}
