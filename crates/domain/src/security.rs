use backoffice_core::{AppResult, NonEmptyString};
use serde::{Deserialize, Serialize};

/// Grant that authorizes every permission.
pub const GLOBAL_WILDCARD: &str = "*";

const WILDCARD_SUFFIX: &str = ".*";

/// Named bundle of dotted permission grants.
///
/// A grant is either an exact dotted path (`admin.user.edit`), a subtree
/// wildcard (`admin.user.*`) or the global wildcard `*`. Granting a path
/// also authorizes everything below it, so `admin.user` covers
/// `admin.user.edit.save`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    name: NonEmptyString,
    permissions: Vec<String>,
}

impl Role {
    /// Creates a role from its name and granted permission strings.
    pub fn new<I, S>(name: impl Into<String>, permissions: I) -> AppResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Ok(Self {
            name: NonEmptyString::new(name)?,
            permissions: permissions.into_iter().map(Into::into).collect(),
        })
    }

    /// Returns the role name.
    #[must_use]
    pub fn name(&self) -> &NonEmptyString {
        &self.name
    }

    /// Returns the granted permission strings.
    #[must_use]
    pub fn permissions(&self) -> &[String] {
        self.permissions.as_slice()
    }

    /// Returns whether the role authorizes the requested dotted permission.
    #[must_use]
    pub fn can(&self, permission: &str) -> bool {
        if self.grants(permission) || self.grants(GLOBAL_WILDCARD) {
            return true;
        }

        permission
            .match_indices('.')
            .map(|(index, _)| index)
            .chain(std::iter::once(permission.len()))
            .any(|end| {
                let prefix = &permission[..end];
                self.grants(prefix) || self.grants_subtree(prefix)
            })
    }

    fn grants(&self, permission: &str) -> bool {
        self.permissions.iter().any(|grant| grant == permission)
    }

    fn grants_subtree(&self, prefix: &str) -> bool {
        self.permissions
            .iter()
            .any(|grant| grant.strip_suffix(WILDCARD_SUFFIX) == Some(prefix))
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::Role;

    fn role(permissions: &[&str]) -> Role {
        match Role::new("tester", permissions.iter().copied()) {
            Ok(role) => role,
            Err(error) => panic!("invalid test role: {error}"),
        }
    }

    #[test]
    fn subtree_wildcard_authorizes_descendants() {
        let role = role(&["admin.user.*"]);
        assert!(role.can("admin.user.edit"));
        assert!(role.can("admin.user.edit.save"));
        assert!(!role.can("admin.media.edit"));
    }

    #[test]
    fn exact_grant_does_not_authorize_children() {
        let role = role(&["admin.user.edit"]);
        assert!(role.can("admin.user.edit"));
        assert!(!role.can("admin.user.edit.save"));
        assert!(!role.can("admin.user"));
    }

    #[test]
    fn shorter_exact_grant_authorizes_longer_paths() {
        let role = role(&["admin.user"]);
        assert!(role.can("admin.user.edit.save"));
    }

    #[test]
    fn global_wildcard_authorizes_everything() {
        let role = role(&["*"]);
        assert!(role.can("anything.at.all"));
        assert!(role.can(""));
    }

    #[test]
    fn empty_role_authorizes_nothing() {
        let role = role(&[]);
        assert!(!role.can("admin"));
        assert!(!role.can("admin.user.edit"));
    }

    #[test]
    fn role_name_must_not_be_blank() {
        assert!(Role::new(" ", ["*"]).is_err());
    }

    fn reference_can(grants: &[String], permission: &str) -> bool {
        if grants.iter().any(|grant| grant == permission || grant == "*") {
            return true;
        }

        let parts: Vec<&str> = permission.split('.').collect();
        (1..=parts.len()).any(|length| {
            let prefix = parts[..length].join(".");
            let wildcard = format!("{prefix}.*");
            grants.iter().any(|grant| *grant == prefix || *grant == wildcard)
        })
    }

    fn dotted_path() -> impl Strategy<Value = String> {
        prop::collection::vec("[a-c]{1,2}", 1..5).prop_map(|parts| parts.join("."))
    }

    fn grant() -> impl Strategy<Value = String> {
        prop_oneof![
            dotted_path(),
            dotted_path().prop_map(|path| format!("{path}.*")),
            Just("*".to_owned()),
        ]
    }

    proptest! {
        #[test]
        fn matcher_agrees_with_prefix_definition(
            grants in prop::collection::vec(grant(), 0..6),
            permission in dotted_path(),
        ) {
            let role = role(&grants.iter().map(String::as_str).collect::<Vec<_>>());
            prop_assert_eq!(role.can(&permission), reference_can(&grants, &permission));
        }

        #[test]
        fn subtree_grant_covers_every_descendant(
            base in dotted_path(),
            suffix in dotted_path(),
        ) {
            let role = role(&[format!("{base}.*").as_str()]);
            let descendant = format!("{base}.{suffix}");
            prop_assert!(role.can(&descendant));
        }
    }
}
