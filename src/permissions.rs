use std::fmt::{Display, Formatter};

use axum::async_trait;

use crate::trigger::{ElevatedContext, RepositorySource};

/// Permission level that the source host reports for a user on a repository.
///
/// `Unknown` is produced when the level could not be determined (network failure, missing
/// credentials, timeout, ...). It is treated as the most restrictive level.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PermissionLevel {
    None,
    Write,
    Admin,
    Unknown,
}

impl PermissionLevel {
    /// Does this level pass the given threshold?
    pub fn satisfies(self, minimum: MinimumPermission) -> bool {
        match minimum {
            MinimumPermission::None => true,
            MinimumPermission::Write => matches!(self, Self::Write | Self::Admin),
            MinimumPermission::Admin => matches!(self, Self::Admin),
        }
    }

    /// Maps the legacy `permission` field of the GitHub collaborator permission endpoint.
    pub fn from_github(permission: &str) -> Self {
        match permission {
            "admin" => Self::Admin,
            "write" | "maintain" => Self::Write,
            "read" | "triage" | "none" => Self::None,
            _ => Self::Unknown,
        }
    }
}

impl Display for PermissionLevel {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::None => "none",
            Self::Write => "write",
            Self::Admin => "admin",
            Self::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

/// Authorization threshold of a trigger rule, ordered `None < Write < Admin`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MinimumPermission {
    None,
    Write,
    Admin,
}

impl MinimumPermission {
    /// Options offered when configuring a trigger rule, most restrictive first.
    pub fn options() -> [(Self, &'static str); 3] {
        [Self::Admin, Self::Write, Self::None].map(|option| (option, option.label()))
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Admin => "Only users with admin permission",
            Self::Write => "Only users that can push to the repository",
            Self::None => "Allow untrusted users to trigger the build",
        }
    }

    /// Threshold used when a rule does not configure one explicitly.
    /// `allow_untrusted` is the deprecated boolean toggle that predates the selector.
    pub fn from_legacy(allow_untrusted: bool) -> Self {
        if allow_untrusted {
            Self::None
        } else {
            Self::Write
        }
    }
}

impl Display for MinimumPermission {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::None => "none",
            Self::Write => "write",
            Self::Admin => "admin",
        };
        f.write_str(name)
    }
}

/// Answers the question "what permission does user U have on the repository of this source?".
///
/// Implementations must never fail: any error is reported as [`PermissionLevel::Unknown`].
#[async_trait]
pub trait PermissionOracle: Send + Sync {
    async fn permission_of(
        &self,
        ctx: &ElevatedContext,
        source: &RepositorySource,
        username: &str,
    ) -> PermissionLevel;
}

#[cfg(test)]
mod tests {
    use super::{MinimumPermission, PermissionLevel};

    #[test]
    fn write_passes_write_and_none() {
        assert!(PermissionLevel::Write.satisfies(MinimumPermission::None));
        assert!(PermissionLevel::Write.satisfies(MinimumPermission::Write));
        assert!(!PermissionLevel::Write.satisfies(MinimumPermission::Admin));
    }

    #[test]
    fn admin_passes_everything() {
        assert!(PermissionLevel::Admin.satisfies(MinimumPermission::None));
        assert!(PermissionLevel::Admin.satisfies(MinimumPermission::Write));
        assert!(PermissionLevel::Admin.satisfies(MinimumPermission::Admin));
    }

    #[test]
    fn unknown_only_passes_none() {
        assert!(PermissionLevel::Unknown.satisfies(MinimumPermission::None));
        assert!(!PermissionLevel::Unknown.satisfies(MinimumPermission::Write));
        assert!(!PermissionLevel::Unknown.satisfies(MinimumPermission::Admin));
    }

    #[test]
    fn none_only_passes_none() {
        assert!(PermissionLevel::None.satisfies(MinimumPermission::None));
        assert!(!PermissionLevel::None.satisfies(MinimumPermission::Write));
    }

    #[test]
    fn selector_options() {
        assert_eq!(
            MinimumPermission::options(),
            [
                (MinimumPermission::Admin, "Only users with admin permission"),
                (
                    MinimumPermission::Write,
                    "Only users that can push to the repository"
                ),
                (
                    MinimumPermission::None,
                    "Allow untrusted users to trigger the build"
                ),
            ]
        );
    }

    #[test]
    fn github_permission_names() {
        assert_eq!(PermissionLevel::from_github("admin"), PermissionLevel::Admin);
        assert_eq!(PermissionLevel::from_github("maintain"), PermissionLevel::Write);
        assert_eq!(PermissionLevel::from_github("write"), PermissionLevel::Write);
        assert_eq!(PermissionLevel::from_github("triage"), PermissionLevel::None);
        assert_eq!(PermissionLevel::from_github("read"), PermissionLevel::None);
        assert_eq!(PermissionLevel::from_github("owner"), PermissionLevel::Unknown);
    }

    #[test]
    fn legacy_threshold() {
        assert_eq!(MinimumPermission::from_legacy(true), MinimumPermission::None);
        assert_eq!(MinimumPermission::from_legacy(false), MinimumPermission::Write);
    }

    #[test]
    fn thresholds_are_ordered() {
        assert!(MinimumPermission::None < MinimumPermission::Write);
        assert!(MinimumPermission::Write < MinimumPermission::Admin);
    }
}
