//! Runtime permissions requested at startup.
//!
//! Android gates the camera, SMS, location and storage behind runtime
//! permissions. The host simulation has no such gate and grants everything;
//! the statuses still flow into startup diagnostics so a denied permission is
//! reported instead of surfacing later as a silent no-op.

use serde::Serialize;

use crate::error::Error;

/// A permission the app asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    /// Take photos.
    Camera,
    /// Send text messages.
    SendSms,
    /// Approximate location (requested, currently unused).
    CoarseLocation,
    /// Precise location (requested, currently unused).
    FineLocation,
    /// Read shared storage.
    ReadStorage,
    /// Write shared storage.
    WriteStorage,
}

impl Permission {
    /// Everything requested when the app starts.
    pub const STARTUP: [Permission; 6] = [
        Permission::Camera,
        Permission::SendSms,
        Permission::CoarseLocation,
        Permission::FineLocation,
        Permission::ReadStorage,
        Permission::WriteStorage,
    ];

    /// The Android manifest name.
    #[must_use]
    pub fn android_name(self) -> &'static str {
        match self {
            Self::Camera => "android.permission.CAMERA",
            Self::SendSms => "android.permission.SEND_SMS",
            Self::CoarseLocation => "android.permission.ACCESS_COARSE_LOCATION",
            Self::FineLocation => "android.permission.ACCESS_FINE_LOCATION",
            Self::ReadStorage => "android.permission.READ_EXTERNAL_STORAGE",
            Self::WriteStorage => "android.permission.WRITE_EXTERNAL_STORAGE",
        }
    }

    /// Whether the emergency workflow degrades without this permission.
    #[must_use]
    pub fn is_required(self) -> bool {
        matches!(self, Self::Camera | Self::SendSms | Self::WriteStorage)
    }
}

impl std::fmt::Display for Permission {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.android_name())
    }
}

/// Result of requesting one permission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PermissionStatus {
    /// The permission.
    pub permission: Permission,
    /// Whether it is granted.
    pub is_granted: bool,
    /// Human-readable description of the status.
    pub description: String,
}

impl PermissionStatus {
    /// Create a granted status.
    #[must_use]
    pub fn granted(permission: Permission) -> Self {
        Self {
            permission,
            is_granted: true,
            description: format!("{permission} is granted"),
        }
    }

    /// Create a not-granted status.
    #[must_use]
    pub fn not_granted(permission: Permission) -> Self {
        Self {
            permission,
            is_granted: false,
            description: format!("{permission} is not granted"),
        }
    }
}

/// Statuses of every permission requested at startup.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PermissionSet {
    statuses: Vec<PermissionStatus>,
}

impl PermissionSet {
    /// Build a set from individual statuses.
    #[must_use]
    pub fn new(statuses: Vec<PermissionStatus>) -> Self {
        Self { statuses }
    }

    /// Request the startup permissions on the host, where all are granted.
    #[must_use]
    pub fn request_host() -> Self {
        Self::new(
            Permission::STARTUP
                .iter()
                .map(|p| PermissionStatus::granted(*p))
                .collect(),
        )
    }

    /// All statuses in request order.
    #[must_use]
    pub fn statuses(&self) -> &[PermissionStatus] {
        &self.statuses
    }

    /// Whether `permission` was granted.
    #[must_use]
    pub fn is_granted(&self, permission: Permission) -> bool {
        self.statuses
            .iter()
            .any(|s| s.permission == permission && s.is_granted)
    }

    /// One error per required permission that is missing.
    #[must_use]
    pub fn missing_required(&self) -> Vec<Error> {
        Permission::STARTUP
            .iter()
            .filter(|p| p.is_required() && !self.is_granted(**p))
            .map(|p| Error::permission_missing(p.android_name(), get_permission_instructions()))
            .collect()
    }
}

/// Instructions for granting permissions by hand.
#[must_use]
pub fn get_permission_instructions() -> &'static str {
    "Open Settings > Apps > Be Safe > Permissions and allow Camera, SMS and Storage, \
     then restart the app."
}
