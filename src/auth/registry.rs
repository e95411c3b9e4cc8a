//! The ordered catalogue of identity stores a login id is resolved against.
//!
//! The list is compiled in. The three administrator stores overlap: the
//! primary one is current, the two legacy ones predate it and are still
//! written to by older tooling. Adding a store here is a reviewed code change.

use std::fmt;

use serde::Serialize;

/// Role assigned to every record found in the admin stores that carries no
/// usable `role` field of its own.
pub const DEFAULT_ADMIN_ROLE: &str = "schoolAdmin";

/// The five identity stores, in no particular order. Use [`STORE_REGISTRY`]
/// for precedence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum StoreKind {
    Teachers,
    Students,
    AdminPrimary,
    AdminLegacy1,
    AdminLegacy2,
}

impl StoreKind {
    pub fn descriptor(self) -> &'static StoreDescriptor {
        match self {
            StoreKind::Teachers => &STORE_REGISTRY[0],
            StoreKind::Students => &STORE_REGISTRY[1],
            StoreKind::AdminPrimary => &STORE_REGISTRY[2],
            StoreKind::AdminLegacy1 => &STORE_REGISTRY[3],
            StoreKind::AdminLegacy2 => &STORE_REGISTRY[4],
        }
    }

    /// Backing table. Only ever interpolated from this compiled-in list.
    pub fn table(self) -> &'static str {
        self.descriptor().table
    }

    /// Column holding the store's natural key.
    pub fn key_column(self) -> &'static str {
        self.descriptor().key_field.column()
    }
}

impl fmt::Display for StoreKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.descriptor().name)
    }
}

/// The identifier field a store's natural key is exposed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentifierField {
    TeacherId,
    AdmissionNo,
    AdminId,
}

impl IdentifierField {
    pub const ALL: [IdentifierField; 3] = [
        IdentifierField::TeacherId,
        IdentifierField::AdmissionNo,
        IdentifierField::AdminId,
    ];

    /// Field name in the external user projection.
    pub fn as_str(self) -> &'static str {
        match self {
            IdentifierField::TeacherId => "teacherId",
            IdentifierField::AdmissionNo => "admissionNo",
            IdentifierField::AdminId => "adminId",
        }
    }

    /// Column name in the backing table.
    pub fn column(self) -> &'static str {
        match self {
            IdentifierField::TeacherId => "teacher_id",
            IdentifierField::AdmissionNo => "admission_no",
            IdentifierField::AdminId => "admin_id",
        }
    }
}

/// How a store's records map to a role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleRule {
    /// Every record gets this role.
    Fixed(&'static str),
    /// The record's `role` field, or `default` when missing or blank.
    FromRecord { default: &'static str },
}

impl RoleRule {
    /// Resolve the role for a record. Never returns an empty string.
    pub fn resolve(self, record_role: Option<&str>) -> String {
        match self {
            RoleRule::Fixed(role) => role.to_string(),
            RoleRule::FromRecord { default } => record_role
                .map(str::trim)
                .filter(|role| !role.is_empty())
                .unwrap_or(default)
                .to_string(),
        }
    }
}

/// Static description of one identity store.
#[derive(Debug, Clone, Copy)]
pub struct StoreDescriptor {
    pub kind: StoreKind,
    pub name: &'static str,
    pub table: &'static str,
    pub key_field: IdentifierField,
    pub role_rule: RoleRule,
    /// 1 is consulted first.
    pub precedence: u8,
}

/// All identity stores in precedence order.
pub static STORE_REGISTRY: [StoreDescriptor; 5] = [
    StoreDescriptor {
        kind: StoreKind::Teachers,
        name: "teachers",
        table: "teachers",
        key_field: IdentifierField::TeacherId,
        role_rule: RoleRule::Fixed("teacher"),
        precedence: 1,
    },
    StoreDescriptor {
        kind: StoreKind::Students,
        name: "students",
        table: "students",
        key_field: IdentifierField::AdmissionNo,
        role_rule: RoleRule::Fixed("student"),
        precedence: 2,
    },
    StoreDescriptor {
        kind: StoreKind::AdminPrimary,
        name: "admin-primary",
        table: "admins",
        key_field: IdentifierField::AdminId,
        role_rule: RoleRule::FromRecord {
            default: DEFAULT_ADMIN_ROLE,
        },
        precedence: 3,
    },
    StoreDescriptor {
        kind: StoreKind::AdminLegacy1,
        name: "admin-legacy-1",
        table: "school_admins",
        key_field: IdentifierField::AdminId,
        role_rule: RoleRule::FromRecord {
            default: DEFAULT_ADMIN_ROLE,
        },
        precedence: 4,
    },
    StoreDescriptor {
        kind: StoreKind::AdminLegacy2,
        name: "admin-legacy-2",
        table: "admin_accounts",
        key_field: IdentifierField::AdminId,
        role_rule: RoleRule::FromRecord {
            default: DEFAULT_ADMIN_ROLE,
        },
        precedence: 5,
    },
];
