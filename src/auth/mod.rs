//! Login id resolution, credential verification and session issuance.

mod error;
mod password;
mod projection;
mod registry;
mod resolver;
mod session;

pub use error::{LoginError, MessageBody, SessionError};
pub use password::CredentialVerifier;
pub use projection::UserProjection;
pub use registry::{
    DEFAULT_ADMIN_ROLE, IdentifierField, RoleRule, STORE_REGISTRY, StoreDescriptor, StoreKind,
};
pub use resolver::{IdentityRecord, Resolver};
pub use session::{SESSION_TTL_SECS, SessionClaims, SessionIssuer, TokenClaims};

#[cfg(test)]
pub(crate) use resolver::tests::RecordingRepo;
