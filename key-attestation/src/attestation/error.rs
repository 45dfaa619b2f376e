use core::fmt::Debug;

use codec::{Decode, Encode};
use scale_info::TypeInfo;

use crate::LOG_TARGET;

/// Error while locating, decoding or encoding an attestation record.
#[cfg_attr(feature = "std", derive(thiserror::Error))]
#[derive(Debug, Encode, Decode, TypeInfo, Clone, PartialEq, Eq)]
pub enum AttestationError {
    /// No certificate in the chain carries a non-empty attestation extension.
    #[cfg_attr(feature = "std", error("Couldn't find the keystore attestation extension data"))]
    ExtensionNotFound,
    /// The issuer of the certificate at `position` is not the subject of the certificate
    /// following it, so the chain is not ordered leaf first.
    #[cfg_attr(
        feature = "std",
        error("Certificate chain is not ordered leaf first (at position {position})")
    )]
    InvalidChainOrder { position: u32 },
    /// The certificate at `position` is not a DER encoded X.509 certificate.
    #[cfg_attr(feature = "std", error("Error parsing certificate at position {position}"))]
    ParseCertificate { position: u32 },
    /// The extension value is not a DER encoded `OCTET STRING`.
    #[cfg_attr(feature = "std", error("Extension value is not a valid octet string"))]
    OuterEncodingMalformed,
    /// The extension content is not a sequence of exactly 8 elements of the expected types.
    #[cfg_attr(feature = "std", error("Malformed attestation record structure"))]
    MalformedRecordStructure,
    /// A security level outside of `{0, 1, 2}`.
    #[cfg_attr(feature = "std", error("Invalid security level {0}"))]
    InvalidSecurityLevel(i64),
    /// Error raised by the authorization list decoder or encoder.
    #[cfg_attr(feature = "std", error("{0}"))]
    AuthorizationList(AuthorizationListError),
    /// Error occured while writing the record.
    #[cfg_attr(feature = "std", error("Error encoding attestation record"))]
    EncodeRecord,
}

impl AttestationError {
    /// Consume given error `e` with `self` and generate a native log entry with error details.
    pub fn log_debug(self, e: impl Debug) -> Self {
        log::debug!(target: LOG_TARGET, "[{:?}] error: {:?}", self, e);
        self
    }
}

impl From<AuthorizationListError> for AttestationError {
    fn from(e: AuthorizationListError) -> Self {
        Self::AuthorizationList(e)
    }
}

/// Error while decoding or encoding an `AuthorizationList`.
#[cfg_attr(feature = "std", derive(thiserror::Error))]
#[derive(Debug, Encode, Decode, TypeInfo, Clone, PartialEq, Eq)]
pub enum AuthorizationListError {
    /// Not a sequence of known, ascending authorization tags.
    #[cfg_attr(feature = "std", error("Malformed authorization list"))]
    Malformed,
    /// The root of trust does not match the layout of the attestation version.
    #[cfg_attr(feature = "std", error("Malformed root of trust"))]
    MalformedRootOfTrust,
    /// Verified boot state outside of `{0, 1, 2, 3}`.
    #[cfg_attr(feature = "std", error("Invalid verified boot state {0}"))]
    InvalidVerifiedBootState(u32),
    /// The attestation application id is not a valid `AttestationApplicationId`.
    #[cfg_attr(feature = "std", error("Malformed attestation application id"))]
    MalformedApplicationId,
    /// Error occured while writing the authorization list.
    #[cfg_attr(feature = "std", error("Error encoding authorization list"))]
    Encode,
}

impl AuthorizationListError {
    /// Consume given error `e` with `self` and generate a native log entry with error details.
    pub fn log_debug(self, e: impl Debug) -> Self {
        log::debug!(target: LOG_TARGET, "[{:?}] error: {:?}", self, e);
        self
    }
}
