use alloc::vec::Vec;

use codec::{Decode, Encode};
use scale_info::TypeInfo;
use serde::{Deserialize, Serialize};

use super::{AttestationVersion, AuthorizationList, KeyMintVersion, SecurityLevel};

/// Decoded content of the key attestation extension (the `KeyDescription` sequence).
/// [See docs](https://source.android.com/docs/security/features/keystore/attestation#schema)
///
/// Constructed either by decoding a certificate chain (see [`AttestationRecord::from_certificate_chain`])
/// or directly from its field values with [`AttestationRecord::new`]. Never mutated afterwards.
#[derive(Debug, Encode, Decode, TypeInfo, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttestationRecord {
    attestation_version: u32,
    attestation_security_level: SecurityLevel,
    keymaster_version: u32,
    keymaster_security_level: SecurityLevel,
    attestation_challenge: Vec<u8>,
    unique_id: Vec<u8>,
    software_enforced: AuthorizationList,
    tee_enforced: AuthorizationList,
}

impl AttestationRecord {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        attestation_version: u32,
        attestation_security_level: SecurityLevel,
        keymaster_version: u32,
        keymaster_security_level: SecurityLevel,
        attestation_challenge: Vec<u8>,
        unique_id: Vec<u8>,
        software_enforced: AuthorizationList,
        tee_enforced: AuthorizationList,
    ) -> Self {
        Self {
            attestation_version,
            attestation_security_level,
            keymaster_version,
            keymaster_security_level,
            attestation_challenge,
            unique_id,
            software_enforced,
            tee_enforced,
        }
    }

    pub fn attestation_version(&self) -> u32 {
        self.attestation_version
    }

    /// The registered [AttestationVersion] for [Self::attestation_version], if it is a known one.
    pub fn attestation_version_kind(&self) -> Option<AttestationVersion> {
        AttestationVersion::from_wire(self.attestation_version)
    }

    pub fn attestation_security_level(&self) -> SecurityLevel {
        self.attestation_security_level
    }

    pub fn keymaster_version(&self) -> u32 {
        self.keymaster_version
    }

    /// The registered [KeyMintVersion] for [Self::keymaster_version], if it is a known one.
    pub fn keymaster_version_kind(&self) -> Option<KeyMintVersion> {
        KeyMintVersion::from_wire(self.keymaster_version)
    }

    pub fn keymaster_security_level(&self) -> SecurityLevel {
        self.keymaster_security_level
    }

    pub fn attestation_challenge(&self) -> &[u8] {
        &self.attestation_challenge
    }

    pub fn unique_id(&self) -> &[u8] {
        &self.unique_id
    }

    pub fn software_enforced(&self) -> &AuthorizationList {
        &self.software_enforced
    }

    pub fn tee_enforced(&self) -> &AuthorizationList {
        &self.tee_enforced
    }
}
