mod attestation_record;
mod authorization_list;

pub use attestation_record::*;
pub use authorization_list::*;

use codec::{Decode, Encode, MaxEncodedLen};
use scale_info::TypeInfo;
use serde::{Deserialize, Serialize};

use crate::attestation::error::AttestationError;

/// The extent to which a key, or the attestation logic itself, is protected based on its
/// location within the device.
#[derive(
    Debug,
    Encode,
    Decode,
    MaxEncodedLen,
    TypeInfo,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
)]
pub enum SecurityLevel {
    Software,
    TrustedEnvironment,
    StrongBox,
}

impl SecurityLevel {
    pub const ALL: [SecurityLevel; 3] = [
        SecurityLevel::Software,
        SecurityLevel::TrustedEnvironment,
        SecurityLevel::StrongBox,
    ];

    /// The value used for this level in the `SecurityLevel` ENUMERATED of the attestation record.
    pub const fn wire_value(self) -> u32 {
        match self {
            SecurityLevel::Software => 0,
            SecurityLevel::TrustedEnvironment => 1,
            SecurityLevel::StrongBox => 2,
        }
    }
}

impl TryFrom<i64> for SecurityLevel {
    type Error = AttestationError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(SecurityLevel::Software),
            1 => Ok(SecurityLevel::TrustedEnvironment),
            2 => Ok(SecurityLevel::StrongBox),
            _ => Err(AttestationError::InvalidSecurityLevel(value)),
        }
    }
}

impl From<SecurityLevel> for u32 {
    fn from(level: SecurityLevel) -> Self {
        level.wire_value()
    }
}

/// The version of the key attestation feature.
/// [See docs](https://source.android.com/docs/security/features/keystore/attestation#attestation-extension)
#[derive(
    Debug,
    Encode,
    Decode,
    MaxEncodedLen,
    TypeInfo,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
)]
pub enum AttestationVersion {
    Keymaster2_0,
    Keymaster3_0,
    Keymaster4_0,
    Keymaster4_1,
    KeyMint1_0,
    KeyMint2_0,
}

impl AttestationVersion {
    pub const ALL: [AttestationVersion; 6] = [
        AttestationVersion::Keymaster2_0,
        AttestationVersion::Keymaster3_0,
        AttestationVersion::Keymaster4_0,
        AttestationVersion::Keymaster4_1,
        AttestationVersion::KeyMint1_0,
        AttestationVersion::KeyMint2_0,
    ];

    pub const fn wire_value(self) -> u32 {
        match self {
            AttestationVersion::Keymaster2_0 => 1,
            AttestationVersion::Keymaster3_0 => 2,
            AttestationVersion::Keymaster4_0 => 3,
            AttestationVersion::Keymaster4_1 => 4,
            AttestationVersion::KeyMint1_0 => 100,
            AttestationVersion::KeyMint2_0 => 200,
        }
    }

    /// Looks up the version for an `attestationVersion` value. Unknown values yield `None`.
    pub const fn from_wire(value: u32) -> Option<Self> {
        match value {
            1 => Some(AttestationVersion::Keymaster2_0),
            2 => Some(AttestationVersion::Keymaster3_0),
            3 => Some(AttestationVersion::Keymaster4_0),
            4 => Some(AttestationVersion::Keymaster4_1),
            100 => Some(AttestationVersion::KeyMint1_0),
            200 => Some(AttestationVersion::KeyMint2_0),
            _ => None,
        }
    }
}

/// The version of the KeyMint or Keymaster implementation (`keyMintVersion` / `keymasterVersion`).
#[derive(
    Debug,
    Encode,
    Decode,
    MaxEncodedLen,
    TypeInfo,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
)]
pub enum KeyMintVersion {
    Keymaster0_2Or3,
    Keymaster1_0,
    Keymaster2_0,
    Keymaster3_0,
    Keymaster4_0,
    Keymaster4_1,
    KeyMint1_0,
    KeyMint2_0,
}

impl KeyMintVersion {
    pub const ALL: [KeyMintVersion; 8] = [
        KeyMintVersion::Keymaster0_2Or3,
        KeyMintVersion::Keymaster1_0,
        KeyMintVersion::Keymaster2_0,
        KeyMintVersion::Keymaster3_0,
        KeyMintVersion::Keymaster4_0,
        KeyMintVersion::Keymaster4_1,
        KeyMintVersion::KeyMint1_0,
        KeyMintVersion::KeyMint2_0,
    ];

    pub const fn wire_value(self) -> u32 {
        match self {
            KeyMintVersion::Keymaster0_2Or3 => 0,
            KeyMintVersion::Keymaster1_0 => 1,
            KeyMintVersion::Keymaster2_0 => 2,
            KeyMintVersion::Keymaster3_0 => 3,
            KeyMintVersion::Keymaster4_0 => 4,
            // not 5: 4.1 was assigned out of sequence
            KeyMintVersion::Keymaster4_1 => 41,
            KeyMintVersion::KeyMint1_0 => 100,
            KeyMintVersion::KeyMint2_0 => 200,
        }
    }

    pub const fn from_wire(value: u32) -> Option<Self> {
        match value {
            0 => Some(KeyMintVersion::Keymaster0_2Or3),
            1 => Some(KeyMintVersion::Keymaster1_0),
            2 => Some(KeyMintVersion::Keymaster2_0),
            3 => Some(KeyMintVersion::Keymaster3_0),
            4 => Some(KeyMintVersion::Keymaster4_0),
            41 => Some(KeyMintVersion::Keymaster4_1),
            100 => Some(KeyMintVersion::KeyMint1_0),
            200 => Some(KeyMintVersion::KeyMint2_0),
            _ => None,
        }
    }
}
