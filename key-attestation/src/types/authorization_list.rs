use alloc::vec::Vec;

use asn1::{Enumerated, Null, Tlv};
use codec::{Decode, Encode};
use scale_info::TypeInfo;
use serde::{Deserialize, Serialize};

use crate::attestation::{
    asn::{self, UnorderedSetOf},
    error::AuthorizationListError,
};

/// First attestation version whose root of trust carries the verified boot hash.
const ROOT_OF_TRUST_BOOT_HASH_VERSION: u32 = 3;

/// The constraints and properties attached to an attested key.
/// [Tag descriptions](https://source.android.com/docs/security/keystore/tags)
///
/// Tags that are flags (`NULL` valued) are represented as `bool`, all other tags are optional.
#[derive(
    Debug, Default, Encode, Decode, TypeInfo, Clone, PartialEq, Eq, Serialize, Deserialize,
)]
pub struct AuthorizationList {
    pub purpose: Option<Vec<i64>>,
    pub algorithm: Option<i64>,
    pub key_size: Option<i64>,
    pub digest: Option<Vec<i64>>,
    pub padding: Option<Vec<i64>>,
    pub ec_curve: Option<i64>,
    pub rsa_public_exponent: Option<i64>,
    pub mgf_digest: Option<Vec<i64>>,
    pub rollback_resistance: bool,
    pub early_boot_only: bool,
    pub active_date_time: Option<i64>,
    pub origination_expire_date_time: Option<i64>,
    pub usage_expire_date_time: Option<i64>,
    pub usage_count_limit: Option<i64>,
    pub no_auth_required: bool,
    pub user_auth_type: Option<i64>,
    pub auth_timeout: Option<i64>,
    pub allow_while_on_body: bool,
    pub trusted_user_presence_required: bool,
    pub trusted_confirmation_required: bool,
    pub unlocked_device_required: bool,
    pub all_applications: bool,
    pub application_id: Option<Vec<u8>>,
    pub creation_date_time: Option<i64>,
    pub origin: Option<i64>,
    pub root_of_trust: Option<RootOfTrust>,
    pub os_version: Option<i64>,
    pub os_patch_level: Option<i64>,
    /// DER encoded `AttestationApplicationId`, see [AuthorizationList::decoded_attestation_application_id].
    pub attestation_application_id: Option<Vec<u8>>,
    pub attestation_id_brand: Option<Vec<u8>>,
    pub attestation_id_device: Option<Vec<u8>>,
    pub attestation_id_product: Option<Vec<u8>>,
    pub attestation_id_serial: Option<Vec<u8>>,
    pub attestation_id_imei: Option<Vec<u8>>,
    pub attestation_id_meid: Option<Vec<u8>>,
    pub attestation_id_manufacturer: Option<Vec<u8>>,
    pub attestation_id_model: Option<Vec<u8>>,
    pub vendor_patch_level: Option<i64>,
    pub boot_patch_level: Option<i64>,
    pub device_unique_attestation: bool,
    pub attestation_id_second_imei: Option<Vec<u8>>,
    pub module_hash: Option<Vec<u8>>,
}

fn present(value: Option<Null>) -> bool {
    value.is_some()
}

fn to_owned_bytes(value: Option<&[u8]>) -> Option<Vec<u8>> {
    value.map(|v| v.to_vec())
}

impl AuthorizationList {
    /// Decodes a DER encoded `AuthorizationList` sequence.
    ///
    /// The layout of some tags depends on the `attestation_version` of the enclosing record.
    pub fn decode(data: &[u8], attestation_version: u32) -> Result<Self, AuthorizationListError> {
        let list = asn1::parse_single::<asn::AuthorizationList>(data)
            .map_err(|e| AuthorizationListError::Malformed.log_debug(e))?;

        let root_of_trust = list
            .root_of_trust
            .map(|tlv| RootOfTrust::decode(tlv.full_data(), attestation_version))
            .transpose()?;

        Ok(AuthorizationList {
            purpose: list.purpose.map(UnorderedSetOf::into_der_order),
            algorithm: list.algorithm,
            key_size: list.key_size,
            digest: list.digest.map(UnorderedSetOf::into_der_order),
            padding: list.padding.map(UnorderedSetOf::into_der_order),
            ec_curve: list.ec_curve,
            rsa_public_exponent: list.rsa_public_exponent,
            mgf_digest: list.mgf_digest.map(UnorderedSetOf::into_der_order),
            rollback_resistance: present(list.rollback_resistance),
            early_boot_only: present(list.early_boot_only),
            active_date_time: list.active_date_time,
            origination_expire_date_time: list.origination_expire_date_time,
            usage_expire_date_time: list.usage_expire_date_time,
            usage_count_limit: list.usage_count_limit,
            no_auth_required: present(list.no_auth_required),
            user_auth_type: list.user_auth_type,
            auth_timeout: list.auth_timeout,
            allow_while_on_body: present(list.allow_while_on_body),
            trusted_user_presence_required: present(list.trusted_user_presence_required),
            trusted_confirmation_required: present(list.trusted_confirmation_required),
            unlocked_device_required: present(list.unlocked_device_required),
            all_applications: present(list.all_applications),
            application_id: to_owned_bytes(list.application_id),
            creation_date_time: list.creation_date_time,
            origin: list.origin,
            root_of_trust,
            os_version: list.os_version,
            os_patch_level: list.os_patch_level,
            attestation_application_id: to_owned_bytes(list.attestation_application_id),
            attestation_id_brand: to_owned_bytes(list.attestation_id_brand),
            attestation_id_device: to_owned_bytes(list.attestation_id_device),
            attestation_id_product: to_owned_bytes(list.attestation_id_product),
            attestation_id_serial: to_owned_bytes(list.attestation_id_serial),
            attestation_id_imei: to_owned_bytes(list.attestation_id_imei),
            attestation_id_meid: to_owned_bytes(list.attestation_id_meid),
            attestation_id_manufacturer: to_owned_bytes(list.attestation_id_manufacturer),
            attestation_id_model: to_owned_bytes(list.attestation_id_model),
            vendor_patch_level: list.vendor_patch_level,
            boot_patch_level: list.boot_patch_level,
            device_unique_attestation: present(list.device_unique_attestation),
            attestation_id_second_imei: to_owned_bytes(list.attestation_id_second_imei),
            module_hash: to_owned_bytes(list.module_hash),
        })
    }

    /// Encodes this list as a DER `AuthorizationList` sequence.
    pub fn to_der(&self) -> Result<Vec<u8>, AuthorizationListError> {
        let root_of_trust = self.root_of_trust.as_ref().map(RootOfTrust::to_der).transpose()?;
        let root_of_trust = root_of_trust
            .as_deref()
            .map(asn1::parse_single::<Tlv>)
            .transpose()
            .map_err(|e| AuthorizationListError::Encode.log_debug(e))?;

        let set = |v: &Option<Vec<i64>>| v.clone().map(UnorderedSetOf::new);
        let null = |v: bool| v.then_some(());

        let list = asn::AuthorizationList {
            purpose: set(&self.purpose),
            algorithm: self.algorithm,
            key_size: self.key_size,
            digest: set(&self.digest),
            padding: set(&self.padding),
            ec_curve: self.ec_curve,
            rsa_public_exponent: self.rsa_public_exponent,
            mgf_digest: set(&self.mgf_digest),
            rollback_resistance: null(self.rollback_resistance),
            early_boot_only: null(self.early_boot_only),
            active_date_time: self.active_date_time,
            origination_expire_date_time: self.origination_expire_date_time,
            usage_expire_date_time: self.usage_expire_date_time,
            usage_count_limit: self.usage_count_limit,
            no_auth_required: null(self.no_auth_required),
            user_auth_type: self.user_auth_type,
            auth_timeout: self.auth_timeout,
            allow_while_on_body: null(self.allow_while_on_body),
            trusted_user_presence_required: null(self.trusted_user_presence_required),
            trusted_confirmation_required: null(self.trusted_confirmation_required),
            unlocked_device_required: null(self.unlocked_device_required),
            all_applications: null(self.all_applications),
            application_id: self.application_id.as_deref(),
            creation_date_time: self.creation_date_time,
            origin: self.origin,
            root_of_trust,
            os_version: self.os_version,
            os_patch_level: self.os_patch_level,
            attestation_application_id: self.attestation_application_id.as_deref(),
            attestation_id_brand: self.attestation_id_brand.as_deref(),
            attestation_id_device: self.attestation_id_device.as_deref(),
            attestation_id_product: self.attestation_id_product.as_deref(),
            attestation_id_serial: self.attestation_id_serial.as_deref(),
            attestation_id_imei: self.attestation_id_imei.as_deref(),
            attestation_id_meid: self.attestation_id_meid.as_deref(),
            attestation_id_manufacturer: self.attestation_id_manufacturer.as_deref(),
            attestation_id_model: self.attestation_id_model.as_deref(),
            vendor_patch_level: self.vendor_patch_level,
            boot_patch_level: self.boot_patch_level,
            device_unique_attestation: null(self.device_unique_attestation),
            attestation_id_second_imei: self.attestation_id_second_imei.as_deref(),
            module_hash: self.module_hash.as_deref(),
        };

        asn1::write_single(&list).map_err(|e| AuthorizationListError::Encode.log_debug(e))
    }

    /// Decodes the [AuthorizationList::attestation_application_id] tag, if present.
    pub fn decoded_attestation_application_id(
        &self,
    ) -> Result<Option<AttestationApplicationId>, AuthorizationListError> {
        self.attestation_application_id
            .as_deref()
            .map(AttestationApplicationId::decode)
            .transpose()
    }
}

#[derive(
    Debug, Encode, Decode, TypeInfo, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
pub enum VerifiedBootState {
    Verified,
    SelfSigned,
    Unverified,
    Failed,
}

impl TryFrom<u32> for VerifiedBootState {
    type Error = AuthorizationListError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(VerifiedBootState::Verified),
            1 => Ok(VerifiedBootState::SelfSigned),
            2 => Ok(VerifiedBootState::Unverified),
            3 => Ok(VerifiedBootState::Failed),
            _ => Err(AuthorizationListError::InvalidVerifiedBootState(value)),
        }
    }
}

impl From<VerifiedBootState> for u32 {
    fn from(state: VerifiedBootState) -> Self {
        match state {
            VerifiedBootState::Verified => 0,
            VerifiedBootState::SelfSigned => 1,
            VerifiedBootState::Unverified => 2,
            VerifiedBootState::Failed => 3,
        }
    }
}

/// Information about the device's verified boot state.
/// [See docs](https://source.android.com/docs/security/features/keystore/attestation#rootoftrust-fields)
#[derive(Debug, Encode, Decode, TypeInfo, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RootOfTrust {
    pub verified_boot_key: Vec<u8>,
    pub device_locked: bool,
    pub verified_boot_state: VerifiedBootState,
    /// Only present from attestation version 3 on.
    pub verified_boot_hash: Option<Vec<u8>>,
}

impl RootOfTrust {
    pub fn decode(data: &[u8], attestation_version: u32) -> Result<Self, AuthorizationListError> {
        if attestation_version < ROOT_OF_TRUST_BOOT_HASH_VERSION {
            let root = asn1::parse_single::<asn::RootOfTrustV1V2>(data)
                .map_err(|e| AuthorizationListError::MalformedRootOfTrust.log_debug(e))?;
            Ok(RootOfTrust {
                verified_boot_key: root.verified_boot_key.to_vec(),
                device_locked: root.device_locked,
                verified_boot_state: root.verified_boot_state.value().try_into()?,
                verified_boot_hash: None,
            })
        } else {
            let root = asn1::parse_single::<asn::RootOfTrust>(data)
                .map_err(|e| AuthorizationListError::MalformedRootOfTrust.log_debug(e))?;
            Ok(RootOfTrust {
                verified_boot_key: root.verified_boot_key.to_vec(),
                device_locked: root.device_locked,
                verified_boot_state: root.verified_boot_state.value().try_into()?,
                verified_boot_hash: Some(root.verified_boot_hash.to_vec()),
            })
        }
    }

    pub fn to_der(&self) -> Result<Vec<u8>, AuthorizationListError> {
        let verified_boot_state = Enumerated::new(self.verified_boot_state.into());
        let written = match &self.verified_boot_hash {
            Some(verified_boot_hash) => asn1::write_single(&asn::RootOfTrust {
                verified_boot_key: &self.verified_boot_key,
                device_locked: self.device_locked,
                verified_boot_state,
                verified_boot_hash: verified_boot_hash.as_slice(),
            }),
            None => asn1::write_single(&asn::RootOfTrustV1V2 {
                verified_boot_key: &self.verified_boot_key,
                device_locked: self.device_locked,
                verified_boot_state,
            }),
        };
        written.map_err(|e| AuthorizationListError::Encode.log_debug(e))
    }
}

/// The applications allowed to use the attested key.
/// [See docs](https://source.android.com/docs/security/features/keystore/attestation#attestationapplicationid-schema)
#[derive(Debug, Encode, Decode, TypeInfo, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttestationApplicationId {
    pub package_infos: Vec<AttestationPackageInfo>,
    pub signature_digests: Vec<Vec<u8>>,
}

#[derive(Debug, Encode, Decode, TypeInfo, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttestationPackageInfo {
    pub package_name: Vec<u8>,
    pub version: i64,
}

impl AttestationApplicationId {
    pub fn decode(data: &[u8]) -> Result<Self, AuthorizationListError> {
        let app_id = asn1::parse_single::<asn::AttestationApplicationId>(data)
            .map_err(|e| AuthorizationListError::MalformedApplicationId.log_debug(e))?;

        Ok(AttestationApplicationId {
            package_infos: app_id
                .package_infos
                .to_vec()
                .into_iter()
                .map(|info| AttestationPackageInfo {
                    package_name: info.package_name.to_vec(),
                    version: info.version,
                })
                .collect(),
            signature_digests: app_id
                .signature_digests
                .to_vec()
                .into_iter()
                .map(|digest| digest.to_vec())
                .collect(),
        })
    }
}
