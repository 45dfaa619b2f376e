pub mod asn;
pub mod error;

use alloc::vec::Vec;

use asn::*;
use asn1::{
    oid, Enumerated, ObjectIdentifier, ParseError, SequenceOf, SimpleAsn1Readable, Tlv,
};
use error::AttestationError;

use crate::{AttestationRecord, AuthorizationList, SecurityLevel, LOG_TARGET};

/// The OID of the Attestation Extension to a X.509 certificate.
/// [See docs](https://source.android.com/docs/security/keystore/attestation#tbscertificate-sequence)
pub const KEY_ATTESTATION_OID: ObjectIdentifier = oid!(1, 3, 6, 1, 4, 1, 11129, 2, 1, 17);

/// Number of elements of the `KeyDescription` sequence.
const KEY_DESCRIPTION_LENGTH: usize = 8;

/// Read access to the parts of a certificate the attestation extension lookup depends on.
///
/// Implemented for the DER [Certificate] of this crate, callers holding certificates parsed by
/// another library implement it for their own type.
pub trait CertificateExtensions {
    /// The DER encoded `OCTET STRING` holding the value of the extension `oid`, if present.
    fn extension_value(&self, oid: &ObjectIdentifier) -> Option<Vec<u8>>;

    /// The DER encoded issuer name.
    ///
    /// When both names of two neighbouring certificates are known, they are used to check
    /// that the chain is ordered leaf first. Names are compared byte for byte, not with the
    /// RFC 5280 matching rules: an issuer and subject holding the same name in different
    /// string types count as different names.
    fn issuer_name(&self) -> Option<Vec<u8>> {
        None
    }

    /// The DER encoded subject name.
    fn subject_name(&self) -> Option<Vec<u8>> {
        None
    }
}

impl<'a> CertificateExtensions for Certificate<'a> {
    fn extension_value(&self, oid: &ObjectIdentifier) -> Option<Vec<u8>> {
        let extension = self
            .tbs_certificate
            .extensions
            .clone()?
            .find(|e| &e.extn_id == oid)?;
        asn1::write_single(&extension.extn_value).ok()
    }

    fn issuer_name(&self) -> Option<Vec<u8>> {
        asn1::write_single(&self.tbs_certificate.issuer).ok()
    }

    fn subject_name(&self) -> Option<Vec<u8>> {
        asn1::write_single(&self.tbs_certificate.subject).ok()
    }
}

pub fn parse_certificate(serialized: &[u8]) -> Result<Certificate, ParseError> {
    let data = asn1::parse_single::<Certificate>(serialized)?;
    Ok(data)
}

/// Ensures every certificate is issued by the one following it, for all neighbours exposing their names.
fn ensure_leaf_first<C: CertificateExtensions>(chain: &[C]) -> Result<(), AttestationError> {
    for (position, pair) in chain.windows(2).enumerate() {
        if let (Some(issuer), Some(subject)) = (pair[0].issuer_name(), pair[1].subject_name()) {
            if issuer != subject {
                return Err(AttestationError::InvalidChainOrder {
                    position: u32::try_from(position).unwrap_or(u32::MAX),
                });
            }
        }
    }
    Ok(())
}

/// Returns the value of the extension `oid` closest to the root of a leaf first `chain`.
///
/// Zero-length extension values are skipped like missing ones.
pub fn locate_extension<C: CertificateExtensions>(
    chain: &[C],
    oid: &ObjectIdentifier,
) -> Result<Vec<u8>, AttestationError> {
    ensure_leaf_first(chain)?;

    // Scanning from the root prevents an adversary from
    // 1) having the TEE attest a key under their control,
    // 2) signing a new leaf certificate with that key carrying an attestation record of their choice,
    // 3) appending that certificate to the otherwise trusted chain.
    for (position, certificate) in chain.iter().enumerate().rev() {
        match certificate.extension_value(oid) {
            Some(value) if !value.is_empty() => {
                log::debug!(
                    target: LOG_TARGET,
                    "using extension {} of certificate {} in chain of {}",
                    oid,
                    position,
                    chain.len()
                );
                return Ok(value);
            }
            Some(_) => {
                log::warn!(
                    target: LOG_TARGET,
                    "certificate {} carries an empty extension {}, treating it as absent",
                    position,
                    oid
                );
            }
            None => {}
        }
    }

    Err(AttestationError::ExtensionNotFound)
}

/// Returns the key attestation extension value closest to the root of a leaf first `chain`.
pub fn locate_attestation_extension<C: CertificateExtensions>(
    chain: &[C],
) -> Result<Vec<u8>, AttestationError> {
    locate_extension(chain, &KEY_ATTESTATION_OID)
}

/// Decodes an `INTEGER` or an `ENUMERATED`, both with the full `i64` range.
fn decode_integer(element: &Tlv) -> Result<i64, AttestationError> {
    let value = if element.tag() == <Enumerated as SimpleAsn1Readable<'_>>::TAG {
        <i64 as SimpleAsn1Readable<'_>>::parse_data(element.data())
    } else {
        asn1::parse_single::<i64>(element.full_data())
    };
    value.map_err(|e| AttestationError::MalformedRecordStructure.log_debug(e))
}

fn decode_version(element: &Tlv) -> Result<u32, AttestationError> {
    let version = decode_integer(element)?;
    u32::try_from(version).map_err(|e| AttestationError::MalformedRecordStructure.log_debug(e))
}

fn decode_security_level(element: &Tlv) -> Result<SecurityLevel, AttestationError> {
    SecurityLevel::try_from(decode_integer(element)?)
}

fn decode_octets(element: &Tlv) -> Result<Vec<u8>, AttestationError> {
    asn1::parse_single::<&[u8]>(element.full_data())
        .map(|octets| octets.to_vec())
        .map_err(|e| AttestationError::MalformedRecordStructure.log_debug(e))
}

fn decode_authorization_list(
    element: &Tlv,
    attestation_version: u32,
) -> Result<AuthorizationList, AttestationError> {
    asn1::parse_single::<asn1::Sequence>(element.full_data())
        .map_err(|e| AttestationError::MalformedRecordStructure.log_debug(e))?;
    Ok(AuthorizationList::decode(element.full_data(), attestation_version)?)
}

/// Decodes the `KeyDescription` carried in the value of the attestation extension.
fn decode_key_description(extension_value: &[u8]) -> Result<AttestationRecord, AttestationError> {
    // The extension value contains one object, the DER encoded sequence.
    let key_description = asn1::parse_single::<&[u8]>(extension_value)
        .map_err(|e| AttestationError::OuterEncodingMalformed.log_debug(e))?;

    let elements = asn1::parse_single::<SequenceOf<Tlv>>(key_description)
        .map_err(|e| AttestationError::MalformedRecordStructure.log_debug(e))?
        .collect::<Vec<Tlv>>();
    let [attestation_version, attestation_security_level, keymaster_version, keymaster_security_level, attestation_challenge, unique_id, software_enforced, tee_enforced]: [Tlv; KEY_DESCRIPTION_LENGTH] =
        elements.try_into().map_err(|elements: Vec<Tlv>| {
            AttestationError::MalformedRecordStructure.log_debug(elements.len())
        })?;

    let attestation_version = decode_version(&attestation_version)?;
    Ok(AttestationRecord::new(
        attestation_version,
        decode_security_level(&attestation_security_level)?,
        decode_version(&keymaster_version)?,
        decode_security_level(&keymaster_security_level)?,
        decode_octets(&attestation_challenge)?,
        decode_octets(&unique_id)?,
        decode_authorization_list(&software_enforced, attestation_version)?,
        decode_authorization_list(&tee_enforced, attestation_version)?,
    ))
}

impl AttestationRecord {
    /// Decodes the attestation record of a leaf first, root last certificate `chain`.
    ///
    /// The record of the certificate closest to the root is used, see [locate_extension].
    pub fn from_certificate_chain<C: CertificateExtensions>(
        chain: &[C],
    ) -> Result<Self, AttestationError> {
        let extension_value = locate_attestation_extension(chain)?;
        Self::from_extension_value(&extension_value)
    }

    /// Like [AttestationRecord::from_certificate_chain] for a chain of DER encoded certificates.
    pub fn from_der_chain<T: AsRef<[u8]>>(chain: &[T]) -> Result<Self, AttestationError> {
        let certificates = chain
            .iter()
            .enumerate()
            .map(|(position, serialized)| {
                parse_certificate(serialized.as_ref()).map_err(|e| {
                    AttestationError::ParseCertificate {
                        position: u32::try_from(position).unwrap_or(u32::MAX),
                    }
                    .log_debug(e)
                })
            })
            .collect::<Result<Vec<Certificate>, AttestationError>>()?;
        Self::from_certificate_chain(&certificates)
    }

    /// Decodes the value of a key attestation extension: an `OCTET STRING` wrapping the DER
    /// encoded `KeyDescription`.
    pub fn from_extension_value(extension_value: &[u8]) -> Result<Self, AttestationError> {
        decode_key_description(extension_value)
    }

    /// Encodes the record as DER `KeyDescription` sequence.
    pub fn to_der(&self) -> Result<Vec<u8>, AttestationError> {
        let software_enforced = self.software_enforced().to_der()?;
        let tee_enforced = self.tee_enforced().to_der()?;

        let key_description = KeyDescription {
            attestation_version: self.attestation_version().into(),
            attestation_security_level: Enumerated::new(self.attestation_security_level().into()),
            key_mint_version: self.keymaster_version().into(),
            key_mint_security_level: Enumerated::new(self.keymaster_security_level().into()),
            attestation_challenge: self.attestation_challenge(),
            unique_id: self.unique_id(),
            software_enforced: asn1::parse_single::<Tlv>(&software_enforced)
                .map_err(|e| AttestationError::EncodeRecord.log_debug(e))?,
            tee_enforced: asn1::parse_single::<Tlv>(&tee_enforced)
                .map_err(|e| AttestationError::EncodeRecord.log_debug(e))?,
        };

        asn1::write_single(&key_description)
            .map_err(|e| AttestationError::EncodeRecord.log_debug(e))
    }

    /// Encodes the record as value of the key attestation extension.
    pub fn to_extension_value(&self) -> Result<Vec<u8>, AttestationError> {
        let key_description = self.to_der()?;
        asn1::write_single(&key_description.as_slice())
            .map_err(|e| AttestationError::EncodeRecord.log_debug(e))
    }
}
