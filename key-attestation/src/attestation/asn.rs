use alloc::vec::Vec;

use asn1::{
    parse, Asn1Read, Asn1Readable, Asn1Writable, Asn1Write, BitString, Enumerated, Null,
    ObjectIdentifier, ParseResult, SequenceOf, SetOf, SetOfWriter, SimpleAsn1Readable,
    SimpleAsn1Writable, Tag, Tlv, WriteBuf, WriteResult,
};

#[derive(Asn1Read, Asn1Write, Clone)]
/// Represents the root structure of a [X.509 v3 certificate](https://www.rfc-editor.org/rfc/rfc5280#section-4.1)
/// See how to map these to [asn1 structs](https://docs.rs/asn1/0.15.5/asn1/#structs)
pub struct Certificate<'a> {
    pub tbs_certificate: TBSCertificate<'a>,
    pub signature_algorithm: AlgorithmIdentifier<'a>,
    pub signature_value: BitString<'a>,
}

#[derive(Asn1Read, Asn1Write, Clone)]
/// [See RFC](https://www.rfc-editor.org/rfc/rfc5280#section-4.1.1.2)
pub struct AlgorithmIdentifier<'a> {
    pub algorithm: ObjectIdentifier,
    pub parameters: Option<Tlv<'a>>,
}

#[derive(Asn1Read, Asn1Write, Clone)]
pub struct TBSCertificate<'a> {
    #[explicit(0)]
    #[default(1u64)]
    pub version: u64,
    pub serial_number: asn1::BigUint<'a>,
    pub signature: AlgorithmIdentifier<'a>,
    // RFC: https://www.rfc-editor.org/rfc/rfc5280#section-4.1.2.4
    pub issuer: Name<'a>,
    /// Validity times are not interpreted here, see [RFC](https://www.rfc-editor.org/rfc/rfc5280#section-4.1.2.5).
    pub validity: Tlv<'a>,
    pub subject: Name<'a>,
    pub subject_public_key_info: SubjectPublicKeyInfo<'a>,
    // If present, version MUST be v2 or v3
    #[implicit(1)]
    pub issuer_unique_id: Option<BitString<'a>>,
    // If present, version MUST be v2 or v3
    #[implicit(2)]
    pub subject_unique_id: Option<BitString<'a>>,
    // If present, version MUST be v3
    #[explicit(3)]
    pub extensions: Option<SequenceOf<'a, Extension<'a>>>,
}

#[derive(Asn1Read, Asn1Write, Clone)]
pub enum Name<'a> {
    RDNSequence(RDNSequence<'a>),
}

type RDNSequence<'a> = SequenceOf<'a, RelativeDistinguishedName<'a>>;

type RelativeDistinguishedName<'a> = SetOf<'a, AttributeTypeAndValue<'a>>;

#[derive(Asn1Read, Asn1Write, Clone)]
pub struct AttributeTypeAndValue<'a> {
    pub typ: ObjectIdentifier,
    /// A value with the format defined by `typ`.
    /// See https://www.rfc-editor.org/rfc/rfc5280#section-4.1.2.4
    pub value: Tlv<'a>,
}

#[derive(Asn1Read, Asn1Write, Clone)]
pub struct SubjectPublicKeyInfo<'a> {
    pub algorithm: AlgorithmIdentifier<'a>,
    pub subject_public_key: BitString<'a>,
}

#[derive(Asn1Read, Asn1Write, Clone)]
pub struct Extension<'a> {
    pub extn_id: ObjectIdentifier,
    #[default(false)]
    pub critical: bool,
    /// contains the DER encoding of an ASN.1 value
    /// corresponding to the extension type identified by extnID
    pub extn_value: &'a [u8],
}

/// The `KeyDescription` sequence as it is written.
///
/// Decoding walks the eight elements positionally instead (see `decode_key_description`),
/// so that every position reports its own failure.
#[derive(Asn1Write)]
pub struct KeyDescription<'a> {
    pub attestation_version: i64,
    pub attestation_security_level: SecurityLevel,
    pub key_mint_version: i64,
    pub key_mint_security_level: SecurityLevel,
    pub attestation_challenge: &'a [u8],
    pub unique_id: &'a [u8],
    /// Already encoded `AuthorizationList` sequence.
    pub software_enforced: Tlv<'a>,
    /// Already encoded `AuthorizationList` sequence.
    pub tee_enforced: Tlv<'a>,
}

/// One of
/// Software (0),
/// TrustedEnvironment (1),
/// StrongBox (2) -> only exists in attestation version >= 3
pub type SecurityLevel = Enumerated;

/// The Authorization List tags. [Tag descriptions](https://source.android.com/docs/security/keystore/tags)
///
/// Superset of the tags of all attestation versions, fields ordered by tag number.
#[derive(Asn1Read, Asn1Write)]
pub struct AuthorizationList<'a> {
    #[explicit(1)]
    pub purpose: Option<UnorderedSetOf<i64>>,
    #[explicit(2)]
    pub algorithm: Option<i64>,
    #[explicit(3)]
    pub key_size: Option<i64>,
    #[explicit(5)]
    pub digest: Option<UnorderedSetOf<i64>>,
    #[explicit(6)]
    pub padding: Option<UnorderedSetOf<i64>>,
    #[explicit(10)]
    pub ec_curve: Option<i64>,
    #[explicit(200)]
    pub rsa_public_exponent: Option<i64>,
    #[explicit(203)]
    pub mgf_digest: Option<UnorderedSetOf<i64>>,
    #[explicit(303)]
    pub rollback_resistance: Option<Null>,
    #[explicit(305)]
    pub early_boot_only: Option<Null>,
    #[explicit(400)]
    pub active_date_time: Option<i64>,
    #[explicit(401)]
    pub origination_expire_date_time: Option<i64>,
    #[explicit(402)]
    pub usage_expire_date_time: Option<i64>,
    #[explicit(405)]
    pub usage_count_limit: Option<i64>,
    #[explicit(503)]
    pub no_auth_required: Option<Null>,
    #[explicit(504)]
    pub user_auth_type: Option<i64>,
    #[explicit(505)]
    pub auth_timeout: Option<i64>,
    #[explicit(506)]
    pub allow_while_on_body: Option<Null>,
    #[explicit(507)]
    pub trusted_user_presence_required: Option<Null>,
    #[explicit(508)]
    pub trusted_confirmation_required: Option<Null>,
    #[explicit(509)]
    pub unlocked_device_required: Option<Null>,
    #[explicit(600)]
    pub all_applications: Option<Null>,
    #[explicit(601)]
    pub application_id: Option<&'a [u8]>,
    #[explicit(701)]
    pub creation_date_time: Option<i64>,
    #[explicit(702)]
    pub origin: Option<i64>,
    /// Either [RootOfTrustV1V2] or [RootOfTrust], depending on the attestation version.
    #[explicit(704)]
    pub root_of_trust: Option<Tlv<'a>>,
    #[explicit(705)]
    pub os_version: Option<i64>,
    #[explicit(706)]
    pub os_patch_level: Option<i64>,
    #[explicit(709)]
    pub attestation_application_id: Option<&'a [u8]>,
    #[explicit(710)]
    pub attestation_id_brand: Option<&'a [u8]>,
    #[explicit(711)]
    pub attestation_id_device: Option<&'a [u8]>,
    #[explicit(712)]
    pub attestation_id_product: Option<&'a [u8]>,
    #[explicit(713)]
    pub attestation_id_serial: Option<&'a [u8]>,
    #[explicit(714)]
    pub attestation_id_imei: Option<&'a [u8]>,
    #[explicit(715)]
    pub attestation_id_meid: Option<&'a [u8]>,
    #[explicit(716)]
    pub attestation_id_manufacturer: Option<&'a [u8]>,
    #[explicit(717)]
    pub attestation_id_model: Option<&'a [u8]>,
    #[explicit(718)]
    pub vendor_patch_level: Option<i64>,
    #[explicit(719)]
    pub boot_patch_level: Option<i64>,
    #[explicit(720)]
    pub device_unique_attestation: Option<Null>,
    #[explicit(723)]
    pub attestation_id_second_imei: Option<&'a [u8]>,
    #[explicit(724)]
    pub module_hash: Option<&'a [u8]>,
}

/// Root of trust of attestation versions 1 and 2, without the verified boot hash.
#[derive(Asn1Read, Asn1Write)]
pub struct RootOfTrustV1V2<'a> {
    pub verified_boot_key: &'a [u8],
    pub device_locked: bool,
    pub verified_boot_state: VerifiedBootState,
}

#[derive(Asn1Read, Asn1Write)]
pub struct RootOfTrust<'a> {
    pub verified_boot_key: &'a [u8],
    pub device_locked: bool,
    pub verified_boot_state: VerifiedBootState,
    pub verified_boot_hash: &'a [u8],
}

#[derive(Asn1Read)]
pub struct AttestationApplicationId<'a> {
    pub package_infos: UnorderedSetOf<AttestationPackageInfo<'a>>,
    pub signature_digests: UnorderedSetOf<&'a [u8]>,
}

#[derive(Asn1Read)]
pub struct AttestationPackageInfo<'a> {
    pub package_name: &'a [u8],
    pub version: i64,
}

/// One of Verified (0),
/// SelfSigned (1),
/// Unverified (2),
/// Failed (3)
pub type VerifiedBootState = Enumerated;

/// Represents an ASN.1 `SET OF` whose elements are not required to be in DER order when read.
/// Written in DER order.
pub struct UnorderedSetOf<T> {
    elements: Vec<T>,
}

impl<T> UnorderedSetOf<T> {
    pub(crate) fn new(elements: Vec<T>) -> Self {
        Self { elements }
    }

    pub fn elements(&self) -> &[T] {
        &self.elements
    }

    pub fn to_vec(self) -> Vec<T> {
        self.elements
    }

    /// The elements sorted by their DER encoding, the order they are written in.
    pub fn into_der_order(self) -> Vec<T>
    where
        T: Asn1Writable,
    {
        let mut elements = self.elements;
        elements.sort_by_cached_key(|e| asn1::write_single(e).unwrap_or_default());
        elements
    }
}

impl<'a, T: Asn1Readable<'a> + 'a> SimpleAsn1Readable<'a> for UnorderedSetOf<T> {
    const TAG: Tag = <SetOf<T> as SimpleAsn1Readable<'a>>::TAG;

    #[inline]
    fn parse_data(data: &'a [u8]) -> ParseResult<Self> {
        parse(data, |parser| {
            let mut elements = Vec::<T>::new();
            while !parser.is_empty() {
                let el = parser.read_element::<T>()?;
                elements.push(el)
            }
            Ok(Self::new(elements))
        })
    }
}

impl<'a, T: Asn1Readable<'a> + Asn1Writable> SimpleAsn1Writable for UnorderedSetOf<T> {
    const TAG: Tag = <SetOf<T> as SimpleAsn1Writable>::TAG;

    fn write_data(&self, dest: &mut WriteBuf) -> WriteResult {
        SetOfWriter::<T, &[T]>::new(self.elements.as_slice()).write_data(dest)
    }
}
