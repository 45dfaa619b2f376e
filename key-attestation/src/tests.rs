#![cfg(test)]

use hex_literal::hex;

use crate::{
    AttestationError, AttestationRecord, AttestationVersion, AuthorizationList,
    AuthorizationListError, KeyMintVersion, SecurityLevel,
};

macro_rules! tests {
    ($property_test_func:ident {
        $( $(#[$attr:meta])* $test_name:ident( $( $param:expr ),* ); )+
    }) => {
        $(
            $(#[$attr])*
            #[test]
            fn $test_name() {
                $property_test_func($( $param ),* )
            }
        )+
    }
}

/// `KeyDescription` of version 3 with TrustedEnvironment attestation, StrongBox keymaster
/// of version 4, challenge `01020304`, no unique id and two empty authorization lists.
const MINIMAL_RECORD: [u8; 28] = hex!(
    "041a"
    "3018"
    "020103"
    "0a0101"
    "020104"
    "0a0102"
    "040401020304"
    "0400"
    "3000"
    "3000"
);

fn minimal_record() -> AttestationRecord {
    AttestationRecord::new(
        3,
        SecurityLevel::TrustedEnvironment,
        4,
        SecurityLevel::StrongBox,
        vec![1, 2, 3, 4],
        vec![],
        AuthorizationList::default(),
        AuthorizationList::default(),
    )
}

fn test_security_level(level: SecurityLevel, wire_value: u32) {
    assert_eq!(level.wire_value(), wire_value);
    assert_eq!(u32::from(level), wire_value);
    assert_eq!(SecurityLevel::try_from(wire_value as i64), Ok(level));
}

tests! {
    test_security_level {
        test_security_level_software(SecurityLevel::Software, 0);
        test_security_level_trusted_environment(SecurityLevel::TrustedEnvironment, 1);
        test_security_level_strong_box(SecurityLevel::StrongBox, 2);
    }
}

fn test_invalid_security_level(value: i64) {
    assert_eq!(
        SecurityLevel::try_from(value),
        Err(AttestationError::InvalidSecurityLevel(value))
    );
}

tests! {
    test_invalid_security_level {
        test_invalid_security_level_3(3);
        test_invalid_security_level_negative(-1);
        test_invalid_security_level_large(i64::MAX);
    }
}

#[test]
fn test_security_levels_are_distinct() {
    for level in SecurityLevel::ALL {
        let same = SecurityLevel::ALL
            .iter()
            .filter(|other| other.wire_value() == level.wire_value())
            .count();
        assert_eq!(same, 1);
    }
}

#[test]
fn test_attestation_version_registry() {
    for version in AttestationVersion::ALL {
        assert_eq!(AttestationVersion::from_wire(version.wire_value()), Some(version));
    }
    assert_eq!(
        AttestationVersion::ALL.map(AttestationVersion::wire_value),
        [1, 2, 3, 4, 100, 200]
    );
    assert_eq!(AttestationVersion::from_wire(0), None);
    assert_eq!(AttestationVersion::from_wire(5), None);
    assert_eq!(AttestationVersion::from_wire(300), None);
}

#[test]
fn test_keymint_version_registry() {
    for version in KeyMintVersion::ALL {
        assert_eq!(KeyMintVersion::from_wire(version.wire_value()), Some(version));
    }
    assert_eq!(
        KeyMintVersion::ALL.map(KeyMintVersion::wire_value),
        [0, 1, 2, 3, 4, 41, 100, 200]
    );
    assert_eq!(KeyMintVersion::from_wire(5), None);
    assert_eq!(KeyMintVersion::from_wire(40), None);
}

#[test]
fn test_decode_minimal_record() -> Result<(), AttestationError> {
    let record = AttestationRecord::from_extension_value(&MINIMAL_RECORD)?;

    assert_eq!(record.attestation_version(), 3);
    assert_eq!(
        record.attestation_version_kind(),
        Some(AttestationVersion::Keymaster4_0)
    );
    assert_eq!(
        record.attestation_security_level(),
        SecurityLevel::TrustedEnvironment
    );
    assert_eq!(record.keymaster_version(), 4);
    assert_eq!(
        record.keymaster_version_kind(),
        Some(KeyMintVersion::Keymaster4_0)
    );
    assert_eq!(record.keymaster_security_level(), SecurityLevel::StrongBox);
    assert_eq!(record.attestation_challenge(), &[1, 2, 3, 4]);
    assert!(record.unique_id().is_empty());
    assert_eq!(record.software_enforced(), &AuthorizationList::default());
    assert_eq!(record.tee_enforced(), &AuthorizationList::default());
    assert_eq!(record, minimal_record());
    Ok(())
}

#[test]
fn test_encode_minimal_record() -> Result<(), AttestationError> {
    let record = minimal_record();
    assert_eq!(record.to_extension_value()?, MINIMAL_RECORD.to_vec());
    assert_eq!(record.to_der()?, MINIMAL_RECORD[2..].to_vec());
    Ok(())
}

#[test]
fn test_unknown_versions_are_kept() -> Result<(), AttestationError> {
    let record = AttestationRecord::new(
        7,
        SecurityLevel::Software,
        42,
        SecurityLevel::Software,
        vec![],
        b"unique".to_vec(),
        AuthorizationList::default(),
        AuthorizationList::default(),
    );
    let decoded = AttestationRecord::from_extension_value(&record.to_extension_value()?)?;

    assert_eq!(decoded, record);
    assert_eq!(decoded.attestation_version_kind(), None);
    assert_eq!(decoded.keymaster_version_kind(), None);
    Ok(())
}

#[test]
fn test_versions_encoded_as_enumerated_are_accepted() -> Result<(), AttestationError> {
    let record = AttestationRecord::from_extension_value(&hex!(
        "041a"
        "3018"
        "0a0103"
        "0a0101"
        "0a0104"
        "0a0102"
        "040401020304"
        "0400"
        "3000"
        "3000"
    ))?;
    assert_eq!(record, minimal_record());
    Ok(())
}

#[test]
fn test_authorization_lists_are_decoded() -> Result<(), AttestationError> {
    // software enforced: creation date time 1, tee enforced: purpose {2}, no auth required
    let record = AttestationRecord::from_extension_value(&hex!(
        "042e"
        "302c"
        "020103"
        "0a0101"
        "020104"
        "0a0102"
        "040401020304"
        "0400"
        "3007" "bf853d03020101"
        "300d" "a1053103020102" "bf837702" "0500"
    ))?;

    assert_eq!(record.software_enforced().creation_date_time, Some(1));
    assert_eq!(record.tee_enforced().purpose, Some(vec![2]));
    assert!(record.tee_enforced().no_auth_required);
    assert_eq!(
        AttestationRecord::from_extension_value(&record.to_extension_value()?)?,
        record
    );
    Ok(())
}

#[test]
fn test_unsorted_set_survives_reencoding() -> Result<(), AttestationError> {
    // tee enforced: purpose {3, 2}, not in DER order
    let record = AttestationRecord::from_extension_value(&hex!(
        "0424"
        "3022"
        "020103"
        "0a0101"
        "020104"
        "0a0102"
        "040401020304"
        "0400"
        "3000"
        "300a" "a1083106020103020102"
    ))?;
    assert_eq!(record.tee_enforced().purpose, Some(vec![2, 3]));

    let reencoded = AttestationRecord::from_extension_value(&record.to_extension_value()?)?;
    assert_eq!(reencoded, record);
    Ok(())
}

fn test_decode_error(extension_value: &[u8], expected: AttestationError) {
    assert_eq!(
        AttestationRecord::from_extension_value(extension_value),
        Err(expected)
    );
}

tests! {
    test_decode_error {
        test_garbage_outer_encoding(&[0xff, 0x00], AttestationError::OuterEncodingMalformed);
        test_empty_extension_value(&[], AttestationError::OuterEncodingMalformed);
        test_truncated_outer_encoding(
            &hex!("041a" "3018" "020103"),
            AttestationError::OuterEncodingMalformed
        );
        test_trailing_data_after_outer_encoding(
            &hex!("0400" "00"),
            AttestationError::OuterEncodingMalformed
        );
        test_content_not_a_sequence(
            &hex!("0403" "020101"),
            AttestationError::MalformedRecordStructure
        );
        test_empty_content(&hex!("0400"), AttestationError::MalformedRecordStructure);
        test_seven_elements(
            &hex!(
                "0418"
                "3016"
                "020103"
                "0a0101"
                "020104"
                "0a0102"
                "040401020304"
                "0400"
                "3000"
            ),
            AttestationError::MalformedRecordStructure
        );
        test_nine_elements(
            &hex!(
                "041c"
                "301a"
                "020103"
                "0a0101"
                "020104"
                "0a0102"
                "040401020304"
                "0400"
                "3000"
                "3000"
                "3000"
            ),
            AttestationError::MalformedRecordStructure
        );
        test_invalid_attestation_security_level(
            &hex!(
                "041a"
                "3018"
                "020103"
                "0a0103"
                "020104"
                "0a0102"
                "040401020304"
                "0400"
                "3000"
                "3000"
            ),
            AttestationError::InvalidSecurityLevel(3)
        );
        test_invalid_keymaster_security_level(
            &hex!(
                "041a"
                "3018"
                "020103"
                "0a0101"
                "020104"
                "0a0105"
                "040401020304"
                "0400"
                "3000"
                "3000"
            ),
            AttestationError::InvalidSecurityLevel(5)
        );
        test_negative_enumerated_security_level(
            &hex!(
                "041a"
                "3018"
                "020103"
                "0a01ff"
                "020104"
                "0a0102"
                "040401020304"
                "0400"
                "3000"
                "3000"
            ),
            AttestationError::InvalidSecurityLevel(-1)
        );
        test_enumerated_security_level_beyond_u32(
            &hex!(
                "041e"
                "301c"
                "020103"
                "0a050100000000"
                "020104"
                "0a0102"
                "040401020304"
                "0400"
                "3000"
                "3000"
            ),
            AttestationError::InvalidSecurityLevel(4294967296)
        );
        test_negative_attestation_version(
            &hex!(
                "041a"
                "3018"
                "0201ff"
                "0a0101"
                "020104"
                "0a0102"
                "040401020304"
                "0400"
                "3000"
                "3000"
            ),
            AttestationError::MalformedRecordStructure
        );
        test_challenge_not_an_octet_string(
            &hex!(
                "0417"
                "3015"
                "020103"
                "0a0101"
                "020104"
                "0a0102"
                "020105"
                "0400"
                "3000"
                "3000"
            ),
            AttestationError::MalformedRecordStructure
        );
        test_version_not_an_integer(
            &hex!(
                "041a"
                "3018"
                "040103"
                "0a0101"
                "020104"
                "0a0102"
                "040401020304"
                "0400"
                "3000"
                "3000"
            ),
            AttestationError::MalformedRecordStructure
        );
        test_authorization_list_not_a_sequence(
            &hex!(
                "041a"
                "3018"
                "020103"
                "0a0101"
                "020104"
                "0a0102"
                "040401020304"
                "0400"
                "3000"
                "0400"
            ),
            AttestationError::MalformedRecordStructure
        );
        test_authorization_list_with_unknown_tag(
            &hex!(
                "0421"
                "301f"
                "020103"
                "0a0101"
                "020104"
                "0a0102"
                "040401020304"
                "0400"
                "3000"
                "3007" "bfce0f03020101"
            ),
            AttestationError::AuthorizationList(AuthorizationListError::Malformed)
        );
    }
}
