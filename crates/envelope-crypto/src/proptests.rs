//! Property-based tests for the envelope codec.
//!
//! - Round trips (payload, key wrap, full envelope)
//! - Fresh IV per encryption
//! - Tamper and cross-key rejection

use proptest::prelude::*;

use crate::base64::{base64_decode, base64_encode};
use crate::test_keys::test_keypair;
use crate::{
    decrypt_payload, encrypt_payload, open, seal, unwrap_key, wrap_key, CryptoError,
    SymmetricKey,
};

fn any_key() -> impl Strategy<Value = [u8; 32]> {
    any::<[u8; 32]>()
}

proptest! {
    #[test]
    fn payload_round_trip(plaintext in any::<String>(), key in any_key()) {
        let token = encrypt_payload(&plaintext, &key).unwrap();
        prop_assert_eq!(decrypt_payload(&token, &key).unwrap(), plaintext);
    }

    #[test]
    fn same_input_different_tokens(plaintext in any::<String>(), key in any_key()) {
        let t1 = encrypt_payload(&plaintext, &key).unwrap();
        let t2 = encrypt_payload(&plaintext, &key).unwrap();
        prop_assert_ne!(&t1, &t2);
        prop_assert_eq!(decrypt_payload(&t1, &key).unwrap(), plaintext.clone());
        prop_assert_eq!(decrypt_payload(&t2, &key).unwrap(), plaintext);
    }

    #[test]
    fn cross_key_never_decrypts(plaintext in any::<String>(), k1 in any_key(), k2 in any_key()) {
        prop_assume!(k1 != k2);
        let token = encrypt_payload(&plaintext, &k1).unwrap();
        prop_assert!(decrypt_payload(&token, &k2).is_err());
    }

    #[test]
    fn flipped_byte_is_rejected(
        plaintext in "[ -~]{0,64}",
        key in any_key(),
        index in any::<prop::sample::Index>(),
        bit in 0u8..8,
    ) {
        let token = encrypt_payload(&plaintext, &key).unwrap();
        let (iv, sealed) = token.split_once(':').unwrap();
        let mut bytes = base64_decode(sealed).unwrap();
        let i = index.index(bytes.len());
        bytes[i] ^= 1 << bit;
        let forged = format!("{}:{}", iv, base64_encode(&bytes));
        let err = decrypt_payload(&forged, &key).unwrap_err();
        prop_assert!(matches!(
            err,
            CryptoError::DecryptionFailed(_) | CryptoError::MalformedToken(_)
        ));
    }

    #[test]
    fn arbitrary_tokens_never_panic(token in any::<String>(), key in any_key()) {
        let _ = decrypt_payload(&token, &key);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn key_wrap_round_trip(bytes in any_key()) {
        let pair = test_keypair();
        let key = SymmetricKey::from_slice(&bytes).unwrap();
        let wrapped = wrap_key(key.as_bytes(), pair.public()).unwrap();
        prop_assert_eq!(unwrap_key(&wrapped, pair.private()).unwrap(), key);
    }

    #[test]
    fn envelope_round_trip(plaintext in any::<String>()) {
        let pair = test_keypair();
        let envelope = seal(&plaintext, pair.public()).unwrap();
        prop_assert_eq!(open(&envelope, pair.private()).unwrap(), plaintext);
    }
}
