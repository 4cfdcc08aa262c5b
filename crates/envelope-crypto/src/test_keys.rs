//! 2048-bit RSA fixtures shared by unit tests.

use once_cell::sync::Lazy;

use crate::keys::KeyPair;

pub(crate) const TEST_PUBLIC_PEM: &str = include_str!("../testdata/test_public.pem");
pub(crate) const TEST_PRIVATE_PEM: &str = include_str!("../testdata/test_private.pem");
pub(crate) const TEST_PUBLIC_PKCS1_PEM: &str = include_str!("../testdata/test_public_pkcs1.pem");
pub(crate) const TEST_PRIVATE_PKCS1_PEM: &str =
    include_str!("../testdata/test_private_pkcs1.pem");
pub(crate) const OTHER_PUBLIC_PEM: &str = include_str!("../testdata/other_public.pem");
pub(crate) const OTHER_PRIVATE_PEM: &str = include_str!("../testdata/other_private.pem");

static TEST_KEYPAIR: Lazy<KeyPair> =
    Lazy::new(|| KeyPair::from_pem(TEST_PUBLIC_PEM, TEST_PRIVATE_PEM).unwrap());
static OTHER_KEYPAIR: Lazy<KeyPair> =
    Lazy::new(|| KeyPair::from_pem(OTHER_PUBLIC_PEM, OTHER_PRIVATE_PEM).unwrap());

pub(crate) fn test_keypair() -> &'static KeyPair {
    &TEST_KEYPAIR
}

pub(crate) fn other_keypair() -> &'static KeyPair {
    &OTHER_KEYPAIR
}
