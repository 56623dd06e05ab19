//! PayHere request signing
//!
//! PayHere signs with an upper-case hex MD5 over a plain concatenation of
//! fields, with the merchant secret appended last.

use md5::{Digest, Md5};
use subtle::ConstantTimeEq;

use crate::config::Credentials;

fn md5_upper_hex(parts: &[&str]) -> String {
    let mut hasher = Md5::new();
    for part in parts {
        hasher.update(part.as_bytes());
    }
    hex::encode_upper(hasher.finalize())
}

/// Expected `md5sig` of a payment notification
///
/// The fields are used exactly as received; no trimming or reformatting.
pub fn notification_signature(
    credentials: Credentials<'_>,
    order_id: &str,
    amount: &str,
    currency: &str,
    status_code: &str,
) -> String {
    md5_upper_hex(&[
        credentials.merchant_id,
        order_id,
        amount,
        currency,
        status_code,
        credentials.merchant_secret,
    ])
}

/// `hash` field of a checkout form
pub fn checkout_hash(
    credentials: Credentials<'_>,
    order_id: &str,
    amount: &str,
    currency: &str,
) -> String {
    md5_upper_hex(&[
        credentials.merchant_id,
        order_id,
        amount,
        currency,
        credentials.merchant_secret,
    ])
}

/// Compare a supplied signature to the expected one, case-insensitively and
/// in constant time
pub fn signatures_match(expected: &str, supplied: &str) -> bool {
    let supplied = supplied.trim().to_ascii_uppercase();
    expected.as_bytes().ct_eq(supplied.as_bytes()).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    const CREDS: Credentials<'static> = Credentials {
        merchant_id: "1211149",
        merchant_secret: "secret",
    };

    #[test]
    fn test_notification_signature_is_md5_of_concatenation() {
        let sig = notification_signature(CREDS, "ORDER_acct123_1700000000", "2500.00", "LKR", "2");
        let expected = hex::encode_upper(Md5::digest(
            b"1211149ORDER_acct123_17000000002500.00LKR2secret",
        ));
        assert_eq!(sig, expected);
        assert_eq!(sig.len(), 32);
        assert!(sig.chars().all(|c| c.is_ascii_digit() || c.is_ascii_uppercase()));
    }

    #[test]
    fn test_checkout_hash_omits_status() {
        let hash = checkout_hash(CREDS, "ORDER_acct123_1", "2500.00", "LKR");
        let expected = hex::encode_upper(Md5::digest(b"1211149ORDER_acct123_12500.00LKRsecret"));
        assert_eq!(hash, expected);
    }

    #[test]
    fn test_signatures_match_ignores_case() {
        let sig = notification_signature(CREDS, "ORDER_a_1", "1.00", "USD", "2");
        assert!(signatures_match(&sig, &sig.to_lowercase()));
        assert!(!signatures_match(&sig, &sig[..31]));
        assert!(!signatures_match(&sig, ""));
    }
}
