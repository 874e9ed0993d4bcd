//! Reversible, tamper-evident encoding of employee ids for URLs.
//!
//! Token layout, base64url without padding:
//! `decimal id bytes || HMAC-SHA256(key, purpose || 0x00 || decimal id)`.
//! The purpose string scopes tokens so one minted for another use never
//! decodes here.

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use thiserror::Error;

use staffdesk_core::EmployeeId;

type HmacSha256 = Hmac<Sha256>;

const TAG_LEN: usize = 32;

/// Purpose string for ids embedded in employee routes.
pub const EMPLOYEE_ID_PURPOSE: &str = "EmployeeIdRouteValue";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProtectError {
    #[error("protection key must not be empty")]
    EmptyKey,

    #[error("token is not valid base64url")]
    Encoding,

    #[error("token is too short")]
    Truncated,

    #[error("token signature does not match")]
    Tampered,

    #[error("token payload is not an id")]
    Payload,
}

#[derive(Clone)]
pub struct IdProtector {
    mac: HmacSha256,
}

impl core::fmt::Debug for IdProtector {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("IdProtector").finish_non_exhaustive()
    }
}

impl IdProtector {
    pub fn new(key: impl AsRef<[u8]>, purpose: &str) -> Result<Self, ProtectError> {
        let key = key.as_ref();
        if key.is_empty() {
            return Err(ProtectError::EmptyKey);
        }
        let mut mac = HmacSha256::new_from_slice(key).map_err(|_| ProtectError::EmptyKey)?;
        mac.update(purpose.as_bytes());
        mac.update(&[0]);
        Ok(Self { mac })
    }

    pub fn for_employee_ids(key: impl AsRef<[u8]>) -> Result<Self, ProtectError> {
        Self::new(key, EMPLOYEE_ID_PURPOSE)
    }

    pub fn protect(&self, id: EmployeeId) -> String {
        let payload = id.get().to_string();
        let mut raw = payload.clone().into_bytes();
        raw.extend_from_slice(&self.tag(payload.as_bytes()));
        URL_SAFE_NO_PAD.encode(raw)
    }

    pub fn unprotect(&self, token: &str) -> Result<EmployeeId, ProtectError> {
        let raw = URL_SAFE_NO_PAD.decode(token.trim()).map_err(|_| ProtectError::Encoding)?;
        if raw.len() <= TAG_LEN {
            return Err(ProtectError::Truncated);
        }
        let (payload, tag) = raw.split_at(raw.len() - TAG_LEN);

        let mut mac = self.mac.clone();
        mac.update(payload);
        mac.verify_slice(tag).map_err(|_| ProtectError::Tampered)?;

        let text = core::str::from_utf8(payload).map_err(|_| ProtectError::Payload)?;
        text.parse::<u64>().map(EmployeeId::new).map_err(|_| ProtectError::Payload)
    }

    fn tag(&self, payload: &[u8]) -> [u8; TAG_LEN] {
        let mut mac = self.mac.clone();
        mac.update(payload);
        let mut out = [0u8; TAG_LEN];
        out.copy_from_slice(&mac.finalize().into_bytes());
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn protector() -> IdProtector {
        IdProtector::for_employee_ids("test-key").unwrap()
    }

    #[test]
    fn empty_key_is_refused() {
        assert_eq!(IdProtector::for_employee_ids("").unwrap_err(), ProtectError::EmptyKey);
    }

    #[test]
    fn tokens_are_url_safe() {
        let token = protector().protect(EmployeeId::new(42));
        assert!(token.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
    }

    #[test]
    fn other_purpose_or_key_cannot_decode() {
        let token = protector().protect(EmployeeId::new(7));
        let other_purpose = IdProtector::new("test-key", "SomethingElse").unwrap();
        let other_key = IdProtector::for_employee_ids("another-key").unwrap();
        assert_eq!(other_purpose.unprotect(&token), Err(ProtectError::Tampered));
        assert_eq!(other_key.unprotect(&token), Err(ProtectError::Tampered));
    }

    #[test]
    fn garbage_is_rejected() {
        let p = protector();
        assert_eq!(p.unprotect("not base64!"), Err(ProtectError::Encoding));
        assert_eq!(p.unprotect("AAAA"), Err(ProtectError::Truncated));
        assert!(p.unprotect("").is_err());
    }

    proptest! {
        #![proptest_config(ProptestConfig { cases: 256, ..ProptestConfig::default() })]

        #[test]
        fn decode_inverts_encode(id in any::<u64>()) {
            let p = protector();
            prop_assert_eq!(p.unprotect(&p.protect(EmployeeId::new(id))), Ok(EmployeeId::new(id)));
        }

        #[test]
        fn flipping_any_byte_is_detected(id in any::<u64>(), pos in any::<prop::sample::Index>(), bit in 0u8..8) {
            let p = protector();
            let mut raw = URL_SAFE_NO_PAD.decode(p.protect(EmployeeId::new(id))).unwrap();
            let i = pos.index(raw.len());
            raw[i] ^= 1 << bit;
            let tampered = URL_SAFE_NO_PAD.encode(&raw);
            prop_assert!(p.unprotect(&tampered).is_err());
        }
    }
}
