//! Signed session tokens.
//!
//! A token is `base64url(json claims) "." hex(HMAC-SHA256(secret, payload))`
//! where `payload` is the base64url text. Claims are trusted once the
//! signature and expiry check out.

use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD as B64};
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use portal_core::session::Session;
use sha2::Sha256;
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;

/// Cookie carrying the session token.
pub const SESSION_COOKIE: &str = "portal_session";

/// Keyed HMAC used to sign and verify session tokens.
#[derive(Clone)]
pub struct SessionKeys {
  mac: HmacSha256,
}

impl std::fmt::Debug for SessionKeys {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("SessionKeys").finish_non_exhaustive()
  }
}

impl SessionKeys {
  pub fn new(secret: &[u8]) -> Result<Self, hmac::digest::InvalidLength> {
    Ok(Self { mac: <HmacSha256 as Mac>::new_from_slice(secret)? })
  }

  fn mac(&self, payload: &[u8]) -> Vec<u8> {
    let mut mac = self.mac.clone();
    mac.update(payload);
    mac.finalize().into_bytes().to_vec()
  }

  pub fn sign(&self, session: &Session) -> Result<String, serde_json::Error> {
    let claims = serde_json::to_vec(session)?;
    let payload = B64.encode(claims);
    let signature = hex::encode(self.mac(payload.as_bytes()));
    Ok(format!("{payload}.{signature}"))
  }

  /// `None` for malformed, forged or expired tokens.
  pub fn verify(&self, token: &str, now: DateTime<Utc>) -> Option<Session> {
    let (payload, signature) = token.trim().split_once('.')?;
    let given = hex::decode(signature).ok()?;
    let expected = self.mac(payload.as_bytes());
    if given.len() != expected.len() || !bool::from(expected.ct_eq(given.as_slice())) {
      return None;
    }
    let claims = B64.decode(payload).ok()?;
    let session: Session = serde_json::from_slice(&claims).ok()?;
    (!session.is_expired(now)).then_some(session)
  }
}

#[cfg(test)]
mod tests {
  use chrono::Duration;
  use portal_core::session::Role;
  use uuid::Uuid;

  use super::*;

  fn session(ttl: Duration) -> Session {
    Session {
      id:                  Uuid::new_v4(),
      role:                Role::Admin,
      tenant_id:           Uuid::new_v4(),
      communal_section_id: None,
      expires_at:          Utc::now() + ttl,
    }
  }

  fn keys() -> SessionKeys { SessionKeys::new(b"0123456789abcdef0123456789abcdef").unwrap() }

  #[test]
  fn signed_tokens_verify() {
    let s = session(Duration::hours(1));
    let token = keys().sign(&s).unwrap();
    let back = keys().verify(&token, Utc::now()).unwrap();
    assert_eq!(back.id, s.id);
    assert_eq!(back.tenant_id, s.tenant_id);
    assert_eq!(back.role, Role::Admin);
  }

  #[test]
  fn other_secret_is_rejected() {
    let token = keys().sign(&session(Duration::hours(1))).unwrap();
    let other = SessionKeys::new(b"another-secret-another-secret-xx").unwrap();
    assert!(other.verify(&token, Utc::now()).is_none());
  }

  #[test]
  fn tampered_claims_are_rejected() {
    let token = keys().sign(&session(Duration::hours(1))).unwrap();
    let (_, sig) = token.split_once('.').unwrap();
    let mut forged = session(Duration::hours(1));
    forged.role = Role::Admin;
    let payload = B64.encode(serde_json::to_vec(&forged).unwrap());
    assert!(keys().verify(&format!("{payload}.{sig}"), Utc::now()).is_none());
  }

  #[test]
  fn expired_tokens_are_rejected() {
    let token = keys().sign(&session(Duration::seconds(-5))).unwrap();
    assert!(keys().verify(&token, Utc::now()).is_none());
  }

  #[test]
  fn garbage_is_rejected() {
    for bad in ["", "abc", "abc.def", ".", "x.zz"] {
      assert!(keys().verify(bad, Utc::now()).is_none(), "{bad:?}");
    }
  }
}
