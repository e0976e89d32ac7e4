use super::MacPrimitive;
use crate::error::{HttpSigError, HttpSigResult};
use base64::{engine::general_purpose, Engine as _};
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256Inner = Hmac<Sha256>;

/* -------------------------------- */
#[derive(Clone, PartialEq, Eq)]
/// Shared secret key for hmac algorithms
pub struct SecretKey(Vec<u8>);

impl SecretKey {
  /// Create a secret key from raw bytes
  pub fn from_bytes(key: &[u8]) -> Self {
    SecretKey(key.to_vec())
  }

  /// Create a secret key from base64 encoded string
  pub fn from_base64(key: &str) -> HttpSigResult<Self> {
    let key = general_purpose::STANDARD.decode(key.trim())?;
    Ok(SecretKey(key))
  }

  pub fn as_bytes(&self) -> &[u8] {
    &self.0
  }
}

impl std::fmt::Debug for SecretKey {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "SecretKey({} bytes)", self.0.len())
  }
}

/* -------------------------------- */
/// hmac-sha256
pub(super) struct HmacSha256;

impl HmacSha256 {
  fn mac(key: &SecretKey, data: &[u8]) -> HttpSigResult<HmacSha256Inner> {
    let mut mac = HmacSha256Inner::new_from_slice(key.as_bytes()).map_err(|e| HttpSigError::CryptoError(e.to_string()))?;
    mac.update(data);
    Ok(mac)
  }
}

impl MacPrimitive for HmacSha256 {
  fn compute(&self, key: &SecretKey, data: &[u8]) -> HttpSigResult<Vec<u8>> {
    Ok(Self::mac(key, data)?.finalize().into_bytes().to_vec())
  }

  fn verify(&self, key: &SecretKey, data: &[u8], expected: &[u8]) -> HttpSigResult<bool> {
    // verify_slice compares in constant time
    Ok(Self::mac(key, data)?.verify_slice(expected).is_ok())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_hmac_compute_verify() {
    let key = SecretKey::from_bytes(b"01234567890123456789012345678901");
    let data = b"hello";
    let mac = HmacSha256.compute(&key, data).unwrap();
    assert_eq!(mac.len(), 32);
    assert!(HmacSha256.verify(&key, data, &mac).unwrap());
    assert!(!HmacSha256.verify(&key, b"hellp", &mac).unwrap());
    assert!(!HmacSha256.verify(&key, data, &mac[..16]).unwrap());
  }

  #[test]
  fn test_from_base64() {
    let key = SecretKey::from_base64("AQID").unwrap();
    assert_eq!(key.as_bytes(), &[1, 2, 3]);
    assert!(matches!(
      SecretKey::from_base64("not base64!"),
      Err(HttpSigError::Base64DecodeError(_))
    ));
  }
}
