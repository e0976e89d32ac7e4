mod asymmetric;
mod provider;
mod random;
mod signature;
mod symmetric;

use crate::error::{HttpSigError, HttpSigResult};

pub use asymmetric::{PrivateKey, PublicKey};
pub use provider::{CryptoProvider, RustCryptoProvider};
pub use random::RandomSource;
pub use symmetric::SecretKey;

#[cfg(test)]
pub(crate) use asymmetric::tests as test_keys;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// Kind of key an algorithm operates with
pub enum AlgorithmKind {
  /// Asymmetric: signed with a private key, verified with a public key
  PublicKey,
  /// Symmetric: MAC computed with a shared secret key
  SecretKey,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// Algorithm names, a closed catalog
pub enum AlgorithmName {
  RsaSha1,
  RsaSha256,
  EcdsaSha256,
  HmacSha256,
}

impl AlgorithmName {
  /// Every supported algorithm
  pub const ALL: [AlgorithmName; 4] = [Self::RsaSha1, Self::RsaSha256, Self::EcdsaSha256, Self::HmacSha256];

  /// Wire name used in the `algorithm` parameter
  pub fn as_str(&self) -> &'static str {
    match self {
      AlgorithmName::RsaSha1 => "rsa-sha1",
      AlgorithmName::RsaSha256 => "rsa-sha256",
      AlgorithmName::EcdsaSha256 => "ecdsa-sha256",
      AlgorithmName::HmacSha256 => "hmac-sha256",
    }
  }

  /// Underlying cryptographic primitive
  pub fn primitive(&self) -> &'static str {
    match self {
      AlgorithmName::RsaSha1 => "RSASSA-PKCS1-v1_5/SHA-1",
      AlgorithmName::RsaSha256 => "RSASSA-PKCS1-v1_5/SHA-256",
      AlgorithmName::EcdsaSha256 => "ECDSA-P256/SHA-256",
      AlgorithmName::HmacSha256 => "HMAC/SHA-256",
    }
  }

  pub fn kind(&self) -> AlgorithmKind {
    match self {
      AlgorithmName::RsaSha1 | AlgorithmName::RsaSha256 | AlgorithmName::EcdsaSha256 => AlgorithmKind::PublicKey,
      AlgorithmName::HmacSha256 => AlgorithmKind::SecretKey,
    }
  }

  /// Signature primitive from the built-in provider
  pub fn create_signature(&self) -> HttpSigResult<Box<dyn SignaturePrimitive>> {
    RustCryptoProvider.signature(*self)
  }

  /// Signature primitive pinned to the given provider
  pub fn create_signature_with(&self, provider: &dyn CryptoProvider) -> HttpSigResult<Box<dyn SignaturePrimitive>> {
    provider.signature(*self)
  }

  /// MAC primitive from the built-in provider
  pub fn create_mac(&self) -> HttpSigResult<Box<dyn MacPrimitive>> {
    RustCryptoProvider.mac(*self)
  }

  /// MAC primitive pinned to the given provider
  pub fn create_mac_with(&self, provider: &dyn CryptoProvider) -> HttpSigResult<Box<dyn MacPrimitive>> {
    provider.mac(*self)
  }
}

impl std::fmt::Display for AlgorithmName {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", self.as_str())
  }
}

impl core::str::FromStr for AlgorithmName {
  type Err = HttpSigError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    Self::ALL
      .into_iter()
      .find(|alg| alg.as_str() == s)
      .ok_or_else(|| HttpSigError::UnsupportedAlgorithm(s.to_string()))
  }
}

/// Asymmetric signature primitive
pub trait SignaturePrimitive: Send + Sync {
  /// Sign data with the private key. `random` selects the randomness for schemes that take one.
  fn sign(&self, key: &PrivateKey, random: RandomSource, data: &[u8]) -> HttpSigResult<Vec<u8>>;

  /// Verify the signature over data. A mismatch is `Ok(false)`, an unusable key is an error.
  fn verify(&self, key: &PublicKey, data: &[u8], signature: &[u8]) -> HttpSigResult<bool>;
}

/// Symmetric MAC primitive
pub trait MacPrimitive: Send + Sync {
  /// Compute the MAC of data
  fn compute(&self, key: &SecretKey, data: &[u8]) -> HttpSigResult<Vec<u8>>;

  /// Compare the MAC of data against the expected one in constant time
  fn verify(&self, key: &SecretKey, data: &[u8], expected: &[u8]) -> HttpSigResult<bool>;
}
