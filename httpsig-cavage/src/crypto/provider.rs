use super::{
  signature::{EcdsaP256Sha256, RsaDigest, RsaPkcs1v15},
  symmetric::HmacSha256,
  AlgorithmName, MacPrimitive, SignaturePrimitive,
};
use crate::error::{HttpSigError, HttpSigResult};

/// Source of cryptographic primitives.
///
/// A signer or verifier pinned to a provider obtains every primitive from it.
pub trait CryptoProvider: Send + Sync {
  /// Provider name, used in error messages
  fn name(&self) -> &str;

  /// Signature primitive for an asymmetric algorithm
  fn signature(&self, algorithm: AlgorithmName) -> HttpSigResult<Box<dyn SignaturePrimitive>>;

  /// MAC primitive for a symmetric algorithm
  fn mac(&self, algorithm: AlgorithmName) -> HttpSigResult<Box<dyn MacPrimitive>>;
}

#[derive(Debug, Clone, Copy, Default)]
/// Built-in provider backed by the RustCrypto crates
pub struct RustCryptoProvider;

impl RustCryptoProvider {
  fn unsupported(&self, algorithm: AlgorithmName) -> HttpSigError {
    HttpSigError::UnsupportedProvider {
      provider: self.name().to_string(),
      algorithm: algorithm.to_string(),
    }
  }
}

impl CryptoProvider for RustCryptoProvider {
  fn name(&self) -> &str {
    "rustcrypto"
  }

  fn signature(&self, algorithm: AlgorithmName) -> HttpSigResult<Box<dyn SignaturePrimitive>> {
    match algorithm {
      AlgorithmName::RsaSha1 => Ok(Box::new(RsaPkcs1v15 {
        algorithm,
        digest: RsaDigest::Sha1,
      })),
      AlgorithmName::RsaSha256 => Ok(Box::new(RsaPkcs1v15 {
        algorithm,
        digest: RsaDigest::Sha256,
      })),
      AlgorithmName::EcdsaSha256 => Ok(Box::new(EcdsaP256Sha256)),
      AlgorithmName::HmacSha256 => Err(self.unsupported(algorithm)),
    }
  }

  fn mac(&self, algorithm: AlgorithmName) -> HttpSigResult<Box<dyn MacPrimitive>> {
    match algorithm {
      AlgorithmName::HmacSha256 => Ok(Box::new(HmacSha256)),
      _ => Err(self.unsupported(algorithm)),
    }
  }
}
