use super::{random::StrongRng, AlgorithmName, PrivateKey, PublicKey, RandomSource, SignaturePrimitive};
use crate::{
  error::{HttpSigError, HttpSigResult},
  trace::*,
};
use p256::ecdsa::{
  Signature as EcdsaSignature, SigningKey as EcdsaSigningKey, VerifyingKey as EcdsaVerifyingKey,
};
use rsa::{
  pkcs1v15,
  signature::{RandomizedSigner, SignatureEncoding, Signer, Verifier},
};
use sha1::Sha1;
use sha2::Sha256;

/* -------------------------------- */
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Digest paired with RSASSA-PKCS1-v1_5
pub(super) enum RsaDigest {
  Sha1,
  Sha256,
}

/// RSASSA-PKCS1-v1_5 signatures
pub(super) struct RsaPkcs1v15 {
  pub(super) algorithm: AlgorithmName,
  pub(super) digest: RsaDigest,
}

impl SignaturePrimitive for RsaPkcs1v15 {
  fn sign(&self, key: &PrivateKey, random: RandomSource, data: &[u8]) -> HttpSigResult<Vec<u8>> {
    let PrivateKey::Rsa(sk) = key else {
      return Err(mismatch(self.algorithm, key.key_type()));
    };
    debug!("Sign with {} ({:?} randomness)", self.algorithm, random);
    let res = match (self.digest, random) {
      (RsaDigest::Sha1, RandomSource::Strong) => {
        pkcs1v15::SigningKey::<Sha1>::new(sk.clone()).try_sign_with_rng(&mut StrongRng::new(), data)
      }
      (RsaDigest::Sha1, RandomSource::Default) => pkcs1v15::SigningKey::<Sha1>::new(sk.clone()).try_sign(data),
      (RsaDigest::Sha256, RandomSource::Strong) => {
        pkcs1v15::SigningKey::<Sha256>::new(sk.clone()).try_sign_with_rng(&mut StrongRng::new(), data)
      }
      (RsaDigest::Sha256, RandomSource::Default) => pkcs1v15::SigningKey::<Sha256>::new(sk.clone()).try_sign(data),
    };
    res
      .map(|sig| sig.to_vec())
      .map_err(|e| HttpSigError::CryptoError(e.to_string()))
  }

  fn verify(&self, key: &PublicKey, data: &[u8], signature: &[u8]) -> HttpSigResult<bool> {
    let PublicKey::Rsa(pk) = key else {
      return Err(mismatch(self.algorithm, key.key_type()));
    };
    let Ok(sig) = pkcs1v15::Signature::try_from(signature) else {
      debug!("Malformed {} signature", self.algorithm);
      return Ok(false);
    };
    let res = match self.digest {
      RsaDigest::Sha1 => pkcs1v15::VerifyingKey::<Sha1>::new(pk.clone()).verify(data, &sig),
      RsaDigest::Sha256 => pkcs1v15::VerifyingKey::<Sha256>::new(pk.clone()).verify(data, &sig),
    };
    Ok(res.is_ok())
  }
}

/* -------------------------------- */
/// ECDSA over P-256 with SHA-256, DER encoded signatures
pub(super) struct EcdsaP256Sha256;

impl SignaturePrimitive for EcdsaP256Sha256 {
  fn sign(&self, key: &PrivateKey, random: RandomSource, data: &[u8]) -> HttpSigResult<Vec<u8>> {
    let PrivateKey::EcdsaP256(sk) = key else {
      return Err(mismatch(AlgorithmName::EcdsaSha256, key.key_type()));
    };
    let signing_key = EcdsaSigningKey::from(sk);
    let res: Result<EcdsaSignature, _> = match random {
      RandomSource::Strong => signing_key.try_sign_with_rng(&mut StrongRng::new(), data),
      RandomSource::Default => signing_key.try_sign(data),
    };
    res
      .map(|sig| sig.to_der().as_bytes().to_vec())
      .map_err(|e| HttpSigError::CryptoError(e.to_string()))
  }

  fn verify(&self, key: &PublicKey, data: &[u8], signature: &[u8]) -> HttpSigResult<bool> {
    let PublicKey::EcdsaP256(pk) = key else {
      return Err(mismatch(AlgorithmName::EcdsaSha256, key.key_type()));
    };
    let Ok(sig) = EcdsaSignature::from_der(signature) else {
      debug!("Malformed ecdsa-sha256 signature");
      return Ok(false);
    };
    let verifying_key = EcdsaVerifyingKey::from(pk);
    Ok(verifying_key.verify(data, &sig).is_ok())
  }
}

fn mismatch(algorithm: AlgorithmName, key_type: &str) -> HttpSigError {
  HttpSigError::InvalidKeyType(format!("algorithm '{algorithm}' cannot be used with a {key_type} key"))
}
