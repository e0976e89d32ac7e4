use crate::{
  error::{HttpSigError, HttpSigResult},
  trace::*,
};
use ecdsa::elliptic_curve::PublicKey as EcPublicKey;
use p256::NistP256;
use pkcs8::{der::Decode, Document, PrivateKeyInfo};
use rsa::{
  pkcs1::DecodeRsaPrivateKey,
  pkcs8::{DecodePrivateKey, DecodePublicKey},
  RsaPrivateKey, RsaPublicKey,
};
use spki::SubjectPublicKeyInfoRef;

#[allow(non_upper_case_globals, dead_code)]
/// Algorithm OIDs
mod algorithm_oids {
  /// OID for `rsaEncryption`
  pub const Rsa: &str = "1.2.840.113549.1.1.1";
  /// OID for `id-ecPublicKey`
  pub const EC: &str = "1.2.840.10045.2.1";
}
#[allow(non_upper_case_globals, dead_code)]
/// Params OIDs
mod params_oids {
  // OID for the NIST P-256 elliptic curve.
  pub const Secp256r1: &str = "1.2.840.10045.3.1.7";
}

/* -------------------------------- */
#[derive(Clone)]
/// Private key for asymmetric algorithms, looked up by the signer
pub enum PrivateKey {
  /// rsa-sha1, rsa-sha256
  Rsa(RsaPrivateKey),
  /// ecdsa-sha256
  EcdsaP256(p256::SecretKey),
}

impl PrivateKey {
  /// Derive private key from PKCS#8 der bytes
  pub fn from_der(der: &[u8]) -> HttpSigResult<Self> {
    let pki = PrivateKeyInfo::from_der(der).map_err(|e| HttpSigError::ParsePrivateKeyError(e.to_string()))?;

    match pki.algorithm.oid.to_string().as_ref() {
      // rsa
      algorithm_oids::Rsa => {
        debug!("Read RSA private key");
        let sk = RsaPrivateKey::from_pkcs8_der(der).map_err(|e| HttpSigError::ParsePrivateKeyError(e.to_string()))?;
        Ok(Self::Rsa(sk))
      }
      // ec
      algorithm_oids::EC => {
        debug!("Read EC private key");
        let param = pki
          .algorithm
          .parameters_oid()
          .map_err(|e| HttpSigError::ParsePrivateKeyError(e.to_string()))?;
        let sk_bytes = sec1::EcPrivateKey::try_from(pki.private_key)
          .map_err(|e| HttpSigError::ParsePrivateKeyError(format!("Error decoding EcPrivateKey: {e}")))?
          .private_key;
        match param.to_string().as_ref() {
          params_oids::Secp256r1 => {
            let sk = p256::SecretKey::from_slice(sk_bytes).map_err(|e| HttpSigError::ParsePrivateKeyError(e.to_string()))?;
            Ok(Self::EcdsaP256(sk))
          }
          _ => Err(HttpSigError::ParsePrivateKeyError("Unsupported curve".to_string())),
        }
      }
      _ => Err(HttpSigError::ParsePrivateKeyError(
        "Unsupported algorithm that supports PEM format keys".to_string(),
      )),
    }
  }

  /// Derive private key from pem string, either PKCS#8 `PRIVATE KEY` or PKCS#1 `RSA PRIVATE KEY`
  pub fn from_pem(pem: &str) -> HttpSigResult<Self> {
    let (tag, doc) = Document::from_pem(pem.trim()).map_err(|e| HttpSigError::ParsePrivateKeyError(e.to_string()))?;
    match tag {
      "PRIVATE KEY" => Self::from_der(doc.as_bytes()),
      "RSA PRIVATE KEY" => {
        debug!("Read PKCS#1 RSA private key");
        let sk =
          RsaPrivateKey::from_pkcs1_der(doc.as_bytes()).map_err(|e| HttpSigError::ParsePrivateKeyError(e.to_string()))?;
        Ok(Self::Rsa(sk))
      }
      _ => Err(HttpSigError::ParsePrivateKeyError("Invalid tag".to_string())),
    }
  }

  /// Get public key from private key
  pub fn public_key(&self) -> PublicKey {
    match &self {
      Self::Rsa(key) => PublicKey::Rsa(key.to_public_key()),
      Self::EcdsaP256(key) => PublicKey::EcdsaP256(key.public_key()),
    }
  }

  /// Key type name, used in error messages
  pub fn key_type(&self) -> &'static str {
    match self {
      Self::Rsa(_) => "rsa",
      Self::EcdsaP256(_) => "ecdsa-p256",
    }
  }
}

impl std::fmt::Debug for PrivateKey {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "PrivateKey({})", self.key_type())
  }
}

/* -------------------------------- */
#[derive(Clone, Debug, PartialEq)]
/// Public key for asymmetric algorithms, looked up by the verifier
pub enum PublicKey {
  /// rsa-sha1, rsa-sha256
  Rsa(RsaPublicKey),
  /// ecdsa-sha256
  EcdsaP256(EcPublicKey<NistP256>),
}

impl PublicKey {
  /// Convert from SubjectPublicKeyInfo der bytes
  pub fn from_der(der: &[u8]) -> HttpSigResult<Self> {
    let spki_ref = SubjectPublicKeyInfoRef::from_der(der)
      .map_err(|e| HttpSigError::ParsePublicKeyError(format!("Error decoding SubjectPublicKeyInfo: {e}")))?;
    match spki_ref.algorithm.oid.to_string().as_ref() {
      // rsa
      algorithm_oids::Rsa => {
        let pk = RsaPublicKey::from_public_key_der(der).map_err(|e| HttpSigError::ParsePublicKeyError(e.to_string()))?;
        Ok(Self::Rsa(pk))
      }
      // ec
      algorithm_oids::EC => {
        let param = spki_ref
          .algorithm
          .parameters_oid()
          .map_err(|e| HttpSigError::ParsePublicKeyError(e.to_string()))?;
        let public_key = spki_ref
          .subject_public_key
          .as_bytes()
          .ok_or(HttpSigError::ParsePublicKeyError("Invalid public key".to_string()))?;
        match param.to_string().as_ref() {
          params_oids::Secp256r1 => {
            let pk = EcPublicKey::<NistP256>::from_sec1_bytes(public_key)
              .map_err(|e| HttpSigError::ParsePublicKeyError(e.to_string()))?;
            Ok(Self::EcdsaP256(pk))
          }
          _ => Err(HttpSigError::ParsePublicKeyError("Unsupported curve".to_string())),
        }
      }
      _ => Err(HttpSigError::ParsePublicKeyError(
        "Unsupported algorithm that supports PEM format keys".to_string(),
      )),
    }
  }

  /// Convert from pem string
  pub fn from_pem(pem: &str) -> HttpSigResult<Self> {
    let (tag, doc) = Document::from_pem(pem.trim()).map_err(|e| HttpSigError::ParsePublicKeyError(e.to_string()))?;
    if tag != "PUBLIC KEY" {
      return Err(HttpSigError::ParsePublicKeyError("Invalid tag".to_string()));
    };
    Self::from_der(doc.as_bytes())
  }

  /// Key type name, used in error messages
  pub fn key_type(&self) -> &'static str {
    match self {
      Self::Rsa(_) => "rsa",
      Self::EcdsaP256(_) => "ecdsa-p256",
    }
  }
}
