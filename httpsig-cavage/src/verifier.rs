use crate::{
  crypto::{AlgorithmKind, CryptoProvider},
  error::{HttpSigError, HttpSigResult},
  key_map::KeyMap,
  message::HttpMessage,
  signature_header::SignatureHeaderElements,
  signing_string::SigningStringBuilder,
  trace::*,
  SIGNATURE_HEADER,
};
use base64::{engine::general_purpose, Engine as _};
use std::sync::Arc;

/// Verifies the `Signature` header of http messages. Never mutates the message.
pub struct HttpMessageVerifier {
  key_map: Arc<dyn KeyMap>,
  provider: Option<Arc<dyn CryptoProvider>>,
}

impl HttpMessageVerifier {
  pub fn builder() -> HttpMessageVerifierBuilder {
    HttpMessageVerifierBuilder::default()
  }

  /// Verify the message signature.
  ///
  /// Returns `Ok(false)` when the signature does not match. Errors raised by an incompatible key or
  /// provider are returned as they are, any other failure is wrapped into [`HttpSigError::VerificationFailed`].
  pub fn verify<M>(&self, message: &M) -> HttpSigResult<bool>
  where
    M: HttpMessage + ?Sized,
  {
    match self.try_verify(message) {
      Ok(verified) => Ok(verified),
      Err(e) if e.is_security_error() => Err(e),
      Err(e) => Err(HttpSigError::VerificationFailed {
        message: message.role().label(),
        source: Box::new(e),
      }),
    }
  }

  fn try_verify<M>(&self, message: &M) -> HttpSigResult<bool>
  where
    M: HttpMessage + ?Sized,
  {
    let header_values = message.header_values(SIGNATURE_HEADER)?;
    let elements = SignatureHeaderElements::from_header_values(&header_values)?;
    let signing_string = SigningStringBuilder::for_headers(elements.signed_headers()).signing_string(message)?;

    let Ok(signature) = general_purpose::STANDARD.decode(elements.signature()) else {
      debug!("Signature parameter is not valid base64");
      return Ok(false);
    };

    let algorithm = elements.algorithm();
    let key_id = elements.key_id();
    let verified = match algorithm.kind() {
      AlgorithmKind::PublicKey => {
        let key = self.key_map.public_key(key_id).ok_or_else(|| HttpSigError::KeyNotFound {
          kind: "public key",
          key_id: key_id.to_string(),
        })?;
        let primitive = match &self.provider {
          Some(provider) => algorithm.create_signature_with(provider.as_ref())?,
          None => algorithm.create_signature()?,
        };
        primitive.verify(&key, &signing_string.as_bytes(), &signature)?
      }
      AlgorithmKind::SecretKey => {
        let key = self.key_map.secret_key(key_id).ok_or_else(|| HttpSigError::KeyNotFound {
          kind: "secret key",
          key_id: key_id.to_string(),
        })?;
        let primitive = match &self.provider {
          Some(provider) => algorithm.create_mac_with(provider.as_ref())?,
          None => algorithm.create_mac()?,
        };
        primitive.verify(&key, &signing_string.as_bytes(), &signature)?
      }
    };

    if !verified {
      debug!("Signature mismatch for keyId '{key_id}' ({algorithm})");
    }
    Ok(verified)
  }
}

/* -------------------------------- */
#[derive(Default, Clone)]
/// Builder of [`HttpMessageVerifier`]
pub struct HttpMessageVerifierBuilder {
  key_map: Option<Arc<dyn KeyMap>>,
  provider: Option<Arc<dyn CryptoProvider>>,
}

impl HttpMessageVerifierBuilder {
  pub fn key_map(&mut self, key_map: Arc<dyn KeyMap>) -> &mut Self {
    self.key_map = Some(key_map);
    self
  }

  /// Pin every primitive to the given provider
  pub fn provider(&mut self, provider: Arc<dyn CryptoProvider>) -> &mut Self {
    self.provider = Some(provider);
    self
  }

  pub fn build(&self) -> HttpSigResult<HttpMessageVerifier> {
    let key_map = self
      .key_map
      .clone()
      .ok_or_else(|| HttpSigError::MissingRequiredProperties(vec!["keyMap"]))?;
    Ok(HttpMessageVerifier {
      key_map,
      provider: self.provider.clone(),
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{
    crypto::{test_keys::*, AlgorithmName, PublicKey, SecretKey},
    key_map::InMemoryKeyMap,
    message::mock::*,
  };

  const DATE: &str = "Sun, 05 Jan 2014 21:31:40 GMT";

  fn verifier(map: InMemoryKeyMap) -> HttpMessageVerifier {
    HttpMessageVerifier::builder().key_map(Arc::new(map)).build().unwrap()
  }

  #[test]
  fn test_builder_requires_key_map() {
    let err = HttpMessageVerifier::builder().build().err().unwrap();
    assert_eq!(err.to_string(), "Missing required properties: keyMap");
  }

  #[test]
  fn test_bad_request_is_wrapped() {
    let mut map = InMemoryKeyMap::new();
    map.insert_public_key("id", PublicKey::from_pem(RSA_PUBLIC_KEY).unwrap());
    let req = MockRequest::new("GET", "/foo")
      .with_header("Date", DATE)
      .with_header("Signature", "keyId=id,signature=AAAA=");
    let err = verifier(map).verify(&req).unwrap_err();
    assert_eq!(err.to_string(), "Unable to verify message 'GET /foo'");
    let HttpSigError::VerificationFailed { source, .. } = err else {
      panic!("unexpected error");
    };
    assert!(matches!(*source, HttpSigError::MissingRequiredProperties(ref m) if m == &["algorithm"]));
  }

  #[test]
  fn test_missing_key_is_wrapped() {
    let req = MockResponse::new(200)
      .with_header("Date", DATE)
      .with_header("Signature", r#"keyId="nobody",algorithm="hmac-sha256",signature="AAAA""#);
    let err = verifier(InMemoryKeyMap::new()).verify(&req).unwrap_err();
    assert_eq!(err.to_string(), "Unable to verify message '200 response'");
    assert!(matches!(
      err,
      HttpSigError::VerificationFailed { ref source, .. } if matches!(**source, HttpSigError::KeyNotFound { .. })
    ));
  }

  #[test]
  fn test_key_type_mismatch_is_not_wrapped() {
    let mut map = InMemoryKeyMap::new();
    map.insert_public_key("k", PublicKey::from_pem(P256_PUBLIC_KEY).unwrap());
    let req = MockRequest::new("GET", "/")
      .with_header("Date", DATE)
      .with_header("Signature", r#"keyId="k",algorithm="rsa-sha256",signature="AAAA""#);
    let err = verifier(map).verify(&req).unwrap_err();
    assert!(matches!(err, HttpSigError::InvalidKeyType(_)));
  }

  #[test]
  fn test_not_base64_is_mismatch() {
    let mut map = InMemoryKeyMap::new();
    map.insert_secret_key("k", SecretKey::from_bytes(b"secret"));
    let req = MockRequest::new("GET", "/")
      .with_header("Date", DATE)
      .with_header("Signature", r#"keyId="k",algorithm="hmac-sha256",signature="!!not base64!!""#);
    assert!(!verifier(map).verify(&req).unwrap());
  }

  #[test]
  fn test_missing_signed_header_is_wrapped() {
    let mut map = InMemoryKeyMap::new();
    map.insert_secret_key("k", SecretKey::from_bytes(b"secret"));
    let req = MockRequest::new("GET", "/")
      .with_header("Date", DATE)
      .with_header("Signature", r#"keyId="k",algorithm="hmac-sha256",headers="date digest",signature="AAAA""#);
    let err = verifier(map).verify(&req).unwrap_err();
    let HttpSigError::VerificationFailed { source, .. } = err else {
      panic!("unexpected error");
    };
    assert!(matches!(*source, HttpSigError::MissingHeaders(_)));
  }

  #[test]
  fn test_provider_override() {
    use crate::crypto::{MacPrimitive, SignaturePrimitive};

    struct NoMacProvider;
    impl CryptoProvider for NoMacProvider {
      fn name(&self) -> &str {
        "no-mac"
      }
      fn signature(&self, algorithm: AlgorithmName) -> HttpSigResult<Box<dyn SignaturePrimitive>> {
        crate::crypto::RustCryptoProvider.signature(algorithm)
      }
      fn mac(&self, algorithm: AlgorithmName) -> HttpSigResult<Box<dyn MacPrimitive>> {
        Err(HttpSigError::UnsupportedProvider {
          provider: self.name().to_string(),
          algorithm: algorithm.to_string(),
        })
      }
    }

    let mut map = InMemoryKeyMap::new();
    map.insert_secret_key("k", SecretKey::from_bytes(b"secret"));
    let verifier = HttpMessageVerifier::builder()
      .key_map(Arc::new(map))
      .provider(Arc::new(NoMacProvider))
      .build()
      .unwrap();
    let req = MockRequest::new("GET", "/")
      .with_header("Date", DATE)
      .with_header("Signature", r#"keyId="k",algorithm="hmac-sha256",signature="AAAA""#);
    let err = verifier.verify(&req).unwrap_err();
    assert_eq!(
      err.to_string(),
      "Provider 'no-mac' does not support algorithm 'hmac-sha256'"
    );
  }
}
