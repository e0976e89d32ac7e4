use crate::{
  crypto::{AlgorithmKind, AlgorithmName, CryptoProvider, RandomSource},
  error::{HttpSigError, HttpSigResult},
  key_map::KeyMap,
  message::HttpMessageMut,
  signature_header::{quote, PARAM_ALGORITHM, PARAM_HEADERS, PARAM_KEY_ID, PARAM_SIGNATURE},
  signing_string::SigningStringBuilder,
  trace::*,
  util::{dedup_header_names, normalize_header_name},
  DATE_HEADER, REQUEST_TARGET, SIGNATURE_HEADER,
};
use base64::{engine::general_purpose, Engine as _};
use std::sync::Arc;

/// Signs http messages by appending `Signature` headers.
///
/// Immutable once built and shareable across threads. Each call to [`HttpMessageSigner::sign`] is independent.
pub struct HttpMessageSigner {
  key_id: String,
  key_map: Arc<dyn KeyMap>,
  algorithm: AlgorithmName,
  signing_string_builder: SigningStringBuilder,
  provider: Option<Arc<dyn CryptoProvider>>,
  random: RandomSource,
}

impl HttpMessageSigner {
  pub fn builder() -> HttpMessageSignerBuilder {
    HttpMessageSignerBuilder::default()
  }

  pub fn key_id(&self) -> &str {
    &self.key_id
  }

  pub fn algorithm(&self) -> AlgorithmName {
    self.algorithm
  }

  /// Headers to sign as configured, empty in date-only mode
  pub fn headers_to_sign(&self) -> &[String] {
    self.signing_string_builder.headers()
  }

  /// Sign the message in place.
  ///
  /// `keyId`, `algorithm`, `headers` (unless in date-only mode) and `signature` are appended as separate `Signature` header
  /// occurrences. Existing headers are left untouched. Nothing is appended when signing fails.
  pub fn sign<M>(&self, message: &mut M) -> HttpSigResult<()>
  where
    M: HttpMessageMut + ?Sized,
  {
    let signing_string = self.signing_string_builder.signing_string(&*message)?;
    let signature = self.compute(&signing_string.as_bytes())?;
    let signature = general_purpose::STANDARD.encode(signature);

    message.add_header(SIGNATURE_HEADER, &format!("{PARAM_KEY_ID}={}", quote(&self.key_id)))?;
    message.add_header(SIGNATURE_HEADER, &format!("{PARAM_ALGORITHM}={}", quote(self.algorithm.as_str())))?;
    if !self.headers_to_sign().is_empty() {
      let headers = self
        .headers_to_sign()
        .iter()
        .map(|h| normalize_header_name(h))
        .collect::<Vec<_>>()
        .join(" ");
      message.add_header(SIGNATURE_HEADER, &format!("{PARAM_HEADERS}={}", quote(&headers)))?;
    }
    message.add_header(SIGNATURE_HEADER, &format!("{PARAM_SIGNATURE}={}", quote(&signature)))?;

    debug!("Signed message '{}' with keyId '{}'", message.role().label(), self.key_id);
    Ok(())
  }

  fn compute(&self, data: &[u8]) -> HttpSigResult<Vec<u8>> {
    match self.algorithm.kind() {
      AlgorithmKind::PublicKey => {
        let key = self.key_map.private_key(&self.key_id).ok_or_else(|| HttpSigError::KeyNotFound {
          kind: "private key",
          key_id: self.key_id.clone(),
        })?;
        let primitive = match &self.provider {
          Some(provider) => self.algorithm.create_signature_with(provider.as_ref())?,
          None => self.algorithm.create_signature()?,
        };
        primitive.sign(&key, self.random, data)
      }
      AlgorithmKind::SecretKey => {
        let key = self.key_map.secret_key(&self.key_id).ok_or_else(|| HttpSigError::KeyNotFound {
          kind: "secret key",
          key_id: self.key_id.clone(),
        })?;
        let primitive = match &self.provider {
          Some(provider) => self.algorithm.create_mac_with(provider.as_ref())?,
          None => self.algorithm.create_mac()?,
        };
        primitive.compute(&key, data)
      }
    }
  }
}

/* -------------------------------- */
#[derive(Default, Clone)]
/// Builder of [`HttpMessageSigner`]
pub struct HttpMessageSignerBuilder {
  key_id: Option<String>,
  key_map: Option<Arc<dyn KeyMap>>,
  algorithm: Option<AlgorithmName>,
  headers_to_sign: Vec<String>,
  provider: Option<Arc<dyn CryptoProvider>>,
  random: Option<RandomSource>,
}

impl HttpMessageSignerBuilder {
  pub fn key_id(&mut self, key_id: &str) -> &mut Self {
    self.key_id = Some(key_id.to_string());
    self
  }

  pub fn key_map(&mut self, key_map: Arc<dyn KeyMap>) -> &mut Self {
    self.key_map = Some(key_map);
    self
  }

  pub fn algorithm(&mut self, algorithm: AlgorithmName) -> &mut Self {
    self.algorithm = Some(algorithm);
    self
  }

  /// Append a header to sign. Ignored if already present, compared case-insensitively.
  pub fn add_header_to_sign(&mut self, header: &str) -> &mut Self {
    let name = normalize_header_name(header);
    if !self.headers_to_sign.iter().any(|h| normalize_header_name(h) == name) {
      self.headers_to_sign.push(header.to_string());
    }
    self
  }

  /// Replace the headers to sign
  pub fn headers_to_sign<I, S>(&mut self, headers: I) -> &mut Self
  where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
  {
    self.headers_to_sign = dedup_header_names(headers);
    self
  }

  /// Pin every primitive to the given provider
  pub fn provider(&mut self, provider: Arc<dyn CryptoProvider>) -> &mut Self {
    self.provider = Some(provider);
    self
  }

  /// Randomness for asymmetric signing. Defaults to [`RandomSource::shared`].
  pub fn random_source(&mut self, random: RandomSource) -> &mut Self {
    self.random = Some(random);
    self
  }

  pub fn build(&self) -> HttpSigResult<HttpMessageSigner> {
    let mut missing = vec![];
    if self.key_id.is_none() {
      missing.push("keyId");
    }
    if self.key_map.is_none() {
      missing.push("keyMap");
    }
    if self.algorithm.is_none() {
      missing.push("algorithm");
    }
    let (Some(key_id), Some(key_map), Some(algorithm)) = (&self.key_id, &self.key_map, self.algorithm) else {
      return Err(HttpSigError::MissingRequiredProperties(missing));
    };

    if !self.headers_to_sign.is_empty() {
      let contains = |name: &str| self.headers_to_sign.iter().any(|h| normalize_header_name(h) == name);
      if !contains(&normalize_header_name(DATE_HEADER)) {
        return Err(HttpSigError::InvalidSignerConfig(format!(
          "HttpMessageSigner should be configured to sign the '{DATE_HEADER}' header"
        )));
      }
      if !contains(REQUEST_TARGET) {
        return Err(HttpSigError::InvalidSignerConfig(format!(
          "HttpMessageSigner should be configured to sign the '{REQUEST_TARGET}' header"
        )));
      }
    }

    Ok(HttpMessageSigner {
      key_id: key_id.clone(),
      key_map: key_map.clone(),
      algorithm,
      signing_string_builder: SigningStringBuilder::for_headers(&self.headers_to_sign),
      provider: self.provider.clone(),
      random: self.random.unwrap_or_else(RandomSource::shared),
    })
  }
}
