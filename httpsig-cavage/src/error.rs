use thiserror::Error;

/// Result type for http signature
pub type HttpSigResult<T> = std::result::Result<T, HttpSigError>;

/// Error type for http signature
#[derive(Error, Debug)]
pub enum HttpSigError {
  /* ----- Configuration errors ----- */
  /// Required properties are not set, listed by name in canonical order
  #[error("Missing required properties: {}", .0.join(" "))]
  MissingRequiredProperties(Vec<&'static str>),

  /// Signer configured with an invalid set of headers to sign
  #[error("{0}")]
  InvalidSignerConfig(String),

  /* ----- Canonicalization errors ----- */
  /// No `Date` header in the message while signing in date-only mode
  #[error("A HTTP message must contain at least a date header to be signed")]
  MissingDateHeader,

  /// Headers to sign absent from the message
  #[error("The following headers cannot be found in the message: {}", .0.iter().map(|h| format!("'{h}'")).collect::<Vec<_>>().join(", "))]
  MissingHeaders(Vec<String>),

  /// Pseudo-header used against the wrong message role
  #[error("Header '{0}' can only be used with HTTP {1}")]
  InvalidPseudoHeader(&'static str, &'static str),

  /// Header value could not be read as a string
  #[error("Invalid header value: {0}")]
  InvalidHeaderValue(String),

  /* ----- Signature header errors ----- */
  /// Malformed `Signature` header value
  #[error("Invalid Signature header: {0}")]
  InvalidSignatureHeader(String),

  /// Algorithm name not in the registry
  #[error("Unsupported algorithm '{0}'")]
  UnsupportedAlgorithm(String),

  /* ----- Crypto errors ----- */
  /// No key registered for the key id
  #[error("No {kind} found for keyId '{key_id}'")]
  KeyNotFound { kind: &'static str, key_id: String },

  /// Key is not usable with the algorithm
  #[error("Invalid key type: {0}")]
  InvalidKeyType(String),

  /// Invalid private key for asymmetric algorithm
  #[error("Failed to parse private key: {0}")]
  ParsePrivateKeyError(String),

  /// Invalid public key for asymmetric algorithm
  #[error("Failed to parse public key: {0}")]
  ParsePublicKeyError(String),

  #[error("Base64 decode error: {0}")]
  Base64DecodeError(#[from] base64::DecodeError),

  /// Crypto provider cannot serve the algorithm
  #[error("Provider '{provider}' does not support algorithm '{algorithm}'")]
  UnsupportedProvider { provider: String, algorithm: String },

  /// Failure inside a cryptographic primitive
  #[error("Crypto error: {0}")]
  CryptoError(String),

  /* ----- Verification errors ----- */
  /// Verification could not be carried out for the message
  #[error("Unable to verify message '{message}'")]
  VerificationFailed {
    message: String,
    #[source]
    source: Box<HttpSigError>,
  },
}

impl HttpSigError {
  /// Errors raised by an incompatible key, algorithm or provider rather than by the message itself
  pub fn is_security_error(&self) -> bool {
    matches!(
      self,
      Self::InvalidKeyType(_) | Self::UnsupportedProvider { .. } | Self::CryptoError(_)
    )
  }
}
