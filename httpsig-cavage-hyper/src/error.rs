use httpsig_cavage::prelude::HttpSigError;
use thiserror::Error;

/// Result type for http signature
pub type HyperSigResult<T> = std::result::Result<T, HyperSigError>;

/// Error type for http signature for hyper
#[derive(Error, Debug)]
pub enum HyperSigError {
  /// No signature header found
  #[error("No signature headers found: {0}")]
  NoSignatureHeaders(String),

  /// Failed to stringify a header value
  #[error("Failed to stringify header value: {0}")]
  FailedToStrHeader(#[from] http::header::ToStrError),

  /// Failed to parse header value
  #[error("Failed to parse header value: {0}")]
  InvalidHeaderValue(#[from] http::header::InvalidHeaderValue),

  /// Failed to parse header name
  #[error("Failed to parse header name: {0}")]
  InvalidHeaderName(#[from] http::header::InvalidHeaderName),

  /// Inherited from HttpSigError
  #[error("HttpSigError: {0}")]
  HttpSigError(#[from] HttpSigError),
}

impl From<HyperSigError> for HttpSigError {
  fn from(e: HyperSigError) -> Self {
    match e {
      HyperSigError::HttpSigError(inner) => inner,
      other => HttpSigError::InvalidHeaderValue(other.to_string()),
    }
  }
}
