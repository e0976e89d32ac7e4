use crate::error::{HyperSigError, HyperSigResult};
use http::{header::HeaderName, HeaderMap, HeaderValue, Request, Response, StatusCode};
use httpsig_cavage::prelude::{
  HttpMessage, HttpMessageMut, HttpMessageSigner, HttpMessageVerifier, HttpRequest, HttpResponse, HttpSigResult,
  MessageRole, SIGNATURE_HEADER,
};
use tracing::{debug, error};

/* --------------------------------------- */
/// Read-only view of an [`http::Request`] as a signable message, used for verification
pub struct RequestMessage<'a, B>(&'a Request<B>);

/// Mutable view of an [`http::Request`], used for signing
pub struct RequestMessageMut<'a, B>(&'a mut Request<B>);

/// Read-only view of an [`http::Response`] as a signable message, used for verification
pub struct ResponseMessage<'a, B>(&'a Response<B>);

/// Mutable view of an [`http::Response`], used for signing
pub struct ResponseMessageMut<'a, B>(&'a mut Response<B>);

impl<'a, B> RequestMessage<'a, B> {
  pub fn new(inner: &'a Request<B>) -> Self {
    Self(inner)
  }
}

impl<'a, B> RequestMessageMut<'a, B> {
  pub fn new(inner: &'a mut Request<B>) -> Self {
    Self(inner)
  }
}

impl<'a, B> ResponseMessage<'a, B> {
  pub fn new(inner: &'a Response<B>) -> Self {
    Self(inner)
  }
}

impl<'a, B> ResponseMessageMut<'a, B> {
  pub fn new(inner: &'a mut Response<B>) -> Self {
    Self(inner)
  }
}

impl<B> HttpRequest for RequestMessage<'_, B> {
  fn method(&self) -> &str {
    self.0.method().as_str()
  }
  fn path(&self) -> &str {
    self.0.uri().path()
  }
  fn query(&self) -> Option<&str> {
    self.0.uri().query()
  }
}

impl<B> HttpMessage for RequestMessage<'_, B> {
  fn header_values(&self, name: &str) -> HttpSigResult<Vec<String>> {
    Ok(header_values_inner(self.0.headers(), name)?)
  }
  fn role(&self) -> MessageRole<'_> {
    MessageRole::Request(self)
  }
}

impl<B> HttpRequest for RequestMessageMut<'_, B> {
  fn method(&self) -> &str {
    self.0.method().as_str()
  }
  fn path(&self) -> &str {
    self.0.uri().path()
  }
  fn query(&self) -> Option<&str> {
    self.0.uri().query()
  }
}

impl<B> HttpMessage for RequestMessageMut<'_, B> {
  fn header_values(&self, name: &str) -> HttpSigResult<Vec<String>> {
    Ok(header_values_inner(self.0.headers(), name)?)
  }
  fn role(&self) -> MessageRole<'_> {
    MessageRole::Request(self)
  }
}

impl<B> HttpMessageMut for RequestMessageMut<'_, B> {
  fn add_header(&mut self, name: &str, value: &str) -> HttpSigResult<()> {
    Ok(add_header_inner(self.0.headers_mut(), name, value)?)
  }
}

impl<B> HttpResponse for ResponseMessage<'_, B> {
  fn status_code(&self) -> u16 {
    self.0.status().as_u16()
  }
}

impl<B> HttpMessage for ResponseMessage<'_, B> {
  fn header_values(&self, name: &str) -> HttpSigResult<Vec<String>> {
    Ok(header_values_inner(self.0.headers(), name)?)
  }
  fn role(&self) -> MessageRole<'_> {
    MessageRole::Response(self)
  }
}

impl<B> HttpResponse for ResponseMessageMut<'_, B> {
  fn status_code(&self) -> u16 {
    self.0.status().as_u16()
  }
}

impl<B> HttpMessage for ResponseMessageMut<'_, B> {
  fn header_values(&self, name: &str) -> HttpSigResult<Vec<String>> {
    Ok(header_values_inner(self.0.headers(), name)?)
  }
  fn role(&self) -> MessageRole<'_> {
    MessageRole::Response(self)
  }
}

impl<B> HttpMessageMut for ResponseMessageMut<'_, B> {
  fn add_header(&mut self, name: &str, value: &str) -> HttpSigResult<()> {
    Ok(add_header_inner(self.0.headers_mut(), name, value)?)
  }
}

/* --------------------------------------- */
/// A trait about http message signature for request
pub trait MessageSignatureReq {
  type Error;

  /// Check if the request has a signature header
  fn has_message_signature(&self) -> bool;

  /// Sign the request in place, appending the signature headers
  fn sign_message(&mut self, signer: &HttpMessageSigner) -> Result<(), Self::Error>;

  /// Verify the request signature. `Ok(false)` on mismatch.
  fn verify_message(&self, verifier: &HttpMessageVerifier) -> Result<bool, Self::Error>;
}

/// A trait about http message signature for response
pub trait MessageSignatureRes {
  type Error;

  /// Check if the response has a signature header
  fn has_message_signature(&self) -> bool;

  /// Sign the response in place, appending the signature headers
  fn sign_message(&mut self, signer: &HttpMessageSigner) -> Result<(), Self::Error>;

  /// Verify the response signature. `Ok(false)` on mismatch.
  fn verify_message(&self, verifier: &HttpMessageVerifier) -> Result<bool, Self::Error>;
}

impl<B> MessageSignatureReq for Request<B> {
  type Error = HyperSigError;

  fn has_message_signature(&self) -> bool {
    has_message_signature_inner(self.headers())
  }

  fn sign_message(&mut self, signer: &HttpMessageSigner) -> HyperSigResult<()> {
    signer.sign(&mut RequestMessageMut::new(self))?;
    Ok(())
  }

  fn verify_message(&self, verifier: &HttpMessageVerifier) -> HyperSigResult<bool> {
    if !self.has_message_signature() {
      return Err(HyperSigError::NoSignatureHeaders(
        "The request does not have signature header".to_string(),
      ));
    }
    Ok(verifier.verify(&RequestMessage::new(self))?)
  }
}

impl<B> MessageSignatureRes for Response<B> {
  type Error = HyperSigError;

  fn has_message_signature(&self) -> bool {
    has_message_signature_inner(self.headers())
  }

  fn sign_message(&mut self, signer: &HttpMessageSigner) -> HyperSigResult<()> {
    signer.sign(&mut ResponseMessageMut::new(self))?;
    Ok(())
  }

  fn verify_message(&self, verifier: &HttpMessageVerifier) -> HyperSigResult<bool> {
    if !self.has_message_signature() {
      return Err(HyperSigError::NoSignatureHeaders(
        "The response does not have signature header".to_string(),
      ));
    }
    Ok(verifier.verify(&ResponseMessage::new(self))?)
  }
}

/* --------------------------------------- */
/// Gate an incoming request on its signature.
///
/// Passes a verified request, answers `401 Unauthorized` for a missing, unverifiable or mismatching signature,
/// and `500 Internal Server Error` when the key or provider setup cannot serve the algorithm.
pub fn verify_request_or_unauthorized<B>(req: &Request<B>, verifier: &HttpMessageVerifier) -> Result<(), StatusCode> {
  match req.verify_message(verifier) {
    Ok(true) => Ok(()),
    Ok(false) => {
      debug!("Signature mismatch for {} {}", req.method(), req.uri().path());
      Err(StatusCode::UNAUTHORIZED)
    }
    Err(HyperSigError::HttpSigError(e)) if e.is_security_error() => {
      error!("Cannot verify request signature: {e}");
      Err(StatusCode::INTERNAL_SERVER_ERROR)
    }
    Err(e) => {
      debug!("Reject request: {e}");
      Err(StatusCode::UNAUTHORIZED)
    }
  }
}

/* --------------------------------------- */
fn has_message_signature_inner(headers: &HeaderMap) -> bool {
  headers.contains_key(SIGNATURE_HEADER)
}

fn header_values_inner(headers: &HeaderMap, name: &str) -> HyperSigResult<Vec<String>> {
  let values = headers
    .get_all(name)
    .iter()
    .map(|v| v.to_str().map(|s| s.to_owned()))
    .collect::<Result<Vec<_>, _>>()?;
  Ok(values)
}

fn add_header_inner(headers: &mut HeaderMap, name: &str, value: &str) -> HyperSigResult<()> {
  let name = HeaderName::from_bytes(name.as_bytes())?;
  let value = HeaderValue::from_str(value)?;
  headers.append(name, value);
  Ok(())
}

/* --------------------------------------- */
#[cfg(test)]
#[path = "hyper_http_tests.rs"]
mod tests;
