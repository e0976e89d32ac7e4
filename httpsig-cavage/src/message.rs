use crate::error::HttpSigResult;

/// Minimal capability an HTTP request or response must offer to be verified.
///
/// Header lookup is case-insensitive and returns values in message order.
pub trait HttpMessage {
  /// All values of the header `name`, in the order they appear in the message. Empty if absent.
  fn header_values(&self, name: &str) -> HttpSigResult<Vec<String>>;

  /// Whether the message is a request or a response, with the role specific accessors
  fn role(&self) -> MessageRole<'_>;
}

/// Message that can be signed.
/// The signer only ever appends headers, it never replaces or reorders existing ones.
pub trait HttpMessageMut: HttpMessage {
  /// Append a header, keeping any existing value of the same name
  fn add_header(&mut self, name: &str, value: &str) -> HttpSigResult<()>;
}

/// Request specific accessors
pub trait HttpRequest {
  /// Request method as sent, e.g. `POST`
  fn method(&self) -> &str;
  /// Path of the target URI
  fn path(&self) -> &str;
  /// Query of the target URI without the leading `?`
  fn query(&self) -> Option<&str>;
}

/// Response specific accessors
pub trait HttpResponse {
  /// Numeric status code
  fn status_code(&self) -> u16;
}

/// Role of an http message
pub enum MessageRole<'a> {
  Request(&'a dyn HttpRequest),
  Response(&'a dyn HttpResponse),
}

impl MessageRole<'_> {
  /// Short human readable label, used in verification errors
  pub fn label(&self) -> String {
    match self {
      Self::Request(req) => match req.query() {
        Some(query) => format!("{} {}?{}", req.method(), req.path(), query),
        None => format!("{} {}", req.method(), req.path()),
      },
      Self::Response(res) => format!("{} response", res.status_code()),
    }
  }
}

/* ----------------------------------------------------------------- */
