use crate::{
  error::{HttpSigError, HttpSigResult},
  message::{HttpMessage, MessageRole},
  util::{dedup_header_names, normalize_header_name},
  DATE_HEADER, REQUEST_TARGET, RESPONSE_STATUS,
};

/* -------------------------------- */
#[derive(Debug, Clone, PartialEq, Eq)]
/// One `name: value` line of a signing string
struct SigningStringLine {
  /// lowercased header name or pseudo-header
  name: String,
  value: String,
}

impl std::fmt::Display for SigningStringLine {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}: {}", self.name, self.value)
  }
}

/* -------------------------------- */
#[derive(Debug, Clone, PartialEq, Eq)]
/// Canonical string that is signed or verified.
/// Lines are joined by `\n` without a trailing newline. Always ASCII.
pub struct SigningString {
  lines: Vec<SigningStringLine>,
}

impl SigningString {
  /// Values outside ASCII are rejected rather than transcoded
  fn from_lines(lines: Vec<SigningStringLine>) -> HttpSigResult<Self> {
    if let Some(line) = lines.iter().find(|line| !line.value.is_ascii()) {
      return Err(HttpSigError::InvalidHeaderValue(format!(
        "non-ASCII value of '{}' cannot be signed",
        line.name
      )));
    }
    Ok(Self { lines })
  }

  /// Returns the signing string as ASCII bytes to be signed
  pub fn as_bytes(&self) -> Vec<u8> {
    self.to_string().into_bytes()
  }
}

impl std::fmt::Display for SigningString {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    let joined = self.lines.iter().map(|line| line.to_string()).collect::<Vec<_>>().join("\n");
    write!(f, "{}", joined)
  }
}

/* -------------------------------- */
#[derive(Debug, Clone, Default, PartialEq, Eq)]
/// Builds the signing string of a message for an ordered list of headers.
///
/// An empty list means date-only mode: the string is the single `date` line.
pub struct SigningStringBuilder {
  headers: Vec<String>,
}

impl SigningStringBuilder {
  /// Date-only mode
  pub fn date_only() -> Self {
    Self::default()
  }

  /// Sign the given headers in order. Case-insensitive duplicates are dropped, the first one kept.
  pub fn for_headers<I, S>(headers: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
  {
    Self {
      headers: dedup_header_names(headers),
    }
  }

  pub fn headers(&self) -> &[String] {
    &self.headers
  }

  /// Build the signing string. Pure, the message is only read.
  pub fn signing_string<M>(&self, message: &M) -> HttpSigResult<SigningString>
  where
    M: HttpMessage + ?Sized,
  {
    if self.headers.is_empty() {
      let values = message.header_values(DATE_HEADER)?;
      if values.is_empty() {
        return Err(HttpSigError::MissingDateHeader);
      }
      return SigningString::from_lines(vec![header_line(DATE_HEADER, &values)]);
    }

    self.check_headers(message)?;

    let lines = self
      .headers
      .iter()
      .map(|header| Self::line(message, header))
      .collect::<HttpSigResult<Vec<_>>>()?;
    SigningString::from_lines(lines)
  }

  /// Every non pseudo-header must have at least one value. All missing ones are reported at once.
  fn check_headers<M>(&self, message: &M) -> HttpSigResult<()>
  where
    M: HttpMessage + ?Sized,
  {
    let mut missing = vec![];
    for header in self.headers.iter().filter(|h| !is_pseudo_header(h)) {
      if message.header_values(header.trim())?.is_empty() {
        missing.push(header.clone());
      }
    }
    if !missing.is_empty() {
      return Err(HttpSigError::MissingHeaders(missing));
    }
    Ok(())
  }

  fn line<M>(message: &M, header: &str) -> HttpSigResult<SigningStringLine>
  where
    M: HttpMessage + ?Sized,
  {
    let name = normalize_header_name(header);
    match (name.as_str(), message.role()) {
      (REQUEST_TARGET, MessageRole::Request(req)) => {
        let mut target = format!("{} {}", req.method().to_lowercase(), req.path());
        if let Some(query) = req.query() {
          target.push('?');
          target.push_str(query);
        }
        Ok(SigningStringLine {
          name: REQUEST_TARGET.to_string(),
          value: target,
        })
      }
      (REQUEST_TARGET, MessageRole::Response(_)) => Err(HttpSigError::InvalidPseudoHeader(REQUEST_TARGET, "Request")),
      (RESPONSE_STATUS, MessageRole::Response(res)) => Ok(SigningStringLine {
        name: RESPONSE_STATUS.to_string(),
        value: res.status_code().to_string(),
      }),
      (RESPONSE_STATUS, MessageRole::Request(_)) => Err(HttpSigError::InvalidPseudoHeader(RESPONSE_STATUS, "Response")),
      _ => Ok(header_line(&name, &message.header_values(header.trim())?)),
    }
  }
}

fn is_pseudo_header(header: &str) -> bool {
  let name = normalize_header_name(header);
  name == REQUEST_TARGET || name == RESPONSE_STATUS
}

fn header_line(name: &str, values: &[String]) -> SigningStringLine {
  SigningStringLine {
    name: normalize_header_name(name),
    value: values.iter().map(|v| v.trim()).collect::<Vec<_>>().join(", "),
  }
}
