use crate::{
  crypto::AlgorithmName,
  error::{HttpSigError, HttpSigResult},
  trace::*,
  util::normalize_header_name,
};
use indexmap::IndexSet;
use logos::{Logos, Span};

pub(crate) const PARAM_KEY_ID: &str = "keyId";
pub(crate) const PARAM_ALGORITHM: &str = "algorithm";
pub(crate) const PARAM_HEADERS: &str = "headers";
pub(crate) const PARAM_SIGNATURE: &str = "signature";

/// Signed headers assumed when the `headers` parameter is absent
const DEFAULT_SIGNED_HEADER: &str = "date";

/* -------------------------------- */
#[derive(Debug, Logos, Clone, Copy, PartialEq, Eq)]
#[logos(skip r"[ \t\r\n]+")]
enum Token {
  #[token("=")]
  Equals,

  #[token(",")]
  Comma,

  #[token(";")]
  Semicolon,

  #[regex(r#""([^"\\]|\\.)*""#)]
  Quoted,

  #[regex(r#"[^\s=,;"]+"#)]
  Word,
}

/// Split a header value into `name[=value]` elements. Empty elements are skipped.
fn parse_elements(input: &str) -> HttpSigResult<Vec<(&str, Option<String>)>> {
  let mut elements = vec![];
  let mut current: Vec<(Token, Span)> = vec![];

  for (token, span) in Token::lexer(input).spanned() {
    let Ok(token) = token else {
      return Err(HttpSigError::InvalidSignatureHeader(format!(
        "unexpected input at position {}",
        span.start
      )));
    };
    match token {
      Token::Comma | Token::Semicolon => {
        if let Some(element) = parse_element(input, &current)? {
          elements.push(element);
        }
        current.clear();
      }
      _ => current.push((token, span)),
    }
  }
  if let Some(element) = parse_element(input, &current)? {
    elements.push(element);
  }
  Ok(elements)
}

fn parse_element<'a>(input: &'a str, tokens: &[(Token, Span)]) -> HttpSigResult<Option<(&'a str, Option<String>)>> {
  let Some(((first, name_span), rest)) = tokens.split_first() else {
    return Ok(None);
  };
  if *first != Token::Word {
    return Err(HttpSigError::InvalidSignatureHeader(format!(
      "expected a parameter name at position {}",
      name_span.start
    )));
  }
  let name = &input[name_span.clone()];

  let Some(((eq, eq_span), value_tokens)) = rest.split_first() else {
    return Ok(Some((name, None)));
  };
  if *eq != Token::Equals {
    return Err(HttpSigError::InvalidSignatureHeader(format!(
      "expected '=' after '{name}' at position {}",
      eq_span.start
    )));
  }

  let value = match value_tokens {
    [] => String::new(),
    [(Token::Quoted, span)] => unquote(&input[span.clone()]),
    [(_, first), ..] if value_tokens.iter().all(|(t, _)| matches!(t, Token::Word | Token::Equals)) => {
      // unquoted values may carry '=' such as base64 padding
      let end = value_tokens.last().map_or(first.end, |(_, last)| last.end);
      input[first.start..end].trim().to_string()
    }
    _ => {
      return Err(HttpSigError::InvalidSignatureHeader(format!(
        "malformed value for parameter '{name}'"
      )))
    }
  };
  Ok(Some((name, Some(value))))
}

/// Strip the surrounding quotes and resolve backslash escapes
fn unquote(quoted: &str) -> String {
  let inner = &quoted[1..quoted.len() - 1];
  let mut out = String::with_capacity(inner.len());
  let mut chars = inner.chars();
  while let Some(c) = chars.next() {
    match c {
      '\\' => {
        if let Some(escaped) = chars.next() {
          out.push(escaped);
        }
      }
      _ => out.push(c),
    }
  }
  out
}

pub(crate) fn quote(value: &str) -> String {
  let mut out = String::with_capacity(value.len() + 2);
  out.push('"');
  for c in value.chars() {
    if c == '"' || c == '\\' {
      out.push('\\');
    }
    out.push(c);
  }
  out.push('"');
  out
}

/* -------------------------------- */
#[derive(Debug, Default)]
/// Accumulates parameters over one or more header values. The last occurrence of a parameter wins.
struct ElementsAccumulator {
  key_id: Option<String>,
  algorithm: Option<AlgorithmName>,
  signed_headers: Option<Vec<String>>,
  signature: Option<String>,
}

impl ElementsAccumulator {
  fn parse(&mut self, header_value: &str) -> HttpSigResult<&mut Self> {
    for (name, value) in parse_elements(header_value)? {
      self.apply(name, value)?;
    }
    Ok(self)
  }

  fn apply(&mut self, name: &str, value: Option<String>) -> HttpSigResult<()> {
    let known = [PARAM_KEY_ID, PARAM_ALGORITHM, PARAM_HEADERS, PARAM_SIGNATURE];
    if !known.contains(&name) {
      debug!("Ignore unknown Signature parameter '{name}'");
      return Ok(());
    }
    let Some(value) = value else {
      return Err(HttpSigError::InvalidSignatureHeader(format!(
        "parameter '{name}' has no value"
      )));
    };
    match name {
      PARAM_KEY_ID => self.key_id = Some(value),
      PARAM_ALGORITHM => self.algorithm = Some(value.parse()?),
      PARAM_HEADERS => self.signed_headers = Some(normalize_signed_headers(value.split_whitespace())),
      _ => self.signature = Some(value),
    }
    Ok(())
  }

  fn build(&mut self) -> HttpSigResult<SignatureHeaderElements> {
    let mut missing = vec![];
    if self.key_id.is_none() {
      missing.push(PARAM_KEY_ID);
    }
    if self.algorithm.is_none() {
      missing.push(PARAM_ALGORITHM);
    }
    if self.signature.is_none() {
      missing.push(PARAM_SIGNATURE);
    }
    let (Some(key_id), Some(algorithm), Some(signature)) = (self.key_id.take(), self.algorithm, self.signature.take())
    else {
      return Err(HttpSigError::MissingRequiredProperties(missing));
    };

    let signed_headers = match self.signed_headers.take() {
      Some(headers) if !headers.is_empty() => headers,
      _ => vec![DEFAULT_SIGNED_HEADER.to_string()],
    };

    Ok(SignatureHeaderElements {
      key_id,
      algorithm,
      signed_headers,
      signature,
    })
  }
}

/// Trim, lowercase and dedup header names, keeping the first position
fn normalize_signed_headers<I, S>(headers: I) -> Vec<String>
where
  I: IntoIterator<Item = S>,
  S: AsRef<str>,
{
  headers
    .into_iter()
    .map(|h| normalize_header_name(h.as_ref()))
    .filter(|h| !h.is_empty())
    .collect::<IndexSet<_>>()
    .into_iter()
    .collect()
}

/* -------------------------------- */
#[derive(Debug, Clone, PartialEq, Eq)]
/// Parameters of the `Signature` header
pub struct SignatureHeaderElements {
  key_id: String,
  algorithm: AlgorithmName,
  /// lowercased, duplicate free, `date` when the header does not say otherwise
  signed_headers: Vec<String>,
  /// base64 encoded
  signature: String,
}

impl SignatureHeaderElements {
  /// Assemble elements directly. An empty header list falls back to `date`.
  pub fn new<I, S>(key_id: &str, algorithm: AlgorithmName, signed_headers: I, signature: &str) -> Self
  where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
  {
    let mut signed_headers = normalize_signed_headers(signed_headers);
    if signed_headers.is_empty() {
      signed_headers.push(DEFAULT_SIGNED_HEADER.to_string());
    }
    Self {
      key_id: key_id.to_string(),
      algorithm,
      signed_headers,
      signature: signature.to_string(),
    }
  }

  /// Parse a single `Signature` header value
  pub fn from_header_value(header_value: &str) -> HttpSigResult<Self> {
    ElementsAccumulator::default().parse(header_value)?.build()
  }

  /// Parse every occurrence of the `Signature` header, in message order
  pub fn from_header_values<I, S>(header_values: I) -> HttpSigResult<Self>
  where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
  {
    let mut acc = ElementsAccumulator::default();
    for value in header_values {
      acc.parse(value.as_ref())?;
    }
    acc.build()
  }

  pub fn key_id(&self) -> &str {
    &self.key_id
  }

  pub fn algorithm(&self) -> AlgorithmName {
    self.algorithm
  }

  pub fn signed_headers(&self) -> &[String] {
    &self.signed_headers
  }

  pub fn signature(&self) -> &str {
    &self.signature
  }
}

impl std::fmt::Display for SignatureHeaderElements {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{PARAM_KEY_ID}={},{PARAM_ALGORITHM}={}", quote(&self.key_id), quote(self.algorithm.as_str()))?;
    if self.signed_headers != [DEFAULT_SIGNED_HEADER] {
      write!(f, ",{PARAM_HEADERS}={}", quote(&self.signed_headers.join(" ")))?;
    }
    write!(f, ",{PARAM_SIGNATURE}={}", quote(&self.signature))
  }
}

impl std::str::FromStr for SignatureHeaderElements {
  type Err = HttpSigError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    Self::from_header_value(s)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  const RFC_HEADER: &str = r#"keyId="Test",algorithm="rsa-sha256",headers="(request-target) host date digest content-length",signature="qdx+H7PHHDZgy4y/Ahn9Tny9V3GP6YgBPyUXMmoxWtLbHpUnXS2mg2+SbrQDMCJypxBLSPQR2aAjn7ndmw2iicw3HMbe8VfEdKFYRqzic+efkb3nndiv/x1xSHDJWeSWkx3ButlYSuBskLu6kd9Fswtemr3lgdDEmn04swr2Os0=""#;

  #[test]
  fn test_parse_rfc_header() {
    let elements = SignatureHeaderElements::from_header_value(RFC_HEADER).unwrap();
    assert_eq!(elements.key_id(), "Test");
    assert_eq!(elements.algorithm(), AlgorithmName::RsaSha256);
    assert_eq!(
      elements.signed_headers(),
      &["(request-target)", "host", "date", "digest", "content-length"]
    );
    assert!(elements.signature().starts_with("qdx+H7PHHDZgy4y"));
    assert!(elements.signature().ends_with("Os0="));
  }

  #[test]
  fn test_empty_header() {
    let err = SignatureHeaderElements::from_header_value("").unwrap_err();
    assert_eq!(
      err.to_string(),
      "Missing required properties: keyId algorithm signature"
    );
  }

  #[test]
  fn test_missing_properties() {
    let err = SignatureHeaderElements::from_header_value(r#"algorithm="rsa-sha256",signature="X==""#).unwrap_err();
    assert!(matches!(err, HttpSigError::MissingRequiredProperties(ref m) if m == &["keyId"]));

    let err = SignatureHeaderElements::from_header_value(r#"keyId="k",signature="X==""#).unwrap_err();
    assert!(matches!(err, HttpSigError::MissingRequiredProperties(ref m) if m == &["algorithm"]));

    let err = SignatureHeaderElements::from_header_value(r#"keyId="k",algorithm="hmac-sha256""#).unwrap_err();
    assert!(matches!(err, HttpSigError::MissingRequiredProperties(ref m) if m == &["signature"]));
  }

  #[test]
  fn test_default_date() {
    let elements =
      SignatureHeaderElements::from_header_value(r#"keyId="Test",algorithm="rsa-sha256",signature="AAAA""#).unwrap();
    assert_eq!(elements.signed_headers(), &["date"]);

    let elements =
      SignatureHeaderElements::from_header_value(r#"keyId="Test",algorithm="rsa-sha256",headers="",signature="AAAA""#)
        .unwrap();
    assert_eq!(elements.signed_headers(), &["date"]);
  }

  #[test]
  fn test_headers_normalized() {
    let elements = SignatureHeaderElements::from_header_value(
      r#"keyId="Test",algorithm="rsa-sha256",headers="  Host DATE   host content-length MMMM",signature="AAAA""#,
    )
    .unwrap();
    assert_eq!(elements.signed_headers(), &["host", "date", "content-length", "mmmm"]);
  }

  #[test]
  fn test_multiple_header_values() {
    let elements = SignatureHeaderElements::from_header_values([
      r#"keyId="Test""#,
      r#"algorithm="rsa-sha256""#,
      r#"headers="(request-target) host date""#,
      r#"signature="AAAA==""#,
    ])
    .unwrap();
    assert_eq!(elements.key_id(), "Test");
    assert_eq!(elements.signed_headers(), &["(request-target)", "host", "date"]);
    assert_eq!(elements.signature(), "AAAA==");
  }

  #[test]
  fn test_unknown_parameters_ignored() {
    let elements = SignatureHeaderElements::from_header_value(
      r#"keyId="Test",pirate=3l33t,algorithm="rsa-sha256",again="overflooow",signature="AAAA""#,
    )
    .unwrap();
    assert_eq!(elements.key_id(), "Test");
    // unknown names may even come without a value
    assert!(SignatureHeaderElements::from_header_value(r#"flag,keyId="k",algorithm="rsa-sha1",signature="A""#).is_ok());
  }

  #[test]
  fn test_last_occurrence_wins() {
    let elements = SignatureHeaderElements::from_header_value(
      r#"keyId="Test",algorithm="rsa-sha256",signature="AAAA",algorithm="rsa-sha1""#,
    )
    .unwrap();
    assert_eq!(elements.algorithm(), AlgorithmName::RsaSha1);

    let elements = SignatureHeaderElements::from_header_value(
      r#"algorithm="rsa-sha256",keyId="rsa-key-1",keyId="rsa-key-2", ,,,signature="XXXXXXXXXXXXXXXX==",keyId=rsa-key-3"#,
    )
    .unwrap();
    assert_eq!(elements.key_id(), "rsa-key-3");
    assert_eq!(elements.signature(), "XXXXXXXXXXXXXXXX==");

    let elements = SignatureHeaderElements::from_header_values([
      r#"keyId="first",algorithm="rsa-sha256",signature="AAAA""#,
      r#"keyId="second""#,
    ])
    .unwrap();
    assert_eq!(elements.key_id(), "second");
  }

  #[test]
  fn test_unquoted_and_semicolons() {
    let elements = SignatureHeaderElements::from_header_value("keyId=id; algorithm=hmac-sha256 ;signature=AAAA=").unwrap();
    assert_eq!(elements.key_id(), "id");
    assert_eq!(elements.algorithm(), AlgorithmName::HmacSha256);
    assert_eq!(elements.signature(), "AAAA=");
  }

  #[test]
  fn test_unsupported_algorithm() {
    let err =
      SignatureHeaderElements::from_header_value(r#"keyId="Test",algorithm="rsa-sha512",signature="AAAA""#).unwrap_err();
    assert!(matches!(err, HttpSigError::UnsupportedAlgorithm(ref alg) if alg == "rsa-sha512"));
  }

  #[test]
  fn test_malformed() {
    assert!(matches!(
      SignatureHeaderElements::from_header_value(r#"keyId="unterminated"#),
      Err(HttpSigError::InvalidSignatureHeader(_))
    ));
    assert!(matches!(
      SignatureHeaderElements::from_header_value(r#"keyId,algorithm="rsa-sha256",signature="A""#),
      Err(HttpSigError::InvalidSignatureHeader(_))
    ));
    assert!(matches!(
      SignatureHeaderElements::from_header_value(r#"="x",keyId="k""#),
      Err(HttpSigError::InvalidSignatureHeader(_))
    ));
  }

  #[test]
  fn test_display_then_parse() {
    let elements = SignatureHeaderElements::from_header_value(RFC_HEADER).unwrap();
    let serialized = elements.to_string();
    assert!(serialized.starts_with(r#"keyId="Test",algorithm="rsa-sha256",headers="(request-target) host date"#));
    assert_eq!(serialized.parse::<SignatureHeaderElements>().unwrap(), elements);

    let elements = SignatureHeaderElements::new("a \"quoted\" id", AlgorithmName::EcdsaSha256, Vec::<String>::new(), "AA==");
    assert_eq!(
      elements.to_string(),
      r#"keyId="a \"quoted\" id",algorithm="ecdsa-sha256",signature="AA==""#
    );
    assert_eq!(SignatureHeaderElements::from_header_value(&elements.to_string()).unwrap(), elements);
  }
}
