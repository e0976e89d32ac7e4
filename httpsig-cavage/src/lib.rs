mod crypto;
mod error;
mod key_map;
mod message;
mod signature_header;
mod signer;
mod signing_string;
mod trace;
mod util;
mod verifier;

/// Pseudo-header covering the request method and target
pub const REQUEST_TARGET: &str = "(request-target)";
/// Pseudo-header covering the response status code
pub const RESPONSE_STATUS: &str = "(response-status)";
/// Header carrying the signature parameters
pub const SIGNATURE_HEADER: &str = "Signature";
/// Header signed in date-only mode
pub const DATE_HEADER: &str = "Date";

pub mod prelude {
  pub use crate::{
    crypto::{
      AlgorithmKind, AlgorithmName, CryptoProvider, MacPrimitive, PrivateKey, PublicKey, RandomSource, RustCryptoProvider,
      SecretKey, SignaturePrimitive,
    },
    error::{HttpSigError, HttpSigResult},
    key_map::{InMemoryKeyMap, KeyMap},
    message::{HttpMessage, HttpMessageMut, HttpRequest, HttpResponse, MessageRole},
    signature_header::SignatureHeaderElements,
    signer::{HttpMessageSigner, HttpMessageSignerBuilder},
    signing_string::{SigningString, SigningStringBuilder},
    verifier::{HttpMessageVerifier, HttpMessageVerifierBuilder},
    DATE_HEADER, REQUEST_TARGET, RESPONSE_STATUS, SIGNATURE_HEADER,
  };
}

/* ----------------------------------------------------------------- */
