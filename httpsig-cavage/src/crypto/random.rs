use crate::trace::*;
use rand::{rngs::OsRng, CryptoRng, RngCore};
use std::sync::OnceLock;

/// Randomness used by asymmetric signing.
///
/// `Strong` draws from the operating system CSPRNG (RSA blinding, hedged ECDSA nonces).
/// `Default` uses the primitives' own behaviour without an external source
/// (unblinded RSA, RFC 6979 deterministic ECDSA nonces).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RandomSource {
  Strong,
  Default,
}

static SHARED: OnceLock<RandomSource> = OnceLock::new();

impl RandomSource {
  /// Process-wide source, checked once on first use and shared read-only afterwards.
  /// Falls back to `Default` when the OS source cannot be read.
  pub fn shared() -> Self {
    *SHARED.get_or_init(Self::detect)
  }

  fn detect() -> Self {
    let mut buf = [0u8; 32];
    match OsRng.try_fill_bytes(&mut buf) {
      Ok(()) => {
        debug!("Strong random source available");
        Self::Strong
      }
      Err(e) => {
        warn!("Strong random source unavailable, falling back to default randomness: {e}");
        Self::Default
      }
    }
  }
}

/* -------------------------------- */
/// Operating system CSPRNG drawn on each signature.
/// A read failure after the first check falls back to the thread-local generator instead of panicking.
pub(crate) struct StrongRng<R = OsRng>(R);

impl StrongRng {
  pub(crate) fn new() -> Self {
    Self(OsRng)
  }
}

impl<R: RngCore + CryptoRng> RngCore for StrongRng<R> {
  fn next_u32(&mut self) -> u32 {
    let mut buf = [0u8; 4];
    self.fill_bytes(&mut buf);
    u32::from_le_bytes(buf)
  }

  fn next_u64(&mut self) -> u64 {
    let mut buf = [0u8; 8];
    self.fill_bytes(&mut buf);
    u64::from_le_bytes(buf)
  }

  fn fill_bytes(&mut self, dest: &mut [u8]) {
    if let Err(e) = self.0.try_fill_bytes(dest) {
      warn!("Strong random source failed, using default randomness: {e}");
      rand::thread_rng().fill_bytes(dest);
    }
  }

  fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
    self.fill_bytes(dest);
    Ok(())
  }
}

impl<R: RngCore + CryptoRng> CryptoRng for StrongRng<R> {}
