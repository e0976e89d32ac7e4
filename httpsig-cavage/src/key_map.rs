use crate::crypto::{PrivateKey, PublicKey, SecretKey};
use rustc_hash::FxHashMap as HashMap;

/// Resolves a `keyId` to key material. Absence is reported as `None`.
pub trait KeyMap: Send + Sync {
  fn public_key(&self, key_id: &str) -> Option<PublicKey>;
  fn private_key(&self, key_id: &str) -> Option<PrivateKey>;
  fn secret_key(&self, key_id: &str) -> Option<SecretKey>;
}

/* -------------------------------- */
#[derive(Debug, Clone, Default)]
/// Key map held in memory
pub struct InMemoryKeyMap {
  public_keys: HashMap<String, PublicKey>,
  private_keys: HashMap<String, PrivateKey>,
  secret_keys: HashMap<String, SecretKey>,
}

impl InMemoryKeyMap {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn insert_public_key(&mut self, key_id: &str, key: PublicKey) -> &mut Self {
    self.public_keys.insert(key_id.to_string(), key);
    self
  }

  pub fn insert_private_key(&mut self, key_id: &str, key: PrivateKey) -> &mut Self {
    self.private_keys.insert(key_id.to_string(), key);
    self
  }

  pub fn insert_secret_key(&mut self, key_id: &str, key: SecretKey) -> &mut Self {
    self.secret_keys.insert(key_id.to_string(), key);
    self
  }

  /// Register a private key together with its public counterpart under the same id
  pub fn insert_key_pair(&mut self, key_id: &str, key: PrivateKey) -> &mut Self {
    self.public_keys.insert(key_id.to_string(), key.public_key());
    self.private_keys.insert(key_id.to_string(), key);
    self
  }
}

impl KeyMap for InMemoryKeyMap {
  fn public_key(&self, key_id: &str) -> Option<PublicKey> {
    self.public_keys.get(key_id).cloned()
  }
  fn private_key(&self, key_id: &str) -> Option<PrivateKey> {
    self.private_keys.get(key_id).cloned()
  }
  fn secret_key(&self, key_id: &str) -> Option<SecretKey> {
    self.secret_keys.get(key_id).cloned()
  }
}
