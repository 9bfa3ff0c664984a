//! The identity a write is attributed to.
//!
//! There is no authentication layer yet, so every caller is the constant
//! `system` actor. Writes already thread an [`Actor`] through the call chain
//! so a real authenticated identity can slot in later without reshaping any
//! stored record.

/// The identity stamped into `submitted_by` on every write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
  name: String,
}

impl Actor {
  /// The placeholder identity used until authentication exists.
  pub fn system() -> Self {
    Self { name: "system".to_string() }
  }

  pub fn name(&self) -> &str { &self.name }
}

impl Default for Actor {
  fn default() -> Self { Self::system() }
}
