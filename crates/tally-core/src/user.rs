//! User accounts and registration input.
//!
//! The password digest is persisted by the store but deliberately absent from
//! [`User`]: no read path can leak a credential that the domain type cannot
//! represent.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

/// The role a user account holds. Serialised under the historical wire name
/// `"type"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
  Admin,
  Faculty,
  Student,
}

/// A stored user account, minus the credential.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
  pub id:           Uuid,
  pub full_name:    String,
  pub username:     String,
  pub email:        String,
  #[serde(rename = "type")]
  pub role:         UserRole,
  pub submitted_by: String,
  pub updated_at:   DateTime<Utc>,
}

/// Input to registration and user update. The plaintext password is digested
/// by the store before persisting; callers must resupply it on every update —
/// there is no "leave password unchanged" path.
#[derive(Debug, Clone, Deserialize)]
pub struct NewUser {
  pub full_name: String,
  pub username:  String,
  pub email:     String,
  pub password:  String,
  #[serde(rename = "type")]
  pub role:      UserRole,
}

impl NewUser {
  /// Reject syntactically invalid email addresses. Uniqueness is the store's
  /// concern; this only checks shape.
  pub fn validate(&self) -> Result<()> {
    if !email_is_valid(&self.email) {
      return Err(Error::InvalidEmail(self.email.clone()));
    }
    Ok(())
  }
}

/// `local@domain` with a non-empty local part, a dot somewhere in the domain,
/// and no whitespace. Exact-match semantics elsewhere mean no normalisation
/// happens here either.
fn email_is_valid(email: &str) -> bool {
  if email.chars().any(char::is_whitespace) {
    return false;
  }
  let Some((local, domain)) = email.split_once('@') else {
    return false;
  };
  if local.is_empty() || domain.is_empty() || domain.contains('@') {
    return false;
  }
  domain
    .split('.')
    .all(|part| !part.is_empty())
    && domain.contains('.')
}
