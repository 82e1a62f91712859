// storefront/src/services/session_store.rs

//! Server-side sessions keyed by an opaque random token. A record holds the
//! logged-in user (if any) and the flash messages waiting for the next page.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use parking_lot::RwLock;
use serde::Serialize;
use tracing::debug;
use uuid::Uuid;

use crate::config::AppConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashCategory {
  Success,
  Info,
  Danger,
}

/// A one-time notice shown on the next page render.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Flash {
  pub category: FlashCategory,
  pub message: String,
}

impl Flash {
  pub fn new(category: FlashCategory, message: impl Into<String>) -> Self {
    Self {
      category,
      message: message.into(),
    }
  }
}

#[derive(Debug)]
struct SessionRecord {
  user_id: Option<i64>,
  remember: bool,
  flashes: Vec<Flash>,
  expires_at: DateTime<Utc>,
}

/// What a request learns about its session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionInfo {
  pub user_id: Option<i64>,
}

#[derive(Debug, Clone)]
pub struct SessionStore {
  records: Arc<RwLock<HashMap<String, SessionRecord>>>,
  ttl: Duration,
  remember_ttl: Duration,
}

impl SessionStore {
  pub fn new(ttl: Duration, remember_ttl: Duration) -> Self {
    Self {
      records: Arc::new(RwLock::new(HashMap::new())),
      ttl,
      remember_ttl,
    }
  }

  /// Lifetimes too large for chrono saturate at `Duration::MAX`.
  pub fn from_config(config: &AppConfig) -> Self {
    Self::new(
      Duration::try_minutes(config.session_ttl_minutes).unwrap_or(Duration::MAX),
      Duration::try_days(config.remember_me_days).unwrap_or(Duration::MAX),
    )
  }

  fn new_token() -> String {
    Uuid::new_v4().simple().to_string()
  }

  fn lifetime(&self, remember: bool) -> Duration {
    if remember {
      self.remember_ttl
    } else {
      self.ttl
    }
  }

  fn expiry(&self, from: DateTime<Utc>, remember: bool) -> DateTime<Utc> {
    from
      .checked_add_signed(self.lifetime(remember))
      .unwrap_or(DateTime::<Utc>::MAX_UTC)
  }

  /// Opens a new session and returns its token.
  pub fn create(&self, user_id: Option<i64>, remember: bool) -> String {
    let token = Self::new_token();
    let record = SessionRecord {
      user_id,
      remember,
      flashes: Vec::new(),
      expires_at: self.expiry(Utc::now(), remember),
    };
    self.records.write().insert(token.clone(), record);
    debug!(?user_id, remember, "Session created.");
    token
  }

  /// Resolves a token and slides its expiry forward. Expired records are
  /// dropped and reported as absent.
  pub fn lookup(&self, token: &str) -> Option<SessionInfo> {
    let now = Utc::now();
    let mut records = self.records.write();
    let expired = match records.get_mut(token) {
      None => return None,
      Some(record) if record.expires_at <= now => true,
      Some(record) => {
        record.expires_at = self.expiry(now, record.remember);
        return Some(SessionInfo { user_id: record.user_id });
      }
    };
    if expired {
      records.remove(token);
      debug!("Expired session discarded.");
    }
    None
  }

  /// Replaces `previous` (if any) with a fresh authenticated session. Pending
  /// flashes move to the new token.
  pub fn rotate(&self, previous: Option<&str>, user_id: i64, remember: bool) -> String {
    let token = Self::new_token();
    let mut records = self.records.write();
    let flashes = previous
      .and_then(|old| records.remove(old))
      .map(|old| old.flashes)
      .unwrap_or_default();
    records.insert(
      token.clone(),
      SessionRecord {
        user_id: Some(user_id),
        remember,
        flashes,
        expires_at: self.expiry(Utc::now(), remember),
      },
    );
    token
  }

  pub fn destroy(&self, token: &str) {
    self.records.write().remove(token);
  }

  /// Queues a flash. Returns false when the session no longer exists.
  pub fn push_flash(&self, token: &str, flash: Flash) -> bool {
    match self.records.write().get_mut(token) {
      Some(record) => {
        record.flashes.push(flash);
        true
      }
      None => false,
    }
  }

  pub fn take_flashes(&self, token: &str) -> Vec<Flash> {
    self
      .records
      .write()
      .get_mut(token)
      .map(|record| std::mem::take(&mut record.flashes))
      .unwrap_or_default()
  }

  /// Removes every expired record, returning how many were dropped.
  pub fn purge_expired(&self) -> usize {
    let now = Utc::now();
    let mut records = self.records.write();
    let before = records.len();
    records.retain(|_, record| record.expires_at > now);
    before - records.len()
  }

  pub fn len(&self) -> usize {
    self.records.read().len()
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }

  /// Lifetime of a "remember me" session, also used as its cookie max-age.
  pub fn remember_ttl(&self) -> Duration {
    self.remember_ttl
  }
}
