//! Canonical user record returned by every provider
//!
//! ```json
//! {
//!   "profile": { "id": "42", "name": "octocat", "first_name": "Mona", ... },
//!   "token": { "access_token": "gho_...", "expires_at": "never" }
//! }
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Vendor-independent result of a successful login
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SocialUser {
    pub profile: Profile,
    pub token: Token,
}

/// Normalized user profile
///
/// Required fields are never empty; optional fields are `None` when the vendor
/// does not expose them, never `Some("")`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub id: String,
    pub name: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_pic_url: Option<String>,
}

/// Access token with its absolute expiry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub access_token: String,
    pub expires_at: Expiry,
}

/// Absolute token expiry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Expiry {
    /// Milliseconds since Unix epoch
    At(i64),
    /// The vendor token does not expire
    Never,
}

impl Expiry {
    /// Expiry `lifetime_secs` after `issued_at`
    pub fn after(issued_at: DateTime<Utc>, lifetime_secs: i64) -> Self {
        Self::At(
            issued_at
                .timestamp_millis()
                .saturating_add(lifetime_secs.saturating_mul(1000)),
        )
    }

    pub fn timestamp_millis(&self) -> Option<i64> {
        match self {
            Self::At(ms) => Some(*ms),
            Self::Never => None,
        }
    }

    pub fn is_expired(&self) -> bool {
        match self {
            Self::At(ms) => *ms < Utc::now().timestamp_millis(),
            Self::Never => false,
        }
    }
}

/// Builds a [`Profile`] from loosely-shaped vendor fields
///
/// `name` falls back to the first available of the candidates given to
/// [`ProfileBuilder::name`], then to the id. First and last names fall back to
/// the resolved name. Blank optional values become `None`.
#[derive(Debug, Default)]
pub struct ProfileBuilder {
    id: String,
    name: Option<String>,
    first_name: Option<String>,
    last_name: Option<String>,
    email: Option<String>,
    profile_pic_url: Option<String>,
}

impl ProfileBuilder {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    /// Use the first non-blank candidate as the display name
    pub fn name<'a>(mut self, candidates: impl IntoIterator<Item = Option<&'a str>>) -> Self {
        self.name = candidates.into_iter().find_map(non_blank);
        self
    }

    pub fn first_name(mut self, first_name: Option<&str>) -> Self {
        self.first_name = non_blank(first_name);
        self
    }

    pub fn last_name(mut self, last_name: Option<&str>) -> Self {
        self.last_name = non_blank(last_name);
        self
    }

    pub fn email(mut self, email: Option<&str>) -> Self {
        self.email = non_blank(email);
        self
    }

    pub fn profile_pic_url(mut self, url: Option<&str>) -> Self {
        self.profile_pic_url = non_blank(url);
        self
    }

    pub fn build(self) -> Profile {
        let name = self.name.unwrap_or_else(|| self.id.clone());
        Profile {
            first_name: self.first_name.unwrap_or_else(|| name.clone()),
            last_name: self.last_name.unwrap_or_else(|| name.clone()),
            name,
            id: self.id,
            email: self.email,
            profile_pic_url: self.profile_pic_url,
        }
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
