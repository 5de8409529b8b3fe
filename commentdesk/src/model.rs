use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: u64,
    #[serde(rename = "postId")]
    pub post_id: u64,
    pub name: String,
    pub email: String,
    pub body: String,
}

impl Comment {
    pub fn field(&self, field: CommentField) -> &str {
        match field {
            CommentField::Name => &self.name,
            CommentField::Body => &self.body,
        }
    }
}

/// Posts carry more on the wire (`userId`, `body`); only the title is used.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: u64,
    pub title: String,
}

/// The two comment fields that can be edited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommentField {
    Name,
    Body,
}

impl CommentField {
    pub fn as_str(&self) -> &'static str {
        match self {
            CommentField::Name => "name",
            CommentField::Body => "body",
        }
    }
}

impl fmt::Display for CommentField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown comment field '{0}' (expected 'name' or 'body')")]
pub struct UnknownField(pub String);

impl FromStr for CommentField {
    type Err = UnknownField;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "name" => Ok(CommentField::Name),
            "body" => Ok(CommentField::Body),
            other => Err(UnknownField(other.to_string())),
        }
    }
}

/// Field-level overrides for one comment. Unknown keys make the persisted
/// document malformed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OverlayEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
}

impl OverlayEntry {
    pub fn get(&self, field: CommentField) -> Option<&str> {
        match field {
            CommentField::Name => self.name.as_deref(),
            CommentField::Body => self.body.as_deref(),
        }
    }

    pub fn set(&mut self, field: CommentField, value: String) {
        match field {
            CommentField::Name => self.name = Some(value),
            CommentField::Body => self.body = Some(value),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.body.is_none()
    }

    /// Applies the set fields onto `comment`, leaving everything else as fetched.
    pub fn apply_to(&self, comment: &mut Comment) {
        if let Some(name) = &self.name {
            comment.name = name.clone();
        }
        if let Some(body) = &self.body {
            comment.body = body.clone();
        }
    }
}

/// Comment id -> overrides. Serialized as a JSON object keyed by the
/// stringified id, e.g. `{"7":{"name":"Bob"}}`.
pub type Overlay = BTreeMap<u64, OverlayEntry>;

/// Both remote collections, as fetched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dataset {
    pub comments: Vec<Comment>,
    pub posts: Vec<Post>,
}
