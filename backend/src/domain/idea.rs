//! Idea aggregate, its closed enums and the input shapes used to create and
//! update it.
//!
//! Raw adapter input arrives as an [`IdeaDraft`] holding plain strings. The
//! draft is validated into [`IdeaFields`] before any storage port sees it, so
//! backends only ever persist enum members they understand.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Requester recorded when an idea is created without one.
pub const ANONYMOUS_REQUESTER: &str = "anonymous";

/// Validation errors raised while turning raw input into idea fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdeaValidationError {
    /// Identifier was not a UUID.
    InvalidId { value: String },
    /// Title was missing or blank once trimmed.
    BlankTitle,
    /// A tech stack entry is outside the supported set.
    UnknownTechStack { value: String },
    /// A status value is outside the supported set.
    UnknownStatus { value: String },
    /// Updates must carry an explicit status.
    MissingStatus,
}

impl IdeaValidationError {
    /// Name of the offending input field.
    pub fn field(&self) -> &'static str {
        match self {
            Self::InvalidId { .. } => "id",
            Self::BlankTitle => "title",
            Self::UnknownTechStack { .. } => "techStack",
            Self::UnknownStatus { .. } | Self::MissingStatus => "status",
        }
    }
}

impl fmt::Display for IdeaValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidId { value } => write!(f, "invalid idea id: {value}"),
            Self::BlankTitle => write!(f, "title must not be empty"),
            Self::UnknownTechStack { value } => write!(f, "invalid tech stack: {value}"),
            Self::UnknownStatus { value } => write!(f, "invalid request status: {value}"),
            Self::MissingStatus => write!(f, "status is required when updating an idea"),
        }
    }
}

impl std::error::Error for IdeaValidationError {}

/// Stable idea identifier stored as a UUID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IdeaId(Uuid);

impl IdeaId {
    /// Parse an identifier from its textual UUID form.
    pub fn new(id: impl AsRef<str>) -> Result<Self, IdeaValidationError> {
        let raw = id.as_ref();
        Uuid::parse_str(raw)
            .map(Self)
            .map_err(|_| IdeaValidationError::InvalidId {
                value: raw.to_owned(),
            })
    }

    /// Generate a new random identifier.
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap an existing UUID.
    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for IdeaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for IdeaId {
    type Err = IdeaValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::new(value)
    }
}

/// Technologies an idea can target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TechStack {
    Rust,
    Go,
    Next,
    React,
    Axum,
    Postgres,
    #[serde(rename = "MySQL")]
    MySql,
    Docker,
    ActixWeb,
    ChiRouter,
    Node,
}

impl TechStack {
    /// Every supported tech stack, in declaration order.
    pub const ALL: [Self; 11] = [
        Self::Rust,
        Self::Go,
        Self::Next,
        Self::React,
        Self::Axum,
        Self::Postgres,
        Self::MySql,
        Self::Docker,
        Self::ActixWeb,
        Self::ChiRouter,
        Self::Node,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Rust => "Rust",
            Self::Go => "Go",
            Self::Next => "Next",
            Self::React => "React",
            Self::Axum => "Axum",
            Self::Postgres => "Postgres",
            Self::MySql => "MySQL",
            Self::Docker => "Docker",
            Self::ActixWeb => "ActixWeb",
            Self::ChiRouter => "ChiRouter",
            Self::Node => "Node",
        }
    }
}

impl fmt::Display for TechStack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parse error for [`TechStack`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseTechStackError {
    pub input: String,
}

impl fmt::Display for ParseTechStackError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid tech stack: {}", self.input)
    }
}

impl std::error::Error for ParseTechStackError {}

impl FromStr for TechStack {
    type Err = ParseTechStackError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|candidate| candidate.as_str() == value)
            .ok_or_else(|| ParseTechStackError {
                input: value.to_owned(),
            })
    }
}

/// Review lifecycle of an idea.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IdeaStatus {
    #[default]
    Requested,
    Reviewing,
    Planned,
    InProgress,
    Published,
    Rejected,
}

impl IdeaStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Requested => "requested",
            Self::Reviewing => "reviewing",
            Self::Planned => "planned",
            Self::InProgress => "in-progress",
            Self::Published => "published",
            Self::Rejected => "rejected",
        }
    }
}

impl fmt::Display for IdeaStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parse error for [`IdeaStatus`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseIdeaStatusError {
    pub input: String,
}

impl fmt::Display for ParseIdeaStatusError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid request status: {}", self.input)
    }
}

impl std::error::Error for ParseIdeaStatusError {}

impl FromStr for IdeaStatus {
    type Err = ParseIdeaStatusError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "requested" => Ok(Self::Requested),
            "reviewing" => Ok(Self::Reviewing),
            "planned" => Ok(Self::Planned),
            "in-progress" => Ok(Self::InProgress),
            "published" => Ok(Self::Published),
            "rejected" => Ok(Self::Rejected),
            _ => Err(ParseIdeaStatusError {
                input: value.to_owned(),
            }),
        }
    }
}

/// A proposal submitted to the board.
///
/// `vote_count` is derived by the storage backend at read time and is never
/// written back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Idea {
    pub id: IdeaId,
    pub title: String,
    pub description: String,
    pub tech_stack: Vec<TechStack>,
    pub tags: Vec<String>,
    pub status: IdeaStatus,
    pub vote_count: u64,
    pub requested_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Validated, storage-ready idea contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdeaFields {
    pub title: String,
    pub description: String,
    pub tech_stack: Vec<TechStack>,
    pub tags: Vec<String>,
    pub status: IdeaStatus,
    pub requested_by: String,
}

/// Unvalidated idea input as decoded by an adapter.
///
/// # Examples
/// ```
/// use idea_board::domain::{IdeaDraft, IdeaStatus, TechStack};
///
/// let draft = IdeaDraft {
///     title: "Board".to_owned(),
///     tech_stack: vec!["Go".to_owned()],
///     ..IdeaDraft::default()
/// };
/// let fields = draft.validate_for_create().unwrap();
/// assert_eq!(fields.status, IdeaStatus::Requested);
/// assert_eq!(fields.tech_stack, vec![TechStack::Go]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdeaDraft {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tech_stack: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub requested_by: Option<String>,
}

impl IdeaDraft {
    /// Validate input for a new idea, applying creation defaults.
    ///
    /// A missing or empty status becomes [`IdeaStatus::Requested`]; a missing
    /// or blank requester becomes [`ANONYMOUS_REQUESTER`].
    pub fn validate_for_create(self) -> Result<IdeaFields, IdeaValidationError> {
        let status = match self.status.as_deref() {
            None | Some("") => IdeaStatus::default(),
            Some(raw) => parse_status(raw)?,
        };
        self.into_fields(status)
    }

    /// Validate input replacing an existing idea. The status is mandatory.
    pub fn validate_for_update(self) -> Result<IdeaFields, IdeaValidationError> {
        let status = match self.status.as_deref() {
            None | Some("") => return Err(IdeaValidationError::MissingStatus),
            Some(raw) => parse_status(raw)?,
        };
        self.into_fields(status)
    }

    fn into_fields(self, status: IdeaStatus) -> Result<IdeaFields, IdeaValidationError> {
        if self.title.trim().is_empty() {
            return Err(IdeaValidationError::BlankTitle);
        }

        let tech_stack = self
            .tech_stack
            .iter()
            .map(|entry| {
                entry
                    .parse::<TechStack>()
                    .map_err(|err| IdeaValidationError::UnknownTechStack { value: err.input })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let requested_by = self
            .requested_by
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| ANONYMOUS_REQUESTER.to_owned());

        Ok(IdeaFields {
            title: self.title,
            description: self.description,
            tech_stack,
            tags: self.tags,
            status,
            requested_by,
        })
    }
}

fn parse_status(raw: &str) -> Result<IdeaStatus, IdeaValidationError> {
    raw.parse::<IdeaStatus>()
        .map_err(|err| IdeaValidationError::UnknownStatus { value: err.input })
}

/// Partial update: only the supplied fields replace the current values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdeaPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub tech_stack: Option<Vec<String>>,
    pub tags: Option<Vec<String>>,
    pub status: Option<String>,
    pub requested_by: Option<String>,
}

impl IdeaPatch {
    /// Overlay the patch on `current`, yielding a whole-record draft.
    pub fn apply_to(self, current: &Idea) -> IdeaDraft {
        IdeaDraft {
            title: self.title.unwrap_or_else(|| current.title.clone()),
            description: self
                .description
                .unwrap_or_else(|| current.description.clone()),
            tech_stack: self.tech_stack.unwrap_or_else(|| {
                current
                    .tech_stack
                    .iter()
                    .map(|stack| stack.as_str().to_owned())
                    .collect()
            }),
            tags: self.tags.unwrap_or_else(|| current.tags.clone()),
            status: Some(
                self.status
                    .unwrap_or_else(|| current.status.as_str().to_owned()),
            ),
            requested_by: Some(
                self.requested_by
                    .unwrap_or_else(|| current.requested_by.clone()),
            ),
        }
    }
}

#[cfg(test)]
mod tests;
