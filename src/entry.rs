//! Leaderboard entry record, admin form input, and patch types.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::types::{EntryId, Score, Seconds, TimestampMs};

/// Fully materialized, authoritative leaderboard entry.
///
/// Field names match the JSON layout written to the entries slot.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LeaderboardEntry {
    /// Stable entry identifier.
    pub id: EntryId,
    /// Participant name.
    pub name: String,
    /// University or company.
    pub organization: String,
    /// Challenge score, higher is better.
    pub score: Score,
    /// Completion time in seconds, lower is better.
    pub time: Seconds,
    /// Creation time in milliseconds since epoch.
    pub timestamp: TimestampMs,
}

/// Validated insert payload used to create a new [`LeaderboardEntry`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEntry {
    /// Participant name.
    pub name: String,
    /// University or company.
    pub organization: String,
    /// Challenge score.
    pub score: Score,
    /// Completion time in seconds.
    pub time: Seconds,
}

/// Raw admin form input, exactly as typed.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EntryForm {
    /// Name field.
    pub name: String,
    /// University/Company field.
    pub organization: String,
    /// Score field, must parse as a non-negative integer.
    pub score: String,
    /// Time field in seconds, must parse as a non-negative integer.
    pub time: String,
}

/// Form field that failed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InvalidField {
    /// Name was empty.
    Name,
    /// Organization was empty.
    Organization,
    /// Score was not a non-negative integer.
    Score,
    /// Time was not a non-negative integer.
    Time,
}

impl fmt::Display for InvalidField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Name => "name",
            Self::Organization => "organization",
            Self::Score => "score",
            Self::Time => "time",
        };
        f.write_str(name)
    }
}

/// Entry input rejected before anything was written.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("please fill all fields correctly (invalid: {})", join_fields(.fields))]
pub struct ValidationError {
    /// Every field that failed, in form order.
    pub fields: Vec<InvalidField>,
}

fn join_fields(fields: &[InvalidField]) -> String {
    fields
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

impl EntryForm {
    /// Builds a form from field values.
    pub fn new(
        name: impl Into<String>,
        organization: impl Into<String>,
        score: impl Into<String>,
        time: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            organization: organization.into(),
            score: score.into(),
            time: time.into(),
        }
    }

    /// Checks every field and returns the typed payload.
    ///
    /// Name and organization are trimmed; score and time must be
    /// non-negative integers.
    pub fn validate(&self) -> Result<NewEntry, ValidationError> {
        let mut fields = Vec::new();

        let name = self.name.trim();
        if name.is_empty() {
            fields.push(InvalidField::Name);
        }
        let organization = self.organization.trim();
        if organization.is_empty() {
            fields.push(InvalidField::Organization);
        }
        let score = self.score.trim().parse::<Score>().ok();
        if score.is_none() {
            fields.push(InvalidField::Score);
        }
        let time = self.time.trim().parse::<Seconds>().ok();
        if time.is_none() {
            fields.push(InvalidField::Time);
        }

        match (score, time) {
            (Some(score), Some(time)) if fields.is_empty() => Ok(NewEntry {
                name: name.to_string(),
                organization: organization.to_string(),
                score,
                time,
            }),
            _ => Err(ValidationError { fields }),
        }
    }
}

/// Sparse patch where each `Some` field overwrites the record value.
///
/// The entry id and creation timestamp are never patched.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EntryPatch {
    /// Optional replacement for the name.
    pub name: Option<String>,
    /// Optional replacement for the organization.
    pub organization: Option<String>,
    /// Optional replacement for the score.
    pub score: Option<Score>,
    /// Optional replacement for the time.
    pub time: Option<Seconds>,
}

impl EntryPatch {
    /// Returns true when no fields are set.
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// Applies this patch in place to `rec`.
    pub fn apply_to(&self, rec: &mut LeaderboardEntry) {
        if let Some(v) = &self.name {
            rec.name = v.clone();
        }
        if let Some(v) = &self.organization {
            rec.organization = v.clone();
        }
        if let Some(v) = self.score {
            rec.score = v;
        }
        if let Some(v) = self.time {
            rec.time = v;
        }
    }
}
