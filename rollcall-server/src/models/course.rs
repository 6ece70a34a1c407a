//! Course records and their validated inputs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::validation::{double_option, non_empty_text, required_text};
use super::ValidationError;

/// Maximum length for course names
pub const MAX_COURSE_NAME_LEN: usize = 200;

/// Maximum length for course descriptions
pub const MAX_DESCRIPTION_LEN: usize = 2000;

/// Smallest accepted course duration
pub const MIN_DURATION: i64 = 1;

/// Course lifecycle status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CourseStatus {
    #[default]
    Active,
    Inactive,
}

impl CourseStatus {
    /// Parse a status value, reporting the field on failure.
    pub fn parse(value: &str) -> Result<Self, ValidationError> {
        match value {
            "active" => Ok(Self::Active),
            "inactive" => Ok(Self::Inactive),
            other => Err(ValidationError::InvalidVariant {
                field: "status",
                value: other.to_owned(),
            }),
        }
    }

    /// Get string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
        }
    }
}

/// Persisted course
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub duration: i32,
    pub status: CourseStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// POST /api/courses body
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCourse {
    pub name: Option<String>,
    pub description: Option<String>,
    pub duration: Option<i64>,
    pub status: Option<String>,
}

/// PUT /api/courses/{id} body
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCourse {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
    pub duration: Option<i64>,
    pub status: Option<String>,
}

/// Validated course, ready to insert
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCourse {
    pub name: String,
    pub description: Option<String>,
    pub duration: i32,
    pub status: CourseStatus,
}

/// Validated partial update for a course
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CoursePatch {
    pub name: Option<String>,
    /// `Some(None)` clears the description
    pub description: Option<Option<String>>,
    pub duration: Option<i32>,
    pub status: Option<CourseStatus>,
}

impl TryFrom<CreateCourse> for NewCourse {
    type Error = ValidationError;

    fn try_from(req: CreateCourse) -> Result<Self, Self::Error> {
        let name = required_text("name", req.name, MAX_COURSE_NAME_LEN)?;
        let duration = req
            .duration
            .ok_or(ValidationError::Missing { field: "duration" })
            .and_then(parse_duration)?;
        let status = req
            .status
            .as_deref()
            .map(CourseStatus::parse)
            .transpose()?
            .unwrap_or_default();

        Ok(Self {
            name,
            description: parse_description(req.description)?,
            duration,
            status,
        })
    }
}

impl TryFrom<UpdateCourse> for CoursePatch {
    type Error = ValidationError;

    fn try_from(req: UpdateCourse) -> Result<Self, Self::Error> {
        Ok(Self {
            name: req
                .name
                .map(|n| non_empty_text("name", n, MAX_COURSE_NAME_LEN))
                .transpose()?,
            description: req.description.map(parse_description).transpose()?,
            duration: req.duration.map(parse_duration).transpose()?,
            status: req.status.as_deref().map(CourseStatus::parse).transpose()?,
        })
    }
}

impl CoursePatch {
    /// Merge the provided fields into `course`, leaving the rest untouched.
    pub fn apply(&self, course: &mut Course) {
        if let Some(name) = &self.name {
            course.name = name.clone();
        }
        if let Some(description) = &self.description {
            course.description = description.clone();
        }
        if let Some(duration) = self.duration {
            course.duration = duration;
        }
        if let Some(status) = self.status {
            course.status = status;
        }
    }
}

fn parse_duration(value: i64) -> Result<i32, ValidationError> {
    if value < MIN_DURATION {
        return Err(ValidationError::BelowMinimum {
            field: "duration",
            min: MIN_DURATION,
        });
    }
    i32::try_from(value).map_err(|_| ValidationError::InvalidFormat {
        field: "duration",
        reason: "value is out of range",
    })
}

// Blank descriptions are stored as absent.
fn parse_description(value: Option<String>) -> Result<Option<String>, ValidationError> {
    match value {
        Some(text) if text.trim().is_empty() => Ok(None),
        Some(text) => non_empty_text("description", text, MAX_DESCRIPTION_LEN).map(Some),
        None => Ok(None),
    }
}
