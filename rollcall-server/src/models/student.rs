//! Student records and their validated inputs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::course::MAX_COURSE_NAME_LEN;
use super::validation::{double_option, non_empty_text, required_text};
use super::ValidationError;

/// Maximum length for student names
const MAX_STUDENT_NAME_LEN: usize = 200;

/// Maximum length for email addresses (RFC 5321 path limit)
const MAX_EMAIL_LEN: usize = 254;

/// Student enrollment status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StudentStatus {
    #[default]
    Active,
    Graduated,
    Inactive,
}

impl StudentStatus {
    /// Parse a status value, reporting the field on failure.
    pub fn parse(value: &str) -> Result<Self, ValidationError> {
        match value {
            "active" => Ok(Self::Active),
            "graduated" => Ok(Self::Graduated),
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
            Self::Graduated => "graduated",
            Self::Inactive => "inactive",
        }
    }
}

/// Normalized email address (trimmed, lowercase)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Email(String);

impl Email {
    /// Validate the basic `local@domain` shape and normalize case.
    ///
    /// # Example
    /// ```
    /// use rollcall_server::models::Email;
    ///
    /// assert_eq!(Email::new(" Ada@Example.org ").unwrap().as_str(), "ada@example.org");
    /// assert!(Email::new("not-an-email").is_err());
    /// ```
    pub fn new(s: &str) -> Result<Self, ValidationError> {
        let normalized = non_empty_text("email", s.to_owned(), MAX_EMAIL_LEN)?.to_lowercase();

        let valid = match normalized.split_once('@') {
            Some((local, domain)) => {
                !local.is_empty()
                    && !domain.is_empty()
                    && !domain.contains('@')
                    && !normalized.chars().any(char::is_whitespace)
            }
            None => false,
        };
        if !valid {
            return Err(ValidationError::InvalidFormat {
                field: "email",
                reason: "must look like local@domain",
            });
        }

        Ok(Self(normalized))
    }

    /// Get the email as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume and return the inner string.
    pub fn into_string(self) -> String {
        self.0
    }
}

/// Persisted student
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    /// Name of the course the student is enrolled in
    pub course: Option<String>,
    pub enrollment_date: DateTime<Utc>,
    pub status: StudentStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// POST /api/students body
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateStudent {
    pub name: Option<String>,
    pub email: Option<String>,
    pub course: Option<String>,
    pub enrollment_date: Option<DateTime<Utc>>,
    pub status: Option<String>,
}

/// PUT /api/students/{id} body
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStudent {
    pub name: Option<String>,
    pub email: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub course: Option<Option<String>>,
    pub enrollment_date: Option<DateTime<Utc>>,
    pub status: Option<String>,
}

/// Validated student, ready to insert
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewStudent {
    pub name: String,
    pub email: Email,
    pub course: Option<String>,
    /// `None` means "at creation time"
    pub enrollment_date: Option<DateTime<Utc>>,
    pub status: StudentStatus,
}

/// Validated partial update for a student
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StudentPatch {
    pub name: Option<String>,
    pub email: Option<Email>,
    /// `Some(None)` clears the course
    pub course: Option<Option<String>>,
    pub enrollment_date: Option<DateTime<Utc>>,
    pub status: Option<StudentStatus>,
}

impl TryFrom<CreateStudent> for NewStudent {
    type Error = ValidationError;

    fn try_from(req: CreateStudent) -> Result<Self, Self::Error> {
        let name = required_text("name", req.name, MAX_STUDENT_NAME_LEN)?;
        let email = req
            .email
            .ok_or(ValidationError::Missing { field: "email" })
            .and_then(|e| Email::new(&e))?;
        let status = req
            .status
            .as_deref()
            .map(StudentStatus::parse)
            .transpose()?
            .unwrap_or_default();

        Ok(Self {
            name,
            email,
            course: parse_course(req.course)?,
            enrollment_date: req.enrollment_date,
            status,
        })
    }
}

impl TryFrom<UpdateStudent> for StudentPatch {
    type Error = ValidationError;

    fn try_from(req: UpdateStudent) -> Result<Self, Self::Error> {
        Ok(Self {
            name: req
                .name
                .map(|n| non_empty_text("name", n, MAX_STUDENT_NAME_LEN))
                .transpose()?,
            email: req.email.as_deref().map(Email::new).transpose()?,
            course: req.course.map(parse_course).transpose()?,
            enrollment_date: req.enrollment_date,
            status: req.status.as_deref().map(StudentStatus::parse).transpose()?,
        })
    }
}

impl StudentPatch {
    /// Merge the provided fields into `student`, leaving the rest untouched.
    pub fn apply(&self, student: &mut Student) {
        if let Some(name) = &self.name {
            student.name = name.clone();
        }
        if let Some(email) = &self.email {
            student.email = email.as_str().to_owned();
        }
        if let Some(course) = &self.course {
            student.course = course.clone();
        }
        if let Some(enrollment_date) = self.enrollment_date {
            student.enrollment_date = enrollment_date;
        }
        if let Some(status) = self.status {
            student.status = status;
        }
    }
}

fn parse_course(value: Option<String>) -> Result<Option<String>, ValidationError> {
    match value {
        Some(text) if text.trim().is_empty() => Ok(None),
        Some(text) => non_empty_text("course", text, MAX_COURSE_NAME_LEN).map(Some),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ada() -> CreateStudent {
        CreateStudent {
            name: Some("Ada".into()),
            email: Some("ada@example.org".into()),
            ..Default::default()
        }
    }

    #[test]
    fn valid_emails() {
        assert!(Email::new("a@b").is_ok());
        assert!(Email::new("first.last+tag@uni.example.ac.uk").is_ok());
    }

    #[test]
    fn rejects_malformed_emails() {
        for bad in ["plain", "@example.org", "ada@", "a@b@c", "ada lovelace@example.org"] {
            let err = Email::new(bad).unwrap_err();
            assert!(
                matches!(err, ValidationError::InvalidFormat { field: "email", .. }),
                "{bad} should be rejected"
            );
        }
        assert!(matches!(Email::new("  ").unwrap_err(), ValidationError::Empty { .. }));
    }

    #[test]
    fn email_is_case_insensitive() {
        assert_eq!(Email::new("ADA@Example.ORG").unwrap(), Email::new("ada@example.org").unwrap());
    }

    #[test]
    fn create_defaults() {
        let student = NewStudent::try_from(ada()).unwrap();
        assert_eq!(student.status, StudentStatus::Active);
        assert_eq!(student.enrollment_date, None);
        assert_eq!(student.course, None);
    }

    #[test]
    fn create_requires_email() {
        let err = NewStudent::try_from(CreateStudent {
            email: None,
            ..ada()
        })
        .unwrap_err();
        assert_eq!(err, ValidationError::Missing { field: "email" });
    }

    #[test]
    fn graduated_is_a_student_status() {
        let student = NewStudent::try_from(CreateStudent {
            status: Some("graduated".into()),
            ..ada()
        })
        .unwrap();
        assert_eq!(student.status, StudentStatus::Graduated);
    }

    #[test]
    fn enrollment_date_parses_rfc3339() {
        let req: CreateStudent = serde_json::from_str(
            r#"{"name":"Ada","email":"ada@example.org","enrollmentDate":"2024-09-01T00:00:00Z"}"#,
        )
        .unwrap();
        let student = NewStudent::try_from(req).unwrap();
        assert_eq!(
            student.enrollment_date.map(|d| d.to_rfc3339()),
            Some("2024-09-01T00:00:00+00:00".to_owned())
        );
    }

    #[test]
    fn patch_clears_course_on_null() {
        let req: UpdateStudent = serde_json::from_str(r#"{"course": null}"#).unwrap();
        let patch = StudentPatch::try_from(req).unwrap();
        assert_eq!(patch.course, Some(None));
        assert_eq!(patch.name, None);
    }
}
