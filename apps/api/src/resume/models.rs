use chrono::{DateTime, NaiveDate, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::resume::SectionRow;

/// Body of `POST /api/resume` and `PUT /api/resume/:id`.
#[derive(Debug, Clone, Deserialize)]
pub struct ResumeInput {
    /// Must match the path id on update; ignored on create.
    pub id: Option<Uuid>,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone_number: Option<String>,
    pub address: Option<String>,
    pub summary: Option<String>,
    pub interests: Option<String>,
}

impl ResumeInput {
    pub fn validate(&self) -> Result<(), String> {
        if self.first_name.trim().is_empty() || self.last_name.trim().is_empty() {
            return Err("first_name and last_name are required".to_string());
        }
        if !self.email.contains('@') {
            return Err("email is not a valid address".to_string());
        }
        Ok(())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Sections
// ────────────────────────────────────────────────────────────────────────────

/// A kind of record attached to a resume and stored as a tagged JSON payload.
pub trait Section: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Value of `resume_sections.section_type`.
    const KIND: &'static str;

    fn validate(&self) -> Result<(), String> {
        Ok(())
    }
}

fn check_dates(start: NaiveDate, end: Option<NaiveDate>) -> Result<(), String> {
    match end {
        Some(end) if end < start => Err("end_date must not precede start_date".to_string()),
        _ => Ok(()),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EducationEntry {
    pub degree: String,
    pub institution: String,
    pub major: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub gpa: Option<f64>,
}

impl Section for EducationEntry {
    const KIND: &'static str = "education";

    fn validate(&self) -> Result<(), String> {
        if self.degree.trim().is_empty() || self.institution.trim().is_empty() {
            return Err("degree and institution are required".to_string());
        }
        if let Some(gpa) = self.gpa {
            if !(0.0..=4.0).contains(&gpa) {
                return Err("gpa must be between 0.0 and 4.0".to_string());
            }
        }
        check_dates(self.start_date, self.end_date)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperienceEntry {
    pub position: String,
    pub company: String,
    pub description: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
}

impl Section for ExperienceEntry {
    const KIND: &'static str = "experience";

    fn validate(&self) -> Result<(), String> {
        if self.position.trim().is_empty() || self.company.trim().is_empty() {
            return Err("position and company are required".to_string());
        }
        check_dates(self.start_date, self.end_date)
    }
}

/// Skill level, serialized as 1 (Beginner) through 5 (Master).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Proficiency {
    Beginner = 1,
    Intermediate = 2,
    Advanced = 3,
    Expert = 4,
    Master = 5,
}

impl TryFrom<u8> for Proficiency {
    type Error = String;

    fn try_from(level: u8) -> Result<Self, Self::Error> {
        match level {
            1 => Ok(Proficiency::Beginner),
            2 => Ok(Proficiency::Intermediate),
            3 => Ok(Proficiency::Advanced),
            4 => Ok(Proficiency::Expert),
            5 => Ok(Proficiency::Master),
            other => Err(format!("proficiency must be 1..5, got {other}")),
        }
    }
}

impl From<Proficiency> for u8 {
    fn from(p: Proficiency) -> Self {
        p as u8
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillEntry {
    pub name: String,
    pub description: Option<String>,
    pub proficiency: Proficiency,
}

impl Section for SkillEntry {
    const KIND: &'static str = "skill";

    fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("name is required".to_string());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkEntry {
    pub name: String,
    pub url: String,
}

impl Section for LinkEntry {
    const KIND: &'static str = "link";

    fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("name is required".to_string());
        }
        if !(self.url.starts_with("http://") || self.url.starts_with("https://")) {
            return Err("url must be an http(s) address".to_string());
        }
        Ok(())
    }
}

/// Create/update body for any section kind.
#[derive(Debug, Clone, Deserialize)]
#[serde(bound = "T: Section")]
pub struct SectionInput<T: Section> {
    pub id: Option<Uuid>,
    pub resume_id: Uuid,
    #[serde(flatten)]
    pub entry: T,
}

/// A stored section as returned to clients.
#[derive(Debug, Clone, Serialize)]
#[serde(bound = "T: Section")]
pub struct SectionRecord<T: Section> {
    pub id: Uuid,
    pub resume_id: Uuid,
    #[serde(flatten)]
    pub entry: T,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl<T: Section> TryFrom<SectionRow> for SectionRecord<T> {
    type Error = anyhow::Error;

    fn try_from(row: SectionRow) -> Result<Self, Self::Error> {
        if row.section_type != T::KIND {
            anyhow::bail!(
                "section {} is of type {}, expected {}",
                row.id,
                row.section_type,
                T::KIND
            );
        }
        Ok(SectionRecord {
            id: row.id,
            resume_id: row.resume_id,
            entry: serde_json::from_value(row.data)?,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(section_type: &str, data: serde_json::Value) -> SectionRow {
        SectionRow {
            id: Uuid::new_v4(),
            resume_id: Uuid::new_v4(),
            section_type: section_type.to_string(),
            data,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_proficiency_bounds() {
        assert_eq!(Proficiency::try_from(1).unwrap(), Proficiency::Beginner);
        assert_eq!(Proficiency::try_from(5).unwrap(), Proficiency::Master);
        assert!(Proficiency::try_from(0).is_err());
        assert!(Proficiency::try_from(6).is_err());
        assert!(serde_json::from_value::<SkillEntry>(json!({"name": "Rust", "proficiency": 9})).is_err());
    }

    #[test]
    fn test_skill_serializes_level_as_number() {
        let skill = SkillEntry {
            name: "Rust".to_string(),
            description: None,
            proficiency: Proficiency::Expert,
        };
        assert_eq!(serde_json::to_value(&skill).unwrap()["proficiency"], 4);
    }

    #[test]
    fn test_section_input_flattens_entry() {
        let resume_id = Uuid::new_v4();
        let input: SectionInput<LinkEntry> = serde_json::from_value(json!({
            "resume_id": resume_id,
            "name": "GitHub",
            "url": "https://github.com/someone"
        }))
        .unwrap();
        assert_eq!(input.resume_id, resume_id);
        assert_eq!(input.id, None);
        assert_eq!(input.entry.name, "GitHub");
    }

    #[test]
    fn test_record_from_row_checks_kind() {
        let data = json!({"name": "Blog", "url": "https://example.com"});
        assert!(SectionRecord::<LinkEntry>::try_from(row("link", data.clone())).is_ok());
        assert!(SectionRecord::<SkillEntry>::try_from(row("link", data)).is_err());
    }

    #[test]
    fn test_education_validation() {
        let mut entry = EducationEntry {
            degree: "BSc".to_string(),
            institution: "Uni".to_string(),
            major: Some("CS".to_string()),
            start_date: NaiveDate::from_ymd_opt(2015, 9, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2019, 6, 1),
            gpa: Some(3.6),
        };
        assert!(entry.validate().is_ok());

        entry.gpa = Some(4.5);
        assert!(entry.validate().is_err());

        entry.gpa = None;
        entry.end_date = NaiveDate::from_ymd_opt(2014, 1, 1);
        assert!(entry.validate().is_err());
    }

    #[test]
    fn test_link_requires_http_url() {
        let link = LinkEntry {
            name: "Site".to_string(),
            url: "ftp://example.com".to_string(),
        };
        assert!(link.validate().is_err());
    }

    #[test]
    fn test_resume_input_validation() {
        let input: ResumeInput = serde_json::from_value(json!({
            "first_name": "Ada",
            "last_name": "Lovelace",
            "email": "ada@example.com"
        }))
        .unwrap();
        assert!(input.validate().is_ok());

        let bad = ResumeInput {
            email: "nope".to_string(),
            ..input
        };
        assert!(bad.validate().is_err());
    }
}
