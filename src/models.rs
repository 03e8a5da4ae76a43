use chrono::{DateTime, NaiveDate, Utc};
use serde::{de, Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::slots::Slot;
use crate::status::ApplicationStatus;
use crate::store::Record;

/// Why a record was refused by `create` or `update`.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("{0} is required")]
    Missing(&'static str),

    #[error("invalid posting URL '{0}' (expected http:// or https://)")]
    InvalidUrl(String),

    #[error("date applied ({applied}) is before date identified ({identified})")]
    AppliedBeforeIdentified {
        applied: NaiveDate,
        identified: NaiveDate,
    },

    #[error("end month {end} is before start month {start}")]
    EndBeforeStart { start: YearMonth, end: YearMonth },

    #[error("salary minimum {min} exceeds maximum {max}")]
    SalaryRange { min: f64, max: f64 },
}

fn require(value: &str, field: &'static str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::Missing(field));
    }
    Ok(())
}

/// Optional text and date fields may be stored as `""` by older exports;
/// read those as absent instead of failing the whole slot.
fn blank_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: fmt::Display,
{
    match Option::<String>::deserialize(deserializer)? {
        Some(raw) if !raw.trim().is_empty() => raw.parse().map(Some).map_err(de::Error::custom),
        _ => Ok(None),
    }
}

/// Copy every field the patch carries onto the record; leave the rest alone.
macro_rules! apply_patch {
    ($record:expr, $patch:expr; $($field:ident),+ $(,)?) => {
        $(
            if let Some(value) = $patch.$field {
                $record.$field = value;
            }
        )+
    };
}

// --- Calendar months ---

#[derive(Debug, Error)]
#[error("expected a month as YYYY-MM, got '{0}'")]
pub struct MonthParseError(String);

/// A calendar month, stored as `YYYY-MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct YearMonth {
    year: i32,
    month: u32,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> Option<Self> {
        (1..=12).contains(&month).then_some(Self { year, month })
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for YearMonth {
    type Err = MonthParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || MonthParseError(s.to_string());
        let (year, month) = s.trim().split_once('-').ok_or_else(err)?;
        let year = year.parse::<i32>().map_err(|_| err())?;
        let month = month.parse::<u32>().map_err(|_| err())?;
        YearMonth::new(year, month).ok_or_else(err)
    }
}

impl TryFrom<String> for YearMonth {
    type Error = MonthParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<YearMonth> for String {
    fn from(value: YearMonth) -> Self {
        value.to_string()
    }
}

/// End of an experience: a month, or still ongoing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum DateEnd {
    Present,
    Month(YearMonth),
}

impl fmt::Display for DateEnd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DateEnd::Present => f.write_str("present"),
            DateEnd::Month(month) => month.fmt(f),
        }
    }
}

impl FromStr for DateEnd {
    type Err = MonthParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("present") {
            Ok(DateEnd::Present)
        } else {
            s.parse().map(DateEnd::Month)
        }
    }
}

impl TryFrom<String> for DateEnd {
    type Error = MonthParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<DateEnd> for String {
    fn from(value: DateEnd) -> Self {
        value.to_string()
    }
}

// --- Job applications ---

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum WorkMode {
    #[default]
    Onsite,
    Hybrid,
    Remote,
}

impl WorkMode {
    pub fn as_str(self) -> &'static str {
        match self {
            WorkMode::Onsite => "onsite",
            WorkMode::Hybrid => "hybrid",
            WorkMode::Remote => "remote",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Interview {
    pub id: String,
    pub round: u32,
    #[serde(rename = "type")]
    pub kind: String,
    pub date: NaiveDate,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub follow_up_sent: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub description: String,
    pub due_date: NaiveDate,
    #[serde(default)]
    pub completed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalaryInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub listed: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub negotiated: Option<f64>,
    pub currency: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeywordMatch {
    #[serde(default)]
    pub matched: Vec<String>,
    #[serde(default)]
    pub missing: Vec<String>,
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobApplication {
    pub id: String,
    pub company: String,
    pub position: String,
    pub location: String,
    #[serde(rename = "remote")]
    pub work_mode: WorkMode,
    #[serde(default, deserialize_with = "blank_as_none", skip_serializing_if = "Option::is_none")]
    pub posting_url: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none", skip_serializing_if = "Option::is_none")]
    pub job_description: Option<String>,
    pub date_identified: NaiveDate,
    #[serde(default, deserialize_with = "blank_as_none", skip_serializing_if = "Option::is_none")]
    pub date_applied: Option<NaiveDate>,
    pub status: ApplicationStatus,
    /// Soft reference to a `ResumeVersion`; may dangle.
    #[serde(default)]
    pub resume_used: String,
    /// Soft reference to a `RoleType`; may dangle.
    #[serde(default)]
    pub role_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub salary_info: Option<SalaryInfo>,
    #[serde(default)]
    pub contacts: Vec<String>,
    #[serde(default)]
    pub interviews: Vec<Interview>,
    #[serde(default)]
    pub tasks: Vec<Task>,
    #[serde(default)]
    pub notes: String,
    #[serde(default, deserialize_with = "blank_as_none", skip_serializing_if = "Option::is_none")]
    pub feedback: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keyword_match: Option<KeywordMatch>,
}

/// A job application before it has been stored.
#[derive(Debug, Clone, Default)]
pub struct ApplicationDraft {
    pub company: String,
    pub position: String,
    pub location: String,
    pub work_mode: WorkMode,
    pub posting_url: Option<String>,
    pub job_description: Option<String>,
    /// Defaults to today when left empty.
    pub date_identified: Option<NaiveDate>,
    pub date_applied: Option<NaiveDate>,
    pub status: ApplicationStatus,
    pub resume_used: String,
    pub role_type: String,
    pub salary_info: Option<SalaryInfo>,
    pub contacts: Vec<String>,
    pub interviews: Vec<Interview>,
    pub tasks: Vec<Task>,
    pub notes: String,
    pub feedback: Option<String>,
    pub keyword_match: Option<KeywordMatch>,
}

#[derive(Debug, Clone, Default)]
pub struct ApplicationPatch {
    pub company: Option<String>,
    pub position: Option<String>,
    pub location: Option<String>,
    pub work_mode: Option<WorkMode>,
    pub posting_url: Option<Option<String>>,
    pub job_description: Option<Option<String>>,
    pub date_identified: Option<NaiveDate>,
    pub date_applied: Option<Option<NaiveDate>>,
    pub status: Option<ApplicationStatus>,
    pub resume_used: Option<String>,
    pub role_type: Option<String>,
    pub salary_info: Option<Option<SalaryInfo>>,
    pub contacts: Option<Vec<String>>,
    pub interviews: Option<Vec<Interview>>,
    pub tasks: Option<Vec<Task>>,
    pub notes: Option<String>,
    pub feedback: Option<Option<String>>,
    pub keyword_match: Option<Option<KeywordMatch>>,
}

impl ApplicationPatch {
    pub fn status(status: ApplicationStatus) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }
}

impl Record for JobApplication {
    type Draft = ApplicationDraft;
    type Patch = ApplicationPatch;
    const SLOT: Slot = Slot::Applications;

    fn id(&self) -> &str {
        &self.id
    }

    fn from_draft(id: String, draft: ApplicationDraft, now: DateTime<Utc>) -> Self {
        JobApplication {
            id,
            company: draft.company,
            position: draft.position,
            location: draft.location,
            work_mode: draft.work_mode,
            posting_url: draft.posting_url,
            job_description: draft.job_description,
            date_identified: draft.date_identified.unwrap_or_else(|| now.date_naive()),
            date_applied: draft.date_applied,
            status: draft.status,
            resume_used: draft.resume_used,
            role_type: draft.role_type,
            salary_info: draft.salary_info,
            contacts: draft.contacts,
            interviews: draft.interviews,
            tasks: draft.tasks,
            notes: draft.notes,
            feedback: draft.feedback,
            keyword_match: draft.keyword_match,
        }
    }

    fn apply(&mut self, patch: ApplicationPatch, _now: DateTime<Utc>) {
        apply_patch!(self, patch;
            company, position, location, work_mode, posting_url, job_description,
            date_identified, date_applied, status, resume_used, role_type, salary_info,
            contacts, interviews, tasks, notes, feedback, keyword_match,
        );
    }

    fn validate(&self) -> Result<(), ValidationError> {
        require(&self.company, "company")?;
        require(&self.position, "position")?;
        require(&self.location, "location")?;
        if let Some(url) = self.posting_url.as_ref().filter(|u| !u.trim().is_empty()) {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(ValidationError::InvalidUrl(url.clone()));
            }
        }
        if let Some(applied) = self.date_applied {
            if applied < self.date_identified {
                return Err(ValidationError::AppliedBeforeIdentified {
                    applied,
                    identified: self.date_identified,
                });
            }
        }
        Ok(())
    }
}

// --- Experience bank ---

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum ExperienceCategory {
    #[default]
    Work,
    Project,
    Volunteer,
    Education,
}

impl ExperienceCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            ExperienceCategory::Work => "work",
            ExperienceCategory::Project => "project",
            ExperienceCategory::Volunteer => "volunteer",
            ExperienceCategory::Education => "education",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExperienceEntry {
    pub id: String,
    pub title: String,
    #[serde(default, deserialize_with = "blank_as_none", skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none", skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    pub date_start: YearMonth,
    pub date_end: DateEnd,
    #[serde(default)]
    pub description: Vec<String>,
    #[serde(default)]
    pub achievements: Vec<String>,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub metrics: Vec<String>,
    #[serde(default)]
    pub keywords: Vec<String>,
    pub category: ExperienceCategory,
    #[serde(default, deserialize_with = "blank_as_none", skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none", skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ExperienceDraft {
    pub title: String,
    pub company: Option<String>,
    pub location: Option<String>,
    pub date_start: YearMonth,
    pub date_end: DateEnd,
    pub description: Vec<String>,
    pub achievements: Vec<String>,
    pub skills: Vec<String>,
    pub metrics: Vec<String>,
    pub keywords: Vec<String>,
    pub category: ExperienceCategory,
    pub url: Option<String>,
    pub notes: Option<String>,
}

impl ExperienceDraft {
    pub fn new(title: impl Into<String>, date_start: YearMonth, date_end: DateEnd) -> Self {
        Self {
            title: title.into(),
            company: None,
            location: None,
            date_start,
            date_end,
            description: Vec::new(),
            achievements: Vec::new(),
            skills: Vec::new(),
            metrics: Vec::new(),
            keywords: Vec::new(),
            category: ExperienceCategory::default(),
            url: None,
            notes: None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ExperiencePatch {
    pub title: Option<String>,
    pub company: Option<Option<String>>,
    pub location: Option<Option<String>>,
    pub date_start: Option<YearMonth>,
    pub date_end: Option<DateEnd>,
    pub description: Option<Vec<String>>,
    pub achievements: Option<Vec<String>>,
    pub skills: Option<Vec<String>>,
    pub metrics: Option<Vec<String>>,
    pub keywords: Option<Vec<String>>,
    pub category: Option<ExperienceCategory>,
    pub url: Option<Option<String>>,
    pub notes: Option<Option<String>>,
}

impl Record for ExperienceEntry {
    type Draft = ExperienceDraft;
    type Patch = ExperiencePatch;
    const SLOT: Slot = Slot::Experiences;

    fn id(&self) -> &str {
        &self.id
    }

    fn from_draft(id: String, draft: ExperienceDraft, _now: DateTime<Utc>) -> Self {
        ExperienceEntry {
            id,
            title: draft.title,
            company: draft.company,
            location: draft.location,
            date_start: draft.date_start,
            date_end: draft.date_end,
            description: draft.description,
            achievements: draft.achievements,
            skills: draft.skills,
            metrics: draft.metrics,
            keywords: draft.keywords,
            category: draft.category,
            url: draft.url,
            notes: draft.notes,
        }
    }

    fn apply(&mut self, patch: ExperiencePatch, _now: DateTime<Utc>) {
        apply_patch!(self, patch;
            title, company, location, date_start, date_end, description, achievements,
            skills, metrics, keywords, category, url, notes,
        );
    }

    fn validate(&self) -> Result<(), ValidationError> {
        require(&self.title, "title")?;
        if let DateEnd::Month(end) = self.date_end {
            if end < self.date_start {
                return Err(ValidationError::EndBeforeStart {
                    start: self.date_start,
                    end,
                });
            }
        }
        Ok(())
    }
}

// --- Resume versions ---

/// Value of a free-form resume section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CustomValue {
    Flag(bool),
    Number(serde_json::Number),
    Text(String),
    Map(BTreeMap<String, CustomValue>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Formatting {
    pub template: String,
    pub font_size: f64,
    pub font_family: String,
    pub spacing: f64,
}

impl Default for Formatting {
    fn default() -> Self {
        Self {
            template: "modern".to_string(),
            font_size: 11.0,
            font_family: "Inter".to_string(),
            spacing: 1.0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomContent {
    #[serde(default, deserialize_with = "blank_as_none", skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none", skip_serializing_if = "Option::is_none")]
    pub additional_info: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumeVersion {
    pub id: String,
    pub name: String,
    pub target_role: String,
    #[serde(default, deserialize_with = "blank_as_none", skip_serializing_if = "Option::is_none")]
    pub target_industry: Option<String>,
    pub created_at: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,
    /// Soft references into the experience bank.
    #[serde(default)]
    pub selected_experiences: Vec<String>,
    #[serde(default)]
    pub custom_sections: BTreeMap<String, CustomValue>,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub education: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_content: Option<CustomContent>,
    #[serde(default)]
    pub formatting: Formatting,
}

#[derive(Debug, Clone, Default)]
pub struct ResumeDraft {
    pub name: String,
    pub target_role: String,
    pub target_industry: Option<String>,
    pub selected_experiences: Vec<String>,
    pub custom_sections: BTreeMap<String, CustomValue>,
    pub skills: Vec<String>,
    pub education: Vec<String>,
    pub custom_content: Option<CustomContent>,
    pub formatting: Formatting,
}

/// Partial update of a resume. The timestamps are not patchable: `created_at`
/// never changes and `last_updated` is stamped by the store.
#[derive(Debug, Clone, Default)]
pub struct ResumePatch {
    pub name: Option<String>,
    pub target_role: Option<String>,
    pub target_industry: Option<Option<String>>,
    pub selected_experiences: Option<Vec<String>>,
    pub custom_sections: Option<BTreeMap<String, CustomValue>>,
    pub skills: Option<Vec<String>>,
    pub education: Option<Vec<String>>,
    pub custom_content: Option<Option<CustomContent>>,
    pub formatting: Option<Formatting>,
}

impl Record for ResumeVersion {
    type Draft = ResumeDraft;
    type Patch = ResumePatch;
    const SLOT: Slot = Slot::Resumes;

    fn id(&self) -> &str {
        &self.id
    }

    fn from_draft(id: String, draft: ResumeDraft, now: DateTime<Utc>) -> Self {
        ResumeVersion {
            id,
            name: draft.name,
            target_role: draft.target_role,
            target_industry: draft.target_industry,
            created_at: now,
            last_updated: now,
            selected_experiences: draft.selected_experiences,
            custom_sections: draft.custom_sections,
            skills: draft.skills,
            education: draft.education,
            custom_content: draft.custom_content,
            formatting: draft.formatting,
        }
    }

    fn apply(&mut self, patch: ResumePatch, now: DateTime<Utc>) {
        apply_patch!(self, patch;
            name, target_role, target_industry, selected_experiences, custom_sections,
            skills, education, custom_content, formatting,
        );
        self.last_updated = now;
    }

    fn validate(&self) -> Result<(), ValidationError> {
        require(&self.name, "name")
    }
}

// --- Role types ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalaryRange {
    pub min: f64,
    pub max: f64,
    pub currency: String,
}

impl Default for SalaryRange {
    fn default() -> Self {
        Self {
            min: 0.0,
            max: 0.0,
            currency: "USD".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleType {
    pub id: String,
    pub title: String,
    pub industry: String,
    #[serde(default, deserialize_with = "blank_as_none", skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub required_skills: Vec<String>,
    #[serde(default)]
    pub preferred_skills: Vec<String>,
    #[serde(default)]
    pub salary_range: SalaryRange,
    #[serde(default)]
    pub target_companies: Vec<String>,
    #[serde(default)]
    pub job_boards: Vec<String>,
    #[serde(default)]
    pub search_keywords: Vec<String>,
    #[serde(default)]
    pub associated_resumes: Vec<String>,
    #[serde(default, deserialize_with = "blank_as_none", skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct RoleTypeDraft {
    pub title: String,
    pub industry: String,
    pub description: Option<String>,
    pub required_skills: Vec<String>,
    pub preferred_skills: Vec<String>,
    pub salary_range: SalaryRange,
    pub target_companies: Vec<String>,
    pub job_boards: Vec<String>,
    pub search_keywords: Vec<String>,
    pub associated_resumes: Vec<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct RoleTypePatch {
    pub title: Option<String>,
    pub industry: Option<String>,
    pub description: Option<Option<String>>,
    pub required_skills: Option<Vec<String>>,
    pub preferred_skills: Option<Vec<String>>,
    pub salary_range: Option<SalaryRange>,
    pub target_companies: Option<Vec<String>>,
    pub job_boards: Option<Vec<String>>,
    pub search_keywords: Option<Vec<String>>,
    pub associated_resumes: Option<Vec<String>>,
    pub notes: Option<Option<String>>,
}

impl Record for RoleType {
    type Draft = RoleTypeDraft;
    type Patch = RoleTypePatch;
    const SLOT: Slot = Slot::RoleTypes;

    fn id(&self) -> &str {
        &self.id
    }

    fn from_draft(id: String, draft: RoleTypeDraft, _now: DateTime<Utc>) -> Self {
        RoleType {
            id,
            title: draft.title,
            industry: draft.industry,
            description: draft.description,
            required_skills: draft.required_skills,
            preferred_skills: draft.preferred_skills,
            salary_range: draft.salary_range,
            target_companies: draft.target_companies,
            job_boards: draft.job_boards,
            search_keywords: draft.search_keywords,
            associated_resumes: draft.associated_resumes,
            notes: draft.notes,
        }
    }

    fn apply(&mut self, patch: RoleTypePatch, _now: DateTime<Utc>) {
        apply_patch!(self, patch;
            title, industry, description, required_skills, preferred_skills, salary_range,
            target_companies, job_boards, search_keywords, associated_resumes, notes,
        );
    }

    fn validate(&self) -> Result<(), ValidationError> {
        require(&self.title, "title")?;
        require(&self.industry, "industry")?;
        let range = &self.salary_range;
        // A zero maximum means "not specified".
        if range.max > 0.0 && range.min > range.max {
            return Err(ValidationError::SalaryRange {
                min: range.min,
                max: range.max,
            });
        }
        Ok(())
    }
}

// --- Networking contacts ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Communication {
    pub id: String,
    pub date: NaiveDate,
    pub medium: String,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub follow_up_needed: bool,
    #[serde(default, deserialize_with = "blank_as_none", skip_serializing_if = "Option::is_none")]
    pub follow_up_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    pub id: String,
    pub name: String,
    #[serde(default, deserialize_with = "blank_as_none", skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none", skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none", skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none", skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none", skip_serializing_if = "Option::is_none")]
    pub linkedin: Option<String>,
    #[serde(default)]
    pub relationship: String,
    #[serde(default)]
    pub source: String,
    pub first_contact_date: NaiveDate,
    pub last_contact_date: NaiveDate,
    #[serde(default)]
    pub communications: Vec<Communication>,
    /// Soft references to job applications this contact referred.
    #[serde(default)]
    pub job_referrals: Vec<String>,
    #[serde(default)]
    pub notes: String,
}

#[derive(Debug, Clone, Default)]
pub struct ContactDraft {
    pub name: String,
    pub company: Option<String>,
    pub position: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub linkedin: Option<String>,
    pub relationship: String,
    pub source: String,
    /// Both contact dates default to today.
    pub first_contact_date: Option<NaiveDate>,
    pub last_contact_date: Option<NaiveDate>,
    pub communications: Vec<Communication>,
    pub job_referrals: Vec<String>,
    pub notes: String,
}

#[derive(Debug, Clone, Default)]
pub struct ContactPatch {
    pub name: Option<String>,
    pub company: Option<Option<String>>,
    pub position: Option<Option<String>>,
    pub email: Option<Option<String>>,
    pub phone: Option<Option<String>>,
    pub linkedin: Option<Option<String>>,
    pub relationship: Option<String>,
    pub source: Option<String>,
    pub first_contact_date: Option<NaiveDate>,
    pub last_contact_date: Option<NaiveDate>,
    pub communications: Option<Vec<Communication>>,
    pub job_referrals: Option<Vec<String>>,
    pub notes: Option<String>,
}

impl Record for Contact {
    type Draft = ContactDraft;
    type Patch = ContactPatch;
    const SLOT: Slot = Slot::Contacts;

    fn id(&self) -> &str {
        &self.id
    }

    fn from_draft(id: String, draft: ContactDraft, now: DateTime<Utc>) -> Self {
        let today = now.date_naive();
        Contact {
            id,
            name: draft.name,
            company: draft.company,
            position: draft.position,
            email: draft.email,
            phone: draft.phone,
            linkedin: draft.linkedin,
            relationship: draft.relationship,
            source: draft.source,
            first_contact_date: draft.first_contact_date.unwrap_or(today),
            last_contact_date: draft.last_contact_date.unwrap_or(today),
            communications: draft.communications,
            job_referrals: draft.job_referrals,
            notes: draft.notes,
        }
    }

    fn apply(&mut self, patch: ContactPatch, _now: DateTime<Utc>) {
        apply_patch!(self, patch;
            name, company, position, email, phone, linkedin, relationship, source,
            first_contact_date, last_contact_date, communications, job_referrals, notes,
        );
    }

    fn validate(&self) -> Result<(), ValidationError> {
        require(&self.name, "name")
    }
}
