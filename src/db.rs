use anyhow::{anyhow, Result};
use chrono::NaiveDate;
use std::rc::Rc;
use tracing::info;

use crate::config::Config;
use crate::models::{
    Contact, ExperienceCategory, ExperienceEntry, JobApplication, ResumeVersion, RoleType,
};
use crate::slots::{MemorySlots, Slots, SqliteSlots};
use crate::status::{ApplicationStatus, StatusFilter};
use crate::store::{Clock, Record, RecordStore, SystemClock};

/// Every record store of the tracker, sharing one durable medium and one clock.
pub struct Database {
    slots: Slots,
    clock: Rc<dyn Clock>,
    location: String,
    pub applications: RecordStore<JobApplication>,
    pub experiences: RecordStore<ExperienceEntry>,
    pub resumes: RecordStore<ResumeVersion>,
    pub role_types: RecordStore<RoleType>,
    pub contacts: RecordStore<Contact>,
}

impl Database {
    pub fn open(config: &Config) -> Result<Self> {
        if config.ephemeral {
            return Ok(Self::with_slots(
                Slots::new(MemorySlots::default()),
                Rc::new(SystemClock),
                "memory",
            ));
        }
        let backend = SqliteSlots::open(&config.data_path)?;
        let location = backend.path().display().to_string();
        Ok(Self::with_slots(Slots::new(backend), Rc::new(SystemClock), location))
    }

    pub fn with_slots(slots: Slots, clock: Rc<dyn Clock>, location: impl Into<String>) -> Self {
        Self {
            applications: RecordStore::new(slots.clone(), clock.clone()),
            experiences: RecordStore::new(slots.clone(), clock.clone()),
            resumes: RecordStore::new(slots.clone(), clock.clone()),
            role_types: RecordStore::new(slots.clone(), clock.clone()),
            contacts: RecordStore::new(slots.clone(), clock.clone()),
            location: location.into(),
            slots,
            clock,
        }
    }

    /// Where the data lives, for display.
    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.now().date_naive()
    }

    pub fn export_json(&self) -> Result<String> {
        let doc = self.slots.export_json()?;
        info!("exported all slots");
        Ok(doc)
    }

    /// Replace slots from an export document, then re-read every store so
    /// that the next mutation snapshots the imported data rather than the
    /// stale in-memory copy.
    pub fn import_json(&mut self, json: &str) -> bool {
        if !self.slots.import_json(json) {
            return false;
        }
        self.applications.reload();
        self.experiences.reload();
        self.resumes.reload();
        self.role_types.reload();
        self.contacts.reload();
        true
    }
}

/// Resolve a full id or a unique id prefix to the full id.
pub fn resolve_id<R: Record>(store: &RecordStore<R>, what: &str, prefix: &str) -> Result<String> {
    if prefix.trim().is_empty() {
        return Err(anyhow!("No {} id given", what));
    }
    if let Some(record) = store.get(prefix) {
        return Ok(record.id().to_string());
    }
    let matches = store.find_by_prefix(prefix);
    match matches.as_slice() {
        [one] => Ok(one.id().to_string()),
        [] => Err(anyhow!("No {} matching '{}'", what, prefix)),
        _ => Err(anyhow!(
            "'{}' matches {} {}s; use more characters",
            prefix,
            matches.len(),
            what
        )),
    }
}

// --- Application queries ---

impl RecordStore<JobApplication> {
    pub fn by_status(&self, status: ApplicationStatus) -> Vec<&JobApplication> {
        self.find_by(|a: &JobApplication| &a.status, &status)
    }

    pub fn by_filter(&self, filter: StatusFilter) -> Vec<&JobApplication> {
        self.find(|a| filter.matches(a.status))
    }

    pub fn by_role_type(&self, role_type_id: &str) -> Vec<&JobApplication> {
        self.find_by(|a: &JobApplication| a.role_type.as_str(), role_type_id)
    }

    pub fn by_resume(&self, resume_id: &str) -> Vec<&JobApplication> {
        self.find_by(|a: &JobApplication| a.resume_used.as_str(), resume_id)
    }

    /// The `limit` most recently identified applications, newest first.
    pub fn recent(&self, limit: usize) -> Vec<&JobApplication> {
        let mut apps = self.find(|_| true);
        // Stable sort keeps creation order among same-day entries.
        apps.sort_by(|a, b| b.date_identified.cmp(&a.date_identified));
        apps.truncate(limit);
        apps
    }
}

// --- Experience queries ---

impl RecordStore<ExperienceEntry> {
    pub fn by_category(&self, category: ExperienceCategory) -> Vec<&ExperienceEntry> {
        self.find_by(|e: &ExperienceEntry| &e.category, &category)
    }

    /// Entries tagged with at least one of `skills` (exact match).
    pub fn with_any_skill(&self, skills: &[String]) -> Vec<&ExperienceEntry> {
        self.find(|e| skills.iter().any(|s| e.skills.contains(s)))
    }
}

// --- Resume queries ---

impl RecordStore<ResumeVersion> {
    pub fn by_target_role(&self, role: &str) -> Vec<&ResumeVersion> {
        self.find_by(|r: &ResumeVersion| r.target_role.as_str(), role)
    }
}

// --- Role type queries ---

impl RecordStore<RoleType> {
    pub fn by_industry(&self, industry: &str) -> Vec<&RoleType> {
        self.find_by(|r: &RoleType| r.industry.as_str(), industry)
    }
}

// --- Contact queries ---

impl RecordStore<Contact> {
    pub fn by_company(&self, company: &str) -> Vec<&Contact> {
        self.find(|c| c.company.as_deref() == Some(company))
    }

    pub fn referring(&self, application_id: &str) -> Vec<&Contact> {
        self.find(|c| c.job_referrals.iter().any(|id| id == application_id))
    }
}
