use chrono::{DateTime, Utc};
use once_cell::unsync::OnceCell;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::rc::Rc;
use tracing::debug;

use crate::models::ValidationError;
use crate::slots::{Slot, Slots};

/// A record kind that can live in a [`RecordStore`].
pub trait Record: Clone + Serialize + DeserializeOwned {
    /// Creation input: everything except the identifier and audit fields.
    type Draft;
    /// Partial update: each `Some` field replaces the stored value wholesale.
    type Patch;

    const SLOT: Slot;

    fn id(&self) -> &str;
    fn from_draft(id: String, draft: Self::Draft, now: DateTime<Utc>) -> Self;
    fn apply(&mut self, patch: Self::Patch, now: DateTime<Utc>);
    fn validate(&self) -> Result<(), ValidationError>;
}

pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Fresh 128-bit random identifier.
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Ordered, in-memory collection of one record kind, mirrored to its durable
/// slot after every mutation.
///
/// The slot is read once, on first use. Memory is authoritative from then
/// on: a failed durable write is logged and the mutation still stands.
pub struct RecordStore<R: Record> {
    slots: Slots,
    clock: Rc<dyn Clock>,
    records: OnceCell<Vec<R>>,
}

impl<R: Record> RecordStore<R> {
    pub fn new(slots: Slots, clock: Rc<dyn Clock>) -> Self {
        Self {
            slots,
            clock,
            records: OnceCell::new(),
        }
    }

    /// Whether the durable slot has been read yet.
    #[cfg(test)]
    pub fn is_loaded(&self) -> bool {
        self.records.get().is_some()
    }

    pub fn all(&self) -> &[R] {
        self.records.get_or_init(|| self.hydrate())
    }

    pub fn len(&self) -> usize {
        self.all().len()
    }

    pub fn is_empty(&self) -> bool {
        self.all().is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&R> {
        self.all().iter().find(|r| r.id() == id)
    }

    /// Records satisfying `pred`, in creation order.
    pub fn find<F>(&self, pred: F) -> Vec<&R>
    where
        F: Fn(&R) -> bool,
    {
        self.all().iter().filter(|r| pred(*r)).collect()
    }

    /// Records whose `field` equals `value`, in creation order.
    pub fn find_by<V, F>(&self, field: F, value: &V) -> Vec<&R>
    where
        V: PartialEq + ?Sized,
        F: Fn(&R) -> &V,
    {
        self.find(|r| field(r) == value)
    }

    /// Records whose id starts with `prefix`, for abbreviated ids typed by hand.
    pub fn find_by_prefix(&self, prefix: &str) -> Vec<&R> {
        self.find(|r| r.id().starts_with(prefix))
    }

    pub fn create(&mut self, draft: R::Draft) -> Result<R, ValidationError> {
        let record = R::from_draft(new_id(), draft, self.clock.now());
        record.validate()?;
        self.with_records(|records| records.push(record.clone()));
        debug!(slot = R::SLOT.key(), id = record.id(), "record created");
        self.persist();
        Ok(record)
    }

    /// Merge `patch` onto the record with `id`. `Ok(None)` when there is no
    /// such record; the store is then left untouched.
    pub fn update(&mut self, id: &str, patch: R::Patch) -> Result<Option<R>, ValidationError> {
        let now = self.clock.now();
        let updated = self.with_records(|records| -> Result<Option<R>, ValidationError> {
            let Some(existing) = records.iter_mut().find(|r| r.id() == id) else {
                return Ok(None);
            };
            let mut updated = existing.clone();
            updated.apply(patch, now);
            updated.validate()?;
            *existing = updated.clone();
            Ok(Some(updated))
        })?;
        if updated.is_some() {
            debug!(slot = R::SLOT.key(), id, "record updated");
            self.persist();
        }
        Ok(updated)
    }

    /// Remove the record with `id`; false when there was none. Records of
    /// other kinds that reference it are left as they are.
    pub fn delete(&mut self, id: &str) -> bool {
        let removed = self.with_records(|records| {
            let before = records.len();
            records.retain(|r| r.id() != id);
            records.len() != before
        });
        if !removed {
            return false;
        }
        debug!(slot = R::SLOT.key(), id, "record deleted");
        self.persist();
        true
    }

    /// Forget the in-memory copy so the next access re-reads the slot.
    pub fn reload(&mut self) {
        self.records = OnceCell::new();
    }

    fn hydrate(&self) -> Vec<R> {
        let records = self.slots.load::<Vec<R>>(R::SLOT).unwrap_or_default();
        debug!(slot = R::SLOT.key(), count = records.len(), "store hydrated");
        records
    }

    /// Run `f` on the records, hydrating them first if nothing has read them yet.
    fn with_records<T>(&mut self, f: impl FnOnce(&mut Vec<R>) -> T) -> T {
        let mut records = self.records.take().unwrap_or_else(|| self.hydrate());
        let out = f(&mut records);
        self.records = OnceCell::with_value(records);
        out
    }

    fn persist(&self) {
        self.slots.save(R::SLOT, self.all());
    }
}

#[cfg(test)]
pub mod testing {
    use super::*;
    use chrono::TimeZone;
    use std::cell::Cell;

    /// Clock that only moves when told to.
    pub struct ManualClock(Cell<DateTime<Utc>>);

    impl ManualClock {
        pub fn new() -> Rc<Self> {
            Rc::new(Self(Cell::new(Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap())))
        }

        pub fn advance(&self, by: chrono::Duration) {
            self.0.set(self.0.get() + by);
        }
    }

    impl Clock for ManualClock {
        fn now(&self) -> DateTime<Utc> {
            self.0.get()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::ManualClock;
    use super::*;
    use crate::models::{
        ApplicationDraft, ApplicationPatch, JobApplication, ResumeDraft, ResumePatch,
        ResumeVersion, RoleType, RoleTypeDraft,
    };
    use crate::slots::{MemorySlots, SlotBackend};
    use crate::status::ApplicationStatus;
    use anyhow::{anyhow, Result};
    use proptest::prelude::*;
    use std::collections::HashSet;

    fn memory_store<R: Record>() -> (RecordStore<R>, Slots, Rc<ManualClock>) {
        let slots = Slots::new(MemorySlots::default());
        let clock = ManualClock::new();
        (RecordStore::new(slots.clone(), clock.clone()), slots, clock)
    }

    fn draft(company: &str) -> ApplicationDraft {
        ApplicationDraft {
            company: company.to_string(),
            position: "Engineer".to_string(),
            location: "Remote".to_string(),
            ..Default::default()
        }
    }

    fn snapshot<R: Record>(store: &RecordStore<R>) -> serde_json::Value {
        serde_json::to_value(store.all()).unwrap()
    }

    #[test]
    fn test_hydrates_lazily_and_once() {
        let (mut store, slots, clock) = memory_store::<JobApplication>();
        assert!(!store.is_loaded());
        assert!(store.is_empty());
        assert!(store.is_loaded());

        store.create(draft("Acme")).unwrap();
        // Writes behind the store's back are not picked up again.
        slots.save(JobApplication::SLOT, &Vec::<JobApplication>::new());
        assert_eq!(store.len(), 1);

        let fresh: RecordStore<JobApplication> = RecordStore::new(slots, clock);
        assert!(fresh.is_empty());
    }

    #[test]
    fn test_mutations_on_unread_store_build_on_stored_records() {
        let (mut seed, slots, clock) = memory_store::<JobApplication>();
        let acme = seed.create(draft("Acme")).unwrap();
        let globex = seed.create(draft("Globex")).unwrap();

        let mut store: RecordStore<JobApplication> = RecordStore::new(slots.clone(), clock.clone());
        let updated = store
            .update(&acme.id, ApplicationPatch::status(ApplicationStatus::Applied))
            .unwrap();
        assert_eq!(updated.map(|a| a.status), Some(ApplicationStatus::Applied));
        assert_eq!(store.len(), 2);

        let mut store: RecordStore<JobApplication> = RecordStore::new(slots.clone(), clock.clone());
        assert!(store.delete(&globex.id));
        let stored: Vec<JobApplication> = slots.load(JobApplication::SLOT).unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].id, acme.id);
        assert_eq!(stored[0].status, ApplicationStatus::Applied);

        let mut store: RecordStore<JobApplication> = RecordStore::new(slots.clone(), clock);
        store.create(draft("Initech")).unwrap();
        let stored: Vec<JobApplication> = slots.load(JobApplication::SLOT).unwrap();
        assert_eq!(stored.len(), 2);
    }

    #[test]
    fn test_unavailable_medium_behaves_as_empty() {
        let mut store: RecordStore<RoleType> =
            RecordStore::new(Slots::unavailable(), ManualClock::new());
        assert!(store.is_empty());
        let role = store
            .create(RoleTypeDraft {
                title: "Backend Developer".to_string(),
                industry: "Fintech".to_string(),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(store.get(&role.id), Some(&role));
    }

    #[test]
    fn test_create_assigns_id_and_persists() {
        let (mut store, slots, clock) = memory_store::<JobApplication>();
        let app = store.create(draft("Acme")).unwrap();
        assert_eq!(app.id.len(), 36);
        assert_eq!(app.date_identified, clock.now().date_naive());

        let stored: Vec<JobApplication> = slots.load(JobApplication::SLOT).unwrap();
        assert_eq!(stored, vec![app]);
    }

    #[test]
    fn test_create_rejects_invalid_without_side_effects() {
        let (mut store, slots, _) = memory_store::<JobApplication>();
        let err = store.create(draft("")).unwrap_err();
        assert_eq!(err, ValidationError::Missing("company"));
        assert!(store.is_empty());
        assert_eq!(slots.load::<Vec<JobApplication>>(JobApplication::SLOT), None);
    }

    #[test]
    fn test_update_rejects_invalid_merge() {
        let (mut store, _, clock) = memory_store::<JobApplication>();
        let app = store.create(draft("Acme")).unwrap();
        let before = snapshot(&store);

        let bad = ApplicationPatch {
            date_applied: Some(Some(clock.now().date_naive() - chrono::Duration::days(1))),
            ..Default::default()
        };
        assert!(store.update(&app.id, bad).is_err());
        assert_eq!(snapshot(&store), before);
    }

    #[test]
    fn test_missing_id_is_a_normal_outcome() {
        let (mut store, _, _) = memory_store::<JobApplication>();
        store.create(draft("Acme")).unwrap();
        store.create(draft("Globex")).unwrap();
        let before = snapshot(&store);

        let result = store.update("no-such-id", ApplicationPatch::status(ApplicationStatus::Offer));
        assert_eq!(result, Ok(None));
        assert!(!store.delete("no-such-id"));
        assert_eq!(snapshot(&store), before);
    }

    #[test]
    fn test_failed_write_keeps_memory_authoritative() {
        struct FullDisk;
        impl SlotBackend for FullDisk {
            fn read(&self, _key: &str) -> Result<Option<String>> {
                Ok(None)
            }
            fn write(&self, _key: &str, _value: &str) -> Result<()> {
                Err(anyhow!("quota exceeded"))
            }
        }

        let mut store: RecordStore<JobApplication> =
            RecordStore::new(Slots::new(FullDisk), ManualClock::new());
        let app = store.create(draft("Acme")).unwrap();
        let updated = store
            .update(&app.id, ApplicationPatch::status(ApplicationStatus::Applied))
            .unwrap()
            .unwrap();
        assert_eq!(store.get(&app.id), Some(&updated));
        assert!(store.delete(&app.id));
        assert!(store.is_empty());
    }

    #[test]
    fn test_resume_timestamps() {
        let (mut store, _, clock) = memory_store::<ResumeVersion>();
        let created = store
            .create(ResumeDraft {
                name: "Frontend Resume".to_string(),
                target_role: "Frontend Developer".to_string(),
                ..Default::default()
            })
            .unwrap();
        let t0 = clock.now();
        assert_eq!(created.created_at, t0);
        assert_eq!(created.last_updated, t0);

        clock.advance(chrono::Duration::seconds(30));
        let updated = store
            .update(
                &created.id,
                ResumePatch {
                    name: Some("Updated Resume".to_string()),
                    ..Default::default()
                },
            )
            .unwrap()
            .unwrap();
        assert_eq!(updated.name, "Updated Resume");
        assert_eq!(updated.target_role, "Frontend Developer");
        assert_eq!(updated.created_at, t0);
        assert!(updated.last_updated > t0);

        // Even an empty patch refreshes the stamp.
        clock.advance(chrono::Duration::seconds(30));
        let touched = store.update(&created.id, ResumePatch::default()).unwrap().unwrap();
        assert!(touched.last_updated > updated.last_updated);
    }

    #[test]
    fn test_find_by_and_prefix() {
        let (mut store, _, _) = memory_store::<JobApplication>();
        let a = store.create(draft("Acme")).unwrap();
        store.create(draft("Globex")).unwrap();
        let c = store.create(draft("Acme")).unwrap();

        let acme: Vec<&str> = store
            .find_by(|r: &JobApplication| r.company.as_str(), "Acme")
            .into_iter()
            .map(|r| r.id.as_str())
            .collect();
        assert_eq!(acme, vec![a.id.as_str(), c.id.as_str()]);
        assert!(store.find_by(|r: &JobApplication| r.company.as_str(), "Initech").is_empty());
        assert_eq!(store.find_by_prefix(&a.id[..8])[0].id, a.id);
    }

    #[test]
    fn test_ten_thousand_ids_are_distinct() {
        let mut store: RecordStore<JobApplication> =
            RecordStore::new(Slots::unavailable(), ManualClock::new());
        let mut seen = HashSet::new();
        for i in 0..10_000 {
            let app = store.create(draft(&format!("Company {i}"))).unwrap();
            assert!(seen.insert(app.id));
        }
        assert_eq!(store.len(), 10_000);
    }

    #[derive(Debug, Clone)]
    enum Op {
        Create(String),
        SetStatus(usize, ApplicationStatus),
        SetNotes(usize, String),
        Delete(usize),
    }

    fn op() -> impl Strategy<Value = Op> {
        let status = proptest::sample::select(ApplicationStatus::ALL.to_vec());
        prop_oneof![
            "[A-Z][a-z]{1,8}".prop_map(Op::Create),
            (any::<usize>(), status).prop_map(|(i, s)| Op::SetStatus(i, s)),
            (any::<usize>(), ".{0,16}").prop_map(|(i, n)| Op::SetNotes(i, n)),
            any::<usize>().prop_map(Op::Delete),
        ]
    }

    fn pick(store: &RecordStore<JobApplication>, i: usize) -> Option<String> {
        let all = store.all();
        (!all.is_empty()).then(|| all[i % all.len()].id.clone())
    }

    proptest! {
        #[test]
        fn prop_snapshot_reload_is_identical(ops in proptest::collection::vec(op(), 0..40)) {
            let (mut store, slots, clock) = memory_store::<JobApplication>();
            for op in ops {
                match op {
                    Op::Create(company) => { store.create(draft(&company)).unwrap(); }
                    Op::SetStatus(i, status) => if let Some(id) = pick(&store, i) {
                        store.update(&id, ApplicationPatch::status(status)).unwrap();
                    },
                    Op::SetNotes(i, notes) => if let Some(id) = pick(&store, i) {
                        let patch = ApplicationPatch { notes: Some(notes), ..Default::default() };
                        store.update(&id, patch).unwrap();
                    },
                    Op::Delete(i) => if let Some(id) = pick(&store, i) {
                        prop_assert!(store.delete(&id));
                    },
                }
            }
            let reloaded: RecordStore<JobApplication> = RecordStore::new(slots, clock);
            prop_assert_eq!(reloaded.all(), store.all());
        }

        #[test]
        fn prop_partial_update_keeps_other_fields(
            companies in proptest::collection::vec("[A-Z][a-z]{1,8}", 1..10),
            target in any::<usize>(),
            notes in ".{0,24}",
        ) {
            let (mut store, _, _) = memory_store::<JobApplication>();
            for company in &companies {
                store.create(draft(company)).unwrap();
            }
            let id = pick(&store, target).unwrap();
            let mut before = serde_json::to_value(store.get(&id).unwrap()).unwrap();

            let patch = ApplicationPatch { notes: Some(notes.clone()), ..Default::default() };
            let after = serde_json::to_value(store.update(&id, patch).unwrap().unwrap()).unwrap();

            before["notes"] = serde_json::Value::String(notes);
            prop_assert_eq!(after, before);
        }

        #[test]
        fn prop_updates_preserve_creation_order(
            companies in proptest::collection::vec("[A-Z][a-z]{1,8}", 1..20),
            touches in proptest::collection::vec(any::<usize>(), 0..30),
        ) {
            let (mut store, _, _) = memory_store::<JobApplication>();
            let ids: Vec<String> = companies
                .iter()
                .map(|c| store.create(draft(c)).unwrap().id)
                .collect();
            for t in touches {
                let id = &ids[t % ids.len()];
                store.update(id, ApplicationPatch::status(ApplicationStatus::Interview)).unwrap();
            }
            let seen: Vec<String> = store.find(|_| true).into_iter().map(|r| r.id.clone()).collect();
            prop_assert_eq!(seen, ids);
        }
    }
}
