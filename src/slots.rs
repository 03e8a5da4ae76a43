use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use std::cell::RefCell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use tracing::{debug, info, warn};

/// The named durable locations, one per entity kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    Applications,
    Experiences,
    Resumes,
    RoleTypes,
    Contacts,
}

impl Slot {
    pub const ALL: [Slot; 5] = [
        Slot::Applications,
        Slot::Experiences,
        Slot::Resumes,
        Slot::RoleTypes,
        Slot::Contacts,
    ];

    /// Key of the slot in the durable medium.
    pub fn key(self) -> &'static str {
        match self {
            Slot::Applications => "job_hunt_applications",
            Slot::Experiences => "job_hunt_experiences",
            Slot::Resumes => "job_hunt_resumes",
            Slot::RoleTypes => "job_hunt_role_types",
            Slot::Contacts => "job_hunt_contacts",
        }
    }

    /// Top-level key of the slot in an export document.
    pub fn export_key(self) -> &'static str {
        match self {
            Slot::Applications => "applications",
            Slot::Experiences => "experiences",
            Slot::Resumes => "resumes",
            Slot::RoleTypes => "roleTypes",
            Slot::Contacts => "contacts",
        }
    }
}

/// A string-keyed durable read/write primitive.
pub trait SlotBackend {
    fn read(&self, key: &str) -> Result<Option<String>>;
    fn write(&self, key: &str, value: &str) -> Result<()>;
}

// --- SQLite-backed slots ---

pub struct SqliteSlots {
    conn: Connection,
    path: PathBuf,
}

impl SqliteSlots {
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create {}", parent.display()))?;
            }
        }
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open {}", path.display()))?;
        let slots = Self {
            conn,
            path: path.to_path_buf(),
        };
        slots.init()?;
        Ok(slots)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn init(&self) -> Result<()> {
        self.conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS slots (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at TEXT NOT NULL DEFAULT (datetime('now'))
            );
            "#,
        )?;
        Ok(())
    }
}

impl SlotBackend for SqliteSlots {
    fn read(&self, key: &str) -> Result<Option<String>> {
        self.conn
            .query_row("SELECT value FROM slots WHERE key = ?1", [key], |row| row.get(0))
            .optional()
            .with_context(|| format!("Failed to read slot {}", key))
    }

    fn write(&self, key: &str, value: &str) -> Result<()> {
        self.conn
            .execute(
                "INSERT INTO slots (key, value) VALUES (?1, ?2)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = datetime('now')",
                params![key, value],
            )
            .with_context(|| format!("Failed to write slot {}", key))?;
        Ok(())
    }
}

// --- In-memory slots ---

#[derive(Default)]
pub struct MemorySlots {
    entries: RefCell<HashMap<String, String>>,
}

impl SlotBackend for MemorySlots {
    fn read(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> Result<()> {
        self.entries.borrow_mut().insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Handle on the durable medium shared by every store of a process.
///
/// With no backend, every slot reads as absent and every write is dropped.
/// Failures never reach the caller: a slot that cannot be read or parsed
/// loads as absent, and a failed write is only logged.
#[derive(Clone)]
pub struct Slots {
    backend: Option<Rc<dyn SlotBackend>>,
}

impl Slots {
    pub fn new(backend: impl SlotBackend + 'static) -> Self {
        Self {
            backend: Some(Rc::new(backend)),
        }
    }

    pub fn unavailable() -> Self {
        Self { backend: None }
    }

    pub fn is_available(&self) -> bool {
        self.backend.is_some()
    }

    pub fn load<T: DeserializeOwned>(&self, slot: Slot) -> Option<T> {
        let backend = self.backend.as_ref()?;
        let raw = match backend.read(slot.key()) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                warn!(slot = slot.key(), error = %format!("{:#}", e), "durable slot unreadable, starting empty");
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(slot = slot.key(), error = %e, "durable slot is malformed, starting empty");
                None
            }
        }
    }

    pub fn save<T: Serialize + ?Sized>(&self, slot: Slot, value: &T) {
        let Some(backend) = &self.backend else { return };
        let result = serde_json::to_string(value)
            .context("Failed to serialize snapshot")
            .and_then(|json| backend.write(slot.key(), &json));
        match result {
            Ok(()) => debug!(slot = slot.key(), "snapshot written"),
            Err(e) => warn!(slot = slot.key(), error = %format!("{:#}", e), "snapshot write failed"),
        }
    }

    /// One pretty-printed document holding every slot; absent slots export as `[]`.
    pub fn export_json(&self) -> Result<String> {
        let mut doc = Map::new();
        for slot in Slot::ALL {
            let value = self
                .load::<Value>(slot)
                .unwrap_or_else(|| Value::Array(Vec::new()));
            doc.insert(slot.export_key().to_string(), value);
        }
        serde_json::to_string_pretty(&Value::Object(doc)).context("Failed to serialize export")
    }

    /// Replace every slot named in `json` wholesale. Record shapes are not
    /// checked. Returns false, importing nothing, when the document does not
    /// parse as a JSON object or there is no durable medium.
    pub fn import_json(&self, json: &str) -> bool {
        if !self.is_available() {
            warn!("import requested but no durable medium is available");
            return false;
        }
        let doc = match serde_json::from_str::<Value>(json) {
            Ok(Value::Object(doc)) => doc,
            Ok(_) => {
                warn!("import document is not a JSON object");
                return false;
            }
            Err(e) => {
                warn!(error = %e, "import document failed to parse");
                return false;
            }
        };

        for slot in Slot::ALL {
            match doc.get(slot.export_key()) {
                None | Some(Value::Null) => debug!(slot = slot.key(), "not in import, left as is"),
                Some(value) => {
                    self.save(slot, value);
                    info!(slot = slot.key(), "slot replaced from import");
                }
            }
        }
        true
    }
}
