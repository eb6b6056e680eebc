use std::fs;
use std::path::PathBuf;

use serde_json::{Map, Value};

use crate::error::{TrackerError, TrackerResult};
use crate::types::EmergencyContact;

/// Key under which the single contact record is stored.
pub const CONTACT_KEY: &str = "emergencyContact";

/// Persistence for the single emergency contact record.
pub trait ContactStore {
    fn get(&self) -> TrackerResult<Option<EmergencyContact>>;
    fn set(&mut self, contact: EmergencyContact) -> TrackerResult<()>;
}

/// Validate and store a contact. Both fields are required.
pub fn save_contact(
    store: &mut dyn ContactStore,
    name: &str,
    phone: &str,
) -> TrackerResult<EmergencyContact> {
    let name = name.trim();
    let phone = phone.trim();
    if name.is_empty() || phone.is_empty() {
        return Err(TrackerError::InvalidContact(
            "both name and phone are required".to_string(),
        ));
    }

    let contact = EmergencyContact {
        name: name.to_string(),
        phone: phone.to_string(),
    };
    store.set(contact.clone())?;
    log::info!("emergency contact saved: {}", contact.name);
    Ok(contact)
}

#[derive(Debug, Default, Clone)]
pub struct MemoryContactStore {
    contact: Option<EmergencyContact>,
}

impl MemoryContactStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_contact(name: &str, phone: &str) -> Self {
        Self {
            contact: Some(EmergencyContact {
                name: name.to_string(),
                phone: phone.to_string(),
            }),
        }
    }
}

impl ContactStore for MemoryContactStore {
    fn get(&self) -> TrackerResult<Option<EmergencyContact>> {
        Ok(self.contact.clone())
    }

    fn set(&mut self, contact: EmergencyContact) -> TrackerResult<()> {
        self.contact = Some(contact);
        Ok(())
    }
}

/// Key-value JSON file; the contact lives under [`CONTACT_KEY`] and any other
/// keys in the file are left untouched.
#[derive(Debug, Clone)]
pub struct JsonContactStore {
    path: PathBuf,
}

impl JsonContactStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    fn read_entries(&self) -> TrackerResult<Map<String, Value>> {
        if !self.path.exists() {
            return Ok(Map::new());
        }
        let contents = fs::read_to_string(&self.path).map_err(|e| {
            TrackerError::Storage(format!("failed to read {}: {}", self.path.display(), e))
        })?;
        if contents.trim().is_empty() {
            return Ok(Map::new());
        }
        match serde_json::from_str::<Value>(&contents)? {
            Value::Object(map) => Ok(map),
            _ => Err(TrackerError::Storage(format!(
                "{} does not hold a JSON object",
                self.path.display()
            ))),
        }
    }
}

impl ContactStore for JsonContactStore {
    fn get(&self) -> TrackerResult<Option<EmergencyContact>> {
        let mut entries = self.read_entries()?;
        match entries.remove(CONTACT_KEY) {
            None | Some(Value::Null) => Ok(None),
            Some(value) => Ok(Some(serde_json::from_value(value)?)),
        }
    }

    fn set(&mut self, contact: EmergencyContact) -> TrackerResult<()> {
        let mut entries = self.read_entries()?;
        entries.insert(CONTACT_KEY.to_string(), serde_json::to_value(&contact)?);

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let serialized = serde_json::to_string_pretty(&Value::Object(entries))?;
        fs::write(&self.path, serialized).map_err(|e| {
            TrackerError::Storage(format!("failed to write {}: {}", self.path.display(), e))
        })
    }
}
