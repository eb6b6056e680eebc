use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::contacts::ContactStore;
use crate::error::{TrackerError, TrackerResult};
use crate::health::HealthSummary;
use crate::types::{EmergencyContact, FallEntry, FallRecord, Location};

/// Last-known position, if any.
pub trait LocationProvider {
    fn current(&self) -> Option<Location>;
}

pub trait Dialer {
    fn call(&mut self, phone: &str) -> TrackerResult<()>;
}

/// Asks the user a yes/no question.
pub trait ConfirmPrompt {
    fn confirm(&mut self, message: &str) -> bool;
}

/// Location fixed at construction (e.g. from command-line coordinates).
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedLocation(pub Option<Location>);

impl LocationProvider for FixedLocation {
    fn current(&self) -> Option<Location> {
        self.0
    }
}

/// Answers every prompt the same way.
#[derive(Debug, Clone, Copy)]
pub struct AutoConfirm(pub bool);

impl ConfirmPrompt for AutoConfirm {
    fn confirm(&mut self, message: &str) -> bool {
        log::info!("{} -> {}", message, if self.0 { "yes" } else { "no" });
        self.0
    }
}

/// Hands the number off as a `tel:` link in the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogDialer;

impl Dialer for LogDialer {
    fn call(&mut self, phone: &str) -> TrackerResult<()> {
        log::warn!("[EMERGENCY] dialing tel:{}", phone);
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum NotificationOutcome {
    /// No contact configured; nothing recorded or dialed
    NoContact,
    /// Fall recorded, user declined the call
    Declined,
    /// Fall recorded and the contact was dialed
    Dialed,
    Failed(String),
}

/// Fires once per transition into the Fall state.
pub struct FallNotifier {
    contacts: Box<dyn ContactStore + Send>,
    location: Box<dyn LocationProvider + Send>,
    dialer: Box<dyn Dialer + Send>,
    confirm: Box<dyn ConfirmPrompt + Send>,
}

impl FallNotifier {
    pub fn new(
        contacts: Box<dyn ContactStore + Send>,
        location: Box<dyn LocationProvider + Send>,
        dialer: Box<dyn Dialer + Send>,
        confirm: Box<dyn ConfirmPrompt + Send>,
    ) -> Self {
        Self {
            contacts,
            location,
            dialer,
            confirm,
        }
    }

    pub fn contacts(&self) -> &dyn ContactStore {
        &*self.contacts
    }

    pub fn contacts_mut(&mut self) -> &mut dyn ContactStore {
        &mut *self.contacts
    }

    /// Handle one fall entry.
    ///
    /// A fall is only written to the history when a contact exists; with no
    /// contact the trigger is a complete no-op.
    pub fn notify(&mut self, summary: &mut HealthSummary) -> TrackerResult<NotificationOutcome> {
        let Some(contact) = self.contacts.get()? else {
            log::warn!("fall detected but no emergency contact is configured");
            return Ok(NotificationOutcome::NoContact);
        };

        let location = self.location.current();
        let mut message = format!("Fall detected\nContact: {}\n", contact.name);
        match location {
            Some(loc) => message.push_str(&format!("Location: {}", loc.map_link())),
            None => log::warn!("location unavailable, alert will not include a position"),
        }
        log::warn!("{}", message.trim_end());

        summary.record_fall(FallRecord {
            detected_at: Utc::now(),
            location,
        });

        let question = format!("Fall detected! Call emergency contact {} now?", contact.name);
        if !self.confirm.confirm(&question) {
            return Ok(NotificationOutcome::Declined);
        }

        self.emergency_call()?;
        Ok(NotificationOutcome::Dialed)
    }

    /// Run `notify` once per entry. Failures are logged and reported in the
    /// outcome list; they never stop the remaining entries.
    pub fn dispatch(
        &mut self,
        entries: &[FallEntry],
        summary: &mut HealthSummary,
    ) -> Vec<NotificationOutcome> {
        entries
            .iter()
            .map(|entry| {
                log::debug!("dispatching fall entry at t={}", entry.time);
                match self.notify(summary) {
                    Ok(outcome) => outcome,
                    Err(e) => {
                        log::error!("notification for fall at t={} failed: {}", entry.time, e);
                        NotificationOutcome::Failed(e.to_string())
                    }
                }
            })
            .collect()
    }

    /// Dial the stored contact.
    pub fn emergency_call(&mut self) -> TrackerResult<EmergencyContact> {
        let contact = self
            .contacts
            .get()?
            .filter(|c| !c.phone.trim().is_empty())
            .ok_or(TrackerError::MissingContact)?;

        self.dialer.call(&contact.phone)?;
        log::info!("calling contact {} ({})", contact.name, contact.phone);
        Ok(contact)
    }
}
