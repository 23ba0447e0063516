//! Editing sessions with debounced auto-save.
//!
//! A session owns the invoice being edited and at most one pending save.
//! Every edit pushes the pending save back to `now + delay`; the save runs
//! once the session is polled after a quiet period. The deadline is a plain
//! value rather than a runtime timer, so hosts drive it from whatever event
//! loop they have (a `setInterval` in the browser, a tick in a CLI).

use chrono::{DateTime, TimeDelta, Utc};
use tracing::{debug, info};

use crate::clock::Clock;
use crate::error::Result;
use crate::models::invoice::Invoice;
use crate::repository::Repository;
use crate::storage::KeyValueStore;

/// Quiet period before an edited invoice is saved automatically.
pub const DEFAULT_AUTOSAVE_DELAY_MS: i64 = 5_000;

/// A scheduled auto-save.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingSave {
    due: DateTime<Utc>,
}

impl PendingSave {
    /// Instant at which the save becomes due.
    pub fn due(&self) -> DateTime<Utc> {
        self.due
    }

    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        now >= self.due
    }
}

/// An invoice being edited, with its auto-save timer.
#[derive(Debug)]
pub struct EditingSession<S, C> {
    repo: Repository<S, C>,
    invoice: Invoice,
    pending: Option<PendingSave>,
    delay: TimeDelta,
}

impl<S: KeyValueStore, C: Clock> EditingSession<S, C> {
    /// Open an editing session.
    ///
    /// Loads the invoice with `id` when it exists. Otherwise picks up a
    /// parked draft (consuming it), or starts a new invoice with the next
    /// invoice number.
    pub fn open(mut repo: Repository<S, C>, id: Option<&str>) -> Result<Self> {
        let existing = match id {
            Some(id) => repo.find_invoice(id)?,
            None => None,
        };

        let invoice = match existing {
            Some(invoice) => invoice,
            None => match repo.take_draft()? {
                Some(draft) => {
                    debug!("Resuming parked draft {}", draft.id);
                    draft
                }
                None => repo.new_invoice()?,
            },
        };

        Ok(Self::with_invoice(repo, invoice))
    }

    /// Start a session on an invoice that is already in memory.
    pub fn with_invoice(repo: Repository<S, C>, invoice: Invoice) -> Self {
        Self {
            repo,
            invoice,
            pending: None,
            delay: TimeDelta::milliseconds(DEFAULT_AUTOSAVE_DELAY_MS),
        }
    }

    /// Change the auto-save quiet period.
    pub fn with_delay(mut self, delay: TimeDelta) -> Self {
        self.delay = delay;
        self
    }

    pub fn invoice(&self) -> &Invoice {
        &self.invoice
    }

    pub fn repository(&self) -> &Repository<S, C> {
        &self.repo
    }

    pub fn repository_mut(&mut self) -> &mut Repository<S, C> {
        &mut self.repo
    }

    /// The scheduled auto-save, if any.
    pub fn pending(&self) -> Option<PendingSave> {
        self.pending
    }

    /// Apply an edit and reschedule the auto-save.
    pub fn edit<F, R>(&mut self, f: F) -> R
    where
        F: FnOnce(&mut Invoice) -> R,
    {
        let result = f(&mut self.invoice);
        self.schedule();
        result
    }

    /// Apply a fallible edit. The auto-save is only rescheduled on success.
    pub fn try_edit<F, R, E>(&mut self, f: F) -> std::result::Result<R, E>
    where
        F: FnOnce(&mut Invoice) -> std::result::Result<R, E>,
    {
        let result = f(&mut self.invoice)?;
        self.schedule();
        Ok(result)
    }

    /// Save if the pending auto-save is due. Returns whether a save happened.
    pub fn poll(&mut self) -> Result<bool> {
        match self.pending {
            Some(pending) if pending.is_due(self.repo.clock().now()) => {
                self.persist()?;
                info!("Auto-saved invoice {}", self.invoice.number);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    /// Save immediately, cancelling any pending auto-save.
    pub fn save_now(&mut self) -> Result<&Invoice> {
        self.persist()?;
        Ok(&self.invoice)
    }

    /// Cancel the pending auto-save without saving.
    pub fn discard(&mut self) {
        self.pending = None;
    }

    /// End the session, returning the repository and the edited invoice.
    pub fn into_parts(self) -> (Repository<S, C>, Invoice) {
        (self.repo, self.invoice)
    }

    fn schedule(&mut self) {
        let due = self.repo.clock().now() + self.delay;
        // Replaces any earlier deadline.
        self.pending = Some(PendingSave { due });
    }

    /// A failed save leaves the pending auto-save in place for the next poll.
    fn persist(&mut self) -> Result<()> {
        self.invoice = self.repo.save_invoice(&self.invoice)?;
        self.pending = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;
    use std::rc::Rc;

    use crate::clock::ManualClock;
    use crate::error::{InvoiceError, StorageError};
    use crate::storage::{self, MemoryStore};
    use std::cell::Cell;

    fn session() -> (EditingSession<MemoryStore, Rc<ManualClock>>, Rc<ManualClock>) {
        let start = NaiveDate::from_ymd_opt(2024, 2, 10)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap()
            .and_utc();
        let clock = Rc::new(ManualClock::new(start));
        let repo = Repository::with_clock(MemoryStore::new(), Rc::clone(&clock));
        (EditingSession::open(repo, None).unwrap(), clock)
    }

    #[test]
    fn test_open_new_invoice_is_not_saved() {
        let (session, _) = session();
        assert_eq!(session.invoice().number, "INV-2024-001");
        assert!(session.pending().is_none());
        assert!(session.repository().invoices().unwrap().is_empty());
    }

    #[test]
    fn test_edit_schedules_save_after_delay() {
        let (mut session, clock) = session();

        session.edit(|inv| inv.notes = "hello".to_string());
        let due = session.pending().unwrap().due();
        assert_eq!(due, clock.now() + TimeDelta::seconds(5));

        clock.advance(TimeDelta::seconds(4));
        assert!(!session.poll().unwrap());
        assert!(session.repository().invoices().unwrap().is_empty());

        clock.advance(TimeDelta::seconds(1));
        assert!(session.poll().unwrap());
        assert!(session.pending().is_none());

        let stored = session.repository().invoices().unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].notes, "hello");
    }

    #[test]
    fn test_edits_push_deadline_back() {
        let (mut session, clock) = session();

        session.edit(|inv| inv.title = "a".to_string());
        clock.advance(TimeDelta::seconds(3));
        session.edit(|inv| inv.title = "ab".to_string());
        clock.advance(TimeDelta::seconds(3));

        // 6s after the first edit, 3s after the last one.
        assert!(!session.poll().unwrap());

        clock.advance(TimeDelta::seconds(2));
        assert!(session.poll().unwrap());
        assert!(!session.poll().unwrap());

        let stored = session.repository().invoices().unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].title, "ab");
    }

    #[test]
    fn test_failed_edit_does_not_schedule() {
        let (mut session, _) = session();
        let only = session.invoice().line_items()[0].id.clone();

        let err = session.try_edit(|inv| inv.remove_line_item(&only)).unwrap_err();

        assert_eq!(err, InvoiceError::LastLineItem);
        assert!(session.pending().is_none());
    }

    #[test]
    fn test_save_now_cancels_pending() {
        let (mut session, clock) = session();
        session.edit(|inv| inv.tax_rate = 15.0);

        let saved = session.save_now().unwrap().clone();
        assert!(session.pending().is_none());
        assert_eq!(saved.created_at, clock.now());

        clock.advance(TimeDelta::seconds(10));
        assert!(!session.poll().unwrap());
        assert_eq!(session.repository().invoices().unwrap().len(), 1);
    }

    #[test]
    fn test_discard_cancels_without_saving() {
        let (mut session, clock) = session();
        session.edit(|inv| inv.notes = "draft".to_string());

        session.discard();
        clock.advance(TimeDelta::seconds(10));

        assert!(!session.poll().unwrap());
        assert!(session.repository().invoices().unwrap().is_empty());
    }

    /// Memory store whose writes fail while `offline` is set.
    struct FlakyStore {
        inner: MemoryStore,
        offline: Rc<Cell<bool>>,
    }

    impl KeyValueStore for FlakyStore {
        fn get(&self, key: &str) -> storage::Result<Option<String>> {
            self.inner.get(key)
        }

        fn set(&mut self, key: &str, value: &str) -> storage::Result<()> {
            if self.offline.get() {
                return Err(StorageError::Backend("quota exceeded".to_string()));
            }
            self.inner.set(key, value)
        }

        fn remove(&mut self, key: &str) -> storage::Result<()> {
            self.inner.remove(key)
        }
    }

    #[test]
    fn test_failed_auto_save_stays_pending() {
        let start = NaiveDate::from_ymd_opt(2024, 2, 10)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap()
            .and_utc();
        let clock = Rc::new(ManualClock::new(start));
        let offline = Rc::new(Cell::new(false));
        let store = FlakyStore {
            inner: MemoryStore::new(),
            offline: Rc::clone(&offline),
        };
        let repo = Repository::with_clock(store, Rc::clone(&clock));
        let mut session = EditingSession::open(repo, None).unwrap();

        session.edit(|inv| inv.notes = "offline edit".to_string());
        offline.set(true);
        clock.advance(TimeDelta::seconds(5));

        assert!(session.poll().is_err());
        assert!(session.pending().is_some());

        offline.set(false);
        assert!(session.poll().unwrap());
        assert!(session.pending().is_none());
        assert_eq!(session.repository().invoices().unwrap()[0].notes, "offline edit");
    }

    #[test]
    fn test_custom_delay() {
        let (session, clock) = session();
        let mut session = session.with_delay(TimeDelta::milliseconds(250));

        session.edit(|inv| inv.notes = "quick".to_string());
        clock.advance(TimeDelta::milliseconds(250));

        assert!(session.poll().unwrap());
    }

    #[test]
    fn test_open_existing_and_parked_draft() {
        let (mut session, _) = session();
        let saved = session.save_now().unwrap().clone();
        let (mut repo, _) = session.into_parts();

        let copy = saved.duplicate();
        repo.stash_draft(&copy).unwrap();

        let reopened = EditingSession::open(repo, Some(saved.id.as_str())).unwrap();
        assert_eq!(reopened.invoice().id, saved.id);
        let (repo, _) = reopened.into_parts();

        let from_draft = EditingSession::open(repo, Some("unknown")).unwrap();
        assert_eq!(from_draft.invoice().id, copy.id);
        assert_eq!(from_draft.invoice().number, "INV-2024-001-COPY");
        let (repo, _) = from_draft.into_parts();

        let fresh = EditingSession::open(repo, None).unwrap();
        assert_eq!(fresh.invoice().number, "INV-2024-002");
    }
}
