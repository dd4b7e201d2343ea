//! Per-process session state.
//!
//! Holds the three flags that gate a turn: the persisted speak preference,
//! whether the last interaction arrived by voice, and the in-flight guard
//! that keeps a second utterance from being processed concurrently.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::error::Result;
use crate::storage::{LocalStore, SETTINGS_KEY};

/// Where an utterance came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    /// Transcribed from the microphone.
    Voice,
    /// Typed into the text box or CLI.
    Typed,
}

/// What kind of output is about to be vocalized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputKind {
    /// A reply to the current interaction.
    Reply,
    /// A recognition advisory (permission denied, unsupported). Spoken even
    /// for typed interactions.
    SafetyAdvisory,
}

/// Session flags shared by the dispatch pipeline.
#[derive(Debug)]
pub struct Session {
    speak_enabled: AtomicBool,
    last_was_voice: AtomicBool,
    in_flight: AtomicBool,
    store: Option<Arc<LocalStore>>,
}

impl Session {
    /// Session whose speak preference is loaded from (and saved to) `store`.
    pub fn new(store: Arc<LocalStore>) -> Self {
        let speak = store.get(SETTINGS_KEY, true);
        Self {
            speak_enabled: AtomicBool::new(speak),
            last_was_voice: AtomicBool::new(false),
            in_flight: AtomicBool::new(false),
            store: Some(store),
        }
    }

    /// Session with nothing persisted; speaking is enabled.
    pub fn ephemeral() -> Self {
        Self {
            speak_enabled: AtomicBool::new(true),
            last_was_voice: AtomicBool::new(false),
            in_flight: AtomicBool::new(false),
            store: None,
        }
    }

    /// Current speak preference.
    pub fn speak_enabled(&self) -> bool {
        self.speak_enabled.load(Ordering::SeqCst)
    }

    /// Set and persist the speak preference.
    ///
    /// # Errors
    ///
    /// Returns an error if the preference cannot be persisted; the
    /// in-memory flag is updated regardless.
    pub fn set_speak_enabled(&self, enabled: bool) -> Result<()> {
        self.speak_enabled.store(enabled, Ordering::SeqCst);
        match &self.store {
            Some(store) => store.save(SETTINGS_KEY, &enabled),
            None => Ok(()),
        }
    }

    /// Flip the speak preference, returning the new value.
    ///
    /// # Errors
    ///
    /// See [`Session::set_speak_enabled`].
    pub fn toggle_speak(&self) -> Result<bool> {
        let next = !self.speak_enabled();
        self.set_speak_enabled(next)?;
        Ok(next)
    }

    /// Remember where the current interaction came from.
    pub fn record_origin(&self, origin: Origin) {
        self.last_was_voice
            .store(origin == Origin::Voice, Ordering::SeqCst);
    }

    /// Whether the most recent interaction was voice-originated.
    pub fn last_was_voice(&self) -> bool {
        self.last_was_voice.load(Ordering::SeqCst)
    }

    /// Whether output of `kind` should be spoken for the current interaction.
    ///
    /// Replies are spoken only for voice interactions; safety advisories
    /// ignore the origin. Both respect the speak preference.
    pub fn should_vocalize(&self, kind: OutputKind) -> bool {
        if !self.speak_enabled() {
            return false;
        }
        match kind {
            OutputKind::Reply => self.last_was_voice(),
            OutputKind::SafetyAdvisory => true,
        }
    }

    /// Try to take the in-flight guard.
    ///
    /// Returns `None` when another utterance is being processed; the caller
    /// drops its input rather than queueing it.
    pub fn try_begin(&self) -> Option<InFlightGuard<'_>> {
        self.in_flight
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .ok()
            .map(|_| InFlightGuard { session: self })
    }

    /// Whether an utterance is currently being processed.
    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst)
    }
}

/// Releases the in-flight flag on drop, on every exit path.
#[derive(Debug)]
pub struct InFlightGuard<'a> {
    session: &'a Session,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.session.in_flight.store(false, Ordering::SeqCst);
    }
}
