//! Debounced address suggestions for a single input field.
//!
//! Every keystroke bumps the field's epoch. A lookup is scheduled after the quiet period and
//! remembers the epoch it was issued under; its answer is only applied if the field is still
//! at that epoch when it arrives. Superseded lookups are also aborted, so at most one is ever
//! outstanding per field.
//!
//! The controller spawns its lookups on the current tokio runtime and must be driven from
//! within one.

use std::sync::Arc;

use nearby_services::{AddressCandidate, GeocodeError, GeocodeResolver};
use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tracing::{Instrument, debug, debug_span, warn};

use crate::config::AutocompleteConfig;

/// Lifecycle of the suggestion list for the current keystroke burst.
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SuggestionPhase {
    /// Nothing scheduled and no list showing.
    #[default]
    Idle,
    /// A lookup is scheduled or in flight; doubles as the loading indicator.
    Pending,
    /// The latest lookup produced suggestions.
    Suggesting,
    /// The latest lookup matched nothing.
    Empty,
    /// The latest lookup failed; suggestions stay off until the next keystroke.
    Failed,
}

/// What the field currently shows.
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AutocompleteSnapshot {
    pub value: String,
    pub phase: SuggestionPhase,
    /// Suggestions visible to the user; empty while the list is closed.
    pub suggestions: Vec<AddressCandidate>,
}

impl AutocompleteSnapshot {
    pub fn is_loading(&self) -> bool {
        self.phase == SuggestionPhase::Pending
    }
}

#[derive(Debug, Default)]
struct FieldState {
    value: String,
    phase: SuggestionPhase,
    suggestions: Vec<AddressCandidate>,
    open: bool,
    selection: Option<AddressCandidate>,
    epoch: u64,
}

impl FieldState {
    fn supersede(&mut self) -> u64 {
        self.epoch += 1;
        self.epoch
    }

    fn close(&mut self) {
        self.open = false;
        self.phase = SuggestionPhase::Idle;
    }

    fn apply(&mut self, result: Result<Vec<AddressCandidate>, GeocodeError>) {
        match result {
            Ok(candidates) if !candidates.is_empty() => {
                self.suggestions = candidates;
                self.open = true;
                self.phase = SuggestionPhase::Suggesting;
            }
            Ok(_) | Err(GeocodeError::NotFound { .. } | GeocodeError::EmptyQuery) => {
                self.suggestions.clear();
                self.open = false;
                self.phase = SuggestionPhase::Empty;
            }
            Err(GeocodeError::Unavailable(reason)) => {
                // Suggestions are a soft affordance: log and go quiet.
                debug!(reason = %reason, "Suggestion lookup failed");
                self.suggestions.clear();
                self.open = false;
                self.phase = SuggestionPhase::Failed;
            }
        }
    }
}

pub struct AutocompleteController {
    resolver: Arc<dyn GeocodeResolver>,
    config: AutocompleteConfig,
    state: Arc<Mutex<FieldState>>,
    pending: Option<JoinHandle<()>>,
}

impl AutocompleteController {
    pub fn new(resolver: Arc<dyn GeocodeResolver>) -> Self {
        Self::with_config(resolver, AutocompleteConfig::default())
    }

    pub fn with_config(resolver: Arc<dyn GeocodeResolver>, config: AutocompleteConfig) -> Self {
        Self {
            resolver,
            config,
            state: Arc::new(Mutex::new(FieldState::default())),
            pending: None,
        }
    }

    pub fn config(&self) -> &AutocompleteConfig {
        &self.config
    }

    /// Record a keystroke.
    ///
    /// The visible value changes immediately. Any earlier scheduled or in-flight lookup is
    /// superseded, and a new one is scheduled for after the quiet period when the trimmed
    /// text is long enough.
    pub fn on_input(&mut self, text: impl Into<String>) {
        let text = text.into();
        self.abort_pending();

        let query = text.trim().to_string();
        let long_enough = query.chars().count() >= self.config.min_query_chars;

        let epoch = {
            let mut state = self.state.lock();
            let epoch = state.supersede();
            state.value = text;
            state.selection = None;
            if long_enough {
                state.phase = SuggestionPhase::Pending;
            } else {
                state.suggestions.clear();
                state.close();
            }
            epoch
        };

        if long_enough {
            self.schedule(query, epoch);
        }
    }

    /// Commit a suggestion as the field value and close the list.
    pub fn on_select(&mut self, candidate: &AddressCandidate) {
        self.abort_pending();
        let mut state = self.state.lock();
        state.supersede();
        state.value.clone_from(&candidate.display_name);
        state.selection = Some(candidate.clone());
        state.suggestions.clear();
        state.close();
    }

    /// Close the list after an interaction outside the control. The value is kept.
    ///
    /// A lookup still pending at this point is dropped so it cannot reopen the list.
    pub fn on_blur_outside(&mut self) {
        self.abort_pending();
        let mut state = self.state.lock();
        state.supersede();
        state.close();
    }

    /// Replace the value without looking anything up, e.g. when a form is cleared.
    pub fn reset(&mut self, value: impl Into<String>) {
        self.abort_pending();
        let mut state = self.state.lock();
        state.supersede();
        state.value = value.into();
        state.selection = None;
        state.suggestions.clear();
        state.close();
    }

    /// Wait for the outstanding lookup, if any, to finish and be applied (or discarded).
    pub async fn settle(&mut self) {
        if let Some(handle) = self.pending.take()
            && let Err(e) = handle.await
            && e.is_panic()
        {
            warn!(error = %e, "Suggestion task panicked");
        }
    }

    pub fn value(&self) -> String {
        self.state.lock().value.clone()
    }

    pub fn phase(&self) -> SuggestionPhase {
        self.state.lock().phase
    }

    /// The suggestion the user explicitly picked for the current value, if any.
    pub fn selection(&self) -> Option<AddressCandidate> {
        self.state.lock().selection.clone()
    }

    pub fn snapshot(&self) -> AutocompleteSnapshot {
        let state = self.state.lock();
        AutocompleteSnapshot {
            value: state.value.clone(),
            phase: state.phase,
            suggestions: if state.open {
                state.suggestions.clone()
            } else {
                Vec::new()
            },
        }
    }

    /// Cancel everything outstanding. Also runs on drop.
    pub fn dispose(mut self) {
        self.teardown();
    }

    fn teardown(&mut self) {
        self.abort_pending();
        self.state.lock().supersede();
    }

    fn abort_pending(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }

    fn schedule(&mut self, query: String, epoch: u64) {
        let resolver = Arc::clone(&self.resolver);
        let state = Arc::clone(&self.state);
        let quiet_period = self.config.quiet_period;
        let limit = self.config.suggestion_limit;
        let span = debug_span!("Address suggestions", query = %query, epoch);

        let task = async move {
            tokio::time::sleep(quiet_period).await;
            if state.lock().epoch != epoch {
                return;
            }
            let result = resolver.suggest(&query, limit).await;

            let mut state = state.lock();
            if state.epoch != epoch {
                debug!(current = state.epoch, "Discarding superseded suggestions");
                return;
            }
            state.apply(result);
        };
        self.pending = Some(tokio::spawn(task.instrument(span)));
    }
}

impl Drop for AutocompleteController {
    fn drop(&mut self) {
        self.teardown();
    }
}

impl std::fmt::Debug for AutocompleteController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AutocompleteController")
            .field("config", &self.config)
            .field("state", &*self.state.lock())
            .field("pending", &self.pending.is_some())
            .finish_non_exhaustive()
    }
}
