//! Submission lifecycle of the portfolio form.
//!
//! One [`SubmissionOrchestrator`] owns the ten symbol slots and the state of the current
//! submission cycle. A cycle validates the filled slots, calls the optimization backend,
//! fans out branding lookups for every slot, and assembles the weight table. Only one cycle
//! may be active at a time; a submit that arrives mid-cycle is refused with
//! [`SubmitError::Busy`].

use serde::Serialize;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use uuid::Uuid;

use crate::domain::portfolio::ViewModel;
use crate::enrich::{enrich_all, EnrichmentClient};
use crate::form::SymbolList;
use crate::optimize::error::BackendError;
use crate::optimize::OptimizationClient;

pub const MIN_FILLED_SYMBOLS: usize = 4;

const INTERRUPTED_MESSAGE: &str = "submission interrupted before completion";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    #[default]
    Idle,
    Validating,
    Submitting,
    Enriching,
    Ready,
    Rejected,
    Failed,
}

impl Phase {
    pub fn is_active(self) -> bool {
        matches!(self, Phase::Validating | Phase::Submitting | Phase::Enriching)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub filled: usize,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "at least {MIN_FILLED_SYMBOLS} stock symbols required")
    }
}

impl std::error::Error for ValidationError {}

#[derive(Debug, Clone, PartialEq)]
pub enum SubmitError {
    /// Another cycle is still running.
    Busy,
    Validation(ValidationError),
    Backend(BackendError),
}

impl fmt::Display for SubmitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubmitError::Busy => write!(f, "a submission is already in progress"),
            SubmitError::Validation(err) => err.fmt(f),
            SubmitError::Backend(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for SubmitError {}

/// Read-only view of the form for the presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormSnapshot {
    pub phase: Phase,
    pub loading: bool,
    pub error: Option<String>,
    pub view: Option<ViewModel>,
    pub slots: SymbolList,
}

#[derive(Debug, Default)]
struct FormState {
    slots: SymbolList,
    phase: Phase,
    cycle: Option<Uuid>,
    error: Option<String>,
    view: Option<ViewModel>,
}

impl FormState {
    fn transition(&mut self, cycle_id: Uuid, to: Phase) {
        tracing::debug!(%cycle_id, from = ?self.phase, ?to, "submission phase change");
        self.phase = to;
    }

    fn snapshot(&self) -> FormSnapshot {
        FormSnapshot {
            phase: self.phase,
            loading: matches!(self.phase, Phase::Submitting | Phase::Enriching),
            error: self.error.clone(),
            view: self.view.clone(),
            slots: self.slots.clone(),
        }
    }
}

fn lock(state: &Mutex<FormState>) -> MutexGuard<'_, FormState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Inputs captured when a cycle is accepted, so slot edits mid-cycle cannot skew it.
struct AcceptedCycle {
    id: Uuid,
    filled: Vec<String>,
    request: Vec<String>,
}

/// Moves an abandoned cycle to `Failed` when `submit` is dropped before it finishes,
/// e.g. on a caller timeout or a disconnected HTTP client.
struct CycleGuard<'a> {
    state: &'a Mutex<FormState>,
    id: Uuid,
}

impl Drop for CycleGuard<'_> {
    fn drop(&mut self) {
        let mut state = lock(self.state);
        if state.cycle != Some(self.id) || !state.phase.is_active() {
            return;
        }
        tracing::warn!(cycle_id = %self.id, phase = ?state.phase, "submission interrupted");
        state.error = Some(INTERRUPTED_MESSAGE.to_string());
        state.view = None;
        state.transition(self.id, Phase::Failed);
    }
}

pub struct SubmissionOrchestrator {
    optimizer: Arc<dyn OptimizationClient>,
    enricher: Arc<dyn EnrichmentClient>,
    // Never held across an await; the cycle guard needs to take it from `Drop`.
    state: Mutex<FormState>,
}

impl SubmissionOrchestrator {
    pub fn new(optimizer: Arc<dyn OptimizationClient>, enricher: Arc<dyn EnrichmentClient>) -> Self {
        Self {
            optimizer,
            enricher,
            state: Mutex::new(FormState::default()),
        }
    }

    pub async fn set_slot(&self, index: usize, text: impl Into<String>) -> anyhow::Result<()> {
        lock(&self.state).slots.set(index, text)
    }

    pub async fn clear_slot(&self, index: usize) -> anyhow::Result<()> {
        lock(&self.state).slots.clear(index)
    }

    pub async fn snapshot(&self) -> FormSnapshot {
        lock(&self.state).snapshot()
    }

    /// Runs one submission cycle to completion and returns the assembled view.
    ///
    /// Dropping the returned future mid-cycle fails that cycle, so the form never stays busy.
    pub async fn submit(&self) -> Result<ViewModel, SubmitError> {
        let cycle = self.accept()?;
        let _guard = CycleGuard {
            state: &self.state,
            id: cycle.id,
        };

        tracing::info!(
            cycle_id = %cycle.id,
            filled = cycle.filled.len(),
            "submitting symbols for optimization"
        );

        let response = match self.optimizer.optimize(&cycle.request).await {
            Ok(response) => response,
            Err(err) => return Err(self.fail(&cycle, err)),
        };
        if let Err(err) = response.ensure_aligned(cycle.filled.len()) {
            return Err(self.fail(&cycle, err));
        }

        lock(&self.state).transition(cycle.id, Phase::Enriching);

        let logos = enrich_all(self.enricher.as_ref(), &cycle.request).await;
        let view = ViewModel::assemble(&cycle.filled, &response, &logos);

        let mut state = lock(&self.state);
        state.view = Some(view.clone());
        state.transition(cycle.id, Phase::Ready);
        tracing::info!(cycle_id = %cycle.id, rows = view.rows.len(), "portfolio weights ready");

        Ok(view)
    }

    fn accept(&self) -> Result<AcceptedCycle, SubmitError> {
        let mut state = lock(&self.state);
        if state.phase.is_active() {
            tracing::warn!(phase = ?state.phase, "submit ignored; cycle in progress");
            return Err(SubmitError::Busy);
        }

        let id = Uuid::new_v4();
        state.cycle = Some(id);
        state.transition(id, Phase::Validating);

        let filled = state.slots.non_empty_trimmed();
        if filled.len() < MIN_FILLED_SYMBOLS {
            let err = ValidationError {
                filled: filled.len(),
            };
            // The last weight table stays visible under the inline message.
            state.error = Some(err.to_string());
            state.transition(id, Phase::Rejected);
            return Err(SubmitError::Validation(err));
        }

        state.error = None;
        state.view = None;
        state.transition(id, Phase::Submitting);

        // The backend receives every slot, blanks included, and answers for the filled ones.
        let request = state.slots.trimmed_all();
        Ok(AcceptedCycle {
            id,
            filled,
            request,
        })
    }

    fn fail(&self, cycle: &AcceptedCycle, err: BackendError) -> SubmitError {
        tracing::error!(cycle_id = %cycle.id, error = %err, "optimization failed");
        let mut state = lock(&self.state);
        state.error = Some(err.to_string());
        state.view = None;
        state.transition(cycle.id, Phase::Failed);
        SubmitError::Backend(err)
    }
}
