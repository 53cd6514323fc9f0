//! In-memory run records with per-run serialisation.
//!
//! Updates to one run are serialised by that run's mutex; different runs never
//! contend beyond the brief map lookup. A failed update leaves the stored
//! record as it was.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};

use tracing::error;

use crate::error::PlannerError;
use crate::run::OptimizationRun;

#[derive(Debug, Default)]
pub struct RunRegistry {
    runs: RwLock<HashMap<String, Arc<Mutex<OptimizationRun>>>>,
}

impl RunRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `run`, replacing any record with the same id.
    pub fn insert(&self, run: OptimizationRun) -> Result<(), PlannerError> {
        let mut runs = self.runs.write().map_err(|_| poisoned())?;
        runs.insert(run.id.clone(), Arc::new(Mutex::new(run)));
        Ok(())
    }

    /// Snapshot of the stored run.
    pub fn get(&self, id: &str) -> Result<OptimizationRun, PlannerError> {
        let slot = self.slot(id)?;
        let run = slot.lock().map_err(|_| poisoned())?;
        Ok(run.clone())
    }

    /// Applies `transition` to the stored run and replaces it with the result.
    pub fn update<F>(&self, id: &str, transition: F) -> Result<OptimizationRun, PlannerError>
    where
        F: FnOnce(&OptimizationRun) -> Result<OptimizationRun, PlannerError>,
    {
        let slot = self.slot(id)?;
        let mut run = slot.lock().map_err(|_| poisoned())?;
        let next = transition(&run)?;
        *run = next.clone();
        Ok(next)
    }

    pub fn len(&self) -> usize {
        self.runs.read().map(|runs| runs.len()).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn slot(&self, id: &str) -> Result<Arc<Mutex<OptimizationRun>>, PlannerError> {
        let runs = self.runs.read().map_err(|_| poisoned())?;
        runs.get(id).cloned().ok_or_else(|| PlannerError::RunNotFound(id.to_string()))
    }
}

fn poisoned() -> PlannerError {
    error!("run registry lock poisoned");
    PlannerError::Internal
}
