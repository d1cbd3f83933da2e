// In-process implementation of the jury store
//
// Used by tests and by the API when no database URL is configured. A
// transaction works on a private copy of the state and publishes it on
// commit; dropping it discards the copy. Concurrent commits are last-writer
// wins, so this store is not a substitute for database isolation.

use crate::db::store::{JuryStore, StoreTransaction};
use crate::errors::DatabaseError;
use crate::models::{Judge, Options, Project};
use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};

/// Every data access a transaction can perform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreCall {
    Begin,
    FindAllProjects,
    UpdateProjects,
    InsertProject,
    GetOptions,
    UpdateTableCounters,
    UpdateGroupConfig,
    FindAllJudges,
    UpdateJudges,
    IncrementManualSwitches,
    Commit,
}

/// Full contents of the store
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreState {
    pub projects: Vec<Project>,
    pub judges: Vec<Judge>,
    pub options: Options,
}

#[derive(Debug, Default)]
struct Shared {
    state: StoreState,
    failures: HashSet<StoreCall>,
    calls: Vec<StoreCall>,
}

fn lock(shared: &Mutex<Shared>) -> MutexGuard<'_, Shared> {
    // state is only replaced wholesale, so a poisoned lock still holds a consistent value
    shared.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Record a call and fail it if a failure was injected for it
fn record(shared: &Mutex<Shared>, call: StoreCall) -> Result<(), DatabaseError> {
    let mut guard = lock(shared);
    guard.calls.push(call);
    if guard.failures.contains(&call) {
        return Err(DatabaseError::TransactionFailed(format!(
            "injected failure at {:?}",
            call
        )));
    }
    Ok(())
}

/// Store that keeps everything in memory
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    shared: Arc<Mutex<Shared>>,
}

impl InMemoryStore {
    pub fn new(state: StoreState) -> Self {
        Self {
            shared: Arc::new(Mutex::new(Shared {
                state,
                ..Shared::default()
            })),
        }
    }

    /// Committed state
    pub fn snapshot(&self) -> StoreState {
        lock(&self.shared).state.clone()
    }

    /// Make every future `call` fail until cleared
    pub fn fail_on(&self, call: StoreCall) {
        lock(&self.shared).failures.insert(call);
    }

    pub fn clear_failures(&self) {
        lock(&self.shared).failures.clear();
    }

    /// Calls recorded so far, in order
    pub fn calls(&self) -> Vec<StoreCall> {
        lock(&self.shared).calls.clone()
    }

    pub fn clear_calls(&self) {
        lock(&self.shared).calls.clear();
    }
}

#[async_trait]
impl JuryStore for InMemoryStore {
    async fn begin(&self) -> Result<Box<dyn StoreTransaction>, DatabaseError> {
        record(&self.shared, StoreCall::Begin)?;
        let working = lock(&self.shared).state.clone();
        Ok(Box::new(InMemoryTransaction {
            shared: Arc::clone(&self.shared),
            working,
        }))
    }
}

/// Transaction over a private copy of the store state
pub struct InMemoryTransaction {
    shared: Arc<Mutex<Shared>>,
    working: StoreState,
}

#[async_trait]
impl StoreTransaction for InMemoryTransaction {
    async fn find_all_projects(&mut self) -> Result<Vec<Project>, DatabaseError> {
        record(&self.shared, StoreCall::FindAllProjects)?;
        Ok(self.working.projects.clone())
    }

    async fn update_projects(&mut self, projects: &[Project]) -> Result<(), DatabaseError> {
        record(&self.shared, StoreCall::UpdateProjects)?;
        for update in projects {
            if let Some(project) = self.working.projects.iter_mut().find(|p| p.id == update.id) {
                project.location = update.location;
                project.group = update.group;
            }
        }
        Ok(())
    }

    async fn insert_project(&mut self, project: &Project) -> Result<(), DatabaseError> {
        record(&self.shared, StoreCall::InsertProject)?;
        if self.working.projects.iter().any(|p| p.id == project.id) {
            return Err(DatabaseError::DuplicateKey(format!(
                "project {} already exists",
                project.id
            )));
        }
        self.working.projects.push(project.clone());
        Ok(())
    }

    async fn get_options(&mut self) -> Result<Options, DatabaseError> {
        record(&self.shared, StoreCall::GetOptions)?;
        Ok(self.working.options.clone())
    }

    async fn update_table_counters(&mut self, options: &Options) -> Result<(), DatabaseError> {
        record(&self.shared, StoreCall::UpdateTableCounters)?;
        self.working.options.curr_table_num = options.curr_table_num;
        self.working
            .options
            .group_table_nums
            .clone_from(&options.group_table_nums);
        Ok(())
    }

    async fn update_group_config(&mut self, options: &Options) -> Result<(), DatabaseError> {
        record(&self.shared, StoreCall::UpdateGroupConfig)?;
        self.working.options.multi_group = options.multi_group;
        self.working.options.num_groups = options.num_groups;
        self.working
            .options
            .group_sizes
            .clone_from(&options.group_sizes);
        Ok(())
    }

    async fn find_all_judges(&mut self) -> Result<Vec<Judge>, DatabaseError> {
        record(&self.shared, StoreCall::FindAllJudges)?;
        Ok(self.working.judges.clone())
    }

    async fn update_judges(&mut self, judges: &[Judge]) -> Result<(), DatabaseError> {
        record(&self.shared, StoreCall::UpdateJudges)?;
        for update in judges {
            if let Some(judge) = self.working.judges.iter_mut().find(|j| j.id == update.id) {
                judge.group = update.group;
            }
        }
        Ok(())
    }

    async fn increment_manual_switches(&mut self) -> Result<(), DatabaseError> {
        record(&self.shared, StoreCall::IncrementManualSwitches)?;
        self.working.options.manual_switches += 1;
        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<(), DatabaseError> {
        record(&self.shared, StoreCall::Commit)?;
        let this = *self;
        lock(&this.shared).state = this.working;
        Ok(())
    }
}
