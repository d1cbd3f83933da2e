// Transaction-scoped data access for the numbering operations
//
// A JuryStore hands out StoreTransaction values. Everything read or written
// through a transaction becomes visible only when `commit` succeeds; a
// transaction dropped without commit is rolled back.

use crate::errors::DatabaseError;
use crate::models::{Judge, Options, Project};
use async_trait::async_trait;

/// Entry point to a backing store
#[async_trait]
pub trait JuryStore: Send + Sync {
    /// Open a new transaction
    async fn begin(&self) -> Result<Box<dyn StoreTransaction>, DatabaseError>;
}

/// Reads and writes performed inside one atomic unit
#[async_trait]
pub trait StoreTransaction: Send {
    /// All projects, in no particular order
    async fn find_all_projects(&mut self) -> Result<Vec<Project>, DatabaseError>;

    /// Persist the `location` and `group` of every given project
    async fn update_projects(&mut self, projects: &[Project]) -> Result<(), DatabaseError>;

    async fn insert_project(&mut self, project: &Project) -> Result<(), DatabaseError>;

    async fn get_options(&mut self) -> Result<Options, DatabaseError>;

    /// Persist `curr_table_num` and `group_table_nums`
    async fn update_table_counters(&mut self, options: &Options) -> Result<(), DatabaseError>;

    /// Persist `multi_group`, `num_groups` and `group_sizes`
    async fn update_group_config(&mut self, options: &Options) -> Result<(), DatabaseError>;

    async fn find_all_judges(&mut self) -> Result<Vec<Judge>, DatabaseError>;

    /// Persist the `group` of every given judge
    async fn update_judges(&mut self, judges: &[Judge]) -> Result<(), DatabaseError>;

    async fn increment_manual_switches(&mut self) -> Result<(), DatabaseError>;

    /// Make every change of this transaction visible
    async fn commit(self: Box<Self>) -> Result<(), DatabaseError>;
}
