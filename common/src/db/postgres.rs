// PostgreSQL implementation of the jury store

use crate::db::queries::{judge_queries, options_queries, project_queries};
use crate::db::store::{JuryStore, StoreTransaction};
use crate::db::DbPool;
use crate::errors::DatabaseError;
use crate::models::{Judge, Options, Project};
use async_trait::async_trait;
use sqlx::{Postgres, Transaction};
use tracing::instrument;
use uuid::Uuid;

/// Store backed by the shared PostgreSQL database
#[derive(Debug, Clone)]
pub struct PgJuryStore {
    pool: DbPool,
}

impl PgJuryStore {
    /// Create a new PgJuryStore
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl JuryStore for PgJuryStore {
    #[instrument(skip(self))]
    async fn begin(&self) -> Result<Box<dyn StoreTransaction>, DatabaseError> {
        let tx = self
            .pool
            .pool()
            .begin()
            .await
            .map_err(|e| DatabaseError::TransactionFailed(e.to_string()))?;
        Ok(Box::new(PgStoreTransaction { tx }))
    }
}

/// Open PostgreSQL transaction; rolled back by sqlx when dropped uncommitted
pub struct PgStoreTransaction {
    tx: Transaction<'static, Postgres>,
}

/// Fail when an UPDATE against the options row touched nothing
fn expect_options_row(rows_affected: u64) -> Result<(), DatabaseError> {
    if rows_affected == 0 {
        return Err(DatabaseError::NotFound("options row is missing".to_string()));
    }
    Ok(())
}

#[async_trait]
impl StoreTransaction for PgStoreTransaction {
    #[instrument(skip(self))]
    async fn find_all_projects(&mut self) -> Result<Vec<Project>, DatabaseError> {
        let projects = sqlx::query_as::<_, Project>(project_queries::SELECT_ALL)
            .fetch_all(&mut *self.tx)
            .await?;

        tracing::debug!(count = projects.len(), "Found projects");
        Ok(projects)
    }

    #[instrument(skip(self, projects), fields(count = projects.len()))]
    async fn update_projects(&mut self, projects: &[Project]) -> Result<(), DatabaseError> {
        let ids: Vec<Uuid> = projects.iter().map(|p| p.id).collect();
        let locations: Vec<i64> = projects.iter().map(|p| p.location).collect();
        let groups: Vec<i64> = projects.iter().map(|p| p.group).collect();

        let result = sqlx::query(project_queries::UPDATE_PLACEMENTS)
            .bind(&ids)
            .bind(&locations)
            .bind(&groups)
            .execute(&mut *self.tx)
            .await?;

        tracing::debug!(rows_affected = result.rows_affected(), "Project placements updated");
        Ok(())
    }

    #[instrument(skip(self, project), fields(project_id = %project.id))]
    async fn insert_project(&mut self, project: &Project) -> Result<(), DatabaseError> {
        sqlx::query(project_queries::INSERT)
            .bind(project.id)
            .bind(&project.name)
            .bind(&project.description)
            .bind(project.location)
            .bind(project.group)
            .bind(project.created_at)
            .execute(&mut *self.tx)
            .await?;

        tracing::info!(
            project_id = %project.id,
            location = project.location,
            group = project.group,
            "Project inserted"
        );
        Ok(())
    }

    #[instrument(skip(self))]
    async fn get_options(&mut self) -> Result<Options, DatabaseError> {
        let options = sqlx::query_as::<_, Options>(options_queries::SELECT_FOR_UPDATE)
            .fetch_optional(&mut *self.tx)
            .await?
            .ok_or_else(|| DatabaseError::NotFound("options row is missing".to_string()))?;

        Ok(options)
    }

    #[instrument(skip(self, options), fields(curr_table_num = options.curr_table_num))]
    async fn update_table_counters(&mut self, options: &Options) -> Result<(), DatabaseError> {
        let result = sqlx::query(options_queries::UPDATE_COUNTERS)
            .bind(options.curr_table_num)
            .bind(&options.group_table_nums)
            .execute(&mut *self.tx)
            .await?;

        expect_options_row(result.rows_affected())
    }

    #[instrument(skip(self, options), fields(num_groups = options.num_groups))]
    async fn update_group_config(&mut self, options: &Options) -> Result<(), DatabaseError> {
        let result = sqlx::query(options_queries::UPDATE_GROUP_CONFIG)
            .bind(options.multi_group)
            .bind(options.num_groups)
            .bind(&options.group_sizes)
            .execute(&mut *self.tx)
            .await?;

        expect_options_row(result.rows_affected())
    }

    #[instrument(skip(self))]
    async fn find_all_judges(&mut self) -> Result<Vec<Judge>, DatabaseError> {
        let judges = sqlx::query_as::<_, Judge>(judge_queries::SELECT_ALL)
            .fetch_all(&mut *self.tx)
            .await?;

        tracing::debug!(count = judges.len(), "Found judges");
        Ok(judges)
    }

    #[instrument(skip(self, judges), fields(count = judges.len()))]
    async fn update_judges(&mut self, judges: &[Judge]) -> Result<(), DatabaseError> {
        let ids: Vec<Uuid> = judges.iter().map(|j| j.id).collect();
        let groups: Vec<i64> = judges.iter().map(|j| j.group).collect();

        sqlx::query(judge_queries::UPDATE_GROUPS)
            .bind(&ids)
            .bind(&groups)
            .execute(&mut *self.tx)
            .await?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn increment_manual_switches(&mut self) -> Result<(), DatabaseError> {
        let result = sqlx::query(options_queries::INCREMENT_MANUAL_SWITCHES)
            .execute(&mut *self.tx)
            .await?;

        expect_options_row(result.rows_affected())
    }

    #[instrument(skip(self))]
    async fn commit(self: Box<Self>) -> Result<(), DatabaseError> {
        let this = *self;
        this.tx
            .commit()
            .await
            .map_err(|e| DatabaseError::TransactionFailed(e.to_string()))
    }
}
