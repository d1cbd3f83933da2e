use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

// ============================================================================
// Project Models
// ============================================================================

/// Project represents a submission placed at a physical table for judging
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Project {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    /// Table number
    pub location: i64,
    #[sqlx(rename = "group_num")]
    pub group: i64,
    pub created_at: DateTime<Utc>,
}

impl Project {
    /// Build a project from a creation request and its assigned placement
    pub fn from_new(new_project: NewProject, group: i64, location: i64) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: new_project.name,
            description: new_project.description,
            location,
            group,
            created_at: Utc::now(),
        }
    }
}

/// NewProject carries the caller-provided fields of a project being added
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewProject {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

// ============================================================================
// Judge Models
// ============================================================================

/// Judge represents a reviewer working through one group of projects at a time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Judge {
    pub id: Uuid,
    pub name: String,
    #[sqlx(rename = "group_num")]
    pub group: i64,
    pub created_at: DateTime<Utc>,
}

// ============================================================================
// Options Models
// ============================================================================

/// Options is the single, event-wide settings record.
///
/// `curr_table_num` and `group_table_nums` are the persisted counters of the
/// table number sequence; see [`crate::sequence::TableSequence`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Options {
    pub curr_table_num: i64,
    pub multi_group: bool,
    pub num_groups: i64,
    pub group_sizes: Vec<i64>,
    pub group_table_nums: Vec<i64>,
    pub manual_switches: i64,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            curr_table_num: 0,
            multi_group: false,
            num_groups: 1,
            group_sizes: Vec::new(),
            group_table_nums: vec![0],
            manual_switches: 0,
        }
    }
}

/// GroupConfig is the admin-editable part of [`Options`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupConfig {
    pub multi_group: bool,
    pub num_groups: i64,
    #[serde(default)]
    pub group_sizes: Vec<i64>,
}

impl GroupConfig {
    /// Copy this layout onto an options record
    pub fn apply_to(&self, options: &mut Options) {
        options.multi_group = self.multi_group;
        options.num_groups = self.num_groups;
        options.group_sizes = self.group_sizes.clone();
    }
}
