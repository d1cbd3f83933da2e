// Table number assignment and judge group rotation
//
// Every operation runs inside a single store transaction. Any failure
// returns before `commit`, and dropping the transaction rolls back every
// write made so far.

use crate::db::{JuryStore, StoreTransaction};
use crate::errors::{NumberingError, ValidationError};
use crate::models::{GroupConfig, NewProject, Options, Project};
use crate::sequence::{validate_group_layout, TableSequence};
use crate::telemetry;
use tracing::{info, instrument};

/// Renumber every project 0..n-1, keeping the current order of table numbers
///
/// Does nothing when there are no projects.
#[instrument(skip(store))]
pub async fn reassign_nums_in_order<S>(store: &S) -> Result<(), NumberingError>
where
    S: JuryStore + ?Sized,
{
    let mut tx = store
        .begin()
        .await
        .map_err(NumberingError::BeginTransaction)?;

    // Options are loaded first: the row lock must be held before the
    // project list is read.
    let mut options = tx
        .get_options()
        .await
        .map_err(NumberingError::LoadOptions)?;

    let projects = tx
        .find_all_projects()
        .await
        .map_err(NumberingError::LoadProjects)?;

    if projects.is_empty() {
        info!("No projects to renumber");
        return commit(tx).await;
    }

    let count = assign_in_order(tx.as_mut(), projects, &mut options).await?;
    commit(tx).await?;

    telemetry::record_reassignment("in_order", count);
    info!(project_count = count, "Projects renumbered in order");
    Ok(())
}

/// Renumber every project into the configured groups
///
/// Group `i` starts at the sum of the sizes of groups `0..i`. The table
/// counters are reset and saved even when there are no projects.
#[instrument(skip(store))]
pub async fn reassign_nums_by_group<S>(store: &S) -> Result<(), NumberingError>
where
    S: JuryStore + ?Sized,
{
    let mut tx = store
        .begin()
        .await
        .map_err(NumberingError::BeginTransaction)?;

    let mut options = tx
        .get_options()
        .await
        .map_err(NumberingError::LoadOptions)?;

    let projects = tx
        .find_all_projects()
        .await
        .map_err(NumberingError::LoadProjects)?;

    let count = assign_by_group(tx.as_mut(), projects, &mut options).await?;
    commit(tx).await?;

    telemetry::record_reassignment("by_group", count);
    info!(
        project_count = count,
        num_groups = options.num_groups,
        "Projects renumbered by group"
    );
    Ok(())
}

/// Group and table number for the next project to be added
///
/// The group is always 0 when grouping is disabled.
pub fn get_next_table_num(sequence: &mut TableSequence, multi_group: bool) -> (i64, i64) {
    if multi_group {
        sequence.next_group_table_num()
    } else {
        (0, sequence.next_incr_table_num())
    }
}

/// Group a judge moves to on the next rotation, wrapping after the last group
pub fn next_judge_group(group: i64, num_groups: i64) -> i64 {
    (group + 1).rem_euclid(num_groups)
}

/// Move every judge to the next group and count the manual switch
#[instrument(skip(store))]
pub async fn increment_judge_group_num<S>(store: &S) -> Result<(), NumberingError>
where
    S: JuryStore + ?Sized,
{
    let mut tx = store
        .begin()
        .await
        .map_err(NumberingError::BeginTransaction)?;

    let options = tx
        .get_options()
        .await
        .map_err(NumberingError::LoadOptions)?;

    if options.num_groups < 1 {
        return Err(ValidationError::InvalidGroupConfig(format!(
            "cannot rotate judges across {} groups",
            options.num_groups
        ))
        .into());
    }

    let mut judges = tx
        .find_all_judges()
        .await
        .map_err(NumberingError::LoadJudges)?;

    for judge in &mut judges {
        judge.group = next_judge_group(judge.group, options.num_groups);
    }

    if !judges.is_empty() {
        tx.update_judges(&judges)
            .await
            .map_err(NumberingError::UpdateJudges)?;
    }

    tx.increment_manual_switches()
        .await
        .map_err(NumberingError::IncrementManualSwitches)?;

    commit(tx).await?;

    telemetry::record_judge_rotation(judges.len());
    info!(
        judge_count = judges.len(),
        num_groups = options.num_groups,
        "Judge groups rotated"
    );
    Ok(())
}

/// Create a project at the next free table
#[instrument(skip(store, new_project), fields(name = %new_project.name))]
pub async fn add_project<S>(store: &S, new_project: NewProject) -> Result<Project, NumberingError>
where
    S: JuryStore + ?Sized,
{
    if new_project.name.trim().is_empty() {
        return Err(ValidationError::MissingField("name".to_string()).into());
    }

    let mut tx = store
        .begin()
        .await
        .map_err(NumberingError::BeginTransaction)?;

    let mut options = tx
        .get_options()
        .await
        .map_err(NumberingError::LoadOptions)?;

    let mut sequence = TableSequence::from_options(&options)?;
    let (group, location) = get_next_table_num(&mut sequence, options.multi_group);
    sequence.write_back(&mut options);

    let project = Project::from_new(new_project, group, location);

    tx.insert_project(&project)
        .await
        .map_err(NumberingError::InsertProject)?;

    tx.update_table_counters(&options)
        .await
        .map_err(NumberingError::UpdateOptions)?;

    commit(tx).await?;

    telemetry::record_project_added(group);
    info!(
        project_id = %project.id,
        group = group,
        location = location,
        "Project added"
    );
    Ok(project)
}

/// Change the group layout and renumber every project to match it
///
/// Returns the options as saved.
#[instrument(skip(store))]
pub async fn configure_groups<S>(store: &S, config: GroupConfig) -> Result<Options, NumberingError>
where
    S: JuryStore + ?Sized,
{
    validate_group_layout(config.num_groups, &config.group_sizes)?;

    let mut tx = store
        .begin()
        .await
        .map_err(NumberingError::BeginTransaction)?;

    let mut options = tx
        .get_options()
        .await
        .map_err(NumberingError::LoadOptions)?;

    config.apply_to(&mut options);

    tx.update_group_config(&options)
        .await
        .map_err(NumberingError::UpdateOptions)?;

    let mut projects = tx
        .find_all_projects()
        .await
        .map_err(NumberingError::LoadProjects)?;

    let (mode, count) = if options.multi_group {
        let count = assign_by_group(tx.as_mut(), projects, &mut options).await?;
        ("by_group", count)
    } else {
        for project in &mut projects {
            project.group = 0;
        }
        let count = assign_in_order(tx.as_mut(), projects, &mut options).await?;
        ("in_order", count)
    };

    commit(tx).await?;

    telemetry::record_reassignment(mode, count);
    info!(
        multi_group = options.multi_group,
        num_groups = options.num_groups,
        project_count = count,
        "Group layout updated"
    );
    Ok(options)
}

/// Sort by current table number and hand out 0..n-1
async fn assign_in_order(
    tx: &mut dyn StoreTransaction,
    mut projects: Vec<Project>,
    options: &mut Options,
) -> Result<usize, NumberingError> {
    if projects.is_empty() {
        return Ok(0);
    }

    projects.sort_by_key(|p| p.location);

    let mut sequence = TableSequence::from_options(options)?;
    sequence.reset_incr();
    for project in &mut projects {
        project.location = sequence.next_incr_table_num();
    }
    sequence.write_back(options);

    tx.update_table_counters(options)
        .await
        .map_err(NumberingError::UpdateOptions)?;

    tx.update_projects(&projects)
        .await
        .map_err(NumberingError::UpdateProjects)?;

    Ok(projects.len())
}

/// Sort by current table number and fill the groups in order
async fn assign_by_group(
    tx: &mut dyn StoreTransaction,
    mut projects: Vec<Project>,
    options: &mut Options,
) -> Result<usize, NumberingError> {
    projects.sort_by_key(|p| p.location);

    let mut sequence = TableSequence::from_options(options)?;
    sequence.reset();
    for project in &mut projects {
        let (group, location) = sequence.next_group_table_num();
        project.group = group;
        project.location = location;
    }
    sequence.write_back(options);

    tx.update_table_counters(options)
        .await
        .map_err(NumberingError::UpdateOptions)?;

    if projects.is_empty() {
        return Ok(0);
    }

    tx.update_projects(&projects)
        .await
        .map_err(NumberingError::UpdateProjects)?;

    Ok(projects.len())
}

async fn commit(tx: Box<dyn StoreTransaction>) -> Result<(), NumberingError> {
    tx.commit().await.map_err(NumberingError::CommitTransaction)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{InMemoryStore, StoreCall, StoreState};
    use crate::models::Judge;
    use chrono::Utc;
    use uuid::Uuid;

    fn project(name: &str, location: i64) -> Project {
        Project {
            id: Uuid::new_v4(),
            name: name.to_string(),
            description: None,
            location,
            group: 0,
            created_at: Utc::now(),
        }
    }

    fn judge(group: i64) -> Judge {
        Judge {
            id: Uuid::new_v4(),
            name: format!("judge-{}", group),
            group,
            created_at: Utc::now(),
        }
    }

    fn location_of(state: &StoreState, name: &str) -> (i64, i64) {
        let p = state
            .projects
            .iter()
            .find(|p| p.name == name)
            .expect("project exists");
        (p.group, p.location)
    }

    fn grouped(num_groups: i64, group_sizes: Vec<i64>) -> Options {
        Options {
            multi_group: true,
            num_groups,
            group_sizes,
            ..Options::default()
        }
    }

    #[tokio::test]
    async fn test_reassign_in_order_closes_gaps() {
        let store = InMemoryStore::new(StoreState {
            projects: vec![project("c", 40), project("a", 3), project("b", 17)],
            options: Options {
                curr_table_num: 41,
                ..Options::default()
            },
            ..StoreState::default()
        });

        reassign_nums_in_order(&store).await.unwrap();

        let state = store.snapshot();
        assert_eq!(location_of(&state, "a").1, 0);
        assert_eq!(location_of(&state, "b").1, 1);
        assert_eq!(location_of(&state, "c").1, 2);
        assert_eq!(state.options.curr_table_num, 3);
    }

    #[tokio::test]
    async fn test_reassign_in_order_with_no_projects_writes_nothing() {
        let store = InMemoryStore::new(StoreState {
            options: Options {
                curr_table_num: 9,
                ..Options::default()
            },
            ..StoreState::default()
        });

        reassign_nums_in_order(&store).await.unwrap();

        assert_eq!(
            store.calls(),
            vec![
                StoreCall::Begin,
                StoreCall::GetOptions,
                StoreCall::FindAllProjects,
                StoreCall::Commit,
            ]
        );
        assert_eq!(store.snapshot().options.curr_table_num, 9);
    }

    #[tokio::test]
    async fn test_reassign_by_group_uses_group_boundaries() {
        let store = InMemoryStore::new(StoreState {
            projects: vec![
                project("p4", 4),
                project("p0", 0),
                project("p3", 3),
                project("p1", 1),
                project("p2", 2),
            ],
            options: grouped(3, vec![2, 1]),
            ..StoreState::default()
        });

        reassign_nums_by_group(&store).await.unwrap();

        let state = store.snapshot();
        assert_eq!(location_of(&state, "p0"), (0, 0));
        assert_eq!(location_of(&state, "p1"), (0, 1));
        assert_eq!(location_of(&state, "p2"), (1, 2));
        assert_eq!(location_of(&state, "p3"), (2, 3));
        assert_eq!(location_of(&state, "p4"), (2, 4));
        assert_eq!(state.options.group_table_nums, vec![2, 3, 5]);
        assert_eq!(state.options.curr_table_num, 5);
    }

    #[tokio::test]
    async fn test_reassign_by_group_with_no_projects_resets_counters_only() {
        let mut options = grouped(2, vec![10]);
        options.group_table_nums = vec![7, 14];
        options.curr_table_num = 11;
        let store = InMemoryStore::new(StoreState {
            options,
            ..StoreState::default()
        });

        reassign_nums_by_group(&store).await.unwrap();

        assert!(!store.calls().contains(&StoreCall::UpdateProjects));
        let state = store.snapshot();
        assert_eq!(state.options.group_table_nums, vec![0, 10]);
        assert_eq!(state.options.curr_table_num, 0);
    }

    #[tokio::test]
    async fn test_reassign_by_group_rejects_short_group_sizes() {
        let store = InMemoryStore::new(StoreState {
            projects: vec![project("a", 0)],
            options: grouped(3, vec![4]),
            ..StoreState::default()
        });
        let before = store.snapshot();

        let err = reassign_nums_by_group(&store).await.unwrap_err();

        assert!(err.is_validation());
        assert!(!store.calls().contains(&StoreCall::Commit));
        assert_eq!(store.snapshot(), before);
    }

    #[tokio::test]
    async fn test_failed_project_write_rolls_back_counters() {
        let store = InMemoryStore::new(StoreState {
            projects: vec![project("a", 5), project("b", 9)],
            options: Options {
                curr_table_num: 10,
                ..Options::default()
            },
            ..StoreState::default()
        });
        store.fail_on(StoreCall::UpdateProjects);
        let before = store.snapshot();

        let err = reassign_nums_in_order(&store).await.unwrap_err();

        assert!(matches!(err, NumberingError::UpdateProjects(_)));
        assert!(err
            .to_string()
            .starts_with("error updating projects in database"));
        assert_eq!(store.snapshot(), before);
    }

    #[tokio::test]
    async fn test_load_failure_is_wrapped() {
        let store = InMemoryStore::default();
        store.fail_on(StoreCall::FindAllProjects);

        let err = reassign_nums_by_group(&store).await.unwrap_err();
        assert!(matches!(err, NumberingError::LoadProjects(_)));
    }

    #[test]
    fn test_get_next_table_num_without_groups() {
        let options = Options {
            curr_table_num: 12,
            ..Options::default()
        };
        let mut sequence = TableSequence::from_options(&options).unwrap();

        assert_eq!(get_next_table_num(&mut sequence, false), (0, 12));
        assert_eq!(get_next_table_num(&mut sequence, false), (0, 13));
    }

    #[test]
    fn test_get_next_table_num_with_groups() {
        let mut options = grouped(2, vec![1]);
        options.group_table_nums = vec![0, 1];
        let mut sequence = TableSequence::from_options(&options).unwrap();

        assert_eq!(get_next_table_num(&mut sequence, true), (0, 0));
        assert_eq!(get_next_table_num(&mut sequence, true), (1, 1));
    }

    #[test]
    fn test_next_judge_group_wraps() {
        assert_eq!(next_judge_group(0, 3), 1);
        assert_eq!(next_judge_group(2, 3), 0);
        assert_eq!(next_judge_group(0, 1), 0);
        assert_eq!(next_judge_group(7, 3), 2);
    }

    #[tokio::test]
    async fn test_increment_judge_group_num() {
        let store = InMemoryStore::new(StoreState {
            judges: vec![judge(0), judge(1), judge(2)],
            options: grouped(3, vec![5, 5]),
            ..StoreState::default()
        });

        increment_judge_group_num(&store).await.unwrap();

        let state = store.snapshot();
        let groups: Vec<i64> = state.judges.iter().map(|j| j.group).collect();
        assert_eq!(groups, vec![1, 2, 0]);
        assert_eq!(state.options.manual_switches, 1);
    }

    #[tokio::test]
    async fn test_increment_judge_group_num_without_judges_counts_switch() {
        let store = InMemoryStore::default();

        increment_judge_group_num(&store).await.unwrap();

        assert!(!store.calls().contains(&StoreCall::UpdateJudges));
        assert_eq!(store.snapshot().options.manual_switches, 1);
    }

    #[tokio::test]
    async fn test_increment_judge_group_num_rejects_zero_groups() {
        let store = InMemoryStore::new(StoreState {
            judges: vec![judge(0)],
            options: Options {
                num_groups: 0,
                ..Options::default()
            },
            ..StoreState::default()
        });

        let err = increment_judge_group_num(&store).await.unwrap_err();
        assert!(err.is_validation());
        assert_eq!(store.snapshot().options.manual_switches, 0);
    }

    #[tokio::test]
    async fn test_switch_counter_failure_rolls_back_judges() {
        let store = InMemoryStore::new(StoreState {
            judges: vec![judge(0), judge(1)],
            options: grouped(2, vec![3]),
            ..StoreState::default()
        });
        store.fail_on(StoreCall::IncrementManualSwitches);

        let err = increment_judge_group_num(&store).await.unwrap_err();

        assert!(matches!(err, NumberingError::IncrementManualSwitches(_)));
        let groups: Vec<i64> = store.snapshot().judges.iter().map(|j| j.group).collect();
        assert_eq!(groups, vec![0, 1]);
    }

    #[tokio::test]
    async fn test_add_project_takes_next_table() {
        let store = InMemoryStore::new(StoreState {
            projects: vec![project("a", 0)],
            options: Options {
                curr_table_num: 1,
                ..Options::default()
            },
            ..StoreState::default()
        });

        let added = add_project(
            &store,
            NewProject {
                name: "b".to_string(),
                description: Some("second".to_string()),
            },
        )
        .await
        .unwrap();

        assert_eq!((added.group, added.location), (0, 1));
        let state = store.snapshot();
        assert_eq!(state.projects.len(), 2);
        assert_eq!(state.options.curr_table_num, 2);
    }

    #[tokio::test]
    async fn test_add_project_rejects_blank_name() {
        let store = InMemoryStore::default();
        let err = add_project(
            &store,
            NewProject {
                name: "   ".to_string(),
                description: None,
            },
        )
        .await
        .unwrap_err();

        assert!(err.is_validation());
        assert!(store.calls().is_empty());
    }

    #[tokio::test]
    async fn test_configure_groups_regroups_projects() {
        let store = InMemoryStore::new(StoreState {
            projects: vec![project("a", 0), project("b", 1), project("c", 2)],
            ..StoreState::default()
        });

        let options = configure_groups(
            &store,
            GroupConfig {
                multi_group: true,
                num_groups: 2,
                group_sizes: vec![1],
            },
        )
        .await
        .unwrap();

        assert_eq!(options.group_table_nums, vec![1, 3]);
        let state = store.snapshot();
        assert_eq!(state.options.num_groups, 2);
        assert_eq!(location_of(&state, "a"), (0, 0));
        assert_eq!(location_of(&state, "b"), (1, 1));
        assert_eq!(location_of(&state, "c"), (1, 2));
    }

    #[tokio::test]
    async fn test_configure_groups_validates_before_writing() {
        let store = InMemoryStore::default();

        let err = configure_groups(
            &store,
            GroupConfig {
                multi_group: true,
                num_groups: 4,
                group_sizes: vec![1, 2],
            },
        )
        .await
        .unwrap_err();

        assert!(err.is_validation());
        assert!(store.calls().is_empty());
    }

    #[tokio::test]
    async fn test_reassign_locks_options_before_reading_projects() {
        let store = InMemoryStore::new(StoreState {
            projects: vec![project("a", 3)],
            options: grouped(2, vec![1]),
            ..StoreState::default()
        });

        reassign_nums_in_order(&store).await.unwrap();
        assert_eq!(
            &store.calls()[..3],
            &[StoreCall::Begin, StoreCall::GetOptions, StoreCall::FindAllProjects]
        );

        store.clear_calls();
        reassign_nums_by_group(&store).await.unwrap();
        assert_eq!(
            &store.calls()[..3],
            &[StoreCall::Begin, StoreCall::GetOptions, StoreCall::FindAllProjects]
        );
    }

    #[tokio::test]
    async fn test_configure_groups_off_moves_projects_to_group_zero() {
        let store = InMemoryStore::new(StoreState {
            projects: vec![project("a", 0), project("b", 1), project("c", 2)],
            ..StoreState::default()
        });
        configure_groups(
            &store,
            GroupConfig {
                multi_group: true,
                num_groups: 3,
                group_sizes: vec![1, 1],
            },
        )
        .await
        .unwrap();
        assert_eq!(location_of(&store.snapshot(), "c"), (2, 2));

        configure_groups(
            &store,
            GroupConfig {
                multi_group: false,
                num_groups: 1,
                group_sizes: Vec::new(),
            },
        )
        .await
        .unwrap();

        let state = store.snapshot();
        assert_eq!(location_of(&state, "a"), (0, 0));
        assert_eq!(location_of(&state, "b"), (0, 1));
        assert_eq!(location_of(&state, "c"), (0, 2));
    }

    #[tokio::test]
    async fn test_configure_groups_rejects_overflowing_sizes() {
        let store = InMemoryStore::new(StoreState {
            projects: vec![project("a", 0)],
            ..StoreState::default()
        });

        let err = configure_groups(
            &store,
            GroupConfig {
                multi_group: true,
                num_groups: 3,
                group_sizes: vec![i64::MAX, 1],
            },
        )
        .await
        .unwrap_err();

        assert!(err.is_validation());
        assert!(store.calls().is_empty());
    }
}
