// SQL query constants for the PostgreSQL store
// Centralizes repeated statements so the store methods stay short

/// SQL for the projects table
pub mod project_queries {
    pub const SELECT_ALL: &str = r#"
        SELECT id, name, description, location, group_num, created_at
        FROM projects
        ORDER BY location, created_at
    "#;

    pub const INSERT: &str = r#"
        INSERT INTO projects (id, name, description, location, group_num, created_at)
        VALUES ($1, $2, $3, $4, $5, $6)
    "#;

    /// Bulk update of placements, one array element per project
    pub const UPDATE_PLACEMENTS: &str = r#"
        UPDATE projects AS p
        SET location = u.location,
            group_num = u.group_num
        FROM UNNEST($1::uuid[], $2::bigint[], $3::bigint[]) AS u(id, location, group_num)
        WHERE p.id = u.id
    "#;
}

/// SQL for the judges table
pub mod judge_queries {
    pub const SELECT_ALL: &str = r#"
        SELECT id, name, group_num, created_at
        FROM judges
        ORDER BY created_at
    "#;

    /// Bulk update of judge groups, one array element per judge
    pub const UPDATE_GROUPS: &str = r#"
        UPDATE judges AS j
        SET group_num = u.group_num
        FROM UNNEST($1::uuid[], $2::bigint[]) AS u(id, group_num)
        WHERE j.id = u.id
    "#;
}

/// SQL for the single-row options table
///
/// `FOR UPDATE` keeps concurrent numbering runs from reading the same
/// counters before either commits.
pub mod options_queries {
    pub const SELECT_FOR_UPDATE: &str = r#"
        SELECT curr_table_num, multi_group, num_groups, group_sizes,
               group_table_nums, manual_switches
        FROM options
        WHERE id = 1
        FOR UPDATE
    "#;

    pub const UPDATE_COUNTERS: &str = r#"
        UPDATE options
        SET curr_table_num = $1,
            group_table_nums = $2
        WHERE id = 1
    "#;

    pub const UPDATE_GROUP_CONFIG: &str = r#"
        UPDATE options
        SET multi_group = $1,
            num_groups = $2,
            group_sizes = $3
        WHERE id = 1
    "#;

    pub const INCREMENT_MANUAL_SWITCHES: &str = r#"
        UPDATE options
        SET manual_switches = manual_switches + 1
        WHERE id = 1
    "#;
}
