// Table number sequence generator
//
// The counters live on the options record in the database, but all
// assignment logic works on an explicit TableSequence value that is loaded
// from the options, advanced in memory and written back in the same
// transaction.

use crate::errors::ValidationError;
use crate::models::Options;

/// Check that a group layout can be used to number projects.
///
/// Only the boundaries between groups matter, so `group_sizes` needs at
/// least `num_groups - 1` entries. The size of the last group is never read:
/// it takes every project that does not fit in the groups before it.
pub fn validate_group_layout(num_groups: i64, group_sizes: &[i64]) -> Result<(), ValidationError> {
    if num_groups < 1 {
        return Err(ValidationError::InvalidGroupConfig(format!(
            "num_groups must be at least 1, got {}",
            num_groups
        )));
    }

    let bounded = (num_groups - 1) as usize;
    if group_sizes.len() < bounded {
        return Err(ValidationError::InvalidGroupConfig(format!(
            "{} groups need at least {} group sizes, got {}",
            num_groups,
            bounded,
            group_sizes.len()
        )));
    }

    if let Some((index, size)) = group_sizes
        .iter()
        .take(bounded)
        .enumerate()
        .find(|(_, size)| **size < 0)
    {
        return Err(ValidationError::InvalidFieldValue {
            field: format!("group_sizes[{}]", index),
            reason: format!("group size cannot be negative, got {}", size),
        });
    }

    group_sizes
        .iter()
        .take(bounded)
        .enumerate()
        .try_fold(0i64, |end, (index, size)| {
            end.checked_add(*size)
                .ok_or_else(|| ValidationError::InvalidFieldValue {
                    field: format!("group_sizes[{}]", index),
                    reason: format!("groups up to this one exceed {} tables", i64::MAX),
                })
        })?;

    Ok(())
}

/// Start offset of every group: 0 for the first group, then the running sum
/// of the sizes of the groups before it.
///
/// Sums saturate; run `validate_group_layout` first to reject layouts whose
/// offsets do not fit.
pub fn group_start_offsets(num_groups: i64, group_sizes: &[i64]) -> Vec<i64> {
    let count = num_groups.max(0) as usize;
    let mut starts = Vec::with_capacity(count);
    let mut next: i64 = 0;
    for i in 0..count {
        starts.push(next);
        if i + 1 < count {
            next = next.saturating_add(group_sizes.get(i).copied().unwrap_or(0));
        }
    }
    starts
}

/// In-memory view of the table number counters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSequence {
    curr_table_num: i64,
    group_starts: Vec<i64>,
    group_table_nums: Vec<i64>,
}

impl TableSequence {
    /// Load the sequence state from an options record
    ///
    /// Persisted group counters are reused when they match the configured
    /// number of groups; otherwise they are rebuilt from the group sizes.
    ///
    /// # Errors
    /// Returns `ValidationError` if the group layout is unusable
    pub fn from_options(options: &Options) -> Result<Self, ValidationError> {
        validate_group_layout(options.num_groups, &options.group_sizes)?;

        let group_starts = group_start_offsets(options.num_groups, &options.group_sizes);
        let group_table_nums = if options.group_table_nums.len() == group_starts.len() {
            options.group_table_nums.clone()
        } else {
            group_starts.clone()
        };

        Ok(Self {
            curr_table_num: options.curr_table_num,
            group_starts,
            group_table_nums,
        })
    }

    /// Rewind the ungrouped counter to zero, leaving group counters alone
    pub fn reset_incr(&mut self) {
        self.curr_table_num = 0;
    }

    /// Rewind every counter to the start of its range
    pub fn reset(&mut self) {
        self.curr_table_num = 0;
        self.group_table_nums.clone_from(&self.group_starts);
    }

    /// Next table number when grouping is disabled
    pub fn next_incr_table_num(&mut self) -> i64 {
        let table = self.curr_table_num;
        self.curr_table_num += 1;
        table
    }

    /// Next `(group, table)` pair when grouping is enabled
    ///
    /// Groups fill up in order: a project goes to the first group whose
    /// range still has a free table number. The last group is unbounded.
    pub fn next_group_table_num(&mut self) -> (i64, i64) {
        let last = self.group_table_nums.len() - 1;
        let group = (0..last)
            .find(|&g| self.group_table_nums[g] < self.group_starts[g + 1])
            .unwrap_or(last);

        let table = self.group_table_nums[group];
        self.group_table_nums[group] += 1;
        self.curr_table_num += 1;

        (group as i64, table)
    }

    /// Store the counters back onto the options record
    pub fn write_back(&self, options: &mut Options) {
        options.curr_table_num = self.curr_table_num;
        options.group_table_nums.clone_from(&self.group_table_nums);
    }

    pub fn curr_table_num(&self) -> i64 {
        self.curr_table_num
    }

    pub fn group_starts(&self) -> &[i64] {
        &self.group_starts
    }

    pub fn group_table_nums(&self) -> &[i64] {
        &self.group_table_nums
    }
}
