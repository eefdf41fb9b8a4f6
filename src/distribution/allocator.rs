//! Weighted allocation of unclaimed records among workers
//!
//! Rows of the residual task type are split into *claimed* rows, whose login
//! contains a known alias, and *unclaimed* rows. Workers are then visited in
//! their configured order; each takes
//! `floor(unclaimed × weight / Σweights)` of the still-unassigned unclaimed
//! rows, first come first served. Rounding down can leave a remainder of
//! unclaimed rows with no owner. That remainder is reported, not
//! redistributed.

use super::filter::login_contains;
use crate::table::Records;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A worker who can receive records
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Worker {
    /// Login code matched against the login column
    pub alias: String,
    /// Display name written into the assignee column and used in file names
    pub name: String,
    /// Proportional weight of this worker's weight class
    pub weight: u32,
}

impl Worker {
    pub fn new(alias: impl Into<String>, name: impl Into<String>, weight: u32) -> Self {
        Self {
            alias: alias.into(),
            name: name.into(),
            weight,
        }
    }
}

/// Workers grouped by weight, heaviest class first
pub fn weight_classes(workers: &[Worker]) -> BTreeMap<std::cmp::Reverse<u32>, Vec<&str>> {
    let mut classes: BTreeMap<std::cmp::Reverse<u32>, Vec<&str>> = BTreeMap::new();
    for worker in workers {
        classes
            .entry(std::cmp::Reverse(worker.weight))
            .or_default()
            .push(worker.name.as_str());
    }
    classes
}

/// Mapping from login alias codes to worker display names
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AliasTable {
    entries: Vec<(String, String)>,
}

impl AliasTable {
    pub fn new<A, N>(entries: impl IntoIterator<Item = (A, N)>) -> Self
    where
        A: Into<String>,
        N: Into<String>,
    {
        Self {
            entries: entries
                .into_iter()
                .map(|(alias, name)| (alias.into(), name.into()))
                .collect(),
        }
    }

    pub fn from_workers(workers: &[Worker]) -> Self {
        Self::new(workers.iter().map(|w| (w.alias.clone(), w.name.clone())))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether a login contains any registered alias
    pub fn is_claimed(&self, login: &str) -> bool {
        self.entries
            .iter()
            .any(|(alias, _)| !alias.is_empty() && login_contains(login, alias))
    }
}

/// Sum of every worker's weight
pub fn total_weight(workers: &[Worker]) -> u64 {
    workers.iter().map(|w| u64::from(w.weight)).sum()
}

/// `floor(unclaimed × weight / denominator)`, zero for a zero denominator
pub fn quota(unclaimed: usize, weight: u32, denominator: u64) -> usize {
    if denominator == 0 {
        return 0;
    }
    (unclaimed as u128 * u128::from(weight) / u128::from(denominator)) as usize
}

/// Quotas for every worker, in worker order
pub fn plan_quotas(unclaimed: usize, workers: &[Worker]) -> Vec<usize> {
    let denominator = total_weight(workers);
    workers
        .iter()
        .map(|w| quota(unclaimed, w.weight, denominator))
        .collect()
}

/// Tracks which unclaimed rows have been handed out and to whom.
///
/// The pool holds row indices in their original relative order; each slot
/// is assigned at most once.
#[derive(Debug, Clone)]
pub struct AssignmentLedger {
    pool: Vec<usize>,
    owners: Vec<Option<usize>>,
}

impl AssignmentLedger {
    pub fn new(pool: Vec<usize>) -> Self {
        let owners = vec![None; pool.len()];
        Self { pool, owners }
    }

    /// Assign up to `quota` of the first still-unassigned rows to `worker`.
    /// Returns the row indices taken.
    pub fn take(&mut self, worker: usize, quota: usize) -> Vec<usize> {
        let mut taken = Vec::with_capacity(quota);
        for (slot, owner) in self.owners.iter_mut().enumerate() {
            if taken.len() == quota {
                break;
            }
            if owner.is_none() {
                *owner = Some(worker);
                taken.push(self.pool[slot]);
            }
        }
        taken
    }

    /// Rows assigned to `worker`, in pool order
    pub fn assigned_to(&self, worker: usize) -> Vec<usize> {
        self.pool
            .iter()
            .zip(&self.owners)
            .filter(|(_, owner)| **owner == Some(worker))
            .map(|(&row, _)| row)
            .collect()
    }

    /// Rows nobody received
    pub fn unassigned(&self) -> Vec<usize> {
        self.pool
            .iter()
            .zip(&self.owners)
            .filter(|(_, owner)| owner.is_none())
            .map(|(&row, _)| row)
            .collect()
    }

    pub fn remaining(&self) -> usize {
        self.owners.iter().filter(|o| o.is_none()).count()
    }
}

/// One worker's part of an allocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerShare {
    pub worker: String,
    pub quota: usize,
    /// Claimed rows whose login contains this worker's alias
    pub direct: Vec<usize>,
    /// Unclaimed rows handed to this worker
    pub allocated: Vec<usize>,
}

impl WorkerShare {
    pub fn total(&self) -> usize {
        self.direct.len() + self.allocated.len()
    }
}

/// Result of allocating one task type.
///
/// Row indices refer to [`Allocation::records`], the rows of the task type.
#[derive(Debug, Clone)]
pub struct Allocation {
    task_type: String,
    records: Records,
    claimed: Vec<usize>,
    unclaimed: Vec<usize>,
    unassigned: Vec<usize>,
    denominator: u64,
    shares: Vec<WorkerShare>,
}

/// Serializable counts describing an allocation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocationSummary {
    pub task_type: String,
    pub total: usize,
    pub claimed: usize,
    pub unclaimed: usize,
    pub unassigned: usize,
    pub denominator: u64,
    pub workers: Vec<WorkerSummary>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerSummary {
    pub worker: String,
    pub quota: usize,
    pub direct: usize,
    pub allocated: usize,
}

impl Allocation {
    pub fn task_type(&self) -> &str {
        &self.task_type
    }

    /// Rows of the allocated task type, before any assignment was written
    pub fn records(&self) -> &Records {
        &self.records
    }

    pub fn claimed(&self) -> &[usize] {
        &self.claimed
    }

    pub fn unclaimed(&self) -> &[usize] {
        &self.unclaimed
    }

    /// Unclaimed rows left without an owner by floor rounding
    pub fn unassigned(&self) -> &[usize] {
        &self.unassigned
    }

    pub fn denominator(&self) -> u64 {
        self.denominator
    }

    pub fn shares(&self) -> &[WorkerShare] {
        &self.shares
    }

    pub fn share_of(&self, worker: &str) -> Option<&WorkerShare> {
        self.shares.iter().find(|s| s.worker == worker)
    }

    /// Direct rows followed by allocated rows, with the assignee column set
    /// to the worker's name on every row
    pub fn combined_for(&self, worker: &str) -> Option<Records> {
        let share = self.share_of(worker)?;
        let indices: Vec<usize> = share
            .direct
            .iter()
            .chain(&share.allocated)
            .copied()
            .collect();

        let mut combined = self.records.select(&indices);
        for row in 0..combined.len() {
            combined.assign(row, worker);
        }
        Some(combined)
    }

    pub fn summary(&self) -> AllocationSummary {
        AllocationSummary {
            task_type: self.task_type.clone(),
            total: self.records.len(),
            claimed: self.claimed.len(),
            unclaimed: self.unclaimed.len(),
            unassigned: self.unassigned.len(),
            denominator: self.denominator,
            workers: self
                .shares
                .iter()
                .map(|s| WorkerSummary {
                    worker: s.worker.clone(),
                    quota: s.quota,
                    direct: s.direct.len(),
                    allocated: s.allocated.len(),
                })
                .collect(),
        }
    }
}

/// Allocate the rows of `task_type` among `workers`.
///
/// Claimed rows go to the first worker, in order, whose alias the login
/// contains. Unclaimed rows are dealt out by quota in worker order.
pub fn allocate(
    records: &Records,
    task_type: &str,
    aliases: &AliasTable,
    workers: &[Worker],
) -> Allocation {
    let category = records.select(&records.rows_with_task(task_type));

    let (claimed, unclaimed): (Vec<usize>, Vec<usize>) =
        (0..category.len()).partition(|&i| aliases.is_claimed(&category.login(i)));

    let mut direct: Vec<Vec<usize>> = vec![Vec::new(); workers.len()];
    for &row in &claimed {
        let login = category.login(row);
        if let Some(owner) = workers
            .iter()
            .position(|w| !w.alias.is_empty() && login_contains(&login, &w.alias))
        {
            direct[owner].push(row);
        }
    }

    let denominator = total_weight(workers);
    let quotas = plan_quotas(unclaimed.len(), workers);
    let mut ledger = AssignmentLedger::new(unclaimed.clone());

    for (idx, (worker, &quota)) in workers.iter().zip(&quotas).enumerate() {
        let taken = ledger.take(idx, quota);
        tracing::debug!(
            worker = %worker.name,
            weight = worker.weight,
            quota,
            taken = taken.len(),
            "Allocated unclaimed rows"
        );
    }

    let shares: Vec<WorkerShare> = workers
        .iter()
        .zip(quotas)
        .zip(direct)
        .enumerate()
        .map(|(idx, ((worker, quota), direct))| WorkerShare {
            worker: worker.name.clone(),
            quota,
            direct,
            allocated: ledger.assigned_to(idx),
        })
        .collect();

    let unassigned = ledger.unassigned();
    if !unassigned.is_empty() {
        tracing::warn!(
            task_type,
            unassigned = unassigned.len(),
            unclaimed = unclaimed.len(),
            "Floor rounding left unclaimed rows without an owner"
        );
    }

    Allocation {
        task_type: task_type.to_string(),
        records: category,
        claimed,
        unclaimed,
        unassigned,
        denominator,
        shares,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::{Cell, ColumnNames, Dataset};

    fn names() -> ColumnNames {
        ColumnNames {
            task_type: "task".into(),
            login: "login".into(),
            assignee: "owner".into(),
        }
    }

    fn records(rows: &[(&str, &str)]) -> Records {
        let dataset = Dataset::from_rows(
            vec!["task".into(), "login".into(), "id".into()],
            rows.iter()
                .enumerate()
                .map(|(i, (t, l))| vec![Cell::from(*t), Cell::from(*l), Cell::Number(i as f64)])
                .collect(),
        );
        Records::normalize(dataset, &names()).unwrap()
    }

    fn unclaimed_rows(n: usize) -> Records {
        let rows: Vec<(&str, &str)> = (0..n).map(|_| ("CTP", "")).collect();
        records(&rows)
    }

    fn reference_workers() -> Vec<Worker> {
        vec![
            Worker::new("EDUARSOUZA", "EDUARDO", 15),
            Worker::new("ROSSILVA", "ROSANA", 15),
            Worker::new("VSILVEIRA", "VINICIUS", 15),
            Worker::new("KAMARQUES", "KAUE", 11),
            Worker::new("PFREGOLON", "PEDRO", 11),
        ]
    }

    fn ids(records: &Records) -> Vec<String> {
        (0..records.len())
            .map(|i| records.dataset().value(i, "id").unwrap().to_string())
            .collect()
    }

    #[test]
    fn test_reference_denominator() {
        assert_eq!(total_weight(&reference_workers()), 67);
    }

    #[test]
    fn test_quotas_exact_multiple() {
        assert_eq!(
            plan_quotas(67, &reference_workers()),
            vec![15, 15, 15, 11, 11]
        );
        assert_eq!(
            plan_quotas(134, &reference_workers()),
            vec![30, 30, 30, 22, 22]
        );
    }

    #[test]
    fn test_quotas_round_down_leaving_remainder() {
        let quotas = plan_quotas(70, &reference_workers());
        assert_eq!(quotas, vec![15, 15, 15, 11, 11]);
        assert_eq!(70 - quotas.iter().sum::<usize>(), 3);
    }

    #[test]
    fn test_quota_zero_denominator() {
        assert_eq!(quota(10, 5, 0), 0);
        assert!(plan_quotas(10, &[]).is_empty());
    }

    #[test]
    fn test_ledger_takes_first_free_rows() {
        let mut ledger = AssignmentLedger::new(vec![10, 11, 12, 13, 14]);

        assert_eq!(ledger.take(0, 2), vec![10, 11]);
        assert_eq!(ledger.take(1, 2), vec![12, 13]);
        assert_eq!(ledger.take(2, 5), vec![14]);
        assert_eq!(ledger.remaining(), 0);
        assert_eq!(ledger.assigned_to(1), vec![12, 13]);
        assert!(ledger.unassigned().is_empty());
    }

    #[test]
    fn test_alias_table_claims_by_substring() {
        let aliases = AliasTable::from_workers(&reference_workers());

        assert!(aliases.is_claimed("eduarsouza"));
        assert!(aliases.is_claimed("PRT-PFREGOLON-01"));
        assert!(!aliases.is_claimed("MMARIO"));
        assert!(!aliases.is_claimed(""));
        assert!(aliases.is_claimed("xx-kamarques"));
    }

    #[test]
    fn test_single_worker_scenario() {
        let recs = records(&[("X", ""), ("X", "FOOUSER"), ("X", "BARUSER")]);
        let aliases = AliasTable::new([("FOO", "Foo")]);
        let workers = vec![Worker::new("FOO", "Foo", 1)];

        let allocation = allocate(&recs, "X", &aliases, &workers);

        assert_eq!(allocation.claimed(), &[1]);
        assert_eq!(allocation.unclaimed(), &[0, 2]);
        assert_eq!(allocation.share_of("Foo").unwrap().quota, 2);

        let combined = allocation.combined_for("Foo").unwrap();
        assert_eq!(ids(&combined), vec!["1", "0", "2"]);
        assert!((0..combined.len()).all(|i| combined.assignee(i) == "Foo"));
    }

    #[test]
    fn test_seventy_unclaimed_leaves_three_unassigned() {
        let recs = unclaimed_rows(70);
        let workers = reference_workers();
        let allocation = allocate(&recs, "CTP", &AliasTable::from_workers(&workers), &workers);

        let allocated: Vec<usize> = allocation
            .shares()
            .iter()
            .map(|s| s.allocated.len())
            .collect();
        assert_eq!(allocated, vec![15, 15, 15, 11, 11]);
        assert_eq!(allocation.unassigned(), &[67, 68, 69]);
    }

    #[test]
    fn test_allocation_is_sequential_in_worker_order() {
        let recs = unclaimed_rows(67);
        let workers = reference_workers();
        let allocation = allocate(&recs, "CTP", &AliasTable::from_workers(&workers), &workers);

        assert_eq!(
            allocation.share_of("EDUARDO").unwrap().allocated,
            (0..15).collect::<Vec<_>>()
        );
        assert_eq!(
            allocation.share_of("ROSANA").unwrap().allocated,
            (15..30).collect::<Vec<_>>()
        );
        assert_eq!(
            allocation.share_of("PEDRO").unwrap().allocated,
            (56..67).collect::<Vec<_>>()
        );
        assert!(allocation.unassigned().is_empty());
    }

    #[test]
    fn test_claimed_rows_come_first_and_keep_order() {
        let recs = records(&[
            ("CTP", ""),
            ("CTP", "vsilveira"),
            ("CTP", "KAMARQUES"),
            ("CTP", "VSILVEIRA2"),
            ("OTHER", "VSILVEIRA"),
        ]);
        let workers = vec![
            Worker::new("VSILVEIRA", "VINICIUS", 1),
            Worker::new("KAMARQUES", "KAUE", 1),
        ];
        let allocation = allocate(&recs, "CTP", &AliasTable::from_workers(&workers), &workers);

        // one unclaimed row, quota floor(1 * 1 / 2) = 0 for both
        assert_eq!(allocation.unassigned().len(), 1);

        let vinicius = allocation.combined_for("VINICIUS").unwrap();
        assert_eq!(ids(&vinicius), vec!["1", "3"]);
        let kaue = allocation.combined_for("KAUE").unwrap();
        assert_eq!(ids(&kaue), vec!["2"]);
    }

    #[test]
    fn test_claimed_direct_rows_get_assignee_overwritten() {
        let dataset = Dataset::from_rows(
            vec!["task".into(), "login".into(), "owner".into()],
            vec![vec![Cell::from("CTP"), Cell::from("pfregolon"), Cell::from("stale")]],
        );
        let recs = Records::normalize(dataset, &names()).unwrap();
        let workers = vec![Worker::new("PFREGOLON", "PEDRO", 11)];

        let allocation = allocate(&recs, "CTP", &AliasTable::from_workers(&workers), &workers);
        let combined = allocation.combined_for("PEDRO").unwrap();

        assert_eq!(combined.assignee(0), "PEDRO");
        // the source rows are untouched
        assert_eq!(allocation.records().assignee(0), "stale");
    }

    #[test]
    fn test_login_matching_two_aliases_goes_to_first_worker() {
        let recs = records(&[("CTP", "ROSSILVA/EDUARSOUZA")]);
        let workers = reference_workers();
        let allocation = allocate(&recs, "CTP", &AliasTable::from_workers(&workers), &workers);

        assert_eq!(allocation.share_of("EDUARDO").unwrap().direct, vec![0]);
        assert!(allocation.share_of("ROSANA").unwrap().direct.is_empty());
    }

    #[test]
    fn test_alias_outside_worker_list_claims_without_owner() {
        let recs = records(&[("CTP", "MMARIO"), ("CTP", "")]);
        let workers = vec![Worker::new("FOO", "Foo", 1)];
        let aliases = AliasTable::new([("FOO", "Foo"), ("MMARIO", "Mario")]);

        let allocation = allocate(&recs, "CTP", &aliases, &workers);

        assert_eq!(allocation.claimed(), &[0]);
        assert_eq!(ids(&allocation.combined_for("Foo").unwrap()), vec!["1"]);
    }

    #[test]
    fn test_no_rows_of_task_type() {
        let recs = records(&[("OTHER", "")]);
        let workers = reference_workers();
        let allocation = allocate(&recs, "CTP", &AliasTable::from_workers(&workers), &workers);

        assert_eq!(allocation.records().len(), 0);
        assert!(allocation
            .shares()
            .iter()
            .all(|s| s.total() == 0 && s.quota == 0));
        assert!(allocation.combined_for("EDUARDO").unwrap().is_empty());
        assert!(allocation.combined_for("NOBODY").is_none());
    }

    #[test]
    fn test_summary_counts() {
        let recs = records(&[("X", ""), ("X", "FOOUSER"), ("X", "BARUSER")]);
        let workers = vec![Worker::new("FOO", "Foo", 1)];
        let summary = allocate(&recs, "X", &AliasTable::from_workers(&workers), &workers).summary();

        assert_eq!(summary.total, 3);
        assert_eq!(summary.claimed, 1);
        assert_eq!(summary.unclaimed, 2);
        assert_eq!(summary.unassigned, 0);
        assert_eq!(summary.workers[0].allocated, 2);
    }

    #[test]
    fn test_weight_classes_group_by_weight() {
        let workers = reference_workers();
        let classes = weight_classes(&workers);
        let grouped: Vec<(u32, Vec<&str>)> = classes
            .into_iter()
            .map(|(std::cmp::Reverse(w), names)| (w, names))
            .collect();

        assert_eq!(
            grouped,
            vec![
                (15, vec!["EDUARDO", "ROSANA", "VINICIUS"]),
                (11, vec!["KAUE", "PEDRO"]),
            ]
        );
    }
}
