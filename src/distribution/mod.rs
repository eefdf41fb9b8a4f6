//! Ownership-based distribution of task records
//!
//! - `filter` - direct selection by task type and login substring
//! - `allocator` - weighted quota allocation of unclaimed records
//! - `combiner` - final per-worker aggregation
//! - `manifest` - per-owner record of written files
//! - `naming` - output file names and run dates

pub mod allocator;
pub mod combiner;
pub mod filter;
pub mod manifest;
pub mod naming;

pub use allocator::{
    allocate, plan_quotas, quota, total_weight, weight_classes, AliasTable, Allocation,
    AllocationSummary, AssignmentLedger, Worker, WorkerShare, WorkerSummary,
};
pub use combiner::{combine_all, combine_tables, FinalPassOptions, FinalPassReport};
pub use filter::{filter_records, login_contains, matching_rows};
pub use manifest::{OutputManifest, SkippedFile, WrittenFile};
pub use naming::{final_file_name, output_file_name, RunDate};
