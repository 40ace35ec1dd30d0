//! Dashboard aggregation — pure reduces over already-fetched complaint rows.
//!
//! Recomputed on every refresh; nothing here is persisted.

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;
use uuid::Uuid;

use crate::complaint::{Complaint, Status};

// ─── Status buckets ──────────────────────────────────────────────────────────

/// The four fixed dashboard buckets. Bucket names are display vocabulary,
/// not storage statuses: `in_progress` rows land in `in_process`,
/// `resolved` in `closed`, `rejected` in `reopened`, and anything null or
/// unknown in `pending`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusBuckets {
  pub pending:    usize,
  pub in_process: usize,
  pub closed:     usize,
  pub reopened:   usize,
}

impl StatusBuckets {
  pub fn total(&self) -> usize {
    self.pending + self.in_process + self.closed + self.reopened
  }
}

pub fn bucket_by_status(complaints: &[Complaint]) -> StatusBuckets {
  let mut buckets = StatusBuckets::default();
  for complaint in complaints {
    match complaint.status {
      None | Some(Status::Pending) => buckets.pending += 1,
      Some(Status::InProgress) => buckets.in_process += 1,
      Some(Status::Resolved) => buckets.closed += 1,
      Some(Status::Rejected) => buckets.reopened += 1,
    }
  }
  buckets
}

// ─── Sector frequencies ──────────────────────────────────────────────────────

/// Frequency table of complaints per sector name. Rows whose sector id is
/// absent or misses the join land under `"Unknown"`.
pub fn sector_frequencies(
  complaints: &[Complaint],
  sector_names: &HashMap<Uuid, String>,
) -> BTreeMap<String, usize> {
  let mut freq = BTreeMap::new();
  for complaint in complaints {
    let name = complaint
      .sector_id
      .and_then(|id| sector_names.get(&id))
      .map_or("Unknown", String::as_str);
    *freq.entry(name.to_owned()).or_insert(0) += 1;
  }
  freq
}

// ─── Summary ─────────────────────────────────────────────────────────────────

/// The full dashboard payload for one scope (public or mine).
#[derive(Debug, Clone, Serialize)]
pub struct DashboardSummary {
  pub total:      usize,
  pub by_status:  StatusBuckets,
  pub by_sector:  BTreeMap<String, usize>,
}

pub fn summarize(
  complaints: &[Complaint],
  sector_names: &HashMap<Uuid, String>,
) -> DashboardSummary {
  DashboardSummary {
    total:     complaints.len(),
    by_status: bucket_by_status(complaints),
    by_sector: sector_frequencies(complaints, sector_names),
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::complaint::SubmissionType;

  fn complaint(status: Option<Status>, sector_id: Option<Uuid>) -> Complaint {
    Complaint {
      status,
      sector_id,
      ..Complaint::blank(SubmissionType::Complaint)
    }
  }

  #[test]
  fn buckets_cover_every_row_exactly_once() {
    let rows = vec![
      complaint(None, None),
      complaint(Some(Status::Pending), None),
      complaint(Some(Status::InProgress), None),
      complaint(Some(Status::Resolved), None),
      complaint(Some(Status::Rejected), None),
      complaint(Some(Status::Resolved), None),
    ];

    let buckets = bucket_by_status(&rows);
    assert_eq!(buckets.total(), rows.len());
    assert_eq!(buckets.pending, 2);
    assert_eq!(buckets.in_process, 1);
    assert_eq!(buckets.closed, 2);
    assert_eq!(buckets.reopened, 1);
  }

  #[test]
  fn missing_sector_join_counts_as_unknown() {
    let roads = Uuid::new_v4();
    let orphan = Uuid::new_v4();
    let mut names = HashMap::new();
    names.insert(roads, "Roads".to_owned());

    let rows = vec![
      complaint(None, Some(roads)),
      complaint(None, Some(roads)),
      complaint(None, Some(orphan)),
      complaint(None, None),
    ];

    let freq = sector_frequencies(&rows, &names);
    assert_eq!(freq.get("Roads"), Some(&2));
    assert_eq!(freq.get("Unknown"), Some(&2));
  }

  #[test]
  fn summary_total_matches_input_length() {
    let rows: Vec<Complaint> =
      (0..5).map(|_| complaint(Some(Status::Pending), None)).collect();
    let summary = summarize(&rows, &HashMap::new());
    assert_eq!(summary.total, 5);
    assert_eq!(summary.by_status.total(), 5);
  }

  #[test]
  fn empty_input_is_all_zero() {
    let summary = summarize(&[], &HashMap::new());
    assert_eq!(summary.total, 0);
    assert_eq!(summary.by_status, StatusBuckets::default());
    assert!(summary.by_sector.is_empty());
  }
}
