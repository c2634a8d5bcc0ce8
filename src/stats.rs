// src/stats.rs

//! Aggregation over survey responses: per-user statistics, overall totals
//! and the six leaderboards.
//!
//! Everything here is a pure function over a snapshot of records and is
//! recomputed from scratch on every request. Callers hand in their own
//! `Vec` fetched from the database; there is no shared state and no cache.

use std::collections::HashMap;

use serde::Serialize;

use crate::models::response::{ResponseRecord, Status};

/// The three fixed response-time ranges a "yes" answer can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bucket {
    Immediate,
    Medium,
    Long,
}

impl Bucket {
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "immediately(2-5 mins)" => Some(Bucket::Immediate),
            "5-15 mins" => Some(Bucket::Medium),
            "more than 15 mins" => Some(Bucket::Long),
            _ => None,
        }
    }

    /// Representative minutes value used for averaging.
    pub fn minutes(&self) -> f64 {
        match self {
            Bucket::Immediate => 3.5,
            Bucket::Medium => 10.0,
            Bucket::Long => 20.0,
        }
    }
}

/// Descriptive statistics for one user's submissions.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStats {
    pub total_calls: i64,
    pub yes_calls: i64,
    pub no_calls: i64,
    pub hehehe_bhai_calls: i64,

    /// Percentage of calls Aayush actually came for, one decimal.
    /// Defined as 0 when there are no calls at all.
    pub success_rate: f64,

    /// Average of the bucket minutes over yes-responses that carry a
    /// bucket, one decimal. None when no such responses exist.
    pub avg_response_time: Option<f64>,

    /// Display labels derived by bucket presence, not per-record min/max.
    pub fastest_response: Option<&'static str>,
    pub slowest_response: Option<&'static str>,

    pub most_common_reason: Option<String>,

    /// Composite nuisance score: no*10 + hehehe*50 + yes*5.
    pub pareshaani_points: i64,
}

/// One user's row on the leaderboard, aggregated from their responses.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardRow {
    pub user_id: i64,
    pub user_name: String,
    pub user_email: String,
    pub total_calls: i64,
    pub yes_calls: i64,
    pub no_calls: i64,
    pub hehehe_bhai_calls: i64,
    pub success_rate: f64,
    /// 0.0 when the user has no timed yes-responses; such rows are
    /// filtered out of the fastest-response board.
    pub avg_response_time: f64,
    pub pareshaani_points: i64,
}

/// The six independently sorted top-10 views.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Leaderboards {
    pub most_calls: Vec<LeaderboardRow>,
    pub most_successful: Vec<LeaderboardRow>,
    pub most_rejected: Vec<LeaderboardRow>,
    pub most_hehehe_bhai: Vec<LeaderboardRow>,
    pub highest_pareshaani: Vec<LeaderboardRow>,
    pub fastest_response: Vec<LeaderboardRow>,
}

/// Unfiltered totals across every response in the system.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OverallStats {
    pub total_users: i64,
    pub total_responses: i64,
    pub total_yes: i64,
    pub total_no: i64,
    pub total_hehehe: i64,
    pub overall_success_rate: f64,
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

fn success_rate(yes: i64, total: i64) -> f64 {
    if total > 0 {
        round1(yes as f64 / total as f64 * 100.0)
    } else {
        0.0
    }
}

fn pareshaani_points(yes: i64, no: i64, hehehe: i64) -> i64 {
    no * 10 + hehehe * 50 + yes * 5
}

/// Average bucket minutes over yes-responses that carry a `time_taken`.
/// Unknown labels count as 0 minutes but still count towards the divisor,
/// matching the historical behavior.
fn avg_response_time(records: &[ResponseRecord]) -> Option<f64> {
    let timed: Vec<&str> = records
        .iter()
        .filter(|r| r.aayush_status == Status::Yes)
        .filter_map(|r| r.time_taken.as_deref())
        .collect();

    if timed.is_empty() {
        return None;
    }

    let total: f64 = timed
        .iter()
        .map(|label| Bucket::from_label(label).map_or(0.0, |b| b.minutes()))
        .sum();

    Some(round1(total / timed.len() as f64))
}

/// Fastest/slowest display labels, derived from which buckets are PRESENT
/// among the user's timed yes-responses rather than from per-record
/// min/max. A user whose only bucket is the long one therefore has no
/// fastest label at all. Deliberately preserved as-is.
fn presence_labels(records: &[ResponseRecord]) -> (Option<&'static str>, Option<&'static str>) {
    let buckets: Vec<Bucket> = records
        .iter()
        .filter(|r| r.aayush_status == Status::Yes)
        .filter_map(|r| r.time_taken.as_deref())
        .filter_map(Bucket::from_label)
        .collect();

    let fastest = if buckets.contains(&Bucket::Immediate) {
        Some("2-5 mins")
    } else if buckets.contains(&Bucket::Medium) {
        Some("5-15 mins")
    } else {
        None
    };

    let slowest = if buckets.contains(&Bucket::Long) {
        Some("15+ mins")
    } else if buckets.contains(&Bucket::Medium) {
        Some("5-15 mins")
    } else {
        None
    };

    (fastest, slowest)
}

/// The reason with the highest occurrence count. Ties go to the first
/// maximal reason in first-occurrence order, so the result is stable for
/// a given record ordering.
fn most_common_reason(records: &[ResponseRecord]) -> Option<String> {
    let mut counts: Vec<(&str, usize)> = Vec::new();
    for record in records {
        match counts.iter_mut().find(|(r, _)| *r == record.reason) {
            Some((_, n)) => *n += 1,
            None => counts.push((record.reason.as_str(), 1)),
        }
    }

    let mut best: Option<(&str, usize)> = None;
    for (reason, n) in counts {
        match best {
            Some((_, best_n)) if n <= best_n => {}
            _ => best = Some((reason, n)),
        }
    }

    best.map(|(reason, _)| reason.to_string())
}

fn count_status(records: &[ResponseRecord], status: Status) -> i64 {
    records.iter().filter(|r| r.aayush_status == status).count() as i64
}

/// Computes the per-user statistics block over one user's records.
pub fn compute_user_stats(records: &[ResponseRecord]) -> UserStats {
    let total_calls = records.len() as i64;
    let yes_calls = count_status(records, Status::Yes);
    let no_calls = count_status(records, Status::No);
    let hehehe_bhai_calls = count_status(records, Status::HeheheBhai);

    let (fastest_response, slowest_response) = presence_labels(records);

    UserStats {
        total_calls,
        yes_calls,
        no_calls,
        hehehe_bhai_calls,
        success_rate: success_rate(yes_calls, total_calls),
        avg_response_time: avg_response_time(records),
        fastest_response,
        slowest_response,
        most_common_reason: most_common_reason(records),
        pareshaani_points: pareshaani_points(yes_calls, no_calls, hehehe_bhai_calls),
    }
}

/// Groups the full record set by submitting user and produces the overall
/// totals plus the six top-10 boards. Each board is an independent sort
/// and slice over the same per-user aggregates.
pub fn compute_leaderboards(records: &[ResponseRecord]) -> (OverallStats, Leaderboards) {
    // Group while preserving first-seen order so that equal sort keys come
    // out in a deterministic order (Rust's sort is stable).
    let mut order: Vec<i64> = Vec::new();
    let mut by_user: HashMap<i64, Vec<&ResponseRecord>> = HashMap::new();
    for record in records {
        let group = by_user.entry(record.user_id).or_insert_with(|| {
            order.push(record.user_id);
            Vec::new()
        });
        group.push(record);
    }

    let rows: Vec<LeaderboardRow> = order
        .iter()
        .map(|user_id| {
            let group = &by_user[user_id];
            let total_calls = group.len() as i64;
            let yes_calls = group
                .iter()
                .filter(|r| r.aayush_status == Status::Yes)
                .count() as i64;
            let no_calls = group
                .iter()
                .filter(|r| r.aayush_status == Status::No)
                .count() as i64;
            let hehehe_bhai_calls = total_calls - yes_calls - no_calls;

            let timed: Vec<f64> = group
                .iter()
                .filter(|r| r.aayush_status == Status::Yes)
                .filter_map(|r| r.time_taken.as_deref())
                .map(|label| Bucket::from_label(label).map_or(0.0, |b| b.minutes()))
                .collect();
            let avg = if timed.is_empty() {
                0.0
            } else {
                round1(timed.iter().sum::<f64>() / timed.len() as f64)
            };

            LeaderboardRow {
                user_id: *user_id,
                user_name: group[0].user_name.clone(),
                user_email: group[0].user_email.clone(),
                total_calls,
                yes_calls,
                no_calls,
                hehehe_bhai_calls,
                success_rate: success_rate(yes_calls, total_calls),
                avg_response_time: avg,
                pareshaani_points: pareshaani_points(yes_calls, no_calls, hehehe_bhai_calls),
            }
        })
        .collect();

    let top10 = |mut sorted: Vec<LeaderboardRow>| {
        sorted.truncate(10);
        sorted
    };
    let sorted_by = |cmp: fn(&LeaderboardRow, &LeaderboardRow) -> std::cmp::Ordering| {
        let mut view = rows.clone();
        view.sort_by(cmp);
        top10(view)
    };

    let most_calls = sorted_by(|a, b| b.total_calls.cmp(&a.total_calls));
    let most_successful = {
        // At least 3 calls for a fair comparison.
        let mut view: Vec<LeaderboardRow> =
            rows.iter().filter(|r| r.total_calls >= 3).cloned().collect();
        view.sort_by(|a, b| b.success_rate.total_cmp(&a.success_rate));
        top10(view)
    };
    let most_rejected = sorted_by(|a, b| b.no_calls.cmp(&a.no_calls));
    let most_hehehe_bhai = sorted_by(|a, b| b.hehehe_bhai_calls.cmp(&a.hehehe_bhai_calls));
    let highest_pareshaani = sorted_by(|a, b| b.pareshaani_points.cmp(&a.pareshaani_points));
    let fastest_response = {
        let mut view: Vec<LeaderboardRow> = rows
            .iter()
            .filter(|r| r.avg_response_time > 0.0)
            .cloned()
            .collect();
        view.sort_by(|a, b| a.avg_response_time.total_cmp(&b.avg_response_time));
        top10(view)
    };

    let total_responses = records.len() as i64;
    let total_yes = count_status(records, Status::Yes);
    let total_no = count_status(records, Status::No);
    let total_hehehe = count_status(records, Status::HeheheBhai);

    let overall = OverallStats {
        total_users: rows.len() as i64,
        total_responses,
        total_yes,
        total_no,
        total_hehehe,
        overall_success_rate: success_rate(total_yes, total_responses),
    };

    let leaderboards = Leaderboards {
        most_calls,
        most_successful,
        most_rejected,
        most_hehehe_bhai,
        highest_pareshaani,
        fastest_response,
    };

    (overall, leaderboards)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(user_id: i64, status: Status, time_taken: Option<&str>, reason: &str) -> ResponseRecord {
        ResponseRecord {
            id: 0,
            name: "Aayush".to_string(),
            date: "2024-03-15".to_string(),
            reason: reason.to_string(),
            aayush_status: status,
            time_taken: time_taken.map(str::to_string),
            reason_not_coming: None,
            q1: None,
            q2: None,
            q3: None,
            q4: None,
            q5: None,
            q6: None,
            message: None,
            user_id,
            user_name: format!("user{}", user_id),
            user_email: format!("user{}@example.com", user_id),
            created_at: chrono::Utc::now(),
        }
    }

    #[test]
    fn empty_record_set_yields_zeroes() {
        let stats = compute_user_stats(&[]);
        assert_eq!(stats.total_calls, 0);
        assert_eq!(stats.success_rate, 0.0);
        assert_eq!(stats.avg_response_time, None);
        assert_eq!(stats.fastest_response, None);
        assert_eq!(stats.slowest_response, None);
        assert_eq!(stats.most_common_reason, None);
        assert_eq!(stats.pareshaani_points, 0);

        let (overall, boards) = compute_leaderboards(&[]);
        assert_eq!(overall.total_users, 0);
        assert_eq!(overall.overall_success_rate, 0.0);
        assert!(boards.most_calls.is_empty());
    }

    #[test]
    fn success_rate_rounds_to_one_decimal() {
        let records = vec![
            record(1, Status::Yes, None, "chai"),
            record(1, Status::No, None, "chai"),
            record(1, Status::No, None, "chai"),
        ];
        // 1/3 = 33.333..% -> 33.3
        assert_eq!(compute_user_stats(&records).success_rate, 33.3);
    }

    #[test]
    fn pareshaani_points_use_fixed_weights() {
        let records = vec![
            record(1, Status::Yes, None, "chai"),
            record(1, Status::Yes, None, "chai"),
            record(1, Status::No, None, "maggi"),
            record(1, Status::HeheheBhai, None, "mood"),
        ];
        // 2*5 + 1*10 + 1*50
        assert_eq!(compute_user_stats(&records).pareshaani_points, 70);
    }

    #[test]
    fn avg_response_time_maps_buckets_to_minutes() {
        let records = vec![
            record(1, Status::Yes, Some("immediately(2-5 mins)"), "chai"),
            record(1, Status::Yes, Some("5-15 mins"), "chai"),
            record(1, Status::No, None, "chai"),
        ];
        let stats = compute_user_stats(&records);
        // (3.5 + 10) / 2 = 6.75 -> 6.8
        assert_eq!(stats.avg_response_time, Some(6.8));
        assert_eq!(stats.fastest_response, Some("2-5 mins"));
        assert_eq!(stats.slowest_response, Some("5-15 mins"));
    }

    #[test]
    fn presence_based_labels_ignore_per_record_ordering() {
        // Only the long bucket present: slowest is known, fastest is not.
        let records = vec![record(1, Status::Yes, Some("more than 15 mins"), "chai")];
        let stats = compute_user_stats(&records);
        assert_eq!(stats.fastest_response, None);
        assert_eq!(stats.slowest_response, Some("15+ mins"));
    }

    #[test]
    fn most_common_reason_breaks_ties_by_first_occurrence() {
        let records = vec![
            record(1, Status::No, None, "maggi"),
            record(1, Status::No, None, "chai"),
            record(1, Status::No, None, "chai"),
            record(1, Status::No, None, "maggi"),
        ];
        // Both reasons occur twice; "maggi" was seen first.
        assert_eq!(
            compute_user_stats(&records).most_common_reason.as_deref(),
            Some("maggi")
        );
    }

    #[test]
    fn most_successful_board_requires_three_calls() {
        let mut records = Vec::new();
        // User 1: 2 calls, 100% success, excluded by the eligibility filter.
        records.push(record(1, Status::Yes, None, "chai"));
        records.push(record(1, Status::Yes, None, "chai"));
        // User 2: 4 calls, 50% success, eligible.
        records.push(record(2, Status::Yes, None, "chai"));
        records.push(record(2, Status::Yes, None, "chai"));
        records.push(record(2, Status::No, None, "chai"));
        records.push(record(2, Status::No, None, "chai"));

        let (_, boards) = compute_leaderboards(&records);
        assert_eq!(boards.most_successful.len(), 1);
        assert_eq!(boards.most_successful[0].user_id, 2);
        assert_eq!(boards.most_successful[0].success_rate, 50.0);
    }

    #[test]
    fn fastest_board_sorts_ascending_and_skips_untimed_users() {
        let records = vec![
            record(1, Status::Yes, Some("more than 15 mins"), "chai"),
            record(2, Status::Yes, Some("immediately(2-5 mins)"), "chai"),
            record(3, Status::No, None, "chai"),
        ];
        let (_, boards) = compute_leaderboards(&records);
        let ids: Vec<i64> = boards.fastest_response.iter().map(|r| r.user_id).collect();
        assert_eq!(ids, vec![2, 1]);
    }

    #[test]
    fn boards_are_independent_top_tens() {
        let mut records = Vec::new();
        for user_id in 1..=12 {
            for _ in 0..user_id {
                records.push(record(user_id, Status::No, None, "chai"));
            }
        }
        let (overall, boards) = compute_leaderboards(&records);
        assert_eq!(overall.total_users, 12);
        assert_eq!(boards.most_calls.len(), 10);
        assert_eq!(boards.most_rejected.len(), 10);
        // Descending by call count: the heaviest caller leads.
        assert_eq!(boards.most_calls[0].user_id, 12);
        // Nobody has a timed yes-response.
        assert!(boards.fastest_response.is_empty());
    }

    #[test]
    fn overall_stats_cover_all_records_unfiltered() {
        let records = vec![
            record(1, Status::Yes, None, "chai"),
            record(2, Status::No, None, "chai"),
            record(2, Status::HeheheBhai, None, "chai"),
        ];
        let (overall, _) = compute_leaderboards(&records);
        assert_eq!(overall.total_users, 2);
        assert_eq!(overall.total_responses, 3);
        assert_eq!(overall.total_yes, 1);
        assert_eq!(overall.total_no, 1);
        assert_eq!(overall.total_hehehe, 1);
        assert_eq!(overall.overall_success_rate, 33.3);
    }
}
