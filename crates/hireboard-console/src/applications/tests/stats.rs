use super::common::*;
use std::collections::BTreeMap;

use crate::applications::domain::ApplicationStatus;
use crate::applications::records::{derive_stats, ServerStats, StatsScope};

fn server_stats(total: u64, counts: &[(&str, u64)]) -> ServerStats {
    ServerStats {
        total,
        by_status: counts
            .iter()
            .map(|(label, count)| (label.to_string(), *count))
            .collect::<BTreeMap<_, _>>(),
    }
}

#[test]
fn well_formed_server_summary_wins() {
    let page = records(0..3, ApplicationStatus::Pending);
    let server = server_stats(40, &[("pending", 25), ("hired", 15)]);

    let stats = derive_stats(&page, Some(&server));
    assert_eq!(stats.scope, StatsScope::Global);
    assert_eq!(stats.total, 40);
    assert_eq!(stats.count(ApplicationStatus::Pending), 25);
    assert_eq!(stats.count(ApplicationStatus::Hired), 15);
    assert_eq!(stats.count(ApplicationStatus::Rejected), 0);
}

#[test]
fn missing_summary_falls_back_to_the_page() {
    let mut page = records(0..3, ApplicationStatus::Pending);
    page.push(record(3, ApplicationStatus::Offer));

    let stats = derive_stats(&page, None);
    assert_eq!(stats.scope, StatsScope::PageLocal);
    assert_eq!(stats.total, 4);
    assert_eq!(stats.count(ApplicationStatus::Pending), 3);
    assert_eq!(stats.count(ApplicationStatus::Offer), 1);
}

#[test]
fn unknown_status_key_is_malformed() {
    let page = records(0..2, ApplicationStatus::Reviewing);
    let server = server_stats(10, &[("reviewing", 8), ("archived", 2)]);

    let stats = derive_stats(&page, Some(&server));
    assert_eq!(stats.scope, StatsScope::PageLocal);
    assert_eq!(stats.count(ApplicationStatus::Reviewing), 2);
}

#[test]
fn count_above_total_is_malformed() {
    let page = records(0..2, ApplicationStatus::Reviewing);
    let server = server_stats(3, &[("reviewing", 9)]);

    assert_eq!(
        derive_stats(&page, Some(&server)).scope,
        StatsScope::PageLocal
    );
}

#[test]
fn empty_page_yields_zeroed_counts() {
    let stats = derive_stats(&[], None);
    assert_eq!(stats.total, 0);
    assert!(ApplicationStatus::ALL
        .into_iter()
        .all(|status| stats.count(status) == 0));
    assert_eq!(stats.by_status.len(), ApplicationStatus::ALL.len());
}
