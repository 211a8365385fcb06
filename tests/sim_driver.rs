// ==============================================
// SIMULATION DRIVER (integration)
// ==============================================

use evictkit::builder::CachePolicy;
use evictkit::sim::{Workload, simulate};

const LRU_REFERENCE: &str = "4 12 1 2 3 4 1 2 5 1 2 4 3 4";

#[test]
fn reference_workload_per_policy() {
    let workload: Workload = LRU_REFERENCE.parse().unwrap();
    let expected = [
        (CachePolicy::Lru, "Hits = 6"),
        (CachePolicy::Ideal, "Hits = 7"),
    ];
    for (policy, line) in expected {
        assert_eq!(simulate(policy, &workload).unwrap().to_string(), line);
    }
}

#[test]
fn multiline_input_with_trailing_newline() {
    let workload = Workload::parse("15\n10\n1 2 3 4 5\n6 7 1 2 6\n").unwrap();
    let two_q = simulate(CachePolicy::TwoQ, &workload).unwrap();
    let ideal = simulate(CachePolicy::Ideal, &workload).unwrap();
    assert_eq!(two_q.hits, 3);
    assert_eq!(ideal.hits, 3);
    assert_eq!(two_q.capacity, 15);
}

#[test]
fn report_accounting_is_consistent() {
    let workload: Workload = LRU_REFERENCE.parse().unwrap();
    for policy in CachePolicy::ALL {
        let report = simulate(policy, &workload).unwrap();
        assert_eq!(report.policy, policy);
        assert_eq!(report.requests, 12);
        assert_eq!(report.hits + report.misses, report.requests);
        assert!(report.loads <= report.misses, "{policy}");
        assert!(report.hit_ratio() > 0.0 && report.hit_ratio() < 1.0);
    }
}

#[test]
fn capacity_far_above_request_count() {
    let workload: Workload = "100000000000 3 1 2 1".parse().unwrap();
    assert_eq!(workload.capacity, 100_000_000_000);
    for policy in CachePolicy::ALL {
        let report = simulate(policy, &workload).unwrap();
        assert_eq!(report.hits, 1, "{policy}");
        assert!(report.capacity >= 100_000_000_000, "{policy}");
    }
}

#[test]
fn malformed_input_is_rejected() {
    for input in ["", "4", "4 x", "4 2 1", "4 2 1 1.5"] {
        assert!(Workload::parse(input).is_err(), "accepted {input:?}");
    }
}

#[test]
fn huge_declared_count_fails_cleanly() {
    let err = Workload::parse("4 9999999999 1 2 3").unwrap_err();
    assert!(err.message().contains("end of input"));
}
