//! Property tests for the field validator and the ledger.

use contact_relay_core::fields::{Violation, rule_for, validate_field};
use contact_relay_core::ledger::Ledger;
use proptest::prelude::*;

proptest! {
    /// Any non-empty message between the configured bounds validates clean.
    #[test]
    fn message_within_bounds_is_valid(len in 10usize..=5000) {
        let rule = rule_for("message").unwrap();
        let value = "m".repeat(len);
        prop_assert!(validate_field(&value, &rule).is_empty());
    }

    /// Required fields never accept whitespace-only input.
    #[test]
    fn required_rejects_whitespace(ws in proptest::collection::vec(prop_oneof![Just(' '), Just('\t'), Just('\n')], 0..20)) {
        let value: String = ws.into_iter().collect();
        let rule = rule_for("message").unwrap();
        let violations = validate_field(&value, &rule);
        prop_assert_eq!(violations, vec![Violation::Required]);
    }

    /// Optional fields accept any value that fits the length cap.
    #[test]
    fn company_under_cap_is_valid(value in "[A-Za-z0-9 ]{0,200}") {
        let rule = rule_for("company").unwrap();
        prop_assert!(validate_field(&value, &rule).is_empty());
    }

    /// Pruning never retains an out-of-window timestamp, and recording at
    /// `now` always survives an immediate prune.
    #[test]
    fn ledger_prune_invariant(
        entries in proptest::collection::vec(0i64..100_000, 0..32),
        window in 1u64..10_000,
        now in 0i64..200_000,
    ) {
        let mut ledger = Ledger::from_entries(entries);
        ledger.prune(window, now);
        let cutoff = now - i64::try_from(window).unwrap();
        prop_assert!(ledger.entries().iter().all(|&ts| ts > cutoff));

        ledger.record(now);
        let len_before = ledger.len();
        ledger.prune(window, now);
        prop_assert_eq!(ledger.len(), len_before);
    }
}
