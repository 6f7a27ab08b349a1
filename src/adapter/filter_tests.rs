//! Tests for the record filtering module.

use std::sync::Arc;

use super::filter::*;
use super::{AdapterFlags, AdapterRecord};

// ============================================================================
// Test Fixtures
// ============================================================================

fn ethernet_record() -> AdapterRecord {
    let mut record = AdapterRecord::new("\\Device\\NPF_{6A9F2C1E-0001}");
    record.set_description("Intel(R) Ethernet Connection I219-V");
    record
}

fn loopback_record() -> AdapterRecord {
    let mut record = AdapterRecord::new("\\Device\\NPF_Loopback");
    record.set_description("Adapter for loopback traffic capture");
    record
}

fn wan_record() -> AdapterRecord {
    let mut record = AdapterRecord::new("\\Device\\NPF_GenericDialupAdapter");
    record.flags = AdapterFlags::NdisWan;
    record
}

fn firewire_record() -> AdapterRecord {
    AdapterRecord::do_not_export("\\Device\\NPF_{1394-0002}")
}

// ============================================================================
// FlagsFilter Tests
// ============================================================================

mod flags_filter {
    use super::*;

    #[test]
    fn matches_single_flag() {
        let filter = FlagsFilter::new([AdapterFlags::DoNotExport]);
        assert!(filter.matches(&firewire_record()));
        assert!(!filter.matches(&ethernet_record()));
    }

    #[test]
    fn matches_multiple_flags() {
        let filter = FlagsFilter::new([AdapterFlags::NdisWan, AdapterFlags::DoNotExport]);
        assert!(filter.matches(&wan_record()));
        assert!(filter.matches(&firewire_record()));
        assert!(!filter.matches(&ethernet_record()));
    }

    #[test]
    fn empty_filter_matches_nothing() {
        let filter = FlagsFilter::new([]);
        assert!(filter.is_empty());
        assert!(!filter.matches(&ethernet_record()));
    }
}

// ============================================================================
// NameRegexFilter Tests
// ============================================================================

mod name_regex_filter {
    use super::*;

    #[test]
    fn matches_name() {
        let filter = NameRegexFilter::new("Loopback$").unwrap();
        assert!(filter.matches(&loopback_record()));
        assert!(!filter.matches(&ethernet_record()));
    }

    #[test]
    fn matches_description() {
        let filter = NameRegexFilter::new("I219").unwrap();
        assert!(filter.matches(&ethernet_record()));
        assert!(!filter.matches(&wan_record()));
    }

    #[test]
    fn invalid_pattern_is_rejected() {
        assert!(NameRegexFilter::new("([").is_err());
    }

    #[test]
    fn pattern_accessor_returns_source() {
        let filter = NameRegexFilter::new("^\\\\Device").unwrap();
        assert_eq!(filter.pattern().as_str(), "^\\\\Device");
    }
}

// ============================================================================
// FilterChain Tests
// ============================================================================

mod filter_chain {
    use super::*;

    #[test]
    fn empty_chain_matches_everything() {
        let chain = FilterChain::new();
        assert!(chain.is_empty());
        assert!(chain.matches(&ethernet_record()));
        assert!(chain.matches(&firewire_record()));
    }

    #[test]
    fn exclude_rejects_matching_records() {
        let chain = FilterChain::new().exclude(FlagsFilter::new([AdapterFlags::DoNotExport]));
        assert!(chain.matches(&ethernet_record()));
        assert!(!chain.matches(&firewire_record()));
    }

    #[test]
    fn includes_use_or_semantics() {
        let chain = FilterChain::new()
            .include(NameRegexFilter::new("Loopback").unwrap())
            .include(NameRegexFilter::new("Dialup").unwrap());

        assert!(chain.matches(&loopback_record()));
        assert!(chain.matches(&wan_record()));
        assert!(!chain.matches(&ethernet_record()));
    }

    #[test]
    fn exclude_wins_over_include() {
        let chain = FilterChain::new()
            .include(NameRegexFilter::new("NPF_").unwrap())
            .exclude(FlagsFilter::new([AdapterFlags::NdisWan]));

        assert!(chain.matches(&ethernet_record()));
        assert!(!chain.matches(&wan_record()));
    }

    #[test]
    fn counts_reflect_configuration() {
        let chain = FilterChain::new()
            .include(NameRegexFilter::new("a").unwrap())
            .exclude(NameRegexFilter::new("b").unwrap())
            .exclude(FlagsFilter::new([AdapterFlags::DoNotExport]));

        assert_eq!(chain.include_count(), 1);
        assert_eq!(chain.exclude_count(), 2);
        assert!(!chain.is_empty());
    }

    #[test]
    fn apply_preserves_order_of_shared_records() {
        let chain = FilterChain::new().exclude(FlagsFilter::new([AdapterFlags::DoNotExport]));
        let records = vec![
            Arc::new(loopback_record()),
            Arc::new(firewire_record()),
            Arc::new(ethernet_record()),
        ];

        let kept = chain.apply(records);

        let names: Vec<&str> = kept.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["\\Device\\NPF_Loopback", "\\Device\\NPF_{6A9F2C1E-0001}"]
        );
    }

    #[test]
    fn debug_shows_counts() {
        let chain = FilterChain::new().include(FlagsFilter::new([AdapterFlags::Normal]));
        let debug = format!("{chain:?}");
        assert!(debug.contains("include_count: 1"));
        assert!(debug.contains("exclude_count: 0"));
    }
}
