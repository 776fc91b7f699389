//! Display formatting shared by the CLI and SDK users

use sui_dao_rs::utils::{
    format_address, format_count, format_percentage, format_proposal_status, format_sui,
    format_timestamp, parse_sui_amount, proposal_status_color, StatusColor,
};
use sui_dao_rs::{Language, Mist, ProposalStatus};

#[test]
fn test_treasury_and_amount_display() {
    assert_eq!(format_sui("125000000000000"), "125,000");
    assert_eq!(format_sui("50000000000000"), "50,000");
    assert_eq!(format_sui("1500000000"), "1.5");
    assert_eq!(format_sui("1234567890"), "1.23");
    assert_eq!(format_sui("0"), "0");
}

#[test]
fn test_sui_input_round_trips_to_display() {
    let mist = parse_sui_amount("75,000").unwrap();
    assert_eq!(mist, Mist(75_000_000_000_000));
    assert_eq!(format_sui(&mist.to_base_units()), "75,000");

    assert!(parse_sui_amount("-1").is_none());
    assert!(parse_sui_amount("0.0000000001").is_none());
}

#[test]
fn test_address_truncation() {
    assert_eq!(
        format_address("0x1234567890abcdef1234567890abcdef12345678"),
        "0x1234...5678"
    );
    assert_eq!(format_address("0xuser1"), "0xuser1");
    assert_eq!(format_address(""), "");
}

#[test]
fn test_counts_and_percentages() {
    assert_eq!(format_count(156_000), "156,000");
    assert_eq!(format_count(999), "999");
    assert_eq!(format_percentage(87.150837), "87.2%");
}

#[test]
fn test_status_labels_in_both_languages() {
    for status in ProposalStatus::ALL {
        assert_ne!(
            format_proposal_status(status, Language::Es),
            format_proposal_status(status, Language::En)
        );
    }
    assert_eq!(format_proposal_status(ProposalStatus::Rejected, Language::Es), "Rechazada");
    assert_eq!(proposal_status_color(ProposalStatus::Active), StatusColor::Blue);
    assert_eq!(proposal_status_color(ProposalStatus::Draft), StatusColor::Gray);
}

#[test]
fn test_timestamp_format() {
    // 2025-09-15T10:00:00Z
    assert_eq!(format_timestamp(1_757_930_400_000), "15 Sep 2025, 10:00");
}
