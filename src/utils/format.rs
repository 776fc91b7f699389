//! Display helpers for addresses, timestamps and proposal status badges.

use chrono::{DateTime, Utc};

use crate::core::constants::ADDRESS_TRUNCATE_MIN_LEN;
use crate::types::{Language, ProposalStatus};

/// Truncate an address to `first6...last4`; short addresses are returned as is.
pub fn format_address(address: &str) -> String {
    if address.chars().count() < ADDRESS_TRUNCATE_MIN_LEN {
        return address.to_string();
    }
    let head: String = address.chars().take(6).collect();
    let tail: String = address
        .chars()
        .rev()
        .take(4)
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();
    format!("{}...{}", head, tail)
}

/// Format a millisecond timestamp as `15 Sep 2025, 10:00` (UTC)
pub fn format_timestamp(timestamp_ms: i64) -> String {
    match DateTime::<Utc>::from_timestamp_millis(timestamp_ms) {
        Some(dt) => format_datetime(&dt),
        None => "-".to_string(),
    }
}

pub fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.format("%d %b %Y, %H:%M").to_string()
}

/// Short date used on proposal cards, e.g. `15/09/2025`
pub fn format_date(timestamp_ms: i64) -> String {
    match DateTime::<Utc>::from_timestamp_millis(timestamp_ms) {
        Some(dt) => dt.format("%d/%m/%Y").to_string(),
        None => "-".to_string(),
    }
}

/// Human readable status label in the selected language
pub fn format_proposal_status(status: ProposalStatus, language: Language) -> &'static str {
    match (language, status) {
        (Language::Es, ProposalStatus::Active) => "En Votación",
        (Language::Es, ProposalStatus::Executed) => "Ejecutada",
        (Language::Es, ProposalStatus::Rejected) => "Rechazada",
        (Language::Es, ProposalStatus::Draft) => "Borrador",
        (Language::En, ProposalStatus::Active) => "Voting",
        (Language::En, ProposalStatus::Executed) => "Executed",
        (Language::En, ProposalStatus::Rejected) => "Rejected",
        (Language::En, ProposalStatus::Draft) => "Draft",
    }
}

/// Badge color for a status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusColor {
    Blue,
    Green,
    Red,
    Gray,
}

pub fn proposal_status_color(status: ProposalStatus) -> StatusColor {
    match status {
        ProposalStatus::Active => StatusColor::Blue,
        ProposalStatus::Executed => StatusColor::Green,
        ProposalStatus::Rejected => StatusColor::Red,
        ProposalStatus::Draft => StatusColor::Gray,
    }
}

/// Percentage with one decimal, as shown under the support bar
pub fn format_percentage(value: f64) -> String {
    format!("{:.1}%", value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_address() {
        assert_eq!(
            format_address("0x1234567890abcdef1234567890abcdef12345678"),
            "0x1234...5678"
        );
        assert_eq!(format_address("0xproposer1"), "0xproposer1");
        assert_eq!(format_address("0x1234567890"), "0x1234...7890");
    }

    #[test]
    fn test_format_timestamp() {
        // 2025-09-01T10:00:00Z
        assert_eq!(format_timestamp(1_756_720_800_000), "01 Sep 2025, 10:00");
        assert_eq!(format_date(1_756_720_800_000), "01/09/2025");
    }

    #[test]
    fn test_status_labels_and_colors() {
        assert_eq!(
            format_proposal_status(ProposalStatus::Active, Language::Es),
            "En Votación"
        );
        assert_eq!(
            format_proposal_status(ProposalStatus::Draft, Language::En),
            "Draft"
        );
        assert_eq!(
            proposal_status_color(ProposalStatus::Executed),
            StatusColor::Green
        );
        assert_eq!(
            proposal_status_color(ProposalStatus::Rejected),
            StatusColor::Red
        );
    }

    #[test]
    fn test_format_percentage() {
        assert_eq!(format_percentage(87.150837), "87.2%");
        assert_eq!(format_percentage(0.0), "0.0%");
    }
}
