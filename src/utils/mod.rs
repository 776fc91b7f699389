pub mod balance;
pub mod format;

pub use balance::{format_count, format_mist_as_sui, format_sui, parse_sui_amount, Mist};
pub use format::{
    format_address, format_date, format_datetime, format_percentage, format_proposal_status,
    format_timestamp, proposal_status_color, StatusColor,
};

/// Current wall-clock time in milliseconds since the Unix epoch
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Fresh object-style identifier (`0x` + 32 hex chars)
pub fn new_object_id() -> String {
    format!("0x{}", uuid::Uuid::new_v4().simple())
}
