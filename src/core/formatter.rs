use crate::core::models::entry::Metadata;

/// "$1.23"; sub-cent amounts keep four decimals ("$0.0030") so free-tier and
/// per-image prices stay visible.
pub fn format_usd(cost: f64) -> String {
    if cost > 0.0 && cost < 0.01 {
        format!("${:.4}", cost)
    } else {
        format!("${:.2}", cost)
    }
}

/// "1 call", "12 calls".
pub fn format_calls(count: u64) -> String {
    if count == 1 {
        "1 call".to_string()
    } else {
        format!("{} calls", count)
    }
}

/// Compact `key=value` rendering of entry metadata. Strings are unquoted.
pub fn format_metadata(metadata: &Metadata) -> String {
    metadata
        .iter()
        .map(|(k, v)| match v {
            serde_json::Value::String(s) => format!("{}={}", k, s),
            other => format!("{}={}", k, other),
        })
        .collect::<Vec<_>>()
        .join(", ")
}
