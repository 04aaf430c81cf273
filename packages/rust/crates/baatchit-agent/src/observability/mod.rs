//! Observability namespace: stable structured event ids for tracing.

mod session_events;

pub use session_events::SessionEvent;

/// Last six characters of a session id, for human-facing log summaries.
pub fn short_session_id(session_id: &str) -> &str {
    let start = session_id
        .char_indices()
        .rev()
        .nth(5)
        .map_or(0, |(index, _)| index);
    &session_id[start..]
}

#[cfg(test)]
mod tests {
    use super::short_session_id;

    #[test]
    fn short_session_id_keeps_last_six_chars() {
        assert_eq!(short_session_id("session_abc_1700000123456"), "123456");
        assert_eq!(short_session_id("abc"), "abc");
        assert_eq!(short_session_id(""), "");
    }
}
