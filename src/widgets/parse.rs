use std::collections::BTreeMap;

use thiserror::Error;

/// Errors from widget code snippets. Widgets never surface these as
/// failures; they fall back to their documented defaults and keep rendering.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("empty value")]
    Empty,
    #[error("invalid duration {0:?}")]
    InvalidDuration(String),
    #[error("invalid time {0:?}, expected HH:MM")]
    InvalidTime(String),
}

/// Parses `key: value` lines. Lines without a colon are skipped; only the
/// first colon splits, so values may contain colons.
pub fn key_values(code: &str) -> BTreeMap<String, String> {
    let mut map = BTreeMap::new();
    for line in code.lines() {
        let line = line.trim();
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let (key, value) = (key.trim(), value.trim());
        if !key.is_empty() && !value.is_empty() {
            map.insert(key.to_string(), value.to_string());
        }
    }
    map
}

/// Parses `- item` / `* item` list lines, skipping everything else.
pub fn list_items(code: &str) -> Vec<String> {
    code.lines()
        .filter_map(|line| {
            let line = line.trim();
            let rest = line.strip_prefix("- ").or_else(|| line.strip_prefix("* "))?;
            let rest = rest.trim();
            (!rest.is_empty()).then(|| rest.to_string())
        })
        .collect()
}

/// Parses pipe-delimited rows, one per non-blank line. Cells are trimmed and
/// missing cells come back as empty strings, so `a||c` has three cells.
pub fn pipe_rows(code: &str) -> Vec<Vec<String>> {
    code.lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.split('|').map(|cell| cell.trim().to_string()).collect())
        .collect()
}

/// Parses a colon-separated duration into seconds: `"90"` is 90 s, `"5:00"`
/// is 300 s, `"1:00:00"` is 3600 s. The full-width colon is accepted too.
pub fn duration_seconds(code: &str) -> Result<u64, ParseError> {
    let code = code.trim();
    if code.is_empty() {
        return Err(ParseError::Empty);
    }
    let mut total: u64 = 0;
    for part in code.split([':', '：']) {
        let value: u64 = part
            .trim()
            .parse()
            .map_err(|_| ParseError::InvalidDuration(code.to_string()))?;
        total = total * 60 + value;
    }
    Ok(total)
}

/// Parses `HH:MM` into (hour, minute). Hours up to 23, minutes up to 59;
/// single-digit hours are fine.
pub fn time_of_day(s: &str) -> Result<(u32, u32), ParseError> {
    let err = || ParseError::InvalidTime(s.to_string());
    let (h, m) = s.trim().split_once(':').ok_or_else(err)?;
    let hour: u32 = h.trim().parse().map_err(|_| err())?;
    let minute: u32 = m.trim().parse().map_err(|_| err())?;
    if hour > 23 || minute > 59 {
        return Err(err());
    }
    Ok((hour, minute))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_values_basic() {
        let map = key_values("name: Launch\ndate: 2026-01-01\n\nnot a pair\n");
        assert_eq!(map.get("name").map(String::as_str), Some("Launch"));
        assert_eq!(map.get("date").map(String::as_str), Some("2026-01-01"));
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn test_key_values_value_may_contain_colon() {
        let map = key_values("start: 09:00");
        assert_eq!(map.get("start").map(String::as_str), Some("09:00"));
    }

    #[test]
    fn test_list_items() {
        let items = list_items("- one\n* two\nplain line\n-nospace\n-  three  ");
        assert_eq!(items, vec!["one", "two", "three"]);
    }

    #[test]
    fn test_pipe_rows() {
        let rows = pipe_rows("Mail | @ | https://mail.example.com\nInbox||inbox.md\n");
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0], vec!["Mail", "@", "https://mail.example.com"]);
        assert_eq!(rows[1], vec!["Inbox", "", "inbox.md"]);
    }

    #[test]
    fn test_duration_seconds() {
        assert_eq!(duration_seconds("90"), Ok(90));
        assert_eq!(duration_seconds("5:00"), Ok(300));
        assert_eq!(duration_seconds("1:00:00"), Ok(3600));
        assert_eq!(duration_seconds(" 2：30 "), Ok(150));
    }

    #[test]
    fn test_duration_seconds_invalid() {
        assert_eq!(duration_seconds(""), Err(ParseError::Empty));
        assert!(matches!(
            duration_seconds("five minutes"),
            Err(ParseError::InvalidDuration(_))
        ));
    }

    #[test]
    fn test_time_of_day() {
        assert_eq!(time_of_day("09:30"), Ok((9, 30)));
        assert_eq!(time_of_day("9:05"), Ok((9, 5)));
        assert_eq!(time_of_day("23:59"), Ok((23, 59)));
    }

    #[test]
    fn test_time_of_day_invalid() {
        assert!(time_of_day("24:00").is_err());
        assert!(time_of_day("09:60").is_err());
        assert!(time_of_day("0900").is_err());
    }
}
