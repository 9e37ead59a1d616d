//! Persisted partial date tokens.
//!
//! Tokens look like `1987-04-??`: a 4-digit year, 2-digit month and 2-digit
//! day, each replaced by `?` placeholders when unknown. The empty string
//! stands for "no date".

use crate::model::date::PartialDate;
use once_cell::sync::Lazy;
use regex::Regex;

static DATE_TOKEN_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([0-9]{4}|\?{4})-([0-9]{2}|\?{2})-([0-9]{2}|\?{2})$")
        .expect("valid date token regex")
});

/// Parses an optional date token.
///
/// Returns `Ok(None)` for the empty string and `Err` with a short reason for
/// anything that is not a valid token.
pub(crate) fn parse_date_token(token: &str) -> Result<Option<PartialDate>, String> {
    if token.is_empty() {
        return Ok(None);
    }
    let captures = DATE_TOKEN_RE
        .captures(token)
        .ok_or_else(|| format!("malformed date token `{token}`"))?;

    let year = parse_component::<i32>(token, &captures[1])?;
    let month = parse_component::<u32>(token, &captures[2])?;
    let day = parse_component::<u32>(token, &captures[3])?;
    PartialDate::new(year, month, day)
        .map(Some)
        .map_err(|err| format!("date token `{token}`: {err}"))
}

/// Formats an optional date as a token; `None` becomes the empty string.
pub(crate) fn format_date_token(date: Option<&PartialDate>) -> String {
    date.map(|date| date.to_string()).unwrap_or_default()
}

/// `?` placeholders are `Ok(None)`; digits that do not parse are an error.
fn parse_component<T: std::str::FromStr>(token: &str, raw: &str) -> Result<Option<T>, String> {
    if raw.starts_with('?') {
        return Ok(None);
    }
    raw.parse()
        .map(Some)
        .map_err(|_| format!("date token `{token}`: bad component `{raw}`"))
}

#[cfg(test)]
mod tests {
    use super::{format_date_token, parse_date_token};
    use crate::model::date::PartialDate;

    #[test]
    fn parses_complete_and_partial_tokens() {
        assert_eq!(
            parse_date_token("1987-04-12").unwrap(),
            Some(PartialDate::ymd(1987, 4, 12).unwrap())
        );
        assert_eq!(
            parse_date_token("????-04-??").unwrap(),
            Some(PartialDate::new(None, Some(4), None).unwrap())
        );
        assert_eq!(parse_date_token("").unwrap(), None);
    }

    #[test]
    fn rejects_malformed_and_empty_tokens() {
        assert!(parse_date_token("1987-4-12").is_err());
        assert!(parse_date_token("1987-13-01").is_err());
        assert!(parse_date_token("????-??-??").is_err());
        assert!(parse_date_token("yesterday").is_err());
        assert!(parse_date_token("\u{661}\u{669}\u{668}\u{667}-04-12").is_err());
        assert!(parse_date_token("1987-\u{ff10}4-12").is_err());
    }

    #[test]
    fn format_round_trips() {
        let date = PartialDate::new(Some(1850), None, Some(3)).unwrap();
        let token = format_date_token(Some(&date));
        assert_eq!(token, "1850-??-03");
        assert_eq!(parse_date_token(&token).unwrap(), Some(date));
        assert_eq!(format_date_token(None), "");
    }
}
