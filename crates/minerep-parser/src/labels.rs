//! Month label parsing for date column headers.
//!
//! Input sheets label their month columns with Spanish abbreviations
//! ("ene-20", "dic-2021"). English abbreviations and full Spanish month
//! names also appear in older files, so both are accepted. Anything that
//! does not resolve to a real month is reported as `None` at this boundary;
//! callers drop such columns instead of carrying a placeholder date
//! downstream.

use chrono::NaiveDate;

/// Month token table: Spanish abbreviations first, then full Spanish names
/// and English abbreviations as fallbacks.
const MONTH_TOKENS: &[(&str, u32)] = &[
    ("ene", 1),
    ("enero", 1),
    ("jan", 1),
    ("feb", 2),
    ("febrero", 2),
    ("mar", 3),
    ("marzo", 3),
    ("abr", 4),
    ("abril", 4),
    ("apr", 4),
    ("may", 5),
    ("mayo", 5),
    ("jun", 6),
    ("junio", 6),
    ("jul", 7),
    ("julio", 7),
    ("ago", 8),
    ("agosto", 8),
    ("aug", 8),
    ("sep", 9),
    ("sept", 9),
    ("septiembre", 9),
    ("oct", 10),
    ("octubre", 10),
    ("nov", 11),
    ("noviembre", 11),
    ("dic", 12),
    ("diciembre", 12),
    ("dec", 12),
];

/// Parse a raw column header of shape "mon-YY" or "mon-YYYY" into the first
/// day of that month.
///
/// Returns `None` for any header that is not a month label. Never panics.
pub fn parse_month_label(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    let (month_token, year_token) = trimmed.split_once('-')?;

    let month = month_number(month_token.trim())?;
    let year = year_number(year_token.trim())?;

    NaiveDate::from_ymd_opt(year, month, 1)
}

fn month_number(token: &str) -> Option<u32> {
    let lower = token.to_lowercase();
    MONTH_TOKENS
        .iter()
        .find(|(name, _)| *name == lower)
        .map(|(_, month)| *month)
}

/// Interpret a 2-digit year as 2000+N and a 4-digit year as-is.
fn year_number(token: &str) -> Option<i32> {
    if !token.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    match token.len() {
        2 => token.parse::<i32>().ok().map(|y| 2000 + y),
        4 => token.parse::<i32>().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn month_of(label: &str) -> Option<(i32, u32)> {
        use chrono::Datelike;
        parse_month_label(label).map(|d| (d.year(), d.month()))
    }

    #[test]
    fn spanish_abbreviations_resolve() {
        assert_eq!(month_of("ene-20"), Some((2020, 1)));
        assert_eq!(month_of("abr-21"), Some((2021, 4)));
        assert_eq!(month_of("ago-19"), Some((2019, 8)));
        assert_eq!(month_of("dic-22"), Some((2022, 12)));
    }

    #[test]
    fn all_twelve_spanish_abbreviations() {
        let abbrevs = [
            "ene", "feb", "mar", "abr", "may", "jun", "jul", "ago", "sep", "oct", "nov", "dic",
        ];
        for (i, abbrev) in abbrevs.iter().enumerate() {
            let label = format!("{abbrev}-20");
            assert_eq!(month_of(&label), Some((2020, i as u32 + 1)), "{label}");
        }
    }

    #[test]
    fn english_fallback_resolves() {
        assert_eq!(month_of("jan-20"), Some((2020, 1)));
        assert_eq!(month_of("aug-20"), Some((2020, 8)));
        assert_eq!(month_of("dec-20"), Some((2020, 12)));
    }

    #[test]
    fn full_spanish_names_resolve() {
        assert_eq!(month_of("enero-2020"), Some((2020, 1)));
        assert_eq!(month_of("septiembre-21"), Some((2021, 9)));
        assert_eq!(month_of("sept-21"), Some((2021, 9)));
    }

    #[test]
    fn case_and_whitespace_are_tolerated() {
        assert_eq!(month_of("ENE-20"), Some((2020, 1)));
        assert_eq!(month_of("  Feb-21 "), Some((2021, 2)));
    }

    #[test]
    fn four_digit_years() {
        assert_eq!(month_of("ene-2020"), Some((2020, 1)));
        assert_eq!(month_of("dic-1999"), Some((1999, 12)));
    }

    #[test]
    fn non_dates_are_rejected() {
        assert_eq!(parse_month_label("xyz-99"), None);
        assert_eq!(parse_month_label("Metric"), None);
        assert_eq!(parse_month_label(""), None);
        assert_eq!(parse_month_label("-"), None);
        assert_eq!(parse_month_label("ene"), None);
        assert_eq!(parse_month_label("ene-"), None);
        assert_eq!(parse_month_label("ene-abc"), None);
        assert_eq!(parse_month_label("ene-123"), None);
        assert_eq!(parse_month_label("ene-20000"), None);
        assert_eq!(parse_month_label("13-20"), None);
    }

    #[test]
    fn extra_separator_goes_to_year_token() {
        // "ene-20-x" splits into ("ene", "20-x"); the year token is invalid
        assert_eq!(parse_month_label("ene-20-x"), None);
    }
}
