//! Date helper functions

use chrono::{DateTime, Datelike, TimeZone, Timelike, Utc};

use crate::i18n::I18n;

/// Format a date using date-fns style tokens
///
/// Supported tokens: `yyyy`, `yy`, `MMMM`, `MMM`, `MM`, `M`, `dd`, `d`,
/// `HH`, `H`, `hh`, `h`, `mm`, `ss`, `a`. Text between single quotes is
/// copied verbatim and `''` is a literal quote. Month names come from the
/// `date.months` / `date.months_short` translations.
///
/// # Examples
/// ```ignore
/// format_date(&date, "dd MMM yyyy", &i18n) // -> "15 mar 2021"
/// ```
pub fn format_date<Tz: TimeZone>(date: &DateTime<Tz>, format: &str, i18n: &I18n) -> String {
    let chars: Vec<char> = format.chars().collect();
    let mut out = String::with_capacity(format.len() + 8);
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];

        if c == '\'' {
            // '' is an escaped quote
            if chars.get(i + 1) == Some(&'\'') {
                out.push('\'');
                i += 2;
                continue;
            }
            i += 1;
            while i < chars.len() {
                if chars[i] == '\'' {
                    if chars.get(i + 1) == Some(&'\'') {
                        out.push('\'');
                        i += 2;
                        continue;
                    }
                    break;
                }
                out.push(chars[i]);
                i += 1;
            }
            i += 1;
            continue;
        }

        if c.is_ascii_alphabetic() {
            let run = chars[i..].iter().take_while(|&&x| x == c).count();
            out.push_str(&render_token(date, c, run, i18n));
            i += run;
            continue;
        }

        out.push(c);
        i += 1;
    }

    out
}

/// Format a UTC timestamp in the display timezone
pub fn format_in_tz(
    date: &DateTime<Utc>,
    tz: chrono_tz::Tz,
    format: &str,
    i18n: &I18n,
) -> String {
    format_date(&date.with_timezone(&tz), format, i18n)
}

/// Format a date in ISO 8601 / XML format
pub fn date_xml(date: &DateTime<Utc>) -> String {
    date.format("%Y-%m-%dT%H:%M:%S%.3f%:z").to_string()
}

fn render_token<Tz: TimeZone>(date: &DateTime<Tz>, token: char, len: usize, i18n: &I18n) -> String {
    match (token, len) {
        ('y', 2) => format!("{:02}", date.year() % 100),
        ('y', _) => format!("{:04}", date.year()),
        ('M', 1) => date.month().to_string(),
        ('M', 2) => format!("{:02}", date.month()),
        ('M', 3) => month_name(date.month0() as usize, "date.months_short", i18n),
        ('M', _) => month_name(date.month0() as usize, "date.months", i18n),
        ('d', 1) => date.day().to_string(),
        ('d', _) => format!("{:02}", date.day()),
        ('H', 1) => date.hour().to_string(),
        ('H', _) => format!("{:02}", date.hour()),
        ('h', 1) => date.hour12().1.to_string(),
        ('h', _) => format!("{:02}", date.hour12().1),
        ('m', _) => format!("{:02}", date.minute()),
        ('s', _) => format!("{:02}", date.second()),
        ('a', _) => (if date.hour12().0 { "PM" } else { "AM" }).to_string(),
        // Unknown tokens pass through untouched
        _ => std::iter::repeat(token).take(len).collect(),
    }
}

fn month_name(index: usize, key: &str, i18n: &I18n) -> String {
    const FALLBACK: [&str; 12] = [
        "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
    ];
    i18n.get_list(key)
        .into_iter()
        .nth(index)
        .unwrap_or_else(|| FALLBACK[index].to_string())
}
