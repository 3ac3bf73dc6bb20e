//! Date-time patterns in the familiar letter notation (`MM/dd/uuuu HH:mm:ss`).
//!
//! A pattern is compiled once into a `strftime` format string and the set of components it
//! captures. Compiled patterns are immutable and can format or parse from any number of
//! threads at once.
//!
//! | Letters | Component |
//! |---------|-----------|
//! | `u`, `y` | year (`uu`/`yy`: two digits) |
//! | `M` | month (`M`, `MM`: number, `MMM`: short name, `MMMM`: full name) |
//! | `d` | day of month |
//! | `E` | weekday name (`E`-`EEE`: short, `EEEE`: full) |
//! | `H` | hour of day (0-23) |
//! | `h` | hour of half-day (1-12), requires `a` |
//! | `a` | AM/PM marker |
//! | `m` | minute |
//! | `s` | second |
//! | `S` | fraction of second (`SSS`, `SSSSSS` or `SSSSSSSSS`) |
//! | `n` | nano of second, zero padded (`nnnnnnnnn`) |
//!
//! Text between single quotes is literal and `''` is a single quote. Any character other
//! than an ASCII letter is literal too.

use super::format::FieldDefaults;
use crate::Error;
use chrono::{
    format::{self, Item, ParseResult, Parsed, StrftimeItems},
    Datelike, NaiveDateTime, Timelike,
};
use std::fmt::{self, Write};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
struct Captures {
    year: bool,
    month: bool,
    day: bool,
    hour: bool,
    minute: bool,
    second: bool,
    nano: bool,
}

/// A compiled date-time pattern.
#[derive(Clone, Debug)]
pub struct Pattern {
    source: String,
    strftime: String,
    captures: Captures,
}

fn invalid(pattern: &str, reason: impl Into<String>) -> Error {
    Error::InvalidPattern {
        pattern: pattern.to_string(),
        reason: reason.into(),
    }
}

fn push_literal(out: &mut String, c: char) {
    if c == '%' {
        out.push_str("%%");
    } else {
        out.push(c);
    }
}

impl Pattern {
    /// Compiles `pattern`.
    pub fn new(pattern: &str) -> Result<Self, Error> {
        let chars: Vec<char> = pattern.chars().collect();
        let mut strftime = String::new();
        let mut captures = Captures::default();
        let (mut half_day, mut meridiem) = (false, false);

        let mut i = 0;
        while i < chars.len() {
            let c = chars[i];

            // Quoted literal
            if c == '\'' {
                i += 1;
                if chars.get(i) == Some(&'\'') {
                    strftime.push('\'');
                    i += 1;
                    continue;
                }
                loop {
                    match chars.get(i) {
                        None => return Err(invalid(pattern, "unterminated quote")),
                        Some('\'') if chars.get(i + 1) == Some(&'\'') => {
                            strftime.push('\'');
                            i += 2;
                        }
                        Some('\'') => {
                            i += 1;
                            break;
                        }
                        Some(&c) => {
                            push_literal(&mut strftime, c);
                            i += 1;
                        }
                    }
                }
                continue;
            }
            if !c.is_ascii_alphabetic() {
                push_literal(&mut strftime, c);
                i += 1;
                continue;
            }

            let count = chars[i..].iter().take_while(|&&next| next == c).count();
            i += count;
            let spec = match (c, count) {
                ('u' | 'y', 2) => "%y",
                ('u' | 'y', _) => "%Y",
                ('M', 1) => "%-m",
                ('M', 2) => "%m",
                ('M', 3) => "%b",
                ('M', 4) => "%B",
                ('d', 1) => "%-d",
                ('d', 2) => "%d",
                ('E', 1..=3) => "%a",
                ('E', 4) => "%A",
                ('H', 1) => "%-H",
                ('H', 2) => "%H",
                ('h', 1) => "%-I",
                ('h', 2) => "%I",
                ('a', 1) => "%p",
                ('m', 1) => "%-M",
                ('m', 2) => "%M",
                ('s', 1) => "%-S",
                ('s', 2) => "%S",
                ('S', 3) => "%3f",
                ('S', 6) => "%6f",
                ('S', 9) | ('n', 9) => "%9f",
                _ => {
                    let field: String = std::iter::repeat(c).take(count).collect();
                    return Err(invalid(pattern, format!("unsupported field {field:?}")));
                }
            };
            strftime.push_str(spec);
            match c {
                'u' | 'y' => captures.year = true,
                'M' => captures.month = true,
                'd' => captures.day = true,
                'H' => captures.hour = true,
                'h' => {
                    captures.hour = true;
                    half_day = true;
                }
                'a' => meridiem = true,
                'm' => captures.minute = true,
                's' => captures.second = true,
                'S' | 'n' => captures.nano = true,
                _ => {}
            }
        }

        if half_day && !meridiem {
            return Err(invalid(pattern, "hour of half-day requires an AM/PM marker"));
        }
        if StrftimeItems::new(&strftime).any(|item| matches!(item, Item::Error)) {
            return Err(invalid(pattern, "not a valid format"));
        }
        Ok(Self {
            source: pattern.to_string(),
            strftime,
            captures,
        })
    }

    /// The pattern as written.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    fn items(&self) -> StrftimeItems<'_> {
        StrftimeItems::new(&self.strftime)
    }

    /// Renders `datetime`.
    pub fn format(&self, datetime: &NaiveDateTime) -> Result<String, fmt::Error> {
        let mut out = String::new();
        write!(out, "{}", datetime.format_with_items(self.items()))?;
        Ok(out)
    }

    /// Parses `text`, taking every component the pattern does not capture from `defaults`.
    pub fn parse(&self, text: &str, defaults: &FieldDefaults) -> ParseResult<NaiveDateTime> {
        let mut parsed = Parsed::new();
        format::parse(&mut parsed, text, self.items())?;

        let (date, time) = (defaults.date, defaults.time);
        if !self.captures.year {
            parsed.set_year(i64::from(date.year()))?;
        }
        if !self.captures.month {
            parsed.set_month(i64::from(date.month()))?;
        }
        if !self.captures.day {
            parsed.set_day(i64::from(date.day()))?;
        }
        if !self.captures.hour {
            parsed.set_hour(i64::from(time.hour()))?;
        }
        if !self.captures.minute {
            parsed.set_minute(i64::from(time.minute()))?;
        }
        if !self.captures.second {
            parsed.set_second(i64::from(time.second()))?;
        }
        if !self.captures.nano {
            parsed.set_nanosecond(i64::from(time.nanosecond()))?;
        }
        parsed.to_naive_datetime_with_offset(0)
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}
