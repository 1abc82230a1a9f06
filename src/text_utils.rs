use chrono::{DateTime, Utc};
use lazy_static::lazy_static;
use regex::Regex;
use unidecode::unidecode;

pub const EXCERPT_LENGTH: usize = 200;
const WORDS_PER_MINUTE: usize = 200;

lazy_static! {
    static ref WHITESPACE: Regex = Regex::new(r"\s+").unwrap();
    static ref NON_SLUG: Regex = Regex::new(r"[^a-z0-9]+").unwrap();
}

pub fn word_count(text: &str) -> usize {
    WHITESPACE
        .split(text.trim())
        .filter(|word| !word.is_empty())
        .count()
}

/// Minutes needed to read `text`, never less than one.
pub fn read_time_minutes(text: &str) -> usize {
    let words = word_count(text);
    words.div_ceil(WORDS_PER_MINUTE).max(1)
}

/// First 200 characters of the trimmed body, with an ellipsis when cut.
pub fn excerpt(body: &str) -> String {
    let body = body.trim();
    let mut chars = body.chars();
    let head: String = chars.by_ref().take(EXCERPT_LENGTH).collect();
    if chars.next().is_some() {
        format!("{}...", head)
    } else {
        head
    }
}

/// URL-friendly form of a title: "Héllo, World!" becomes "hello-world".
pub fn slugify(title: &str) -> String {
    let ascii = unidecode(title).to_lowercase();
    NON_SLUG.replace_all(&ascii, "-").trim_matches('-').to_string()
}

pub fn format_date_time(date_time: &DateTime<Utc>) -> (String, String) {
    let date = date_time.format("%Y-%m-%d").to_string();
    let time = date_time.format("%H:%M:%S").to_string();
    (date, time)
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn test_word_count() {
        assert_eq!(word_count(""), 0);
        assert_eq!(word_count("   "), 0);
        assert_eq!(word_count("one two\n\tthree   four"), 4);
    }

    #[test]
    fn test_read_time() {
        assert_eq!(read_time_minutes(""), 1);
        assert_eq!(read_time_minutes(&"word ".repeat(200)), 1);
        assert_eq!(read_time_minutes(&"word ".repeat(201)), 2);
    }

    #[test]
    fn test_excerpt() {
        assert_eq!(excerpt("  short body \n"), "short body");
        let long = "a".repeat(250);
        let cut = excerpt(&long);
        assert_eq!(cut.len(), 203);
        assert!(cut.ends_with("..."));
        assert_eq!(excerpt(&"b".repeat(200)), "b".repeat(200));
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Héllo, World!"), "hello-world");
        assert_eq!(slugify("  Rust & WebAssembly 101 "), "rust-webassembly-101");
        assert_eq!(slugify("!!!"), "");
    }

    #[test]
    fn test_format_date_time() {
        let date_time = Utc.with_ymd_and_hms(2017, 9, 10, 10, 42, 32).unwrap();
        let (date, time) = format_date_time(&date_time);
        assert_eq!(date, "2017-09-10");
        assert_eq!(time, "10:42:32");
    }
}
