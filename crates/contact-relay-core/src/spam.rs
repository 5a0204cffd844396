//! Spam heuristics for the intake pipeline.
//!
//! Deliberately crude: a fixed denylist substring match plus a cap on link
//! count. Anything fancier belongs behind the dispatcher, not here.

use crate::error::{Error, Result};

/// Terms whose presence anywhere in message+name rejects the submission.
const SPAM_TERMS: &[&str] = &[
    "viagra",
    "casino",
    "lottery",
    "winner",
    "congratulations",
    "claim now",
];

/// More than this many literal `http` occurrences in the message is treated
/// as link spam.
const MAX_HTTP_OCCURRENCES: usize = 3;

/// Screen a submission's free-text content. `Ok(())` means clean.
pub fn screen(message: &str, name: &str) -> Result<()> {
    let haystack = format!("{message} {name}").to_lowercase();
    for term in SPAM_TERMS {
        if haystack.contains(term) {
            return Err(Error::SpamRejected(format!("denylisted term: {term}")));
        }
    }

    if count_occurrences(message, "http") > MAX_HTTP_OCCURRENCES {
        return Err(Error::SpamRejected("too many links in message".to_string()));
    }

    Ok(())
}

/// Non-overlapping occurrence count of `needle` in `haystack`.
fn count_occurrences(haystack: &str, needle: &str) -> usize {
    if needle.is_empty() {
        return 0;
    }
    let mut count = 0;
    let mut rest = haystack;
    while let Some(idx) = rest.find(needle) {
        count += 1;
        rest = &rest[idx + needle.len()..];
    }
    count
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_messages_pass() {
        assert!(screen("Please build me a website", "Jane Doe").is_ok());
    }

    #[test]
    fn denylisted_terms_reject_case_insensitively() {
        assert!(screen("CLAIM NOW before it is gone", "Jane").is_err());
        assert!(screen("regular text", "Casino Royale").is_err());
    }

    #[test]
    fn name_is_screened_together_with_message() {
        let err = screen("hello", "lottery winner").unwrap_err();
        assert_eq!(err.error_type(), "SPAM_REJECTED");
    }

    #[test]
    fn three_links_pass_four_reject() {
        let three = "see http://a.de http://b.de http://c.de";
        assert!(screen(three, "Jane").is_ok());
        let four = "see http://a.de http://b.de http://c.de http://d.de";
        let err = screen(four, "Jane").unwrap_err();
        assert_eq!(err.http_status(), 403);
    }

    #[test]
    fn https_counts_toward_the_link_cap() {
        // `https` contains `http`, matching the literal substring rule.
        let msg = "https://a https://b https://c https://d";
        assert!(screen(msg, "Jane").is_err());
    }

    #[test]
    fn occurrence_counting_is_non_overlapping() {
        assert_eq!(count_occurrences("aaaa", "aa"), 2);
        assert_eq!(count_occurrences("abc", ""), 0);
        assert_eq!(count_occurrences("", "x"), 0);
    }
}
