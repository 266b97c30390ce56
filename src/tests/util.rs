// Unit tests for shared helpers

use crate::util::truncate;

#[test]
fn short_strings_pass_through() {
    assert_eq!(truncate("hello", 10), "hello");
    assert_eq!(truncate("hello", 5), "hello");
}

#[test]
fn long_strings_are_shortened_with_ellipsis() {
    assert_eq!(truncate("hello world", 8), "hello...");
    assert_eq!(truncate("hello world", 8).len(), 8);
}

#[test]
fn truncation_counts_characters_not_bytes() {
    // Multi-byte characters must not be split.
    let s = "héllö wörld";
    let out = truncate(s, 8);
    assert_eq!(out.chars().count(), 8);
    assert!(out.ends_with("..."));
}
