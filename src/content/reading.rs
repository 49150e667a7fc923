//! Post body assembly and reading time estimate

use serde::Serialize;

use super::richtext;
use super::PostDetail;

/// Assumed reading speed
pub const DEFAULT_WORDS_PER_MINUTE: u32 = 150;

/// A content block ready for the template
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderedBlock {
    pub heading: String,
    pub body: String,
    pub words: usize,
}

/// Rendered body of a post with its reading estimate
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssembledPost {
    pub blocks: Vec<RenderedBlock>,
    pub total_words: usize,
    pub reading_minutes: u64,
}

/// Count words by splitting on single spaces.
///
/// Runs of spaces produce empty tokens and those are counted:
/// `"one two  three"` is 4 words and `""` is 1.
pub fn split_words(text: &str) -> usize {
    text.split(' ').count()
}

/// `floor(round(words / wpm))`
pub fn reading_minutes(total_words: usize, words_per_minute: u32) -> u64 {
    if words_per_minute == 0 {
        return 0;
    }
    let minutes = (total_words as f64 / words_per_minute as f64).round();
    minutes.floor() as u64
}

/// Render every block and estimate reading time over all of them
pub fn assemble(post: &PostDetail, words_per_minute: u32) -> AssembledPost {
    let blocks: Vec<RenderedBlock> = post
        .content
        .iter()
        .map(|block| {
            let words = split_words(&richtext::as_text(&block.body)) + split_words(&block.heading);
            RenderedBlock {
                heading: block.heading.clone(),
                body: richtext::as_html(&block.body),
                words,
            }
        })
        .collect();

    let total_words = blocks.iter().map(|b| b.words).sum();

    AssembledPost {
        reading_minutes: reading_minutes(total_words, words_per_minute),
        total_words,
        blocks,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::richtext::RichTextNode;
    use crate::content::{Banner, ContentBlock};

    fn post_with(blocks: Vec<ContentBlock>) -> PostDetail {
        PostDetail {
            uid: "post".to_string(),
            first_publication_date: None,
            last_publication_date: None,
            title: "Post".to_string(),
            author: "Author".to_string(),
            banner: Banner::default(),
            content: blocks,
            previous_post: None,
            next_post: None,
        }
    }

    fn block(heading: &str, paragraphs: &[&str]) -> ContentBlock {
        ContentBlock {
            heading: heading.to_string(),
            body: paragraphs.iter().map(|p| RichTextNode::paragraph(p)).collect(),
        }
    }

    fn words(n: usize) -> String {
        vec!["word"; n].join(" ")
    }

    #[test]
    fn test_split_words_counts_empty_tokens() {
        assert_eq!(split_words("one two three"), 3);
        assert_eq!(split_words("one two  three"), 4);
        assert_eq!(split_words(""), 1);
        assert_eq!(split_words("tab\tseparated"), 1);
    }

    #[test]
    fn test_reading_minutes() {
        assert_eq!(reading_minutes(150, 150), 1);
        assert_eq!(reading_minutes(74, 150), 0);
        assert_eq!(reading_minutes(75, 150), 1);
        assert_eq!(reading_minutes(225, 150), 2);
        assert_eq!(reading_minutes(0, 150), 0);
        assert_eq!(reading_minutes(1000, 0), 0);
    }

    #[test]
    fn test_block_words_include_heading() {
        let post = post_with(vec![block("Two words", &["one two three"])]);
        let assembled = assemble(&post, DEFAULT_WORDS_PER_MINUTE);
        assert_eq!(assembled.blocks[0].words, 5);
        assert_eq!(assembled.blocks[0].body, "<p>one two three</p>");
        assert_eq!(assembled.total_words, 5);
    }

    #[test]
    fn test_total_sums_every_block() {
        // heading (1 word) + body for each block
        let post = post_with(vec![
            block("A", &[words(99).as_str()]),
            block("B", &[words(99).as_str()]),
            block("C", &[words(99).as_str()]),
        ]);
        let assembled = assemble(&post, DEFAULT_WORDS_PER_MINUTE);
        assert_eq!(assembled.total_words, 300);
        assert_eq!(assembled.reading_minutes, 2);
    }

    #[test]
    fn test_single_block_is_its_own_total() {
        let post = post_with(vec![block("Heading", &[words(149).as_str()])]);
        let assembled = assemble(&post, DEFAULT_WORDS_PER_MINUTE);
        assert_eq!(assembled.total_words, 150);
        assert_eq!(assembled.reading_minutes, 1);
    }

    #[test]
    fn test_empty_post() {
        let assembled = assemble(&post_with(Vec::new()), DEFAULT_WORDS_PER_MINUTE);
        assert!(assembled.blocks.is_empty());
        assert_eq!(assembled.reading_minutes, 0);
    }

    #[test]
    fn test_paragraphs_are_joined_before_counting() {
        // "a b" + " " + "c" -> "a b c"
        let post = post_with(vec![block("H", &["a b", "c"])]);
        assert_eq!(assemble(&post, DEFAULT_WORDS_PER_MINUTE).blocks[0].words, 4);
    }
}
