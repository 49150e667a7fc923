//! Content module - post models, rich text and reading time

mod post;
pub mod reading;
pub mod richtext;

pub use post::{post_path, Banner, ContentBlock, NavPost, PostDetail, PostPage, PostSummary};
pub use reading::{assemble, AssembledPost, RenderedBlock, DEFAULT_WORDS_PER_MINUTE};
pub use richtext::RichTextNode;
