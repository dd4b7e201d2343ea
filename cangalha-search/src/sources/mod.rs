//! Snippet source implementations.
//!
//! Each module provides a struct implementing [`crate::source::SnippetSource`].

pub mod instant_answer;
pub mod news_feed;

pub use instant_answer::InstantAnswerSource;
pub use news_feed::NewsFeedSource;
