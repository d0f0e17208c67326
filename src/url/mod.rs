//! URL handling module
//!
//! This module knows the shape of the forum's URLs: which pages are thread or
//! board listings, where a post ID lives, and which links may enter the
//! frontier.

mod forum;

pub use forum::{frontier_key, is_thread_page, ForumUrls, LinkRejection};
