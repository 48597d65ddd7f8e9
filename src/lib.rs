//! The library code for `pagegen`, the page-creation step of a static blog
//! build. A build runs in three steps:
//!
//! 1. Querying a content source for posts ([`crate::source`])
//! 2. Deriving page requests from the posts ([`crate::derive`])
//! 3. Handing each request to a page sink ([`crate::sink`])
//!
//! The second step is the only one with real logic. Every post with a path
//! gets a post page, every distinct tag gets a tag page at a kebab-case URL
//! ([`crate::tag`]), and the full, ordered post list is split into
//! fixed-size windows that become the article listing pages
//! ([`crate::paginate`]). [`build::build_pages`] ties the steps together.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]

pub mod build;
pub mod config;
pub mod derive;
pub mod logging;
pub mod page;
pub mod paginate;
pub mod post;
pub mod sink;
pub mod source;
pub mod tag;
