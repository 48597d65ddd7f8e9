//! Turns the posts returned by a content source into [`PageRequest`]s: one
//! page per post, one per distinct tag and a paginated article listing.

use crate::page::PageRequest;
use crate::paginate::paginate;
use crate::post::PostRecord;
use crate::sink::PageSink;
use crate::tag::unique_tags;
use std::num::NonZeroUsize;

/// The number of posts per listing page unless configured otherwise.
pub const DEFAULT_PAGE_SIZE: NonZeroUsize = match NonZeroUsize::new(20) {
    Some(size) => size,
    None => panic!("page size must be non-zero"),
};

/// Where derived pages are served and how the listing is paginated.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Settings {
    /// The path of the first listing page; later pages append `/{n}`.
    pub listing_prefix: String,

    /// The number of posts per listing page.
    pub page_size: NonZeroUsize,

    /// Tag pages are served at `{tag_prefix}/{slug}`.
    pub tag_prefix: String,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            listing_prefix: String::from("/articles"),
            page_size: DEFAULT_PAGE_SIZE,
            tag_prefix: String::from("/tags"),
        }
    }
}

/// The derived pages, grouped by kind.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Pages {
    pub posts: Vec<PageRequest>,
    pub tags: Vec<PageRequest>,
    pub listings: Vec<PageRequest>,

    /// The number of records skipped for lacking a path.
    pub skipped: usize,
}

impl Pages {
    /// Hands every page to `sink`: post pages, then tag pages, then listing
    /// pages.
    pub fn submit<S: PageSink + ?Sized>(self, sink: &mut S) {
        let pages =
            self.posts.into_iter().chain(self.tags).chain(self.listings);
        for page in pages {
            tracing::debug!(
                path = %page.path,
                template = %page.template,
                "creating page"
            );
            sink.create_page(page);
        }
    }

    pub fn len(&self) -> usize {
        self.posts.len() + self.tags.len() + self.listings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Derives every page for `posts`. `posts` is expected in listing order
/// (newest first); this function doesn't reorder or filter it beyond
/// skipping path-less records for post pages.
pub fn derive_pages(posts: &[PostRecord], settings: &Settings) -> Pages {
    let (posts_pages, skipped) = post_pages(posts);
    Pages {
        posts: posts_pages,
        tags: tag_pages(posts, &settings.tag_prefix),
        listings: paginate(posts, settings.page_size, &settings.listing_prefix)
            .into_iter()
            .map(PageRequest::listing)
            .collect(),
        skipped,
    }
}

/// Creates a post page for each record with a path. Returns the pages and
/// the number of records skipped.
fn post_pages(posts: &[PostRecord]) -> (Vec<PageRequest>, usize) {
    let mut skipped = 0;
    let pages = posts
        .iter()
        .enumerate()
        .filter_map(|(i, post)| match post.output_path() {
            Some(path) => Some(PageRequest::post(path)),
            None => {
                tracing::warn!(
                    index = i,
                    date = ?post.date,
                    "post has no path in its front matter; skipping"
                );
                skipped += 1;
                None
            }
        })
        .collect();
    (pages, skipped)
}

/// Creates a page for each distinct tag across `posts`.
fn tag_pages(posts: &[PostRecord], tag_prefix: &str) -> Vec<PageRequest> {
    let tag_prefix = tag_prefix.trim_end_matches('/');
    unique_tags(posts)
        .into_iter()
        .map(|tag| {
            PageRequest::tag(format!("{}/{}", tag_prefix, tag.slug), &tag.name)
        })
        .collect()
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::page::{PageContext, TemplateId};
    use std::collections::HashSet;
    use std::io;
    use std::sync::{Arc, Mutex};

    fn post(path: &str, tags: &[&str]) -> PostRecord {
        PostRecord {
            path: Some(path.to_owned()),
            tags: Some(tags.iter().map(|t| t.to_string()).collect()),
            date: None,
        }
    }

    fn posts(n: usize) -> Vec<PostRecord> {
        (0..n).map(|i| post(&format!("/post-{}", i), &[])).collect()
    }

    #[test]
    fn test_one_post_page_per_post() {
        let pages = derive_pages(&posts(7), &Settings::default());
        assert_eq!(7, pages.posts.len());
        assert_eq!(0, pages.skipped);

        let paths: HashSet<&str> =
            pages.posts.iter().map(|p| p.path.as_str()).collect();
        assert_eq!(7, paths.len());
        for (i, page) in pages.posts.iter().enumerate() {
            assert_eq!(format!("/post-{}", i), page.path);
            assert_eq!(TemplateId::BlogPost, page.template);
            assert_eq!(PageContext::Post {}, page.context);
        }
    }

    #[test]
    fn test_missing_path_is_skipped_but_listed() {
        let mut input = posts(2);
        input.push(PostRecord {
            path: None,
            tags: Some(vec![String::from("orphan")]),
            date: None,
        });
        input.push(PostRecord {
            path: Some(String::new()),
            ..PostRecord::default()
        });

        let pages = derive_pages(&input, &Settings::default());
        assert_eq!(2, pages.posts.len());
        assert_eq!(2, pages.skipped);
        assert_eq!(1, pages.tags.len());
        assert_eq!(1, pages.listings.len());
        match &pages.listings[0].context {
            PageContext::Listing(listing) => assert_eq!(4, listing.items.len()),
            other => panic!("unexpected context {:?}", other),
        }
    }

    /// Collects formatted log output so tests can assert on it.
    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_one_warning_per_skipped_post() {
        let mut input = posts(1);
        input.push(PostRecord::default());
        input.push(PostRecord {
            path: Some(String::new()),
            date: Some(String::from("2021-04-16")),
            ..PostRecord::default()
        });

        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::WARN)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();
        let pages = tracing::subscriber::with_default(subscriber, || {
            derive_pages(&input, &Settings::default())
        });

        let logs = String::from_utf8(captured.0.lock().unwrap().clone())
            .unwrap();
        assert_eq!(2, pages.skipped);
        assert_eq!(2, logs.matches("post has no path").count());
        assert_eq!(2, logs.lines().filter(|l| l.contains("WARN")).count());
        assert!(logs.contains("index=1"));
        assert!(logs.contains("index=2"));
        assert!(logs.contains("2021-04-16"));
    }

    #[test]
    fn test_tags_are_deduplicated() {
        let input = vec![
            post("/1", &["a", "b"]),
            post("/2", &["a"]),
            post("/3", &["c"]),
        ];
        let pages = derive_pages(&input, &Settings::default());
        let paths: Vec<&str> =
            pages.tags.iter().map(|p| p.path.as_str()).collect();
        assert_eq!(vec!["/tags/a", "/tags/b", "/tags/c"], paths);
        assert!(pages.tags.iter().all(|p| p.template == TemplateId::Tags));
    }

    #[test]
    fn test_tag_page_uses_slug_path_and_verbatim_name() {
        let pages =
            derive_pages(&[post("/1", &["Web Dev"])], &Settings::default());
        assert_eq!(1, pages.tags.len());
        assert_eq!("/tags/web-dev", pages.tags[0].path);
        assert_eq!(
            PageContext::Tag {
                tag: String::from("Web Dev")
            },
            pages.tags[0].context
        );
    }

    #[test]
    fn test_listing_pages() {
        let pages = derive_pages(&posts(45), &Settings::default());
        let paths: Vec<&str> =
            pages.listings.iter().map(|p| p.path.as_str()).collect();
        assert_eq!(vec!["/articles", "/articles/2", "/articles/3"], paths);
        assert!(pages
            .listings
            .iter()
            .all(|p| p.template == TemplateId::BlogIndex));
    }

    #[test]
    fn test_custom_settings() {
        let settings = Settings {
            listing_prefix: String::from("/blog"),
            page_size: NonZeroUsize::new(2).unwrap(),
            tag_prefix: String::from("/topics/"),
        };
        let mut input = posts(3);
        input[0].tags = Some(vec![String::from("rust")]);
        let pages = derive_pages(&input, &settings);
        assert_eq!("/topics/rust", pages.tags[0].path);
        let paths: Vec<&str> =
            pages.listings.iter().map(|p| p.path.as_str()).collect();
        assert_eq!(vec!["/blog", "/blog/2"], paths);
    }

    #[test]
    fn test_derivation_is_deterministic() {
        let input = vec![post("/1", &["x", "y"]), post("/2", &["y", "z"])];
        assert_eq!(
            derive_pages(&input, &Settings::default()),
            derive_pages(&input, &Settings::default())
        );
    }

    #[test]
    fn test_submit_order() {
        let pages = derive_pages(&[post("/1", &["x"])], &Settings::default());
        assert_eq!(3, pages.len());
        let mut sink: Vec<PageRequest> = Vec::new();
        pages.submit(&mut sink);
        let templates: Vec<TemplateId> =
            sink.iter().map(|p| p.template).collect();
        assert_eq!(
            vec![TemplateId::BlogPost, TemplateId::Tags, TemplateId::BlogIndex],
            templates
        );
    }

    #[test]
    fn test_no_posts_no_pages() {
        let pages = derive_pages(&[], &Settings::default());
        assert!(pages.is_empty());
    }
}
