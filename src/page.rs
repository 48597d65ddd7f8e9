//! Defines [`PageRequest`], the unit handed to a [`crate::sink::PageSink`],
//! along with the template identifiers and per-template contexts.

use crate::post::PostRecord;
use serde::Serialize;
use std::fmt;

/// Identifies the template a page is rendered with.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum TemplateId {
    /// The post detail template.
    #[serde(rename = "blog-post")]
    BlogPost,

    /// The tag index template.
    #[serde(rename = "tags")]
    Tags,

    /// The paginated article listing template.
    #[serde(rename = "blog-index")]
    BlogIndex,
}

impl TemplateId {
    pub const ALL: [TemplateId; 3] =
        [TemplateId::BlogPost, TemplateId::Tags, TemplateId::BlogIndex];

    pub fn as_str(&self) -> &'static str {
        match self {
            TemplateId::BlogPost => "blog-post",
            TemplateId::Tags => "tags",
            TemplateId::BlogIndex => "blog-index",
        }
    }
}

impl fmt::Display for TemplateId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A request to register one output page.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PageRequest {
    /// The output URL path of the page.
    pub path: String,

    /// The template the page is rendered with.
    pub template: TemplateId,

    /// The data made available to the template.
    pub context: PageContext,
}

impl PageRequest {
    /// A post detail page. The context is empty for now.
    pub fn post(path: &str) -> PageRequest {
        PageRequest {
            path: path.to_owned(),
            template: TemplateId::BlogPost,
            context: PageContext::Post {},
        }
    }

    /// A tag index page. `tag` is the tag as written, not its slug, so the
    /// template can show a readable label.
    pub fn tag(path: String, tag: &str) -> PageRequest {
        PageRequest {
            path,
            template: TemplateId::Tags,
            context: PageContext::Tag {
                tag: tag.to_owned(),
            },
        }
    }

    /// One page of the article listing.
    pub fn listing(page: ListingPage) -> PageRequest {
        PageRequest {
            path: page.path,
            template: TemplateId::BlogIndex,
            context: PageContext::Listing(page.context),
        }
    }
}

/// The template context of a [`PageRequest`]. Serializes to a plain object.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PageContext {
    /// Reserved for per-post data.
    Post {},

    Tag {
        tag: String,
    },

    Listing(ListingContext),
}

/// One window of the paginated article listing and the path it's served at.
#[derive(Clone, Debug, PartialEq)]
pub struct ListingPage {
    pub path: String,
    pub context: ListingContext,
}

/// What a listing template needs to render one page: the posts in the
/// window and where the neighbouring pages are.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingContext {
    /// The posts on this page, in listing order.
    pub items: Vec<PostRecord>,

    /// Zero-based page index.
    pub page_number: usize,

    /// One-based page number, as shown to readers.
    pub human_page_number: usize,

    /// How many posts precede this page.
    pub skip: usize,

    /// The page size.
    pub limit: usize,

    pub number_of_pages: usize,

    /// `None` on the first page.
    pub previous_page_path: Option<String>,

    /// `None` on the last page.
    pub next_page_path: Option<String>,
}

#[cfg(test)]
mod test {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_post_context_is_empty_object() -> serde_json::Result<()> {
        let value = serde_json::to_value(PageRequest::post("/hello"))?;
        assert_eq!(
            json!({"path": "/hello", "template": "blog-post", "context": {}}),
            value
        );
        Ok(())
    }

    #[test]
    fn test_tag_context_keeps_tag_name() -> serde_json::Result<()> {
        let page = PageRequest::tag(String::from("/tags/web-dev"), "Web Dev");
        assert_eq!(
            json!({
                "path": "/tags/web-dev",
                "template": "tags",
                "context": {"tag": "Web Dev"},
            }),
            serde_json::to_value(page)?
        );
        Ok(())
    }

    #[test]
    fn test_listing_context_uses_camel_case() -> serde_json::Result<()> {
        let value = serde_json::to_value(PageContext::Listing(ListingContext {
            items: Vec::new(),
            page_number: 0,
            human_page_number: 1,
            skip: 0,
            limit: 20,
            number_of_pages: 1,
            previous_page_path: None,
            next_page_path: None,
        }))?;
        assert_eq!(
            json!({
                "items": [],
                "pageNumber": 0,
                "humanPageNumber": 1,
                "skip": 0,
                "limit": 20,
                "numberOfPages": 1,
                "previousPagePath": null,
                "nextPagePath": null,
            }),
            value
        );
        Ok(())
    }

    #[test]
    fn test_template_ids() {
        let ids: Vec<&str> =
            TemplateId::ALL.iter().map(TemplateId::as_str).collect();
        assert_eq!(vec!["blog-post", "tags", "blog-index"], ids);
    }
}
