//! Splits an ordered list of posts into fixed-size listing pages.

use crate::page::{ListingContext, ListingPage};
use crate::post::PostRecord;
use std::num::NonZeroUsize;

/// Converts `items` into listing pages of `page_size` posts each, in order.
/// The first page is served at `path_prefix` itself and page *n* (1-based,
/// n > 1) at `{path_prefix}/{n}`. A trailing slash on `path_prefix` is
/// ignored, so a prefix of `/` gives `/`, `/2`, `/3`, ...
///
/// No items means no pages.
pub fn paginate(
    items: &[PostRecord],
    page_size: NonZeroUsize,
    path_prefix: &str,
) -> Vec<ListingPage> {
    let page_size = page_size.get();
    let number_of_pages = match items.len() % page_size {
        0 => items.len() / page_size,
        _ => items.len() / page_size + 1,
    };
    let base = path_prefix.trim_end_matches('/');
    let page_path = |i: usize| match i {
        0 if base.is_empty() => String::from("/"),
        0 => base.to_owned(),
        _ => format!("{}/{}", base, i + 1),
    };

    items
        .chunks(page_size)
        .enumerate()
        .map(|(i, chunk)| ListingPage {
            path: page_path(i),
            context: ListingContext {
                items: chunk.to_vec(),
                page_number: i,
                human_page_number: i + 1,
                skip: i * page_size,
                limit: page_size,
                number_of_pages,
                previous_page_path: match i {
                    0 => None,
                    _ => Some(page_path(i - 1)),
                },
                next_page_path: match i < number_of_pages - 1 {
                    false => None,
                    true => Some(page_path(i + 1)),
                },
            },
        })
        .collect()
}
