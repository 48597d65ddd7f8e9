//! Exports the [`build_pages`] function which stitches together the steps of
//! creating a site's pages: querying the content source
//! ([`crate::source`]), deriving page requests ([`crate::derive`]) and handing
//! them to the page sink ([`crate::sink`]).

use crate::derive::{derive_pages, Settings};
use crate::sink::PageSink;
use crate::source::{ContentSource, Error as SourceError, Query};
use std::fmt;

/// How many pages of each kind a build created.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Report {
    pub posts: usize,
    pub tags: usize,
    pub listings: usize,

    /// Records that got no post page because they had no path.
    pub skipped: usize,
}

impl Report {
    pub fn total(&self) -> usize {
        self.posts + self.tags + self.listings
    }
}

/// Queries `source` once and registers every derived page with `sink`. If
/// the query fails nothing reaches the sink and the error is returned.
pub async fn build_pages<C, S>(
    source: &C,
    query: &Query,
    settings: &Settings,
    sink: &mut S,
) -> Result<Report>
where
    C: ContentSource,
    S: PageSink + ?Sized,
{
    let posts = source.query(query).await?;
    tracing::debug!(posts = posts.len(), "query returned");

    let pages = derive_pages(&posts, settings);
    let report = Report {
        posts: pages.posts.len(),
        tags: pages.tags.len(),
        listings: pages.listings.len(),
        skipped: pages.skipped,
    };
    pages.submit(sink);

    tracing::info!(
        posts = report.posts,
        tags = report.tags,
        listings = report.listings,
        skipped = report.skipped,
        "created pages"
    );
    Ok(report)
}

type Result<T> = std::result::Result<T, Error>;

/// The error type for building pages. The only failure is the content
/// source's query.
#[derive(Debug)]
pub enum Error {
    /// Returned when the content source query fails.
    Query(SourceError),
}

impl fmt::Display for Error {
    /// Implements [`fmt::Display`] for [`Error`].
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Query(err) => write!(f, "Querying posts: {}", err),
        }
    }
}

impl std::error::Error for Error {
    /// Implements [`std::error::Error`] for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Query(err) => Some(err),
        }
    }
}

impl From<SourceError> for Error {
    /// Converts [`SourceError`]s into [`Error`]. This allows us to use the `?`
    /// operator.
    fn from(err: SourceError) -> Error {
        Error::Query(err)
    }
}
