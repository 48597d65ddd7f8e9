//! Defines the [`ContentSource`] trait, which answers the one query a build
//! makes for posts, and its two implementations: [`MarkdownSource`], which
//! reads a directory of markdown posts, and [`JsonSource`], which reads a
//! saved document-graph query response.

use crate::post::{self, parse_date, Frontmatter, PostRecord};
use serde::Deserialize;
use std::fmt;
use std::future::Future;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// The number of posts a query returns unless told otherwise.
pub const DEFAULT_LIMIT: usize = 2000;

/// Asks for every post whose `published` flag is absent or true, newest
/// first, capped at `limit` posts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Query {
    pub limit: usize,
}

impl Default for Query {
    fn default() -> Self {
        Query {
            limit: DEFAULT_LIMIT,
        }
    }
}

/// Something that can answer a [`Query`].
pub trait ContentSource {
    fn query(
        &self,
        query: &Query,
    ) -> impl Future<Output = Result<Vec<PostRecord>>>;
}

/// Reads posts from the `.md` files under a directory, recursively.
pub struct MarkdownSource {
    directory: PathBuf,
}

impl MarkdownSource {
    pub fn new<P: Into<PathBuf>>(directory: P) -> MarkdownSource {
        MarkdownSource {
            directory: directory.into(),
        }
    }
}

impl ContentSource for MarkdownSource {
    async fn query(&self, query: &Query) -> Result<Vec<PostRecord>> {
        let directory = self.directory.clone();
        let query = *query;
        tokio::task::spawn_blocking(move || read_posts(&directory, &query))
            .await?
    }
}

const MARKDOWN_EXTENSION: &str = "md";

/// Walks `directory` for markdown files and answers `query` over them.
fn read_posts(directory: &Path, query: &Query) -> Result<Vec<PostRecord>> {
    let mut posts = Vec::new();
    for result in WalkDir::new(directory).sort_by_file_name() {
        let entry = result?;
        let is_markdown = entry
            .path()
            .extension()
            .map_or(false, |ext| ext == MARKDOWN_EXTENSION);
        if !entry.file_type().is_file() || !is_markdown {
            continue;
        }

        let frontmatter = read_frontmatter(entry.path())?;
        if !frontmatter.is_published() {
            tracing::debug!(
                file = %entry.path().display(),
                "skipping unpublished post"
            );
            continue;
        }
        let sort_key = frontmatter.record.date.as_deref().and_then(|date| {
            let parsed = parse_date(date);
            if parsed.is_none() {
                tracing::warn!(
                    file = %entry.path().display(),
                    date,
                    "unrecognized post date; sorting it last"
                );
            }
            parsed
        });
        posts.push((sort_key, frontmatter.record));
    }

    // newest first, undated last; the sort is stable so ties keep file order
    posts.sort_by(|(a, _), (b, _)| match (a, b) {
        (Some(a), Some(b)) => b.cmp(a),
        _ => b.is_some().cmp(&a.is_some()),
    });
    posts.truncate(query.limit);
    Ok(posts.into_iter().map(|(_, record)| record).collect())
}

fn read_frontmatter(path: &Path) -> Result<Frontmatter> {
    let contents = std::fs::read_to_string(path).map_err(|err| Error::Read {
        path: path.to_owned(),
        err,
    })?;
    Frontmatter::from_markdown(&contents).map_err(|err| {
        Error::Annotated(
            format!("parsing post `{}`", path.display()),
            Box::new(err.into()),
        )
    })
}

/// Reads a saved query response, as produced by the document graph, from a
/// JSON file:
///
/// ```json
/// {
///   "data": {
///     "allMarkdownRemark": {
///       "edges": [
///         { "node": { "frontmatter": { "path": "/hello", "tags": [] } } }
///       ]
///     }
///   }
/// }
/// ```
///
/// The response is taken as already filtered, sorted and limited.
pub struct JsonSource {
    path: PathBuf,
}

impl JsonSource {
    pub fn new<P: Into<PathBuf>>(path: P) -> JsonSource {
        JsonSource { path: path.into() }
    }
}

impl ContentSource for JsonSource {
    async fn query(&self, _query: &Query) -> Result<Vec<PostRecord>> {
        let contents = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|err| Error::Read {
                path: self.path.clone(),
                err,
            })?;
        let response: QueryResponse =
            serde_json::from_str(&contents).map_err(|err| {
                Error::Annotated(
                    format!("parsing query response `{}`", self.path.display()),
                    Box::new(err.into()),
                )
            })?;
        response.into_posts()
    }
}

/// The shape of a document-graph query response.
#[derive(Debug, Default, Deserialize)]
pub struct QueryResponse {
    #[serde(default)]
    pub data: Option<QueryData>,

    /// Present when the query failed. Any value here, even an empty list,
    /// fails the whole query.
    #[serde(default)]
    pub errors: Option<Vec<QueryError>>,
}

#[derive(Debug, Default, Deserialize)]
pub struct QueryData {
    #[serde(rename = "allMarkdownRemark")]
    pub all_markdown_remark: Connection,
}

#[derive(Debug, Default, Deserialize)]
pub struct Connection {
    #[serde(default)]
    pub edges: Vec<Edge>,
}

#[derive(Debug, Deserialize)]
pub struct Edge {
    pub node: Node,
}

#[derive(Debug, Deserialize)]
pub struct Node {
    /// A node without front matter becomes an empty [`PostRecord`].
    #[serde(default)]
    pub frontmatter: Option<PostRecord>,
}

/// One entry of a failed query's `errors` list.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct QueryError {
    pub message: String,
}

impl fmt::Display for QueryError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl QueryResponse {
    /// Returns the posts of a successful response, or [`Error::Query`] if the
    /// response carries errors.
    pub fn into_posts(self) -> Result<Vec<PostRecord>> {
        if let Some(errors) = self.errors {
            return Err(Error::Query(errors));
        }
        Ok(self
            .data
            .map(|data| data.all_markdown_remark.edges)
            .unwrap_or_default()
            .into_iter()
            .map(|edge| edge.node.frontmatter.unwrap_or_default())
            .collect())
    }
}

/// Represents the result of a query.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents a failed query.
#[derive(Debug)]
pub enum Error {
    /// Returned when the content source reports errors of its own.
    Query(Vec<QueryError>),

    /// Returned when a source file can't be read.
    Read { path: PathBuf, err: std::io::Error },

    /// Returned when a post's front matter is malformed.
    Frontmatter(post::Error),

    /// Returned when a saved query response isn't valid JSON.
    DeserializeJson(serde_json::Error),

    /// Returned for WalkDir I/O errors.
    WalkDir(walkdir::Error),

    /// Returned when the blocking task reading posts panicked.
    Join(tokio::task::JoinError),

    /// An error with an annotation.
    Annotated(String, Box<Error>),
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as human-readable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Query(errors) => {
                write!(f, "query failed")?;
                for (i, err) in errors.iter().enumerate() {
                    write!(f, "{} {}", if i == 0 { ":" } else { ";" }, err)?;
                }
                Ok(())
            }
            Error::Read { path, err } => {
                write!(f, "Reading '{}': {}", path.display(), err)
            }
            Error::Frontmatter(err) => err.fmt(f),
            Error::DeserializeJson(err) => err.fmt(f),
            Error::WalkDir(err) => err.fmt(f),
            Error::Join(err) => err.fmt(f),
            Error::Annotated(annotation, err) => {
                write!(f, "{}: {}", &annotation, err)
            }
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Query(_) => None,
            Error::Read { path: _, err } => Some(err),
            Error::Frontmatter(err) => Some(err),
            Error::DeserializeJson(err) => Some(err),
            Error::WalkDir(err) => Some(err),
            Error::Join(err) => Some(err),
            Error::Annotated(_, err) => Some(err),
        }
    }
}

impl From<post::Error> for Error {
    fn from(err: post::Error) -> Error {
        Error::Frontmatter(err)
    }
}

impl From<serde_json::Error> for Error {
    /// Converts a [`serde_json::Error`] into an [`Error`]. It allows us to use
    /// the `?` operator for [`serde_json`] deserialization functions.
    fn from(err: serde_json::Error) -> Error {
        Error::DeserializeJson(err)
    }
}

impl From<walkdir::Error> for Error {
    /// Converts a [`walkdir::Error`] into an [`Error`]. It allows us to
    /// use the `?` operator while walking the posts directory.
    fn from(err: walkdir::Error) -> Error {
        Error::WalkDir(err)
    }
}

impl From<tokio::task::JoinError> for Error {
    fn from(err: tokio::task::JoinError) -> Error {
        Error::Join(err)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write_post(dir: &Path, name: &str, frontmatter: &str) {
        fs::write(dir.join(name), format!("---\n{}---\nBody\n", frontmatter))
            .unwrap();
    }

    fn paths(posts: &[PostRecord]) -> Vec<&str> {
        posts.iter().map(|p| p.path.as_deref().unwrap_or("")).collect()
    }

    async fn query_all(dir: &Path) -> Result<Vec<PostRecord>> {
        MarkdownSource::new(dir).query(&Query::default()).await
    }

    #[tokio::test]
    async fn test_markdown_source_sorts_newest_first() -> Result<()> {
        let dir = TempDir::new().unwrap();
        write_post(dir.path(), "a.md", "path: /old\ndate: 2019-01-01\n");
        write_post(dir.path(), "b.md", "path: /new\ndate: 2021-06-01\n");
        write_post(dir.path(), "c.md", "path: /undated\n");
        write_post(
            dir.path(),
            "d.md",
            "path: /mid\ndate: 2020-03-04 10:00:00\n",
        );

        let posts = query_all(dir.path()).await?;
        assert_eq!(vec!["/new", "/mid", "/old", "/undated"], paths(&posts));
        Ok(())
    }

    #[tokio::test]
    async fn test_markdown_source_filters_unpublished() -> Result<()> {
        let dir = TempDir::new().unwrap();
        write_post(dir.path(), "draft.md", "path: /draft\npublished: false\n");
        write_post(dir.path(), "live.md", "path: /live\npublished: true\n");
        write_post(dir.path(), "default.md", "path: /default\n");

        let posts = query_all(dir.path()).await?;
        assert_eq!(vec!["/default", "/live"], paths(&posts));
        Ok(())
    }

    #[tokio::test]
    async fn test_markdown_source_applies_limit_and_recurses() -> Result<()> {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("bundle")).unwrap();
        write_post(
            &dir.path().join("bundle"),
            "index.md",
            "path: /bundle\ndate: 2022-01-01\n",
        );
        write_post(dir.path(), "a.md", "path: /a\ndate: 2021-01-01\n");
        write_post(dir.path(), "b.md", "path: /b\ndate: 2020-01-01\n");
        fs::write(dir.path().join("notes.txt"), "not a post").unwrap();

        let posts =
            MarkdownSource::new(dir.path()).query(&Query { limit: 2 }).await?;
        assert_eq!(vec!["/bundle", "/a"], paths(&posts));
        Ok(())
    }

    #[tokio::test]
    async fn test_markdown_source_rejects_unterminated_frontmatter() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("bad.md"), "---\npath: /bad\n").unwrap();

        let result = query_all(dir.path()).await;
        assert!(matches!(result, Err(Error::Annotated(_, _))));
    }

    #[tokio::test]
    async fn test_json_source() -> Result<()> {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("response.json");
        fs::write(
            &file,
            r#"{"data": {"allMarkdownRemark": {"edges": [
                {"node": {"frontmatter": {"path": "/a", "tags": ["x", "y"]}}},
                {"node": {"frontmatter": null}},
                {"node": {"frontmatter": {"path": "/b", "tags": null}}},
                {"node": {"frontmatter": {"path": "/c", "tags": ["css", 3]}}}
            ]}}}"#,
        )
        .unwrap();

        let posts = JsonSource::new(&file).query(&Query::default()).await?;
        assert_eq!(4, posts.len());
        assert_eq!(vec!["x", "y"], posts[0].tags().collect::<Vec<_>>());
        assert_eq!(PostRecord::default(), posts[1]);
        assert_eq!(None, posts[2].tags);
        assert_eq!(vec!["css", "3"], posts[3].tags().collect::<Vec<_>>());
        Ok(())
    }

    #[tokio::test]
    async fn test_json_source_reports_errors() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("response.json");
        fs::write(
            &file,
            r#"{"errors": [{"message": "Cannot query field"}], "data": null}"#,
        )
        .unwrap();

        match JsonSource::new(&file).query(&Query::default()).await {
            Err(Error::Query(errors)) => {
                assert_eq!("Cannot query field", errors[0].message)
            }
            other => panic!("expected a query error, got {:?}", other),
        }
    }

    #[test]
    fn test_query_error_display() {
        let err = Error::Query(vec![
            QueryError {
                message: String::from("first"),
            },
            QueryError {
                message: String::from("second"),
            },
        ]);
        assert_eq!("query failed: first; second", err.to_string());
    }
}
