//! Defines the [`PostRecord`] type, the unit of input for page derivation,
//! and the logic for reading a post's YAML front matter out of a markdown
//! source file. Only the front matter is read; post bodies are left to the
//! renderer.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::de::{self, SeqAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// A post's front matter as reported by the content source.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct PostRecord {
    /// The output URL of the post, e.g. `/2021/hello-world`. Records without
    /// a path get no post page.
    #[serde(default, deserialize_with = "deserialize_scalar")]
    pub path: Option<String>,

    /// The post's tags, in the order they were written.
    #[serde(default, deserialize_with = "deserialize_tags")]
    pub tags: Option<Vec<String>>,

    /// The post date. Only used for ordering by the content source.
    #[serde(default, deserialize_with = "deserialize_scalar")]
    pub date: Option<String>,
}

impl PostRecord {
    /// Returns the post's output path if it has a non-empty one.
    pub fn output_path(&self) -> Option<&str> {
        self.path.as_deref().filter(|path| !path.is_empty())
    }

    /// Iterates the post's tags. Absent tags yield nothing.
    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.tags.iter().flatten().map(String::as_str)
    }
}

/// A front matter value read as text. YAML has no quoting requirement for
/// numbers and booleans, so `2019` and `true` are taken as the strings
/// `"2019"` and `"true"`. `null` reads as `None`.
struct Scalar(Option<String>);

struct ScalarVisitor;

impl<'de> Visitor<'de> for ScalarVisitor {
    type Value = Scalar;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a string, number or boolean")
    }

    fn visit_str<E: de::Error>(
        self,
        v: &str,
    ) -> std::result::Result<Scalar, E> {
        Ok(Scalar(Some(v.to_owned())))
    }

    fn visit_string<E: de::Error>(
        self,
        v: String,
    ) -> std::result::Result<Scalar, E> {
        Ok(Scalar(Some(v)))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> std::result::Result<Scalar, E> {
        Ok(Scalar(Some(v.to_string())))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> std::result::Result<Scalar, E> {
        Ok(Scalar(Some(v.to_string())))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> std::result::Result<Scalar, E> {
        Ok(Scalar(Some(v.to_string())))
    }

    fn visit_bool<E: de::Error>(
        self,
        v: bool,
    ) -> std::result::Result<Scalar, E> {
        Ok(Scalar(Some(v.to_string())))
    }

    fn visit_none<E: de::Error>(self) -> std::result::Result<Scalar, E> {
        Ok(Scalar(None))
    }

    fn visit_unit<E: de::Error>(self) -> std::result::Result<Scalar, E> {
        Ok(Scalar(None))
    }

    fn visit_some<D: Deserializer<'de>>(
        self,
        deserializer: D,
    ) -> std::result::Result<Scalar, D::Error> {
        deserializer.deserialize_any(self)
    }
}

impl<'de> Deserialize<'de> for Scalar {
    fn deserialize<D: Deserializer<'de>>(
        deserializer: D,
    ) -> std::result::Result<Scalar, D::Error> {
        deserializer.deserialize_any(ScalarVisitor)
    }
}

fn deserialize_scalar<'de, D>(
    deserializer: D,
) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Scalar::deserialize(deserializer)?.0)
}

/// Accepts `tags` either as a list or as a single value (`tags: rust`), the
/// latter being treated as a one-element list. Numbers and booleans are kept
/// as their text. `null` is the same as absent, and `null` items are dropped.
fn deserialize_tags<'de, D>(
    deserializer: D,
) -> std::result::Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    struct TagsVisitor;

    impl<'de> Visitor<'de> for TagsVisitor {
        type Value = Option<Vec<String>>;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("a tag or a list of tags")
        }

        fn visit_seq<A: SeqAccess<'de>>(
            self,
            mut seq: A,
        ) -> std::result::Result<Self::Value, A::Error> {
            let mut tags = Vec::new();
            while let Some(Scalar(tag)) = seq.next_element()? {
                tags.extend(tag);
            }
            Ok(Some(tags))
        }

        fn visit_some<D: Deserializer<'de>>(
            self,
            deserializer: D,
        ) -> std::result::Result<Self::Value, D::Error> {
            deserializer.deserialize_any(self)
        }

        fn visit_str<E: de::Error>(
            self,
            v: &str,
        ) -> std::result::Result<Self::Value, E> {
            self.scalar(ScalarVisitor.visit_str(v)?)
        }

        fn visit_string<E: de::Error>(
            self,
            v: String,
        ) -> std::result::Result<Self::Value, E> {
            self.scalar(ScalarVisitor.visit_string(v)?)
        }

        fn visit_i64<E: de::Error>(
            self,
            v: i64,
        ) -> std::result::Result<Self::Value, E> {
            self.scalar(ScalarVisitor.visit_i64(v)?)
        }

        fn visit_u64<E: de::Error>(
            self,
            v: u64,
        ) -> std::result::Result<Self::Value, E> {
            self.scalar(ScalarVisitor.visit_u64(v)?)
        }

        fn visit_f64<E: de::Error>(
            self,
            v: f64,
        ) -> std::result::Result<Self::Value, E> {
            self.scalar(ScalarVisitor.visit_f64(v)?)
        }

        fn visit_bool<E: de::Error>(
            self,
            v: bool,
        ) -> std::result::Result<Self::Value, E> {
            self.scalar(ScalarVisitor.visit_bool(v)?)
        }

        fn visit_none<E: de::Error>(
            self,
        ) -> std::result::Result<Self::Value, E> {
            Ok(None)
        }

        fn visit_unit<E: de::Error>(
            self,
        ) -> std::result::Result<Self::Value, E> {
            Ok(None)
        }
    }

    impl TagsVisitor {
        fn scalar<E>(
            self,
            Scalar(tag): Scalar,
        ) -> std::result::Result<Option<Vec<String>>, E> {
            Ok(tag.map(|tag| vec![tag]))
        }
    }

    deserializer.deserialize_any(TagsVisitor)
}

/// The front matter fields the content source cares about.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct Frontmatter {
    #[serde(flatten)]
    pub record: PostRecord,

    /// `published: false` hides a post from every query.
    #[serde(default)]
    pub published: Option<bool>,
}

const FENCE: &str = "---";

impl Frontmatter {
    /// Parses the front matter from the contents of a markdown file. The
    /// file must be structured as follows:
    ///
    /// 1. Initial front matter fence (`---`)
    /// 2. YAML front matter with optional fields `path`, `tags`, `date` and
    ///    `published`
    /// 3. Terminal front matter fence (`---` on a line of its own)
    /// 4. Post body
    ///
    /// For example:
    ///
    /// ```md
    /// ---
    /// path: /hello-world
    /// date: 2021-04-16
    /// tags: [greet]
    /// ---
    /// # Hello
    ///
    /// World
    /// ```
    ///
    /// A file that doesn't start with a fence has no front matter at all and
    /// parses to an empty [`Frontmatter`].
    pub fn from_markdown(input: &str) -> Result<Frontmatter> {
        let input = input.trim_start_matches('\u{feff}');
        if !input.starts_with(FENCE) {
            return Ok(Frontmatter::default());
        }
        let rest = &input[FENCE.len()..];
        let yaml = match closing_fence(rest) {
            None => return Err(Error::MissingEndFence),
            Some(offset) => &rest[..offset],
        };

        // serde_yaml refuses to deserialize an empty document into a struct
        if yaml.trim().is_empty() {
            return Ok(Frontmatter::default());
        }
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Whether the post should be returned by queries (`published != false`).
    pub fn is_published(&self) -> bool {
        self.published != Some(false)
    }
}

/// Returns the byte offset of the first line in `rest` that is exactly a
/// fence. `rest` starts right after the opening fence, so its first line is
/// the tail of the opening line and never closes the front matter.
fn closing_fence(rest: &str) -> Option<usize> {
    let mut offset = 0;
    for (i, line) in rest.split_inclusive('\n').enumerate() {
        if i > 0 && line.trim_end() == FENCE {
            return Some(offset);
        }
        offset += line.len();
    }
    None
}

/// Parses a front matter date for ordering. Accepts RFC 3339 timestamps,
/// `YYYY-MM-DD HH:MM:SS` and plain `YYYY-MM-DD` dates (at midnight).
pub fn parse_date(date: &str) -> Option<NaiveDateTime> {
    let date = date.trim();
    if let Ok(datetime) = DateTime::parse_from_rfc3339(date) {
        return Some(datetime.naive_utc());
    }
    if let Ok(datetime) =
        NaiveDateTime::parse_from_str(date, "%Y-%m-%d %H:%M:%S")
    {
        return Some(datetime);
    }
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
}

/// Represents the result of a front matter parse.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error parsing front matter.
#[derive(Debug)]
pub enum Error {
    /// Returned when the starting fence (`---`) was found but the terminal
    /// one was missing.
    MissingEndFence,

    /// Returned when there was an error parsing the front matter as YAML.
    DeserializeYaml(serde_yaml::Error),
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as human-readable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::MissingEndFence => write!(f, "Missing closing `---`"),
            Error::DeserializeYaml(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::MissingEndFence => None,
            Error::DeserializeYaml(err) => Some(err),
        }
    }
}

impl From<serde_yaml::Error> for Error {
    /// Converts a [`serde_yaml::Error`] into an [`Error`]. It allows us to use
    /// the `?` operator for [`serde_yaml`] deserialization functions.
    fn from(err: serde_yaml::Error) -> Error {
        Error::DeserializeYaml(err)
    }
}
