//! Defines the [`Tag`] type and the kebab-case slug transform that turns a
//! tag's name into the last segment of its index page URL.

use std::collections::HashSet;

use crate::post::PostRecord;

/// Represents a distinct post tag. The `name` is kept verbatim for display
/// while the `slug` is what goes into the URL.
#[derive(Clone, Debug)]
pub struct Tag {
    /// The tag exactly as written in the front matter. Tags are compared
    /// by name, so `macOS` and `MacOS` are different tags even though they
    /// share a slug.
    pub name: String,

    /// The kebab-case form of `name`.
    pub slug: String,
}

impl Tag {
    pub fn new(name: &str) -> Tag {
        Tag {
            name: name.to_owned(),
            slug: kebab_case(name),
        }
    }
}

impl PartialEq for Tag {
    /// Implements [`PartialEq`] and [`Eq`] for [`Tag`] by delegating directly
    /// to the `name` field.
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}
impl Eq for Tag {}

/// Collects the distinct tags across `posts` in order of first appearance.
/// Posts without tags contribute nothing.
pub fn unique_tags(posts: &[PostRecord]) -> Vec<Tag> {
    let mut seen: HashSet<&str> = HashSet::new();
    posts
        .iter()
        .flat_map(|post| post.tags())
        .filter(|name| seen.insert(*name))
        .map(Tag::new)
        .collect()
}

/// Converts `input` to kebab case: apostrophes are dropped (`don't` is one
/// word), words are split at punctuation and whitespace, at case changes
/// (`fooBar`, `XMLHttp`) and between letters and digits unless the letters
/// are an ordinal suffix (`1st`), then transliterated to ASCII, lowercased
/// and joined with `-`.
pub fn kebab_case(input: &str) -> String {
    let chars: Vec<char> = input
        .chars()
        .filter(|c| !matches!(c, '\'' | '\u{2019}'))
        .collect();
    let mut spaced = String::with_capacity(input.len() + 8);
    for (i, &c) in chars.iter().enumerate() {
        if i > 0 && is_word_boundary(&chars, i) {
            spaced.push(' ');
        }
        spaced.push(c);
    }
    slug::slugify(spaced)
}

/// Whether a new word starts at `chars[i]`.
fn is_word_boundary(chars: &[char], i: usize) -> bool {
    let (prev, cur) = (chars[i - 1], chars[i]);
    let next = chars.get(i + 1).copied();
    if !prev.is_alphanumeric() || !cur.is_alphanumeric() {
        return false;
    }
    (prev.is_lowercase() && cur.is_uppercase())
        || (prev.is_alphabetic() && cur.is_numeric())
        || (prev.is_numeric()
            && cur.is_alphabetic()
            && !is_ordinal_suffix(&chars[i..]))
        || (prev.is_uppercase()
            && cur.is_uppercase()
            && next.map_or(false, char::is_lowercase))
}

/// Whether `rest` starts with `st`, `nd`, `rd` or `th` (any case) and the
/// word ends right after it.
fn is_ordinal_suffix(rest: &[char]) -> bool {
    let suffix: String = rest
        .iter()
        .take(2)
        .flat_map(|c| c.to_lowercase())
        .collect();
    let ends_word = match rest.get(2) {
        None => true,
        Some(c) => !c.is_alphabetic() || c.is_uppercase(),
    };
    ends_word && matches!(suffix.as_str(), "st" | "nd" | "rd" | "th")
}
