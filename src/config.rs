//! Loads the project configuration from a `pagegen.yaml` file.

use crate::derive::{Settings, DEFAULT_PAGE_SIZE};
use crate::page::TemplateId;
use crate::source::{Query, DEFAULT_LIMIT};
use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

/// The name of the project file searched for by [`Config::from_directory`].
pub const PROJECT_FILE: &str = "pagegen.yaml";

#[derive(Deserialize)]
struct PageSize(usize);
impl Default for PageSize {
    fn default() -> Self {
        PageSize(DEFAULT_PAGE_SIZE.get())
    }
}

#[derive(Deserialize)]
struct Limit(usize);
impl Default for Limit {
    fn default() -> Self {
        Limit(DEFAULT_LIMIT)
    }
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct Project {
    #[serde(default = "default_posts_directory")]
    posts_directory: PathBuf,

    #[serde(default)]
    limit: Limit,

    #[serde(default)]
    listing: Listing,

    #[serde(default)]
    tags: Tags,

    #[serde(default)]
    templates: Templates,
}

fn default_posts_directory() -> PathBuf {
    PathBuf::from("posts")
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct Listing {
    #[serde(default = "default_listing_prefix")]
    path_prefix: String,

    #[serde(default)]
    page_size: PageSize,
}

impl Default for Listing {
    fn default() -> Self {
        Listing {
            path_prefix: default_listing_prefix(),
            page_size: PageSize::default(),
        }
    }
}

fn default_listing_prefix() -> String {
    Settings::default().listing_prefix
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct Tags {
    #[serde(default = "default_tag_prefix")]
    path_prefix: String,
}

impl Default for Tags {
    fn default() -> Self {
        Tags {
            path_prefix: default_tag_prefix(),
        }
    }
}

fn default_tag_prefix() -> String {
    Settings::default().tag_prefix
}

#[derive(Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct Templates {
    #[serde(rename = "blog-post")]
    blog_post: Option<PathBuf>,

    #[serde(rename = "blog-index")]
    blog_index: Option<PathBuf>,

    tags: Option<PathBuf>,
}

/// The resolved configuration for a build. Relative paths in the project
/// file are resolved against the directory containing it.
#[derive(Debug, PartialEq)]
pub struct Config {
    /// The directory the posts are read from.
    pub posts_directory: PathBuf,

    pub query: Query,

    pub settings: Settings,

    /// The template file for each template id that has one configured.
    pub templates: BTreeMap<TemplateId, PathBuf>,
}

impl Config {
    /// The configuration used when there's no project file: posts are read
    /// from `{root}/posts` and everything else takes its default.
    pub fn with_defaults(root: &Path) -> Config {
        Config {
            posts_directory: root.join(default_posts_directory()),
            query: Query::default(),
            settings: Settings::default(),
            templates: BTreeMap::new(),
        }
    }

    /// Searches `dir` and then each of its ancestors for a `pagegen.yaml`
    /// file and loads the first one found. Without one, `dir` is taken as
    /// the project root and [`Config::with_defaults`] applies.
    pub fn from_directory(dir: &Path) -> Result<Config> {
        match Config::find_project_file(dir) {
            Some(path) => Config::from_project_file(&path).with_context(|| {
                format!("Loading configuration from `{}`", path.display())
            }),
            None => {
                tracing::debug!(
                    project = %dir.display(),
                    "no {} found; using defaults",
                    PROJECT_FILE
                );
                Ok(Config::with_defaults(dir))
            }
        }
    }

    /// Returns the path of the nearest `pagegen.yaml` at or above `dir`.
    pub fn find_project_file(dir: &Path) -> Option<PathBuf> {
        dir.ancestors()
            .map(|ancestor| ancestor.join(PROJECT_FILE))
            .find(|path| path.is_file())
    }

    pub fn from_project_file(path: &Path) -> Result<Config> {
        let file = std::fs::File::open(path).with_context(|| {
            format!("Opening project file `{}`", path.display())
        })?;
        let project: Project = serde_yaml::from_reader(file)?;
        let page_size = NonZeroUsize::new(project.listing.page_size.0)
            .ok_or_else(|| anyhow!("`listing.page_size` must not be 0"))?;
        match path.parent() {
            None => Err(anyhow!(
                "Can't get parent directory for project file '{:?}'",
                path
            )),
            Some(project_root) => Ok(Config {
                posts_directory: project_root.join(&project.posts_directory),
                query: Query {
                    limit: project.limit.0,
                },
                settings: Settings {
                    listing_prefix: project.listing.path_prefix,
                    page_size,
                    tag_prefix: project.tags.path_prefix,
                },
                templates: [
                    (TemplateId::BlogPost, project.templates.blog_post),
                    (TemplateId::BlogIndex, project.templates.blog_index),
                    (TemplateId::Tags, project.templates.tags),
                ]
                .into_iter()
                .filter_map(|(id, relpath)| {
                    relpath.map(|relpath| (id, project_root.join(relpath)))
                })
                .collect(),
            }),
        }
    }
}
