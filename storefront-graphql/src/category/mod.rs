//! Category lookups against the catalog tree.
//!
//! The platform's single category endpoint does not return the url of a
//! category, so `slug`, `href` and `children` are read from the category tree
//! instead: the tree is fetched, flattened into a [`CategoryMap`] and the
//! requested id is looked up there.

mod slug;

use std::collections::HashMap;

use regex::Regex;
use serde::Deserialize;
use serde::Deserializer;
use serde::Serialize;
use tokio::sync::OnceCell;

pub use self::slug::slugify;
use crate::clients::Catalog;
use crate::error::FetchError;

/// Department, category and subcategory.
pub const CATEGORY_TREE_DEPTH: usize = 3;

/// A catalog category as returned by the platform.
#[derive(Clone, Debug, Default, Eq, PartialEq, Deserialize, Serialize)]
pub struct CategoryRecord {
    #[serde(alias = "Id", deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default, alias = "Name")]
    pub name: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub children: Vec<CategoryRecord>,
    #[serde(rename = "Title", default)]
    pub title: Option<String>,
    #[serde(rename = "MetaTagDescription", default)]
    pub meta_tag_description: Option<String>,
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Id {
        String(String),
        Number(serde_json::Number),
    }

    Ok(match Id::deserialize(deserializer)? {
        Id::String(id) => id,
        Id::Number(id) => id.to_string(),
    })
}

/// Every category of a tree, keyed by id.
#[derive(Debug, Default)]
pub struct CategoryMap<'a> {
    categories: HashMap<&'a str, &'a CategoryRecord>,
}

impl<'a> CategoryMap<'a> {
    /// Flattens `roots` in pre-order: a parent is inserted before its
    /// children, and a later node replaces an earlier one with the same id.
    pub fn from_tree(roots: &'a [CategoryRecord]) -> Self {
        let mut categories = HashMap::new();
        let mut pending: Vec<&'a CategoryRecord> = roots.iter().rev().collect();
        while let Some(category) = pending.pop() {
            categories.insert(category.id.as_str(), category);
            pending.extend(category.children.iter().rev());
        }
        Self { categories }
    }

    pub fn get(&self, id: &str) -> Option<&'a CategoryRecord> {
        self.categories.get(id).copied()
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}

/// Fetches the category tree and looks up `id` in it.
pub async fn category_info(
    catalog: &dyn Catalog,
    id: &str,
) -> Result<Option<CategoryRecord>, FetchError> {
    CategoryTree::default().category_info(catalog, id).await
}

/// The category tree of one GraphQL request.
///
/// The tree is fetched on the first lookup and shared by every later one. A
/// failed fetch is not kept, the next lookup tries again.
#[derive(Debug, Default)]
pub struct CategoryTree {
    roots: OnceCell<Vec<CategoryRecord>>,
}

impl CategoryTree {
    /// Looks up `id`, fetching the tree if this is the first lookup.
    pub async fn category_info(
        &self,
        catalog: &dyn Catalog,
        id: &str,
    ) -> Result<Option<CategoryRecord>, FetchError> {
        let roots = self
            .roots
            .get_or_try_init(|| catalog.categories(CATEGORY_TREE_DEPTH))
            .await?;
        let category = CategoryMap::from_tree(roots).get(id).cloned();
        if category.is_none() {
            tracing::debug!(id, "category not found in the catalog tree");
        }
        Ok(category)
    }
}

/// The last path segment of `url`, or `None` for an empty url.
pub fn slug(url: &str) -> Option<String> {
    if url.is_empty() {
        return None;
    }
    url.rsplit('/').next().map(str::to_string)
}

/// Removes the scheme and host matched by `host_pattern` from `url`.
pub fn clean_url(host_pattern: &Regex, url: &str) -> String {
    host_pattern.replace(url, "").into_owned()
}

/// The storefront href for a category path.
///
/// `/clothing` is a department and becomes `clothing/d`, while
/// `/clothing/shirts` is returned slugified as `clothing/shirts`.
pub fn path_to_category_href(path: &str) -> String {
    let slugified = slugify(path);
    let mut rest = path.chars();
    rest.next();
    let is_department = !rest.as_str().contains('/');
    if is_department {
        format!("{slugified}/d")
    } else {
        slugified
    }
}

/// The href of the category at `url`, see [`path_to_category_href`].
pub fn category_href(host_pattern: &Regex, url: &str) -> String {
    path_to_category_href(&clean_url(host_pattern, url))
}
