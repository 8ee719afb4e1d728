// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

//! Configuration document types describing badge composition groups.
//!
//! A group names an ordered list of previously downloaded badge files and the
//! combined SVG they are composed into. Groups are loaded from YAML and
//! normalized so that every group has a slug, an accessible label, and a
//! unique output filename before the composer runs.

use std::{
    collections::HashSet,
    fs,
    path::{Component, Path},
};

use serde::{Deserialize, Serialize};

use crate::{
    error::{self, Error},
    slug::SlugStrategy,
};

/// File extension applied to composed artifacts.
const DEFAULT_EXTENSION: &str = "svg";

/// Root configuration document listing every composition group.
///
/// # Examples
///
/// ```
/// use badgesmith::ComposeConfig;
///
/// let yaml = r#"
/// groups:
///   - name: build-tools
///     label: PNPM Bun
///     files: [21-pnpm-f69220.svg, 22-bun-000000.svg]
/// "#;
/// let config = ComposeConfig::parse(yaml,).expect("valid configuration",);
/// assert_eq!(config.groups[0].output, "build-tools.svg");
/// ```
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq,)]
#[serde(deny_unknown_fields)]
pub struct ComposeConfig
{
    /// Composition groups in execution order.
    #[serde(default)]
    pub groups: Vec<GroupEntry,>,
}

/// Raw configuration entry describing a single composition group.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq,)]
#[serde(deny_unknown_fields)]
pub struct GroupEntry
{
    /// Identifier of the group, also used to derive the default output name.
    pub name: String,

    /// Accessible label written to `aria-label` and `<title>`.
    #[serde(default, alias = "title", alias = "aria_label")]
    pub label: Option<String,>,

    /// Output filename relative to the output directory.
    #[serde(default, alias = "output_file")]
    pub output: Option<String,>,

    /// Badge filenames in left-to-right order.
    #[serde(default, alias = "badges")]
    pub files: Vec<String,>,
}

/// Normalized composition group consumed by the composer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize,)]
pub struct BadgeGroup
{
    /// Slug derived from the configured name.
    pub slug:   String,
    /// Accessible label of the combined image.
    pub label:  String,
    /// Output filename relative to the output directory.
    pub output: String,
    /// Badge filenames in left-to-right order.
    pub files:  Vec<String,>,
}

/// Normalized configuration holding validated groups.
#[derive(Debug, Clone, PartialEq, Eq, Serialize,)]
pub struct GroupsDocument
{
    /// Validated groups in execution order.
    pub groups: Vec<BadgeGroup,>,
}

impl ComposeConfig
{
    /// Loads and normalizes a YAML group configuration from disk.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`](Error::Io) when the file cannot be read and
    /// propagates the errors of [`ComposeConfig::parse`].
    pub fn load(path: &Path,) -> Result<GroupsDocument, Error,>
    {
        let contents = fs::read_to_string(path,).map_err(|source| error::io_error(path, source,),)?;
        Self::parse(&contents,)
    }

    /// Parses and normalizes a YAML group configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Parse`](Error::Parse) when the YAML cannot be decoded
    /// and [`Error::Validation`](Error::Validation) when a group is empty or
    /// collides with another group.
    pub fn parse(contents: &str,) -> Result<GroupsDocument, Error,>
    {
        let config: ComposeConfig = serde_yaml::from_str(contents,)?;
        config.normalize()
    }

    /// Returns the two groups shipped with the project.
    pub fn builtin() -> Self
    {
        Self {
            groups: vec![
                GroupEntry {
                    name:   "build-tools".to_owned(),
                    label:  Some("PNPM Bun Webpack Vite".to_owned(),),
                    output: Some("build-tools.svg".to_owned(),),
                    files:  vec![
                        "21-pnpm-f69220.svg".to_owned(),
                        "22-bun-000000.svg".to_owned(),
                        "23-webpack-8dd6f9.svg".to_owned(),
                        "24-vite-646cff.svg".to_owned(),
                    ],
                },
                GroupEntry {
                    name:   "collaboration-tools".to_owned(),
                    label:  Some("Figma Notion Slack Teams".to_owned(),),
                    output: Some("collaboration-tools.svg".to_owned(),),
                    files:  vec![
                        "28-figma-f24e1e.svg".to_owned(),
                        "29-notion-000000.svg".to_owned(),
                        "30-slack-4a154b.svg".to_owned(),
                        "31-teams-897bff.svg".to_owned(),
                    ],
                },
            ],
        }
    }

    /// Validates the raw entries and derives defaults.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`](Error::Validation) when the document has
    /// no groups, a group has no files or no usable name, or two groups share
    /// a slug or output filename.
    pub fn normalize(&self,) -> Result<GroupsDocument, Error,>
    {
        if self.groups.is_empty() {
            return Err(Error::validation("configuration must include at least one group",),);
        }

        let mut slugs = HashSet::with_capacity(self.groups.len(),);
        let mut outputs = HashSet::with_capacity(self.groups.len(),);
        let mut groups = Vec::with_capacity(self.groups.len(),);

        for entry in &self.groups {
            let group = entry.normalize()?;

            if !slugs.insert(group.slug.clone(),) {
                return Err(Error::validation(format!("duplicate group '{}'", group.slug),),);
            }
            if !outputs.insert(group.output.clone(),) {
                return Err(Error::validation(format!(
                    "group '{}' writes to '{}' which is already used by another group",
                    group.slug, group.output
                ),),);
            }

            groups.push(group,);
        }

        Ok(GroupsDocument {
            groups,
        },)
    }
}

impl GroupEntry
{
    fn normalize(&self,) -> Result<BadgeGroup, Error,>
    {
        let trimmed = self.name.trim();
        let slug = collapse_hyphens(&SlugStrategy::builder(trimmed,).build(),);
        if slug.is_empty() {
            return Err(Error::validation(format!("group name '{}' has no usable characters", self.name),),);
        }

        if self.files.is_empty() {
            return Err(Error::validation(format!("group '{slug}' must list at least one badge file"),),);
        }
        if let Some(blank,) = self.files.iter().position(|file| file.trim().is_empty(),) {
            return Err(Error::validation(format!("group '{slug}' has an empty filename at position {}", blank + 1),),);
        }

        let label = self
            .label
            .as_deref()
            .map(str::trim,)
            .filter(|value| !value.is_empty(),)
            .unwrap_or(trimmed,)
            .to_owned();

        let output = match self.output.as_deref().map(str::trim,) {
            Some(custom,) if !custom.is_empty() => custom.to_owned(),
            _ => format!("{slug}.{DEFAULT_EXTENSION}"),
        };
        if !is_contained(&output,) {
            return Err(Error::validation(format!(
                "group '{slug}' output '{output}' must be a relative path inside the output directory"
            ),),);
        }

        Ok(BadgeGroup {
            slug,
            label,
            output,
            files: self.files.iter().map(|file| file.trim().to_owned(),).collect(),
        },)
    }
}

impl GroupsDocument
{
    /// Keeps only the groups whose slug appears in `names`, preserving the
    /// configured order. An empty filter keeps every group.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`](Error::Validation) when a requested name
    /// does not match any group.
    pub fn select(self, names: &[String],) -> Result<Self, Error,>
    {
        if names.is_empty() {
            return Ok(self,);
        }

        for name in names {
            if !self.groups.iter().any(|group| &group.slug == name,) {
                return Err(Error::validation(format!("group '{name}' was not found"),),);
            }
        }

        Ok(Self {
            groups: self.groups.into_iter().filter(|group| names.contains(&group.slug,),).collect(),
        },)
    }
}

/// Output paths must stay below the output directory.
fn is_contained(output: &str,) -> bool
{
    let path = Path::new(output,);
    path.components().any(|component| matches!(component, Component::Normal(_,)),)
        && path.components().all(|component| matches!(component, Component::Normal(_,) | Component::CurDir),)
}

fn collapse_hyphens(raw: &str,) -> String
{
    raw.split('-',).filter(|part| !part.is_empty(),).collect::<Vec<_,>>().join("-",)
}
