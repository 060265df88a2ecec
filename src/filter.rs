// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Artifact filtering by tag, file type, uploader and upload date

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::model::Artifact;
use crate::{Result, VitrineError};

/// Inclusive calendar-date window. Either bound may be open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl DateRange {
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start.map_or(true, |start| date >= start) && self.end.map_or(true, |end| date <= end)
    }

    pub fn is_open(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }
}

/// Active filter selection.
///
/// Categories combine with AND. Inside the tag category any one match is
/// enough. An empty category constrains nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FilterSpec {
    pub tags: BTreeSet<String>,
    pub file_types: BTreeSet<String>,
    pub uploaders: BTreeSet<String>,
    pub date_range: DateRange,
}

impl FilterSpec {
    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
            && self.file_types.is_empty()
            && self.uploaders.is_empty()
            && self.date_range.is_open()
    }

    pub fn matches(&self, artifact: &Artifact) -> bool {
        if !self.tags.is_empty() && !artifact.tags.iter().any(|t| self.tags.contains(t)) {
            return false;
        }
        if !self.file_types.is_empty() && !self.file_types.contains(&artifact.file_type) {
            return false;
        }
        if !self.uploaders.is_empty() && !self.uploaders.contains(&artifact.uploader) {
            return false;
        }
        self.date_range.contains(artifact.upload_date)
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags.extend(tags.into_iter().map(Into::into));
        self
    }

    pub fn with_file_types<I, S>(mut self, file_types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.file_types.extend(file_types.into_iter().map(Into::into));
        self
    }

    pub fn with_uploaders<I, S>(mut self, uploaders: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.uploaders.extend(uploaders.into_iter().map(Into::into));
        self
    }

    pub fn with_date_range(mut self, start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        self.date_range = DateRange { start, end };
        self
    }
}

/// Keep the artifacts that pass `spec`, in their original order
pub fn apply_filters<'a>(base: &[&'a Artifact], spec: &FilterSpec) -> Vec<&'a Artifact> {
    base.iter().copied().filter(|a| spec.matches(a)).collect()
}

/// Filter selection as it arrives in a URL query or form post.
///
/// List fields are comma separated; blank values mean "not set".
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FilterQuery {
    pub tags: Option<String>,
    pub file_types: Option<String>,
    pub uploaders: Option<String>,
    pub start: Option<String>,
    pub end: Option<String>,
}

impl FilterQuery {
    pub fn into_spec(self) -> Result<FilterSpec> {
        Ok(FilterSpec {
            tags: split_list(self.tags.as_deref()),
            file_types: split_list(self.file_types.as_deref()),
            uploaders: split_list(self.uploaders.as_deref()),
            date_range: DateRange {
                start: parse_date(self.start.as_deref())?,
                end: parse_date(self.end.as_deref())?,
            },
        })
    }
}

fn split_list(raw: Option<&str>) -> BTreeSet<String> {
    raw.unwrap_or("")
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

/// Parse a `YYYY-MM-DD` date; blank input is an open bound
pub fn parse_date(raw: Option<&str>) -> Result<Option<NaiveDate>> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map(Some)
            .map_err(|e| VitrineError::Validation(format!("Invalid date '{}': {}", s, e))),
    }
}

/// Choices offered in the filter panel
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterOptions {
    pub tags: Vec<String>,
    pub file_types: Vec<String>,
    pub uploaders: Vec<String>,
}

impl Default for FilterOptions {
    fn default() -> Self {
        let owned = |items: &[&str]| -> Vec<String> { items.iter().map(|s| s.to_string()).collect() };
        Self {
            tags: owned(&["animals", "citywork", "historical", "architecture", "nature"]),
            file_types: owned(&["image/png", "image/jpeg", "application/pdf", "video/mp4"]),
            uploaders: owned(&["John Doe", "Jane Smith", "Archive Admin"]),
        }
    }
}

impl FilterOptions {
    /// Defaults extended with every value present on `artifacts`, first seen first
    pub fn for_artifacts(artifacts: &[&Artifact]) -> Self {
        let mut options = Self::default();
        for artifact in artifacts {
            for tag in &artifact.tags {
                push_unique(&mut options.tags, tag);
            }
            push_unique(&mut options.file_types, &artifact.file_type);
            push_unique(&mut options.uploaders, &artifact.uploader);
        }
        options
    }
}

fn push_unique(list: &mut Vec<String>, value: &str) {
    if !value.is_empty() && !list.iter().any(|v| v == value) {
        list.push(value.to_string());
    }
}
