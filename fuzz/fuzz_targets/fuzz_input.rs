// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

use vitrine::collections::derive_collections;
use vitrine::download::download_filename;
use vitrine::filter::{apply_filters, FilterQuery};
use vitrine::model::Artifact;
use vitrine::visibility::visible_artifacts;

#[derive(Debug, Arbitrary)]
struct Input {
    title: String,
    file_type: String,
    tags: Option<String>,
    start: Option<String>,
    end: Option<String>,
    seed: String,
}

fuzz_target!(|input: Input| {
    let name = download_filename(&input.title, &input.file_type);
    assert!(!name.contains('/') && !name.contains('\\'));
    let (slug, _) = name.split_once('.').unwrap_or((&name, ""));
    assert!(slug.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-'));
    assert!(!slug.starts_with('-') && !slug.ends_with('-'));

    let query = FilterQuery {
        tags: input.tags,
        start: input.start,
        end: input.end,
        ..Default::default()
    };
    let Ok(spec) = query.into_spec() else {
        return;
    };

    if let Ok(artifacts) = serde_json::from_str::<Vec<Artifact>>(&input.seed) {
        let visible = visible_artifacts(&artifacts, false);
        let filtered = apply_filters(&visible, &spec);
        assert!(filtered.len() <= visible.len());
        let _ = derive_collections(&visible, &[]);
    }
});
