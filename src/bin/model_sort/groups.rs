//! Grouping and version-family detection over scanned files.
//!
//! Everything here is pure classification over in-memory records:
//! stem grouping, underscore-prefix version detection, orphan matching,
//! and per-group action planning. Filesystem mutation lives in
//! [`crate::model_sort`].

use std::cmp::Reverse;
use std::collections::{BTreeMap, HashMap, HashSet};

use itertools::Itertools;

use crate::config::IgnoreRules;
use crate::extensions::{ExtensionSet, FileKind};
use crate::types::{DuplicateSet, FileRecord, GroupPlan};

/// Reserved stem collecting files whose name matches no known extension.
pub const UNKNOWN_GROUP: &str = "unknown";

/// Files bucketed by stem, in scan order within each bucket.
pub type Groups = HashMap<String, Vec<FileRecord>>;

/// Version-family base name to its member stems, sorted lexicographically.
/// `BTreeMap` keeps base iteration deterministic for orphan matching.
pub type VersionMap = BTreeMap<String, Vec<String>>;

/// Partition files into stem groups, applying the ignore rules.
///
/// Files whose name is ignored or matches an ignored extension suffix are
/// skipped entirely. Files without a recognized extension land in the
/// [`UNKNOWN_GROUP`] bucket. Buckets whose stem matches an ignored group
/// name are dropped after bucketing.
pub fn group_files(files: Vec<FileRecord>, extensions: &ExtensionSet, ignore: &IgnoreRules) -> Groups {
    let mut groups: Groups = HashMap::new();

    for file in files {
        if ignore.skip_file(&file.name) {
            continue;
        }
        let stem = extensions
            .split(&file.name)
            .map(|(stem, _)| stem.to_string())
            .filter(|stem| !stem.is_empty());

        match stem {
            Some(stem) => groups.entry(stem).or_default().push(file),
            None => groups.entry(UNKNOWN_GROUP.to_string()).or_default().push(file),
        }
    }

    groups.retain(|stem, _| !ignore.skip_group(stem));
    groups
}

/// True when any file in the bucket classifies as a model.
pub(crate) fn group_has_model(files: &[FileRecord], extensions: &ExtensionSet) -> bool {
    files.iter().any(|file| extensions.classify(&file.name) == FileKind::Model)
}

/// Decompose group stems by `_` to find common bases (versions of the same model).
///
/// Each stem generates every underscore prefix-join of itself as a candidate
/// base, the full stem included. A candidate is retained only when it has
/// more than one member stem and at least one member contains a model file.
/// Redundant bases are then dropped: when a longer retained base starts
/// with a shorter retained base and both cover the same member set, the
/// shorter one is removed and the longer, more descriptive name wins.
pub fn detect_versions(groups: &Groups, extensions: &ExtensionSet, ignore: &IgnoreRules) -> VersionMap {
    let mut candidates: HashMap<String, Vec<String>> = HashMap::new();

    for stem in groups.keys().filter(|stem| stem.as_str() != UNKNOWN_GROUP).sorted() {
        let mut base = String::new();
        for (index, part) in stem.split('_').enumerate() {
            if index > 0 {
                base.push('_');
            }
            base.push_str(part);
            if ignore.skip_group(&base) {
                continue;
            }
            candidates.entry(base.clone()).or_default().push(stem.clone());
        }
    }

    let mut version_map: VersionMap = BTreeMap::new();
    for (base, mut stems) in candidates {
        let has_model = stems
            .iter()
            .any(|stem| groups.get(stem).is_some_and(|files| group_has_model(files, extensions)));
        if stems.len() > 1 && has_model {
            stems.sort();
            version_map.insert(base, stems);
        }
    }

    // Drop redundant bases: iterate longest first so the most specific
    // name absorbs shorter prefixes with an identical member set.
    let ordered_bases: Vec<String> = version_map
        .keys()
        .cloned()
        .sorted_by_key(|base| (Reverse(base.len()), base.clone()))
        .collect();
    let mut removed: HashSet<String> = HashSet::new();
    for (index, long_base) in ordered_bases.iter().enumerate() {
        if removed.contains(long_base) {
            continue;
        }
        for short_base in &ordered_bases[index + 1..] {
            if removed.contains(short_base) {
                continue;
            }
            if long_base.starts_with(short_base.as_str()) && version_map[long_base] == version_map[short_base] {
                removed.insert(short_base.clone());
            }
        }
    }
    for base in &removed {
        version_map.remove(base);
    }

    version_map
}

/// Associate orphan groups with the version family they likely belong to.
///
/// An orphan group is a stem without any model file. A stem that is itself
/// a family base self-matches. Otherwise family bases are checked in
/// ascending lexicographic order and the last prefix match wins, which is
/// the longest matching base since nested prefixes sort shorter-first.
pub fn match_orphans(groups: &Groups, extensions: &ExtensionSet, versions: &VersionMap) -> BTreeMap<String, String> {
    let mut matches: BTreeMap<String, String> = BTreeMap::new();

    let orphan_stems = groups
        .iter()
        .filter(|(stem, files)| stem.as_str() != UNKNOWN_GROUP && !group_has_model(files, extensions))
        .map(|(stem, _)| stem);

    for orphan in orphan_stems {
        if versions.contains_key(orphan) {
            matches.insert(orphan.clone(), orphan.clone());
            continue;
        }
        for base in versions.keys() {
            if orphan.starts_with(base.as_str()) {
                matches.insert(orphan.clone(), base.clone());
            }
        }
    }

    matches
}

/// Compute the orphan, duplicate, and move actions implied by one group's
/// file placement. Pure classification: the execution layer decides what
/// actually happens on disk.
pub fn plan_group(files: &[FileRecord], extensions: &ExtensionSet) -> GroupPlan {
    let mut plan = GroupPlan::default();

    let models: Vec<&FileRecord> = files
        .iter()
        .filter(|file| extensions.classify(&file.name) == FileKind::Model)
        .collect();
    let sidecars: Vec<&FileRecord> = files
        .iter()
        .filter(|file| extensions.classify(&file.name) == FileKind::Sidecar)
        .collect();

    let Some(first_model) = models.first() else {
        if !sidecars.is_empty() {
            plan.orphans = sidecars.into_iter().cloned().collect();
        }
        return plan;
    };

    let target_dir = first_model.parent().to_path_buf();

    // Bucket sidecars by their own longest-matched extension,
    // preserving the order in which extensions are first seen.
    let mut buckets: Vec<(String, Vec<FileRecord>)> = Vec::new();
    for sidecar in &sidecars {
        if let Some((_, extension)) = extensions.split(&sidecar.name) {
            match buckets.iter_mut().find(|(ext, _)| ext.as_str() == extension) {
                Some((_, bucket)) => bucket.push((*sidecar).clone()),
                None => buckets.push((extension.to_string(), vec![(*sidecar).clone()])),
            }
        }
    }
    for (extension, bucket) in buckets {
        if bucket.len() > 1 {
            // Prefer to keep the copy already next to the model,
            // otherwise the first one in scan order.
            let keeper = bucket
                .iter()
                .position(|file| file.parent() == target_dir)
                .unwrap_or(0);
            plan.duplicates.push(DuplicateSet {
                extension,
                files: bucket,
                keeper,
            });
        }
    }

    plan.moves = sidecars
        .iter()
        .filter(|sidecar| sidecar.parent() != target_dir)
        .map(|sidecar| (*sidecar).clone())
        .collect();
    plan.target_dir = Some(target_dir);

    plan
}


#[cfg(test)]
mod version_tests {
    use super::*;

    use std::path::PathBuf;

    fn records(paths: &[&str]) -> Vec<FileRecord> {
        paths.iter().map(|path| FileRecord::new(PathBuf::from(path))).collect()
    }

    fn detect(paths: &[&str]) -> VersionMap {
        let extensions = ExtensionSet::new();
        let ignore = IgnoreRules::default();
        let groups = group_files(records(paths), &extensions, &ignore);
        detect_versions(&groups, &extensions, &ignore)
    }

    #[test]
    fn family_retained_with_two_stems_and_a_model() {
        let versions = detect(&["/m/Foo_v1.safetensors", "/m/Foo_v2.preview.png"]);
        assert_eq!(versions.len(), 1);
        assert_eq!(versions["Foo"], vec!["Foo_v1", "Foo_v2"]);
    }

    #[test]
    fn no_family_without_any_model() {
        let versions = detect(&["/m/Bar_a.civitai.info", "/m/Bar_b.preview.png"]);
        assert!(versions.is_empty());
    }

    #[test]
    fn no_family_for_a_single_stem() {
        let versions = detect(&["/m/Solo_v1.safetensors", "/m/Solo_v1.preview.png"]);
        assert!(versions.is_empty());
    }

    #[test]
    fn member_lists_are_sorted() {
        let versions = detect(&[
            "/m/Urd_v2.safetensors",
            "/m/Urd_v10.safetensors",
            "/m/Urd_v1.safetensors",
        ]);
        assert_eq!(versions["Urd"], vec!["Urd_v1", "Urd_v10", "Urd_v2"]);
    }

    #[test]
    fn redundant_shorter_base_is_subsumed() {
        // "Urd" and "Urd_from" cover exactly the same stems; only the
        // longer, more specific base survives.
        let versions = detect(&["/m/Urd_from_v1.safetensors", "/m/Urd_from_v2.safetensors"]);
        assert_eq!(versions.keys().collect::<Vec<_>>(), vec!["Urd_from"]);
        assert_eq!(versions["Urd_from"], vec!["Urd_from_v1", "Urd_from_v2"]);
    }

    #[test]
    fn distinct_member_sets_keep_both_bases() {
        let versions = detect(&[
            "/m/Urd_a.safetensors",
            "/m/Urd_b.safetensors",
            "/m/Urd_from_v1.safetensors",
            "/m/Urd_from_v2.safetensors",
        ]);
        // "Urd" covers all four stems, "Urd_from" only two
        assert_eq!(versions["Urd"].len(), 4);
        assert_eq!(versions["Urd_from"].len(), 2);
    }

    #[test]
    fn ignored_bases_are_never_candidates() {
        let extensions = ExtensionSet::new();
        let ignore = IgnoreRules::from_user_config(crate::config::UserConfig {
            ignore_groups: vec!["Urd".to_string()],
            ..crate::config::UserConfig::default()
        });
        let groups = group_files(
            records(&["/m/Urd_v1.safetensors", "/m/Urd_v2.safetensors"]),
            &extensions,
            &ignore,
        );
        let versions = detect_versions(&groups, &extensions, &ignore);
        assert!(!versions.contains_key("Urd"));
    }

    #[test]
    fn unknown_bucket_generates_no_candidates() {
        let versions = detect(&["/m/readme_a.zip", "/m/readme_b.zip", "/m/Urd.safetensors"]);
        assert!(versions.is_empty());
    }
}
