// fataar-rs: Android library archive merger
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

use crate::cli::merge::{MergeStep, MergeSteps};
use crate::cli::resources::SanitizeCommand;
use crate::cli::{Cli, Command};
use crate::remap::RemapStrategy;
use crate::values::DedupePolicy;
use clap::Parser;
use std::path::PathBuf;

#[test]
fn test_parse_version() {
    let cli = Cli::try_parse_from(["fataar", "version"]).unwrap();
    assert!(matches!(cli.command, Some(Command::Version)));
}

#[test]
fn test_parse_global_options() {
    let cli = Cli::try_parse_from([
        "fataar", "-l", "5", "-c", "a.toml", "-c", "b.toml", "-n", "com.sdk", "-s",
        "remap.threads=2", "options",
    ])
    .unwrap();
    assert_eq!(cli.global.configs, vec![PathBuf::from("a.toml"), PathBuf::from("b.toml")]);
    insta::assert_debug_snapshot!(cli.global.to_config_overrides(), @r#"
    [
        "remap.threads=2",
        "global.output_log_level=5",
        "global.file_log_level=5",
        "project.namespace=com.sdk",
    ]
    "#);
}

#[test]
fn test_log_level_out_of_range() {
    assert!(Cli::try_parse_from(["fataar", "-l", "7", "options"]).is_err());
}

#[test]
fn test_parse_remap() {
    let cli = Cli::try_parse_from([
        "fataar", "remap", "release", "-i", "classes", "-i", "kotlin", "-o", "out", "-j", "4",
        "--strategy", "structural", "--changes", "changes.json",
    ])
    .unwrap();
    let Some(Command::Remap(args)) = cli.command else {
        panic!("expected remap command");
    };
    assert_eq!(args.variant, "release");
    assert_eq!(args.inputs.len(), 2);
    assert_eq!(args.threads, Some(4));
    assert_eq!(args.strategy, Some(RemapStrategy::Structural));
    assert_eq!(args.changes, Some(PathBuf::from("changes.json")));
}

#[test]
fn test_remap_requires_input_and_rejects_full_with_changes() {
    assert!(Cli::try_parse_from(["fataar", "remap", "release", "-o", "out"]).is_err());
    assert!(
        Cli::try_parse_from([
            "fataar", "remap", "release", "-i", "c", "-o", "out", "--full", "--changes", "x.json",
        ])
        .is_err()
    );
}

#[test]
fn test_parse_values_and_sanitize() {
    let cli = Cli::try_parse_from(["fataar", "values", "debug", "--policy", "strip-format"]).unwrap();
    let Some(Command::Values(args)) = cli.command else {
        panic!("expected values command");
    };
    assert_eq!(args.policy, Some(DedupePolicy::StripFormat));

    let cli = Cli::try_parse_from([
        "fataar", "sanitize", "manifest", "debug", "--name", "android:icon", "--name",
        "android:label",
    ])
    .unwrap();
    let Some(Command::Sanitize(args)) = cli.command else {
        panic!("expected sanitize command");
    };
    let SanitizeCommand::Manifest(target) = args.command else {
        panic!("expected manifest target");
    };
    assert_eq!(target.names, vec!["android:icon", "android:label"]);
}

#[test]
fn test_merge_steps() {
    let cli = Cli::try_parse_from([
        "fataar", "merge", "release", "-i", "classes", "-o", "out", "--skip", "values",
        "--skip", "application-attrs",
    ])
    .unwrap();
    let Some(Command::Merge(args)) = cli.command else {
        panic!("expected merge command");
    };
    assert_eq!(args.skip, vec![MergeStep::Values, MergeStep::ApplicationAttrs]);
    assert_eq!(
        args.steps(),
        MergeSteps::STYLEABLES | MergeSteps::REMAP
    );
}

#[test]
fn test_merge_manifest_needs_both_paths() {
    assert!(Cli::try_parse_from(["fataar", "merge", "release", "--main", "AndroidManifest.xml"]).is_err());
    let cli = Cli::try_parse_from([
        "fataar", "merge", "release", "--main", "a.xml", "--manifest-out", "b.xml",
    ])
    .unwrap();
    let Some(Command::Merge(args)) = cli.command else {
        panic!("expected merge command");
    };
    assert!(args.steps().contains(MergeSteps::MANIFEST));
    assert!(!args.steps().contains(MergeSteps::REMAP));
}

#[test]
fn test_merge_reports_steps_missing_paths() {
    let parse = |args: &[&str]| {
        let cli = Cli::try_parse_from(["fataar", "merge", "release"].iter().chain(args)).unwrap();
        let Some(Command::Merge(args)) = cli.command else {
            panic!("expected merge command");
        };
        args
    };

    let bare = parse(&[]);
    assert_eq!(bare.unrunnable(), MergeSteps::REMAP | MergeSteps::MANIFEST);
    assert!(!bare.steps().intersects(MergeSteps::REMAP | MergeSteps::MANIFEST));

    let output_only = parse(&["-o", "out"]);
    assert_eq!(output_only.unrunnable(), MergeSteps::REMAP | MergeSteps::MANIFEST);

    let skipped = parse(&["--skip", "remap", "--skip", "manifest"]);
    assert_eq!(skipped.unrunnable(), MergeSteps::empty());

    let remap = parse(&["-i", "classes", "-o", "out"]);
    assert_eq!(remap.unrunnable(), MergeSteps::MANIFEST);
    assert!(remap.steps().contains(MergeSteps::REMAP));
}
