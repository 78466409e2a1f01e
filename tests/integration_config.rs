// fataar-rs: Android library archive merger
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Integration tests for configuration loading.
//!
//! Tests layered TOML files and command-line overrides the way `main`
//! assembles them.

use fataar_rs::cli::global::GlobalOptions;
use fataar_rs::config::Config;
use fataar_rs::config::loader::ConfigLoader;
use fataar_rs::logging::LogLevel;
use fataar_rs::remap::RemapStrategy;
use fataar_rs::store::BuildContext;
use fataar_rs::values::DedupePolicy;

fn write_config(dir: &std::path::Path, name: &str, text: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, text).unwrap();
    path
}

// =============================================================================
// Layering
// =============================================================================

#[test]
fn config_later_files_override_earlier() {
    let temp = tempfile::tempdir().unwrap();
    let base = write_config(
        temp.path(),
        "fataar.toml",
        r#"
[project]
namespace = "com.sdk"

[remap]
strategy = "structural"
threads = 2
"#,
    );
    let local = write_config(
        temp.path(),
        "local.toml",
        r"
[remap]
threads = 6
",
    );

    let config = ConfigLoader::new()
        .add_toml_file(&base)
        .add_toml_file(&local)
        .build()
        .unwrap();
    assert_eq!(config.project.namespace.as_deref(), Some("com.sdk"));
    assert_eq!(config.remap.strategy, RemapStrategy::Structural);
    assert_eq!(config.remap.threads, Some(6));
}

#[test]
fn config_cli_overrides_win() {
    let temp = tempfile::tempdir().unwrap();
    let base = write_config(
        temp.path(),
        "fataar.toml",
        r#"
[global]
output_log_level = 1

[project]
namespace = "com.sdk"

[values]
policy = "split"
"#,
    );

    let global = GlobalOptions {
        log_level: Some(5),
        namespace: Some("com.override".to_string()),
        options: vec!["values.policy=strip-format".to_string()],
        ..GlobalOptions::default()
    };

    let mut loader = ConfigLoader::new().add_toml_file(&base);
    for assignment in global.to_config_overrides() {
        loader = loader.set_assignment(&assignment).unwrap();
    }
    let config = loader.build().unwrap();

    assert_eq!(config.global.output_log_level, LogLevel::TRACE);
    assert_eq!(config.global.file_log_level, LogLevel::TRACE);
    assert_eq!(config.project.namespace.as_deref(), Some("com.override"));
    assert_eq!(config.values.policy, DedupePolicy::StripFormat);
}

#[test]
fn config_invalid_override_fails_build() {
    let result = ConfigLoader::new()
        .set_assignment("project.namespace=not a package")
        .unwrap()
        .build();
    assert!(result.is_err());
}

#[test]
fn config_malformed_file_fails() {
    let temp = tempfile::tempdir().unwrap();
    let path = write_config(temp.path(), "broken.toml", "[project\nnamespace = ");
    assert!(Config::from_file(&path).is_err());
}

// =============================================================================
// Variants
// =============================================================================

#[test]
fn config_variants_build_the_store() {
    let config = Config::parse(
        r#"
[project]
namespace = "com.sdk"
exploded_root = "exploded"

[variants.debug]
dependencies = [{ group = "com.lib", name = "core", version = "1.0" }]

[variants.release]
namespace = "com.sdk.release"
dependencies = [
    { group = "com.lib", name = "core", version = "1.0" },
    { group = "com.lib", name = "ui", version = "2.1" },
]
"#,
    )
    .unwrap();

    let ctx = BuildContext::from_config(config).unwrap();
    assert_eq!(ctx.store().variants(), vec!["debug", "release"]);
    assert_eq!(ctx.target_namespace("debug"), Some("com.sdk"));
    assert_eq!(ctx.target_namespace("release"), Some("com.sdk.release"));

    let release = ctx.store().require("release").unwrap();
    assert_eq!(release.len(), 2);
    assert_eq!(
        release[1].root(),
        std::path::Path::new("exploded/com.lib/ui/2.1/release")
    );
}

#[test]
fn config_jar_dependency_rejected() {
    let config = Config::parse(
        r#"
[variants.release]
dependencies = [{ group = "com.lib", name = "util", version = "1.0", kind = "jar" }]
"#,
    )
    .unwrap();
    let err = BuildContext::from_config(config).unwrap_err();
    assert!(format!("{err:#}").contains("com.lib:util:1.0"));
}
