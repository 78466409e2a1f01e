// fataar-rs: Android library archive merger
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! End-to-end tests: exploded archives on disk, a config, and the command
//! handlers run against a `BuildContext`.

use std::path::{Path, PathBuf};

use fataar_rs::archive::ArtifactDescriptor;
use fataar_rs::classfile::ClassFile;
use fataar_rs::cli::merge::{MergeArgs, MergeStep};
use fataar_rs::cli::remap::RemapArgs;
use fataar_rs::cli::resources::ValuesArgs;
use fataar_rs::cmd::merge::run_merge_command;
use fataar_rs::cmd::remap::run_remap_command;
use fataar_rs::cmd::resources::run_values_command;
use fataar_rs::cmd::table::rename_table;
use fataar_rs::config::Config;
use fataar_rs::config::types::VariantConfig;
use fataar_rs::store::BuildContext;
use fataar_rs::values::DedupePolicy;

// =============================================================================
// Fixtures
// =============================================================================

/// Minimal class file whose pool references `owner.field:I`.
fn class_with_field_ref(this: &str, owner: &str, field: &str) -> Vec<u8> {
    fn utf8(pool: &mut Vec<u8>, value: &str) {
        pool.push(1);
        pool.extend_from_slice(&u16::try_from(value.len()).unwrap().to_be_bytes());
        pool.extend_from_slice(value.as_bytes());
    }

    let mut pool = Vec::new();
    utf8(&mut pool, this); // 1
    pool.extend_from_slice(&[7, 0, 1]); // 2 Class
    utf8(&mut pool, owner); // 3
    pool.extend_from_slice(&[7, 0, 3]); // 4 Class
    utf8(&mut pool, field); // 5
    utf8(&mut pool, "I"); // 6
    pool.extend_from_slice(&[12, 0, 5, 0, 6]); // 7 NameAndType
    pool.extend_from_slice(&[9, 0, 4, 0, 7]); // 8 Fieldref

    let mut out = Vec::new();
    out.extend_from_slice(&0xCAFE_BABE_u32.to_be_bytes());
    out.extend_from_slice(&[0, 0, 0, 52]);
    out.extend_from_slice(&9u16.to_be_bytes());
    out.extend_from_slice(&pool);
    out.extend_from_slice(&[0x00, 0x21, 0, 2]);
    out.extend_from_slice(&[0; 10]);
    out
}

fn class_names(bytes: &[u8]) -> Vec<String> {
    let class = ClassFile::parse(bytes).unwrap();
    class
        .class_indices()
        .into_iter()
        .map(|index| class.class_name(index).unwrap().into_owned())
        .collect()
}

fn contains(haystack: &[u8], needle: &str) -> bool {
    haystack
        .windows(needle.len())
        .any(|window| window == needle.as_bytes())
}

fn write(path: &Path, contents: impl AsRef<[u8]>) {
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, contents).unwrap();
}

const CORE_VALUES: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<resources>
    <declare-styleable name="Toolbar">
        <attr name="colorPrimary" format="color"/>
    </declare-styleable>
    <declare-styleable name="Chip">
        <attr name="colorPrimary" format="color"/>
    </declare-styleable>
    <declare-styleable name="Legacy">
        <attr name="legacyMode" format="boolean"/>
    </declare-styleable>
    <string name="app_name">Core</string>
</resources>
"#;

const UI_MANIFEST: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<manifest xmlns:android="http://schemas.android.com/apk/res/android" package="com.lib.ui">
    <application android:icon="@drawable/icon" android:label="@string/app_name"/>
</manifest>
"#;

struct Project {
    _temp: tempfile::TempDir,
    core: PathBuf,
    ui: PathBuf,
    classes: PathBuf,
    out: PathBuf,
    ctx: BuildContext,
}

fn project() -> Project {
    let temp = tempfile::tempdir().unwrap();
    let core = temp.path().join("exploded/core");
    let ui = temp.path().join("exploded/ui");
    let classes = temp.path().join("classes");
    let out = temp.path().join("out");

    write(
        &core.join("AndroidManifest.xml"),
        r#"<manifest package="com.lib.core"/>"#,
    );
    write(&core.join("res/values/values.xml"), CORE_VALUES);
    write(&ui.join("AndroidManifest.xml"), UI_MANIFEST);

    write(
        &classes.join("com/lib/core/Widget.class"),
        class_with_field_ref("com/lib/core/Widget", "com/lib/core/R$string", "app_name"),
    );
    write(
        &classes.join("com/lib/ui/Screen.class"),
        class_with_field_ref("com/lib/ui/Screen", "com/lib/ui/R$layout", "screen"),
    );
    write(&classes.join("META-INF/lib.kotlin_module"), b"module");

    let mut config = Config::parse(
        r#"
[project]
namespace = "com.sdk"

[sanitize]
styleables = ["Legacy"]
application_attrs = ["android:icon"]
"#,
    )
    .unwrap();
    config.variants.insert(
        "release".to_string(),
        VariantConfig {
            namespace: None,
            dependencies: vec![
                ArtifactDescriptor::aar("com.lib", "core", "1.0").with_root(&core),
                ArtifactDescriptor::aar("com.lib", "ui", "2.1").with_root(&ui),
            ],
        },
    );

    let ctx = BuildContext::from_config(config).unwrap();
    Project {
        _temp: temp,
        core,
        ui,
        classes,
        out,
        ctx,
    }
}

// =============================================================================
// Rename table
// =============================================================================

#[test]
fn table_maps_every_dependency_to_the_consumer() {
    let project = project();
    let table = rename_table(&project.ctx, "release").unwrap();

    assert_eq!(table.target_namespace(), "com.sdk");
    assert_eq!(table.source_namespaces(), ["com.lib.core", "com.lib.ui"]);
    assert_eq!(table.get("com/lib/ui/R$layout"), Some("com/sdk/R$layout"));
    assert_eq!(table.get("com/sdk/R$layout"), None);
}

#[test]
fn table_unknown_variant_fails() {
    let project = project();
    let err = rename_table(&project.ctx, "staging").unwrap_err();
    assert!(err.to_string().contains("staging"));
}

// =============================================================================
// Remap
// =============================================================================

#[tokio::test]
async fn remap_command_rewrites_symbol_references() {
    let project = project();
    let args = RemapArgs {
        variant: "release".to_string(),
        inputs: vec![project.classes.clone()],
        output: project.out.clone(),
        changes: None,
        full: false,
        threads: Some(2),
        strategy: None,
    };
    run_remap_command(&args, &project.ctx).await.unwrap();

    let widget = std::fs::read(project.out.join("com/lib/core/Widget.class")).unwrap();
    assert_eq!(
        class_names(&widget),
        vec!["com/lib/core/Widget", "com/sdk/R$string"]
    );

    let screen = std::fs::read(project.out.join("com/lib/ui/Screen.class")).unwrap();
    assert!(contains(&screen, "com/sdk/R$layout"));

    assert!(!project.out.join("META-INF/lib.kotlin_module").exists());
}

// =============================================================================
// Values
// =============================================================================

#[test]
fn values_command_strip_format_policy() {
    let project = project();
    let args = ValuesArgs {
        variant: "release".to_string(),
        policy: Some(DedupePolicy::StripFormat),
        file: None,
    };
    run_values_command(&args, &project.ctx).unwrap();

    let text = std::fs::read_to_string(project.core.join("res/values/values.xml")).unwrap();
    assert_eq!(text.matches("format=\"color\"").count(), 1);
    assert!(!project.core.join("res/values/values0.xml").exists());
}

// =============================================================================
// Merge
// =============================================================================

#[tokio::test]
async fn merge_runs_resource_steps_then_remap() {
    let project = project();
    let args = MergeArgs {
        variant: "release".to_string(),
        inputs: vec![project.classes.clone()],
        output: Some(project.out.clone()),
        changes: None,
        main: None,
        manifest_out: None,
        skip: Vec::new(),
    };
    run_merge_command(&args, &project.ctx).await.unwrap();

    let values_dir = project.core.join("res/values");
    let main = std::fs::read_to_string(values_dir.join("values.xml")).unwrap();
    assert!(!main.contains("Legacy"));
    assert!(!main.contains("colorPrimary"));
    assert!(main.contains("app_name"));
    assert!(values_dir.join("values0.xml").is_file());
    assert!(values_dir.join("values1.xml").is_file());

    let manifest = std::fs::read_to_string(project.ui.join("AndroidManifest.xml")).unwrap();
    assert!(!manifest.contains("android:icon"));
    assert!(manifest.contains("android:label"));

    let widget = std::fs::read(project.out.join("com/lib/core/Widget.class")).unwrap();
    assert!(contains(&widget, "com/sdk/R$string"));
}

#[tokio::test]
async fn merge_skip_leaves_resources_alone() {
    let project = project();
    let args = MergeArgs {
        variant: "release".to_string(),
        inputs: Vec::new(),
        output: None,
        changes: None,
        main: None,
        manifest_out: None,
        skip: vec![MergeStep::Values, MergeStep::ApplicationAttrs],
    };
    run_merge_command(&args, &project.ctx).await.unwrap();

    let main = std::fs::read_to_string(project.core.join("res/values/values.xml")).unwrap();
    assert!(!main.contains("Legacy"));
    assert_eq!(main.matches("colorPrimary").count(), 2);

    let manifest = std::fs::read_to_string(project.ui.join("AndroidManifest.xml")).unwrap();
    assert!(manifest.contains("android:icon"));
    assert!(!project.out.exists());
}

#[tokio::test]
async fn merge_unknown_variant_fails_before_any_step() {
    let project = project();
    let args = MergeArgs {
        variant: "staging".to_string(),
        inputs: vec![project.classes.clone()],
        output: Some(project.out.clone()),
        changes: None,
        main: None,
        manifest_out: None,
        skip: Vec::new(),
    };
    assert!(run_merge_command(&args, &project.ctx).await.is_err());
    assert!(!project.out.exists());
    let main = std::fs::read_to_string(project.core.join("res/values/values.xml")).unwrap();
    assert!(main.contains("Legacy"));
}
