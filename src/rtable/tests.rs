// fataar-rs: Android library archive merger
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

use super::{RenameTable, ResourceCategory, symbol_class, to_dotted};

fn deps(names: &[&str]) -> Vec<String> {
    names.iter().map(ToString::to_string).collect()
}

#[test]
fn test_absent_inputs_yield_no_table() {
    let dependencies = deps(&["com.lib"]);
    assert!(RenameTable::build(None, Some(dependencies.as_slice())).is_none());
    assert!(RenameTable::build(Some("com.sdk"), None).is_none());
}

#[test]
fn test_every_category_mapped() {
    let dependencies = deps(&["com.lib1", "com.lib2"]);
    let table = RenameTable::build(Some("com.sdk"), Some(dependencies.as_slice())).unwrap();

    assert_eq!(table.len(), 2 * ResourceCategory::ALL.len());
    for category in ResourceCategory::ALL {
        let target = symbol_class("com.sdk", category);
        assert_eq!(table.get(&symbol_class("com.lib1", category)), Some(target.as_str()));
        assert_eq!(table.get(&symbol_class("com.lib2", category)), Some(target.as_str()));
    }
    assert_eq!(table.get("com/lib1/R$string"), Some("com/sdk/R$string"));
    assert_eq!(table.get("com/lib1/R"), None);
    assert_eq!(table.get("com/other/R$string"), None);
}

#[test]
fn test_never_maps_to_self() {
    let dependencies = deps(&["com.sdk", "com.lib", "com.lib"]);
    let table = RenameTable::build(Some("com.sdk"), Some(dependencies.as_slice())).unwrap();

    assert_eq!(table.source_namespaces(), ["com.lib".to_string()]);
    assert!(table.iter().all(|(source, target)| source != target));
    assert_eq!(table.get("com/sdk/R$id"), None);
}

#[test]
fn test_empty_dependencies_give_empty_table() {
    let table = RenameTable::build(Some("com.sdk"), Some([].as_slice())).unwrap();
    assert!(table.is_empty());
    assert_eq!(table.target_namespace(), "com.sdk");
}

#[test]
fn test_entries_carry_namespace_and_category() {
    let dependencies = deps(&["com.lib"]);
    let table = RenameTable::build(Some("com.sdk"), Some(dependencies.as_slice())).unwrap();

    let rows: Vec<String> = table
        .entries()
        .take(3)
        .map(|e| format!("{} {} {} -> {}", e.source_namespace, e.category, to_dotted(e.source), to_dotted(e.target)))
        .collect();
    insta::assert_debug_snapshot!(rows, @r#"
    [
        "com.lib anim com.lib.R$anim -> com.sdk.R$anim",
        "com.lib animator com.lib.R$animator -> com.sdk.R$animator",
        "com.lib array com.lib.R$array -> com.sdk.R$array",
    ]
    "#);
}

#[test]
fn test_split_symbol_class() {
    assert_eq!(
        ResourceCategory::split_symbol_class("com/sdk/R$styleable"),
        Some(("com/sdk", ResourceCategory::Styleable))
    );
    assert_eq!(ResourceCategory::split_symbol_class("com/sdk/R$unknown"), None);
    assert_eq!(ResourceCategory::split_symbol_class("com/sdk/R"), None);
}

#[test]
fn test_category_parse() {
    assert_eq!("navigation".parse::<ResourceCategory>().unwrap(), ResourceCategory::Navigation);
    assert!("Navigation".parse::<ResourceCategory>().is_err());
}
