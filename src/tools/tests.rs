use super::*;
use crate::config::ToolsConfig;
use serde_json::json;
use std::path::PathBuf;

fn test_dir(tag: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("sleuth_test_{}_{}", tag, std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

fn registry_in(dir: &std::path::Path) -> ToolRegistry {
    let config = ToolsConfig {
        output_dir: Some(dir.to_string_lossy().into_owned()),
        ..ToolsConfig::default()
    };
    ToolRegistry::with_builtins(&config).unwrap()
}

#[tokio::test]
async fn test_registry_with_builtins() {
    let registry = registry_in(&std::env::temp_dir());
    assert_eq!(registry.len(), 3);
    assert!(!registry.is_empty());
    let defs = registry.definitions();
    assert_eq!(defs[0].name, "search");
    assert_eq!(defs[1].name, "wiki_search");
    assert_eq!(defs[2].name, "save_text_to_file");
    for def in &defs {
        assert_eq!(def.parameters["type"], "object");
    }
}

#[tokio::test]
async fn test_unknown_tool() {
    let registry = registry_in(&std::env::temp_dir());
    assert!(registry.get("nonexistent_tool").is_none());
    let result = registry.execute("nonexistent_tool", json!({})).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_search_rejects_bad_arguments() {
    let registry = registry_in(&std::env::temp_dir());
    let result = registry.execute("search", json!({"q": "typo"})).await;
    assert!(result.is_err());
    let empty = registry
        .execute("wiki_search", json!({"query": "   "}))
        .await
        .unwrap();
    assert!(empty.is_error);
}

#[tokio::test]
async fn test_save_default_filename_appends() {
    let dir = test_dir("save_default");
    let registry = registry_in(&dir);

    for text in ["first note", "second note"] {
        let result = registry
            .execute("save_text_to_file", json!({"text": text}))
            .await
            .unwrap();
        assert!(!result.is_error);
        assert_eq!(
            result.content,
            "Data successfully saved to research_output.txt"
        );
    }

    let written = std::fs::read_to_string(dir.join("research_output.txt")).unwrap();
    assert_eq!(written.matches("--- Research Output ---").count(), 2);
    assert!(written.find("first note").unwrap() < written.find("second note").unwrap());

    std::fs::remove_dir_all(&dir).unwrap();
}

#[tokio::test]
async fn test_save_custom_filename_creates_parents() {
    let dir = test_dir("save_nested");
    let registry = registry_in(&dir);
    let result = registry
        .execute(
            "save_text_to_file",
            json!({"text": "volcano", "filename": "notes/fuji.txt"}),
        )
        .await
        .unwrap();
    assert!(!result.is_error);

    let written = std::fs::read_to_string(dir.join("notes/fuji.txt")).unwrap();
    assert!(written.contains("volcano"));

    std::fs::remove_dir_all(&dir).unwrap();
}

#[tokio::test]
async fn test_save_path_escape() {
    let dir = test_dir("save_escape");
    let registry = registry_in(&dir);
    let result = registry
        .execute(
            "save_text_to_file",
            json!({"text": "bad", "filename": "../../../tmp/evil.txt"}),
        )
        .await;
    assert!(result.is_err());

    std::fs::remove_dir_all(&dir).unwrap();
}
