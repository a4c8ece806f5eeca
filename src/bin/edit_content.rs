//! Operator CLI for editing site content without the admin panel.
//!
//! Usage:
//!   edit-content <lang> show <path>
//!   edit-content <lang> set <path> <value> [--publish]
//!   edit-content <lang> set-item <list-path> <index> <field> <value> [--publish]
//!   edit-content <lang> add-item <list-path> <value> [--publish]
//!   edit-content <lang> remove-item <list-path> <index> [--publish]
//!   edit-content publish
//!
//! Values are parsed as JSON; anything that is not valid JSON is taken as a
//! plain string, so `set hero.title Welcome` works without quoting.
//!
//! Optional environment variables:
//! - LOCALES_DIR (defaults to locales)
//! - PUBLISH_REPO_DIR (defaults to .)
//! - PUBLISH_REMOTE (defaults to origin)
//! - PUBLISH_BRANCH (defaults to main)

use anyhow::{bail, Context, Result};
use serde_json::Value;
use std::sync::Arc;
use tracing::info;
use vailite_site::content::{ContentEditor, FileContentStore, LanguageCode};
use vailite_site::publish::{GitPublisher, PublishTrigger};

const USAGE: &str = "usage: edit-content <lang> <show|set|set-item|add-item|remove-item> ... [--publish]\n       edit-content publish";

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn parse_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

fn parse_index(raw: &str) -> Result<usize> {
    raw.parse()
        .with_context(|| format!("'{}' is not a list index", raw))
}

/// Apply one edit command to the loaded buffer. Returns false for `show`.
fn apply(editor: &mut ContentEditor, command: &str, args: &[&str]) -> Result<bool> {
    match (command, args) {
        ("show", [path]) => {
            let value = editor.get(path)?;
            println!("{}", serde_json::to_string_pretty(&value)?);
            Ok(false)
        }
        ("set", [path, value]) => {
            editor.set_field(path, parse_value(value))?;
            Ok(true)
        }
        ("set-item", [list, index, field, value]) => {
            editor.set_list_item_field(list, parse_index(index)?, field, parse_value(value))?;
            Ok(true)
        }
        ("add-item", [list, value]) => {
            let index = editor.add_list_item(list, parse_value(value))?;
            println!("Added item at index {}", index);
            Ok(true)
        }
        ("remove-item", [list, index]) => {
            editor.remove_list_item(list, parse_index(index)?)?;
            Ok(true)
        }
        _ => bail!("unrecognised command '{}'\n{}", command, USAGE),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("vailite_site=info".parse()?),
        )
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let publish_flag = args.iter().any(|arg| arg == "--publish");
    let args: Vec<&str> = args
        .iter()
        .map(String::as_str)
        .filter(|arg| *arg != "--publish")
        .collect();

    let publisher = Arc::new(GitPublisher::new(
        env_or("PUBLISH_REPO_DIR", "."),
        &env_or("PUBLISH_REMOTE", "origin"),
        &env_or("PUBLISH_BRANCH", "main"),
    ));

    if args.first() == Some(&"publish") {
        let outcome = publisher.publish().await?;
        println!("{}", outcome.message());
        return Ok(());
    }

    let [lang, command, rest @ ..] = args.as_slice() else {
        bail!("{}", USAGE);
    };
    let lang = LanguageCode::parse(lang)?;

    let store = Arc::new(FileContentStore::new(env_or("LOCALES_DIR", "locales")));
    let mut editor = ContentEditor::new(store, publisher);
    editor
        .load(&lang)
        .with_context(|| format!("Failed to load '{}' content", lang))?;

    if !apply(&mut editor, command, rest)? {
        return Ok(());
    }

    editor.save()?;
    info!("Saved '{}' content", lang);

    if publish_flag {
        let outcome = editor.publish().await?;
        println!("{}", outcome.message());
    }
    Ok(())
}
