//! API key CLI commands: create, list.

use anyhow::Result;
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;

use crate::state::AppState;

/// Issue a key for `user` and print its plaintext once.
///
/// ```bash
/// mgdi keys create --user alice --name laptop
/// ```
pub async fn create_key(state: &AppState, user: &str, name: &str, json: bool) -> Result<()> {
    let issued = state.api_keys.create(user, name).await?;

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "id": issued.key.id,
                "user_id": issued.key.user_id,
                "name": issued.key.name,
                "created_at": issued.key.created_at,
                "key": issued.plaintext,
            }))?
        );
        return Ok(());
    }

    println!();
    println!(
        "  {} API key for '{}' (save this, it won't be shown again):",
        style("✓").green().bold(),
        style(&issued.key.user_id).bold()
    );
    println!();
    println!("  {}", style(&issued.plaintext).yellow().bold());
    println!();
    Ok(())
}

/// List issued keys.
pub async fn list_keys(state: &AppState, json: bool) -> Result<()> {
    let keys = state.api_keys.list().await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&keys)?);
        return Ok(());
    }

    if keys.is_empty() {
        println!();
        println!(
            "  {} No API keys yet. Create one with: {}",
            style("i").blue().bold(),
            style("mgdi keys create --user <id>").yellow()
        );
        println!();
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("Id").fg(Color::White),
        Cell::new("User").fg(Color::White),
        Cell::new("Name").fg(Color::White),
        Cell::new("Created").fg(Color::White),
        Cell::new("Last used").fg(Color::White),
    ]);

    for key in &keys {
        let last_used = key
            .last_used_at
            .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "never".to_string());
        table.add_row(vec![
            Cell::new(key.id.to_string()).fg(Color::DarkGrey),
            Cell::new(&key.user_id).fg(Color::Cyan),
            Cell::new(&key.name),
            Cell::new(key.created_at.format("%Y-%m-%d").to_string()),
            Cell::new(last_used).fg(Color::DarkGrey),
        ]);
    }

    println!();
    println!("{table}");
    println!();
    println!(
        "  {} key{}",
        style(keys.len()).bold(),
        if keys.len() == 1 { "" } else { "s" }
    );
    println!();
    Ok(())
}
