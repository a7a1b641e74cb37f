//! `modlist show`

use std::path::Path;

use byomod_modlist::{ListSummary, ModerationList, PlatformRegistry};

use crate::CliError;

pub fn cmd_show(path: &Path, json: bool) -> Result<(), CliError> {
    if !path.exists() {
        return Err(CliError::args(format!("list not found: {}", path.display())));
    }
    let list = ModerationList::load(path, PlatformRegistry::builtin())?;
    let summary = list.summary();

    if json {
        let text = serde_json::to_string_pretty(&summary).map_err(|e| CliError::general(e.to_string()))?;
        println!("{}", text);
    } else {
        print!("{}", render(&summary));
    }
    Ok(())
}

fn render(summary: &ListSummary) -> String {
    let mut out = String::new();
    out.push_str(&format!("{}\n", summary.list_name));
    out.push_str(&format!("  last updated: {}\n", summary.last_updated.to_rfc3339()));
    out.push_str(&format!(
        "  blocks: {}  accounts: {}  trusts: {}  recommends: {}\n",
        summary.blocks, summary.accounts, summary.trusts, summary.recommends
    ));
    if !summary.category_counts.is_empty() {
        out.push_str("  categories:\n");
        let width = summary.category_counts.keys().map(|k| k.len()).max().unwrap_or(0);
        for (category, count) in &summary.category_counts {
            out.push_str(&format!("    {:<width$}  {}\n", category, count, width = width));
        }
    }
    out
}
