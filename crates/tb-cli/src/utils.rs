use anyhow::{Context, Result};
use tb_parser::RuleTable;
use tokio::fs;
use tokio::io::{self, AsyncReadExt};
use tracing::debug;

/// Read all text in `file`, or stdin when `file` is not set.
///
/// # Errors
///
/// When failed to io on the file or stdin, or the content is not utf-8.
pub async fn read_input(file: Option<&str>) -> Result<String> {
    match file {
        Some(path) => fs::read_to_string(path)
            .await
            .with_context(|| format!("when reading input file {path}")),
        None => {
            let mut content = String::new();
            io::stdin()
                .read_to_string(&mut content)
                .await
                .context("when reading input from stdin")?;
            Ok(content)
        }
    }
}

/// Load the rule table at `path`, or the built-in table when `path` is not set.
///
/// # Errors
///
/// When failed to read the file or it is not a valid rule table.
pub async fn load_rule_table(path: Option<&str>) -> Result<RuleTable> {
    let path = match path {
        Some(v) => v,
        None => return Ok(RuleTable::default()),
    };
    let content = fs::read_to_string(path)
        .await
        .with_context(|| format!("when reading rule table {path}"))?;
    let table = RuleTable::from_toml(&content).with_context(|| format!("when loading {path}"))?;
    debug!("loaded rule table from {path}");
    Ok(table)
}
