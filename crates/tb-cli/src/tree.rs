use crate::cmd::TreeArgs;
use crate::utils::{load_rule_table, read_input};
use anyhow::Context;
use tb_parser::Converter;
use tb_types::Dialect;

pub async fn run_tree_command(args: TreeArgs) -> anyhow::Result<()> {
    let table = load_rule_table(args.rules.as_deref()).await?;
    let input = read_input(args.file.as_deref()).await?;
    let rules = match Dialect::from(args.from) {
        Dialect::BBCode => table.bbcode_rules(),
        Dialect::Html => table.html_rules(),
    }
    .context("when building rules")?;
    let converter = Converter::new(rules, table.options());
    let tree = converter.parse(&input).context("when parsing input")?;
    let json = serde_json::to_string_pretty(&tree).context("when printing syntax tree")?;
    println!("{json}");
    Ok(())
}
