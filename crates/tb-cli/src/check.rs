use crate::cmd::CheckRulesArgs;
use crate::utils::load_rule_table;
use anyhow::Context;
use tb_parser::RuleSet;

fn print_summary(rules: &RuleSet, from_table: bool) {
    let source = if from_table { "table" } else { "built-in" };
    let dialect = rules.dialect().to_string();
    println!("{dialect} ({source}): {} tags", rules.tags().len());
    for tag in rules.tags() {
        let close = if tag.is_self_terminating() {
            "<no closing>"
        } else {
            tag.close()
        };
        println!("  {:<12} {:<14} {} variants", tag.open(), close, tag.variants().len());
    }
}

pub async fn run_check_rules_command(args: CheckRulesArgs) -> anyhow::Result<()> {
    let table = load_rule_table(Some(args.rules.as_str())).await?;
    let bbcode = table.bbcode_rules().context("when checking bbcode rules")?;
    let html = table.html_rules().context("when checking html rules")?;
    // Build the translator the same way conversions do.
    table.translator().context("when building translator")?;

    println!("decode_output: {}", table.decode_output);
    print_summary(&bbcode, table.bbcode.is_some());
    print_summary(&html, table.html.is_some());
    println!("rule table {} is valid", args.rules);
    Ok(())
}
