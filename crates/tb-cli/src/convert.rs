use crate::cmd::{ToBBCodeArgs, ToHtmlArgs};
use crate::utils::{load_rule_table, read_input};
use anyhow::Context;
use tb_parser::Converter;

pub async fn run_to_html_command(args: ToHtmlArgs) -> anyhow::Result<()> {
    let table = load_rule_table(args.rules.as_deref()).await?;
    let input = read_input(args.file.as_deref()).await?;
    let converter = Converter::new(
        table.bbcode_rules().context("when building bbcode rules")?,
        table.options(),
    );
    let html = converter
        .convert(&input)
        .context("when converting bbcode to html")?;
    println!("{html}");
    Ok(())
}

pub async fn run_to_bbcode_command(args: ToBBCodeArgs) -> anyhow::Result<()> {
    let table = load_rule_table(args.rules.as_deref()).await?;
    let input = read_input(args.file.as_deref()).await?;
    let mut options = table.options();
    if args.raw {
        options.decode_output = false;
    }
    let converter = Converter::new(
        table.html_rules().context("when building html rules")?,
        options,
    );
    let bbcode = converter
        .convert(&input)
        .context("when converting html to bbcode")?;
    println!("{bbcode}");
    Ok(())
}
