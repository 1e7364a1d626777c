use crate::check::run_check_rules_command;
use crate::convert::{run_to_bbcode_command, run_to_html_command};
use crate::tree::run_tree_command;
use anyhow::Result;
use clap::{ArgAction, ValueEnum};
use clap::{Args, Parser, Subcommand};
use tb_types::Dialect;

///////// Args /////////

#[derive(Clone, Debug, Args)]
pub struct ToHtmlArgs {
    #[arg(help = "File holding bbcode to convert, read stdin if not set")]
    pub file: Option<String>,

    #[arg(
        short = 'r',
        long = "rules",
        help = "Path to the toml rule table, use built-in tags if not set"
    )]
    pub rules: Option<String>,
}

#[derive(Clone, Debug, Args)]
pub struct ToBBCodeArgs {
    #[arg(help = "File holding html to convert, read stdin if not set")]
    pub file: Option<String>,

    #[arg(
        short = 'r',
        long = "rules",
        help = "Path to the toml rule table, use built-in tags if not set"
    )]
    pub rules: Option<String>,

    #[arg(
        long = "raw",
        help = "Keep html entities in output. Override decode_output in rule table when presents",
        default_value = "false",
        action = ArgAction::SetTrue,
    )]
    pub raw: bool,
}

/// Dialect of input.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum SourceDialect {
    Bbcode,
    Html,
}

impl From<SourceDialect> for Dialect {
    fn from(value: SourceDialect) -> Self {
        match value {
            SourceDialect::Bbcode => Dialect::BBCode,
            SourceDialect::Html => Dialect::Html,
        }
    }
}

#[derive(Clone, Debug, Args)]
pub struct TreeArgs {
    #[arg(short = 'f', long = "from", help = "Dialect of input")]
    pub from: SourceDialect,

    #[arg(help = "File holding text to parse, read stdin if not set")]
    pub file: Option<String>,

    #[arg(
        short = 'r',
        long = "rules",
        help = "Path to the toml rule table, use built-in tags if not set"
    )]
    pub rules: Option<String>,
}

#[derive(Clone, Debug, Args)]
pub struct CheckRulesArgs {
    #[arg(help = "Path to the toml rule table to check")]
    pub rules: String,
}

///////// Subcommand /////////

#[derive(Clone, Debug, Parser)]
#[command(name = "tb", about = "Convert forum posts between bbcode and html")]
pub struct Cli {
    #[arg(
        long = "json-log",
        global = true,
        help = "Write logs as json lines",
        action = ArgAction::SetTrue,
    )]
    pub json_log: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Clone, Debug, Subcommand)]
pub enum Command {
    #[command(about = "convert bbcode to html")]
    ToHtml(ToHtmlArgs),

    #[command(about = "convert html to bbcode")]
    ToBbcode(ToBBCodeArgs),

    #[command(about = "print the syntax tree of input as json")]
    Tree(TreeArgs),

    #[command(about = "validate a rule table and print a summary")]
    CheckRules(CheckRulesArgs),
}

/// Main entry of all subcommands.
pub async fn run_command_with_args(cli: Cli) -> Result<()> {
    match cli.command {
        Command::ToHtml(to_html_args) => run_to_html_command(to_html_args).await,
        Command::ToBbcode(to_bbcode_args) => run_to_bbcode_command(to_bbcode_args).await,
        Command::Tree(tree_args) => run_tree_command(tree_args).await,
        Command::CheckRules(check_rules_args) => run_check_rules_command(check_rules_args).await,
    }
}
