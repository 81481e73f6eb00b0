// src/cli.rs
use anyhow::{Context, Result};
use clap::{Arg, ArgAction, ArgMatches, Command};
use std::io::IsTerminal;
use std::{env, path::PathBuf};

use crate::core::config::{self, RunnerConfig};
use crate::infra::t;

pub mod commands;

/// Pre-parses the command line arguments to find the language setting.
/// This allows i18n to be initialized before the full CLI is built.
/// It looks for a `--lang <VALUE>` argument.
fn pre_parse_language() -> Option<String> {
    let args: Vec<String> = env::args().collect();
    let pos = args.iter().position(|arg| arg == "--lang")?;
    args.get(pos + 1).cloned()
}

fn verbose_arg(help: String) -> Arg {
    Arg::new("verbose")
        .short('v')
        .long("verbose")
        .help(help)
        .action(ArgAction::SetTrue)
}

fn archive_dir_arg() -> Arg {
    Arg::new("archive-dir")
        .long("archive-dir")
        .help(t!("arg_archive_dir").to_string())
        .value_name("DIR")
        .required(true)
        .value_parser(clap::value_parser!(PathBuf))
        .action(ArgAction::Set)
}

fn email_arg() -> Arg {
    Arg::new("email")
        .long("email")
        .help(t!("arg_email").to_string())
        .value_name("EMAIL")
        .action(ArgAction::Set)
}

pub fn build_cli() -> Command {
    Command::new("suite-runner")
        .version(env!("CARGO_PKG_VERSION"))
        .about(t!("cli_about").to_string())
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("lang")
                .long("lang")
                .help(t!("cli_lang").to_string())
                .value_name("LANGUAGE")
                .global(true)
                .action(ArgAction::Set),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .help(t!("cli_config").to_string())
                .value_name("FILE")
                .global(true)
                .value_parser(clap::value_parser!(PathBuf))
                .action(ArgAction::Set),
        )
        .subcommand(
            Command::new("schedule")
                .about(t!("cmd_schedule_about").to_string())
                .arg(
                    Arg::new("name")
                        .long("name")
                        .help(t!("arg_name").to_string())
                        .value_name("NAME")
                        .required(true)
                        .action(ArgAction::Set),
                )
                .arg(
                    Arg::new("collections")
                        .long("collections")
                        .help(t!("arg_collections").to_string())
                        .value_name("DIR")
                        .required(true)
                        .num_args(1..)
                        .value_parser(clap::value_parser!(PathBuf))
                        .action(ArgAction::Append),
                )
                .arg(
                    Arg::new("owner")
                        .long("owner")
                        .help(t!("arg_owner").to_string())
                        .value_name("OWNER")
                        .action(ArgAction::Set),
                )
                .arg(email_arg())
                .arg(
                    Arg::new("timeout")
                        .long("timeout")
                        .help(t!("arg_schedule_timeout").to_string())
                        .value_name("SECONDS")
                        .value_parser(clap::value_parser!(u64))
                        .action(ArgAction::Set),
                )
                .arg(
                    Arg::new("num")
                        .short('n')
                        .long("num")
                        .help(t!("arg_num").to_string())
                        .value_name("NUM")
                        .default_value("1")
                        .value_parser(clap::value_parser!(u32).range(1..))
                        .action(ArgAction::Set),
                )
                .arg(verbose_arg(t!("arg_verbose").to_string()))
                .arg(
                    Arg::new("dry-run")
                        .long("dry-run")
                        .help(t!("arg_dry_run").to_string())
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("configs")
                        .help(t!("arg_override_configs").to_string())
                        .value_name("CONFFILE")
                        .num_args(0..)
                        .value_parser(clap::value_parser!(PathBuf))
                        .action(ArgAction::Append),
                ),
        )
        .subcommand(
            Command::new("ls")
                .about(t!("cmd_ls_about").to_string())
                .arg(archive_dir_arg())
                .arg(verbose_arg(t!("arg_ls_verbose").to_string())),
        )
        .subcommand(
            Command::new("results")
                .about(t!("cmd_results_about").to_string())
                .arg(archive_dir_arg())
                .arg(
                    Arg::new("name")
                        .long("name")
                        .help(t!("arg_name").to_string())
                        .value_name("NAME")
                        .required(true)
                        .action(ArgAction::Set),
                )
                .arg(email_arg())
                .arg(
                    Arg::new("timeout")
                        .long("timeout")
                        .help(t!("arg_results_timeout").to_string())
                        .value_name("SECONDS")
                        .default_value("0")
                        .value_parser(clap::value_parser!(u64))
                        .action(ArgAction::Set),
                )
                .arg(verbose_arg(t!("arg_verbose").to_string())),
        )
}

fn paths(matches: &ArgMatches, id: &str) -> Vec<PathBuf> {
    matches
        .get_many::<PathBuf>(id)
        .map(|values| values.cloned().collect())
        .unwrap_or_default()
}

fn load_config(matches: &ArgMatches, explicit_lang: bool) -> Result<RunnerConfig> {
    let path = matches.get_one::<PathBuf>("config");
    let runner_config = config::load_runner_config(path.map(PathBuf::as_path))
        .with_context(|| t!("config_load_failed").to_string())?;

    if !explicit_lang {
        if let Some(language) = &runner_config.language {
            rust_i18n::set_locale(crate::resolve_locale(language));
        }
    }
    Ok(runner_config)
}

pub async fn run() -> Result<()> {
    // Pre-parse language and initialize i18n first.
    let explicit_lang = pre_parse_language();
    match &explicit_lang {
        Some(language) => rust_i18n::set_locale(crate::resolve_locale(language)),
        None => crate::init(),
    }

    if !std::io::stdout().is_terminal() {
        colored::control::set_override(false);
    }

    let matches = build_cli().get_matches();
    let runner_config = load_config(&matches, explicit_lang.is_some())?;

    match matches.subcommand() {
        Some(("schedule", sub)) => {
            let args = commands::schedule::ScheduleArgs {
                name: sub.get_one::<String>("name").cloned().unwrap_or_default(),
                collections: paths(sub, "collections"),
                owner: sub.get_one::<String>("owner").cloned(),
                email: sub.get_one::<String>("email").cloned(),
                timeout: sub.get_one::<u64>("timeout").copied(),
                num: sub.get_one::<u32>("num").copied().unwrap_or(1),
                verbose: sub.get_flag("verbose"),
                dry_run: sub.get_flag("dry-run"),
                configs: paths(sub, "configs"),
            };
            commands::schedule::execute(args, &runner_config).await
        }
        Some(("ls", sub)) => {
            let archive_dir = paths(sub, "archive-dir").into_iter().next().unwrap_or_default();
            commands::ls::execute(&archive_dir, sub.get_flag("verbose"))
        }
        Some(("results", sub)) => {
            let args = commands::results::ResultsArgs {
                archive_dir: paths(sub, "archive-dir").into_iter().next().unwrap_or_default(),
                name: sub.get_one::<String>("name").cloned().unwrap_or_default(),
                email: sub.get_one::<String>("email").cloned(),
                timeout: sub.get_one::<u64>("timeout").copied().unwrap_or(0),
                verbose: sub.get_flag("verbose"),
            };
            commands::results::execute(args, &runner_config)
                .await
                .map(|_| ())
        }
        // `subcommand_required` makes clap print help and exit before this.
        _ => Ok(()),
    }
}
