use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use serde::Serialize;
use sexp_path::cache::get_or_parse_pattern;
use sexp_path::config::{apply_rules, load_from_path, RuleResult};
use sexp_path::files::{atomic_write, collect_sexp_files, read_forms, render_forms};
use sexp_path::search::search;
use sexp_path::Matcher;
use similar::{ChangeTag, TextDiff};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "sexp-path")]
#[command(about = "Search and rewrite s-expression trees with patterns", long_about = None)]
#[command(version)]
struct Cli {
    /// Log debug detail to stderr (otherwise RUST_LOG, default warn)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Find nodes matching a pattern
    Search {
        /// Pattern text, e.g. "(defn _ (args) ___)"
        pattern: String,

        /// Files or directories (walked for *.sexp)
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Only print the number of matches
        #[arg(short, long)]
        count: bool,

        /// Print matches as JSON
        #[arg(long, conflicts_with = "count")]
        json: bool,
    },

    /// Parse a pattern and print how it was understood
    Parse {
        pattern: String,
    },

    /// Apply a rule file to data files
    Apply {
        /// TOML rule file
        #[arg(short, long)]
        rules: PathBuf,

        /// Files or directories (walked for *.sexp)
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Dry run - show what would be changed without modifying files
        #[arg(short = 'n', long)]
        dry_run: bool,

        /// Show unified diff of changes
        #[arg(short, long)]
        diff: bool,
    },
}

/// One match, as printed by `search --json`.
#[derive(Debug, Serialize)]
struct MatchReport {
    file: String,
    line: Option<usize>,
    path: String,
    source: String,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Search {
            pattern,
            paths,
            count,
            json,
        } => cmd_search(&pattern, &paths, count, json),

        Commands::Parse { pattern } => cmd_parse(&pattern),

        Commands::Apply {
            rules,
            paths,
            dry_run,
            diff,
        } => cmd_apply(&rules, &paths, dry_run, diff),
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn parse_pattern(text: &str) -> Result<Matcher> {
    get_or_parse_pattern(text)
        .with_context(|| format!("invalid pattern {text:?}"))?
        .ok_or_else(|| anyhow::anyhow!("pattern is empty"))
}

fn cmd_search(pattern: &str, paths: &[PathBuf], count_only: bool, json: bool) -> Result<()> {
    let matcher = parse_pattern(pattern)?;
    let files = collect_sexp_files(paths)?;

    let mut reports = Vec::new();
    for file in &files {
        let (_, forms) = read_forms(file)?;
        for (index, form) in forms.iter().enumerate() {
            let Some(sexp) = form.as_sexp() else {
                continue;
            };
            for result in search(sexp, &matcher)? {
                reports.push(MatchReport {
                    file: file.display().to_string(),
                    line: result.node.line(),
                    path: format!("{index}{}", result.path),
                    source: result.node.to_source(),
                });
            }
        }
    }

    if count_only {
        println!("{}", reports.len());
    } else if json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
    } else {
        for report in &reports {
            let location = match report.line {
                Some(line) => format!("{}:{}", report.file, line),
                None => report.file.clone(),
            };
            println!("{} {}", location.cyan(), report.source);
        }
        println!();
        println!(
            "{} match(es) in {} file(s)",
            format!("{}", reports.len()).green(),
            files.len()
        );
    }

    Ok(())
}

fn cmd_parse(pattern: &str) -> Result<()> {
    match parse_pattern(pattern) {
        Ok(matcher) => {
            println!("{} {}", "debug:  ".dimmed(), matcher);
            println!("{} {:#}", "calls:  ".dimmed(), matcher);
            println!("{} {}", "pattern:".dimmed(), matcher.to_pattern_text());
            if matcher.is_greedy() {
                println!("{}", "(greedy)".yellow());
            }
            Ok(())
        }
        Err(e) => {
            eprintln!("{} {:#}", "✗".red(), e);
            std::process::exit(1);
        }
    }
}

/// Helper: Show unified diff between original and rewritten content
fn display_diff(file: &Path, original: &str, modified: &str) {
    println!(
        "\n{}",
        format!("--- {} (original)", file.display()).dimmed()
    );
    println!("{}", format!("+++ {} (rewritten)", file.display()).dimmed());

    let diff = TextDiff::from_lines(original, modified);

    for change in diff.iter_all_changes() {
        let sign = match change.tag() {
            ChangeTag::Delete => format!("-{}", change).red(),
            ChangeTag::Insert => format!("+{}", change).green(),
            ChangeTag::Equal => format!(" {}", change).normal(),
        };
        print!("{}", sign);
    }
}

#[derive(Default)]
struct Tally {
    applied: usize,
    unchanged: usize,
    skipped: usize,
    failed: usize,
}

fn cmd_apply(rules: &Path, paths: &[PathBuf], dry_run: bool, show_diff: bool) -> Result<()> {
    println!("Loading rules from {}...", rules.display());
    let config = load_from_path(rules)?;
    if !config.meta.name.is_empty() {
        println!("Rule set: {}", config.meta.name.bold());
    }
    let files = collect_sexp_files(paths)?;
    if dry_run {
        println!("{}", "[DRY RUN - showing what would be applied]".cyan());
    }
    println!();

    let mut tally = Tally::default();
    for file in &files {
        let (_, forms) = read_forms(file)?;
        let before = render_forms(&forms);

        // Per rule id: summed over every top-level form of the file.
        let mut outcomes: BTreeMap<String, RuleResult> = BTreeMap::new();
        let mut rewritten = Vec::with_capacity(forms.len());
        for form in forms {
            let (next, results) = apply_rules(&config, form);
            rewritten.push(next);
            for result in results {
                merge_outcome(&mut outcomes, result);
            }
        }

        println!("{}", file.display().to_string().bold());
        for rule in &config.rules {
            let Some(result) = outcomes.get(&rule.id) else {
                continue;
            };
            match result {
                RuleResult::Applied { id, count } => {
                    tally.applied += 1;
                    println!("  {} {}: {} replaced", "✓".green(), id, count);
                }
                RuleResult::Unchanged { id } => {
                    tally.unchanged += 1;
                    println!("  {} {}: unchanged", "·".dimmed(), id);
                }
                RuleResult::Skipped { id, reason } => {
                    tally.skipped += 1;
                    println!("  {} {}: Skipped ({})", "⊘".cyan(), id, reason);
                }
                RuleResult::Failed { id, reason } => {
                    tally.failed += 1;
                    eprintln!("  {} {}: Failed - {}", "✗".red(), id, reason);
                }
            }
        }

        let after = render_forms(&rewritten);
        if after != before {
            if show_diff {
                display_diff(file, &before, &after);
            }
            if !dry_run {
                atomic_write(file, after.as_bytes())?;
            }
        }
    }

    println!();
    println!("{}", "Summary:".bold());
    println!("  {} applied", format!("{}", tally.applied).green());
    println!("  {} unchanged", format!("{}", tally.unchanged).yellow());
    println!("  {} skipped", format!("{}", tally.skipped).cyan());
    println!("  {} failed", format!("{}", tally.failed).red());

    if tally.failed > 0 {
        std::process::exit(1);
    }

    Ok(())
}

/// Fold the result of one rule on one form into the file-level result.
///
/// Failures win, then applications (counts add up), then skips.
fn merge_outcome(outcomes: &mut BTreeMap<String, RuleResult>, result: RuleResult) {
    let id = result.id().to_string();
    let merged = match (outcomes.remove(&id), result) {
        (None, result) => result,
        (Some(failed @ RuleResult::Failed { .. }), _) | (_, failed @ RuleResult::Failed { .. }) => {
            failed
        }
        (
            Some(RuleResult::Applied { count: a, .. }),
            RuleResult::Applied { id, count: b },
        ) => RuleResult::Applied { id, count: a + b },
        (Some(applied @ RuleResult::Applied { .. }), _) | (_, applied @ RuleResult::Applied { .. }) => {
            applied
        }
        (Some(skipped @ RuleResult::Skipped { .. }), _) | (_, skipped @ RuleResult::Skipped { .. }) => {
            skipped
        }
        (Some(unchanged), _) => unchanged,
    };
    outcomes.insert(id, merged);
}
