//! `recur` CLI: build recurrence rules and query them from the command line.
//!
//! Rules travel as JSON rule records (the rule-store shape), so the output of
//! `build` can be piped straight into the query subcommands.
//!
//! ## Usage
//!
//! ```sh
//! # Every 5 days from 2023-04-15 until the end of April
//! recur build --start 2023-04-15 --every 5 --ends-at 2023-04-30 > rules.json
//!
//! # Mondays and Wednesdays, authored in Dubai local time
//! recur build --start 2023-04-17T09:00:00 --timezone Asia/Dubai --weekdays mon,wed
//!
//! # Second Friday of every month
//! recur build --start 2023-04-20 --nth 2 --weekday fri
//!
//! # Queries (rules from -i FILE or stdin)
//! recur occurs -i rules.json --on 2023-04-20
//! recur occurs -i rules.json --from 2023-04-21 --to 2023-04-24
//! recur next -i rules.json --after 2023-04-22
//! recur list -i rules.json --limit 10
//! recur rrule -i rules.json
//! ```
//!
//! Log output goes to stderr; set `RUST_LOG=debug` (or pass `--verbose`) to
//! see builder decisions.

use std::io::{self, Read};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc, Weekday};
use clap::{Args, Parser, Subcommand};
use recurrence_engine::calendar_day::{parse_instant, tz_offset_at};
use recurrence_engine::config::MonthlyNthConfig;
use recurrence_engine::ruleset::occurs_between_any;
use recurrence_engine::{
    enumerate_all, next_occurrence_in, occurrences_between, occurs_on_any, rules_from_json,
    rules_to_json, to_rrule_text, weekday_from_index, weekday_index, Rule, RuleConfig,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "recur", version, about = "Calendar recurrence rule CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log builder and search decisions to stderr
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Build rule records from a pattern and bounds
    Build(BuildArgs),
    /// Check whether any rule occurs on a day or within a range of days
    Occurs {
        #[command(flatten)]
        rules: RulesInput,
        /// Day to check
        #[arg(long, conflicts_with_all = ["from", "to"], required_unless_present = "from")]
        on: Option<String>,
        /// First day of the range (inclusive)
        #[arg(long, requires = "to")]
        from: Option<String>,
        /// Last day of the range (inclusive)
        #[arg(long, requires = "from")]
        to: Option<String>,
    },
    /// Print the next occurrence after a date, or "none"
    Next {
        #[command(flatten)]
        rules: RulesInput,
        #[arg(long)]
        after: String,
    },
    /// List occurrences, one RFC 3339 instant per line
    List {
        #[command(flatten)]
        rules: RulesInput,
        /// Maximum number of occurrences to print
        #[arg(long, default_value_t = 20)]
        limit: usize,
        /// Only list occurrences from this day (requires --to)
        #[arg(long, requires = "to")]
        from: Option<String>,
        /// Only list occurrences through this day (requires --from)
        #[arg(long, requires = "from")]
        to: Option<String>,
    },
    /// Print each rule as an RFC 5545 DTSTART/RRULE block
    Rrule {
        #[command(flatten)]
        rules: RulesInput,
    },
}

#[derive(Args)]
struct RulesInput {
    /// Rule records JSON file (reads from stdin if omitted)
    #[arg(short, long)]
    input: Option<String>,
}

#[derive(Args)]
struct BuildArgs {
    /// Host base date; the first day the rule may occur
    #[arg(long)]
    start: String,
    /// Fixed UTC offset of the rule author, in seconds
    #[arg(long, allow_hyphen_values = true, conflicts_with = "timezone")]
    tz_offset: Option<i32>,
    /// IANA timezone of the rule author, resolved to its offset at --start
    #[arg(long)]
    timezone: Option<String>,
    /// Repeat every N days
    #[arg(long)]
    every: Option<u32>,
    /// Repeat every day
    #[arg(long, conflicts_with = "every")]
    daily: bool,
    /// Repeat weekly on these weekdays (e.g. "mon,wed" or "1,3"; "" = start's weekday)
    #[arg(long)]
    weekdays: Option<String>,
    /// Repeat on the Nth (1-5) --weekday of every month
    #[arg(long, requires = "weekday")]
    nth: Option<u8>,
    /// Weekday for --nth
    #[arg(long, requires = "nth")]
    weekday: Option<String>,
    /// Last day on which the rule may occur
    #[arg(long)]
    ends_at: Option<String>,
    /// Stop after this many occurrences
    #[arg(long)]
    ends_after: Option<u32>,
    /// Output file (writes to stdout if omitted)
    #[arg(short, long)]
    output: Option<String>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Build(args) => {
            let json = build_rules(&args)?;
            write_output(args.output.as_deref(), &json)?;
        }
        Commands::Occurs {
            rules,
            on,
            from,
            to,
        } => {
            let rules = read_rules(&rules)?;
            let occurs = match (on, from, to) {
                (Some(on), _, _) => occurs_on_any(&rules, instant(&on)?),
                (None, Some(from), Some(to)) => {
                    occurs_between_any(&rules, instant(&from)?, instant(&to)?)
                }
                _ => anyhow::bail!("Pass either --on or both --from and --to"),
            };
            println!("{}", occurs);
        }
        Commands::Next { rules, after } => {
            let rules = read_rules(&rules)?;
            match next_occurrence_in(&rules, instant(&after)?) {
                Some(next) => println!("{}", next.to_rfc3339()),
                None => println!("none"),
            }
        }
        Commands::List {
            rules,
            limit,
            from,
            to,
        } => {
            let rules = read_rules(&rules)?;
            let occurrences = match (from, to) {
                (Some(from), Some(to)) => window(&rules, instant(&from)?, instant(&to)?, limit),
                _ => enumerate_all(&rules).take(limit).collect(),
            };
            for occurrence in occurrences {
                println!("{}", occurrence.to_rfc3339());
            }
        }
        Commands::Rrule { rules } => {
            let rules = read_rules(&rules)?;
            let blocks = rules
                .iter()
                .map(to_rrule_text)
                .collect::<Result<Vec<_>, _>>()
                .context("Failed to render RRULE")?;
            println!("{}", blocks.join("\n\n"));
        }
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

/// Translate the build flags into a [`RuleConfig`] and build it.
fn build_rules(args: &BuildArgs) -> Result<String> {
    let start = instant(&args.start)?;
    let tz_offset = match (&args.timezone, args.tz_offset) {
        (Some(zone), _) => tz_offset_at(zone, start)
            .with_context(|| format!("Failed to resolve timezone: {}", zone))?,
        (None, Some(offset)) => offset,
        (None, None) => 0,
    };

    let config = RuleConfig {
        every_days: if args.daily { Some(1) } else { args.every },
        weekdays: args.weekdays.as_deref().map(parse_weekdays).transpose()?,
        monthly_nth: match (args.nth, &args.weekday) {
            (Some(index), Some(weekday)) => Some(MonthlyNthConfig {
                index,
                weekday: weekday_index(parse_weekday(weekday)?),
            }),
            _ => None,
        },
        start_at: None,
        ends_at: args.ends_at.as_deref().map(instant).transpose()?,
        ends_after: args.ends_after,
    };
    tracing::debug!(?config, tz_offset, "building rules");

    let rules = config
        .to_builder()
        .and_then(|builder| builder.build(start, tz_offset))
        .context("Invalid rule configuration")?;
    rules_to_json(&rules).context("Failed to encode rules")
}

/// Up to `limit` occurrences across all rules within `[from, to]`, ascending.
fn window(
    rules: &[Rule],
    from: DateTime<Utc>,
    to: DateTime<Utc>,
    limit: usize,
) -> Vec<DateTime<Utc>> {
    let mut occurrences: Vec<DateTime<Utc>> = rules
        .iter()
        .flat_map(|rule| occurrences_between(rule, from, to).take(limit))
        .collect();
    occurrences.sort();
    occurrences.dedup();
    occurrences.truncate(limit);
    occurrences
}

fn parse_weekdays(raw: &str) -> Result<Vec<u8>> {
    raw.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| parse_weekday(part).map(weekday_index))
        .collect()
}

/// Accepts a name ("mon", "Monday") or an index (0 = Sunday).
fn parse_weekday(raw: &str) -> Result<Weekday> {
    if let Ok(index) = raw.parse::<u8>() {
        return weekday_from_index(index).map_err(Into::into);
    }
    raw.parse::<Weekday>()
        .map_err(|_| anyhow::anyhow!("Unknown weekday: '{}'", raw))
}

fn instant(raw: &str) -> Result<DateTime<Utc>> {
    parse_instant(raw).with_context(|| format!("Failed to parse date: {}", raw))
}

fn read_rules(input: &RulesInput) -> Result<Vec<Rule>> {
    let json = read_input(input.input.as_deref())?;
    rules_from_json(&json).context("Failed to read rule records")
}

fn read_input(path: Option<&str>) -> Result<String> {
    match path {
        Some(path) => {
            std::fs::read_to_string(path).with_context(|| format!("Failed to read file: {}", path))
        }
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read from stdin")?;
            Ok(buf)
        }
    }
}

fn write_output(path: Option<&str>, content: &str) -> Result<()> {
    match path {
        Some(path) => {
            std::fs::write(path, content)
                .with_context(|| format!("Failed to write file: {}", path))?;
        }
        None => {
            println!("{}", content);
        }
    }
    Ok(())
}
