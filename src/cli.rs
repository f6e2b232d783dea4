// src/cli.rs
// =============================================================================
// Command-line interface, defined with clap's derive API.
//
//   release-notes notes --from 2024-01-01 [--to 2024-03-31] [--out-dir DIR]
//   release-notes issues --from 2024-01-01
//   release-notes prs --from 2024-01-01 --json
//   release-notes last-merge [--base main]
//
// Global flags pick the repository and the API/web hosts. Each one can also
// come from an environment variable, which is the only configuration source.
//
// Rust concepts:
// - Derive macros: clap generates the parser from the struct definitions
// - #[command(flatten)]: reuse one group of flags in several subcommands
// - Validation after parsing: strings become RepoSlug / Url in settings()
// =============================================================================

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use url::Url;

use release_notes::github::{ClosedWindow, RepoSlug, DEFAULT_API_BASE};
use release_notes::notes::{DEFAULT_BASE_BRANCH, DEFAULT_WEB_BASE};

// The whole command line: global flags plus exactly one subcommand
#[derive(Parser, Debug)]
#[command(
    name = "release-notes",
    version,
    about = "List issues and pull requests closed in a date range as release notes",
    long_about = "release-notes searches a GitHub repository for issues and pull requests closed \
                  between two dates and renders them as HTML, together with a per-author tally \
                  of pull requests."
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands,
}

// Flags accepted before or after any subcommand (global = true)
#[derive(Args, Debug)]
pub struct GlobalArgs {
    /// Repository to search, as OWNER/NAME
    #[arg(long, global = true, env = "RELEASE_NOTES_REPO", default_value = "google/blockly")]
    pub repo: String,

    /// Base URL of the GitHub REST API
    #[arg(long, global = true, env = "RELEASE_NOTES_API_BASE", default_value = DEFAULT_API_BASE)]
    pub api_base: String,

    /// Base URL used for issue and pull request links in the output
    #[arg(long, global = true, env = "RELEASE_NOTES_WEB_BASE", default_value = DEFAULT_WEB_BASE)]
    pub web_base: String,

    /// Results requested per page (1-100)
    #[arg(long, global = true, default_value_t = 100, value_parser = clap::value_parser!(u8).range(1..=100))]
    pub per_page: u8,

    /// Log progress to stderr (-v info, -vv debug); RUST_LOG overrides
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

// One variant per subcommand; the doc comments become the --help text
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Issue notes and pull request notes for one window
    Notes {
        #[command(flatten)]
        window: WindowArgs,

        /// Write issues.html and pull-requests.html into this directory
        #[arg(long, value_name = "DIR")]
        out_dir: Option<PathBuf>,

        /// Print a JSON report instead of HTML
        #[arg(long, conflicts_with = "out_dir")]
        json: bool,
    },

    /// Issue notes only
    Issues {
        #[command(flatten)]
        window: WindowArgs,

        #[arg(long)]
        json: bool,
    },

    /// Pull request notes only
    Prs {
        #[command(flatten)]
        window: WindowArgs,

        #[arg(long)]
        json: bool,
    },

    /// Closing date of the last PR merged into BASE in the past 90 days
    ///
    /// Use it as --from for the next run.
    LastMerge {
        #[arg(long, default_value = DEFAULT_BASE_BRANCH)]
        base: String,
    },
}

// --from/--to, shared by every command that searches a window
#[derive(Args, Debug, Clone, Copy)]
pub struct WindowArgs {
    /// First closing date to include
    #[arg(long, value_parser = parse_date, value_name = "YYYY-MM-DD")]
    pub from: NaiveDate,

    /// Last closing date to include
    #[arg(long, value_parser = parse_date, value_name = "YYYY-MM-DD", default_value_t = today())]
    pub to: NaiveDate,
}

impl WindowArgs {
    // clap cannot compare two flags, so the start <= end check happens here
    pub fn window(&self) -> Result<ClosedWindow> {
        ClosedWindow::new(self.from, self.to).context("invalid date range")
    }
}

// Validated form of the global flags
#[derive(Debug, Clone)]
pub struct Settings {
    pub repo: RepoSlug,
    pub api_base: Url,
    pub web_base: Url,
    pub per_page: u8,
}

impl GlobalArgs {
    // Turns the raw flag strings into typed settings
    //
    // Returns: Settings, or an error naming the flag that was wrong
    pub fn settings(&self) -> Result<Settings> {
        let repo = self.repo.parse::<RepoSlug>().context("invalid --repo")?;
        let api_base = Url::parse(&self.api_base)
            .with_context(|| format!("invalid --api-base '{}'", self.api_base))?;
        let web_base = Url::parse(&self.web_base)
            .with_context(|| format!("invalid --web-base '{}'", self.web_base))?;

        Ok(Settings {
            repo,
            api_base,
            web_base,
            per_page: self.per_page,
        })
    }

    // Default log level for -v count; RUST_LOG still wins in main.rs
    pub fn log_filter(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            _ => "debug",
        }
    }
}

// Value parser for --from/--to: strict YYYY-MM-DD
fn parse_date(input: &str) -> Result<NaiveDate, chrono::ParseError> {
    NaiveDate::parse_from_str(input, "%Y-%m-%d")
}

// Default for --to, and "now" for the last-merge lookback
pub fn today() -> NaiveDate {
    chrono::Utc::now().date_naive()
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why keep raw Strings in GlobalArgs?
//    - clap reports parse errors by itself, but a bad --repo deserves a
//      message that says what shape was expected
//    - settings() does that conversion once, with anyhow context
//
// 2. default_value_t = today()
//    - The default is computed every time the parser is built
//    - It needs Display on the type so --help can show it
//
// 3. ArgAction::Count
//    - Counts how many times -v was given: -v = 1, -vv = 2
// -----------------------------------------------------------------------------
