// src/main.rs
// =============================================================================
// Entry point of the release-notes CLI.
//
// What happens here:
// 1. Parse command-line arguments using clap
// 2. Set up logging (stderr only, stdout is reserved for the notes)
// 3. Run the chosen command against the GitHub search API
// 4. Bind the rendered notes to their output target (stdout, files or JSON)
// 5. Exit with 0 on success, 2 on any error
//
// Rust concepts used:
// - async/await: every page is an HTTP request we wait on
// - futures::join!: the issue and PR searches run side by side
// - anyhow::Result + .context(): errors carry a readable trail up to main
// =============================================================================

mod cli;

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands, Settings, WindowArgs};
use release_notes::github::{ClosedWindow, SearchClient};
use release_notes::notes::{
    fetch_issue_notes, fetch_pull_notes, last_merge_date, IssueNotes, ItemLinks, PullNotes,
};

// Output targets, named after the elements the notes used to be pasted into
const ISSUES_FILE: &str = "issues.html";
const PULLS_FILE: &str = "pull-requests.html";

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Logging must be up before the first request so -v shows every page
    init_logging(cli.global.log_filter());

    let exit_code = match run(cli).await {
        Ok(()) => 0,
        Err(e) => {
            // {:#} prints the whole context chain on one line
            eprintln!("Error: {e:#}");
            2
        }
    };

    std::process::exit(exit_code);
}

// Sets up tracing output on stderr
//
// Parameters:
//   default_filter: level used when RUST_LOG is not set ("warn", "info", ...)
fn init_logging(default_filter: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

// Main application logic
//
// Returns:
//   Ok(())  = the command finished and its output was written
//   Err     = bad settings, a failed search, or an unwritable target
async fn run(cli: Cli) -> Result<()> {
    // Validate the global flags once; every command needs them
    let settings = cli.global.settings()?;

    // One client for the whole run, so connections are reused across pages
    let client = SearchClient::new(settings.api_base.clone())
        .context("failed to create HTTP client")?
        .with_per_page(settings.per_page);

    match cli.command {
        Commands::Notes {
            window,
            out_dir,
            json,
        } => handle_notes(&client, &settings, window, out_dir.as_deref(), json).await,
        Commands::Issues { window, json } => {
            let notes = fetch_issue_notes(&client, links(&settings), &settings.repo, window.window()?)
                .await
                .context("failed to collect issue notes")?;
            print_notes(&notes, json, IssueNotes::render)
        }
        Commands::Prs { window, json } => {
            let notes = fetch_pull_notes(&client, links(&settings), &settings.repo, window.window()?)
                .await
                .context("failed to collect pull request notes")?;
            print_notes(&notes, json, PullNotes::render)
        }
        Commands::LastMerge { base } => {
            let found = last_merge_date(&client, &settings.repo, &base, cli::today())
                .await
                .context("failed to look up the last merge")?;

            // The date alone goes to stdout so it can be fed to --from
            match found {
                Some(date) => println!("{}", date.format("%Y-%m-%d")),
                None => eprintln!("No pull requests merged into {base} in the last 90 days"),
            }
            Ok(())
        }
    }
}

// JSON shape of the `notes --json` output
//
// A section whose search failed is serialized as null.
#[derive(Serialize)]
struct Report<'a> {
    repo: String,
    from: String,
    to: String,
    issues: Option<&'a IssueNotes>,
    pull_requests: Option<&'a PullNotes>,
}

// Handles the 'notes' subcommand
//
// Both searches run side by side and neither cancels the other. Whatever
// succeeded is still written to its own target; a failed search leaves its
// target blank and turns into the returned error.
//
// Parameters:
//   client:   shared search client
//   settings: validated global flags (repo, link base)
//   window:   --from/--to as parsed by clap
//   out_dir:  write issues.html / pull-requests.html here instead of stdout
//   json:     print a JSON report instead of HTML
async fn handle_notes(
    client: &SearchClient,
    settings: &Settings,
    window: WindowArgs,
    out_dir: Option<&Path>,
    json: bool,
) -> Result<()> {
    let window = window.window()?;

    let (issues, pulls) = futures::join!(
        fetch_issue_notes(client, links(settings), &settings.repo, window),
        fetch_pull_notes(client, links(settings), &settings.repo, window),
    );

    // Split each outcome into "notes to write" and "failure to report"
    let mut failures = Vec::new();
    let issues = issues
        .map_err(|e| failures.push(format!("failed to collect issue notes: {e}")))
        .ok();
    let pulls = pulls
        .map_err(|e| failures.push(format!("failed to collect pull request notes: {e}")))
        .ok();

    if json {
        let report = report(settings, window, issues.as_ref(), pulls.as_ref());
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        let issues_html = issues.as_ref().map(IssueNotes::render);
        let pulls_html = pulls.as_ref().map(PullNotes::render);

        match out_dir {
            Some(dir) => write_targets(dir, issues_html.as_deref(), pulls_html.as_deref())?,
            None => print!("{}", as_sections(issues_html.as_deref(), pulls_html.as_deref())),
        }
    }

    if !failures.is_empty() {
        anyhow::bail!("{}", failures.join("; "));
    }
    Ok(())
}

fn links(settings: &Settings) -> ItemLinks {
    ItemLinks::new(&settings.web_base, &settings.repo)
}

fn report<'a>(
    settings: &Settings,
    window: ClosedWindow,
    issues: Option<&'a IssueNotes>,
    pull_requests: Option<&'a PullNotes>,
) -> Report<'a> {
    Report {
        repo: settings.repo.to_string(),
        from: window.start().format("%Y-%m-%d").to_string(),
        to: window.end().format("%Y-%m-%d").to_string(),
        issues,
        pull_requests,
    }
}

// Prints one set of notes, as HTML or as JSON
//
// `render` is the notes type's own render method, so this works for both
// IssueNotes and PullNotes.
fn print_notes<T: Serialize>(notes: &T, json: bool, render: fn(&T) -> String) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(notes)?);
    } else {
        print!("{}", render(notes));
    }
    Ok(())
}

// Writes each rendered target into `dir`
//
// Parameters:
//   dir:         output directory, created if missing
//   issues_html: None when the issue search failed; issues.html is left alone
//   pulls_html:  None when the PR search failed; pull-requests.html is left alone
//
// Targets that are written are overwritten, never appended to.
fn write_targets(dir: &Path, issues_html: Option<&str>, pulls_html: Option<&str>) -> Result<()> {
    fs::create_dir_all(dir).with_context(|| format!("cannot create {}", dir.display()))?;

    for (name, html) in [(ISSUES_FILE, issues_html), (PULLS_FILE, pulls_html)] {
        let path = dir.join(name);
        let Some(html) = html else {
            tracing::warn!(path = %path.display(), "search failed, target not written");
            continue;
        };
        fs::write(&path, html).with_context(|| format!("cannot write {}", path.display()))?;
        tracing::info!(path = %path.display(), "wrote notes");
    }
    Ok(())
}

// Wraps both targets for stdout; a failed one stays an empty element
fn as_sections(issues_html: Option<&str>, pulls_html: Option<&str>) -> String {
    format!(
        "<div id=\"issues\">\n{}</div>\n<div id=\"pull-requests\">\n{}</div>\n",
        issues_html.unwrap_or_default(),
        pulls_html.unwrap_or_default()
    )
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. join! vs try_join!
//    - try_join! stops at the first error and drops the other future
//    - join! waits for both and hands back both Results
//    - We want the second behavior: one failed search must not erase the other
//
// 2. Result::ok() with a side effect
//    - `.map_err(|e| failures.push(...)).ok()` records the error, then keeps
//      only the success value as an Option
//    - Each closure borrows `failures` mutably, one statement at a time
//
// 3. Option<&str> and as_deref()
//    - Option<String> -> Option<&str> without cloning the HTML
// -----------------------------------------------------------------------------
