use anyhow::{bail, Context, Result};
use clap::{ArgMatches, CommandFactory, FromArgMatches, Parser};
use crossterm::terminal;
use std::io;
use std::path::PathBuf;
use tracing::info;

use tdu::render;
use tdu::report;
use tdu::settings::Settings;
use tdu::tree::FileGroup;
use tdu::ui::App;
use tdu::viewport::RedrawPolicy;

#[derive(Parser)]
#[command(name = "tdu")]
#[command(about = "Browse a disk usage report as a collapsible tree", long_about = None)]
#[command(version)]
struct Cli {
    /// Output of `du -ak`; `-` or nothing reads standard input
    report: Option<PathBuf>,

    /// Path to settings file
    #[arg(short = 'c', long)]
    config: Option<String>,

    /// Draw the tree with ASCII characters
    #[arg(long)]
    ascii: bool,

    /// Repaint everything below the cursor after expanding or collapsing
    #[arg(long)]
    full_redraw: bool,

    /// Show sizes as KB/MB/GB
    #[arg(long)]
    human: bool,

    /// Write logs to this file (filter with RUST_LOG)
    #[arg(long)]
    log_file: Option<String>,

    /// Print the fully expanded tree and exit
    #[arg(long)]
    dump: bool,

    /// Read the report, print a summary and exit
    #[arg(short = 'P', long, conflicts_with = "dump")]
    parse_only: bool,

    /// Start a file group; the `-I` patterns that follow belong to it
    #[arg(short = 'G', long = "group", value_name = "NAME")]
    groups: Vec<String>,

    /// Add a wildcard (`*`, `?`) to the most recent `-G` group
    #[arg(short = 'I', long = "include", value_name = "PATTERN")]
    includes: Vec<String>,
}

/// Groups from `-G`/`-I`, in command line order
fn groups_from_matches(matches: &ArgMatches) -> Result<Vec<FileGroup>> {
    fn indexed<'a>(matches: &'a ArgMatches, id: &str) -> Vec<(usize, &'a String)> {
        match (matches.indices_of(id), matches.get_many::<String>(id)) {
            (Some(indices), Some(values)) => indices.zip(values).collect(),
            _ => Vec::new(),
        }
    }

    let mut flags: Vec<(usize, bool, &String)> = indexed(matches, "groups")
        .into_iter()
        .map(|(index, name)| (index, true, name))
        .chain(
            indexed(matches, "includes")
                .into_iter()
                .map(|(index, pattern)| (index, false, pattern)),
        )
        .collect();
    flags.sort_by_key(|&(index, ..)| index);

    let mut groups: Vec<FileGroup> = Vec::new();
    for (_, is_group, value) in flags {
        if is_group {
            groups.push(FileGroup::new(value.as_str()));
        } else if let Some(group) = groups.last_mut() {
            group.patterns.push(value.clone());
        } else {
            bail!("-I {} needs a preceding -G group", value);
        }
    }
    Ok(groups)
}

fn main() -> Result<()> {
    let matches = Cli::command().get_matches();
    let cli = Cli::from_arg_matches(&matches).unwrap_or_else(|err| err.exit());
    let groups = groups_from_matches(&matches)?;

    if let Some(log_file) = &cli.log_file {
        tdu::logging::init(&PathBuf::from(shellexpand::tilde(log_file).to_string()))?;
    }

    let settings_path = if let Some(config) = &cli.config {
        PathBuf::from(shellexpand::tilde(config).to_string())
    } else {
        Settings::default_path()
    };
    let mut settings = Settings::load(&settings_path).context("Failed to load settings")?;
    if cli.ascii {
        settings.ui.ascii_tree_chars = true;
    }
    if cli.human {
        settings.ui.human_sizes = true;
    }
    if cli.full_redraw {
        settings.ui.redraw = RedrawPolicy::Full;
    }
    if !groups.is_empty() {
        info!(
            groups = cli.groups.len(),
            patterns = cli.includes.len(),
            "file groups from the command line"
        );
        // command line groups are tried before those from the settings file
        settings.input.groups.splice(0..0, groups);
    }
    info!(path = %settings_path.display(), "settings loaded");

    let report = report::load(cli.report.as_deref(), &settings.input)?;
    if cli.parse_only {
        println!("{}", report.summary());
        return Ok(());
    }
    if report.skipped > 0 {
        eprintln!("{} malformed lines skipped", report.skipped);
    }

    if cli.dump {
        let mut tree = report.tree;
        let ui = &settings.ui;
        let root = tree.root();
        tree.sort_children(root, Some(ui.initial_sort), ui.initial_sort_descending, true);
        render::dump(&mut tree, &ui.row_format(), &mut io::stdout().lock())
            .context("Failed to write tree")?;
        return Ok(());
    }

    let (width, height) = terminal::size().context("Failed to query the terminal size")?;
    let mut app = App::new(report.tree, &settings.ui, report.skipped, width, height);
    app.run()?;

    Ok(())
}
