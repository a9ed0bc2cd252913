use std::collections::HashMap;
use std::io::IsTerminal;
use std::path::PathBuf;
use std::time::Duration;

use clap::{error::ErrorKind, CommandFactory, Parser};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;

use crate::catalog::{CatalogSource, LoadFailurePolicy, DEFAULT_PLACEHOLDER_COUNT, DEFAULT_SOURCE};
use crate::cli::args::CliArgs;
use crate::cli::validation;
use crate::config::{self, ConfigFile};
use crate::controller::DEFAULT_QUIET;
use crate::output::{self, Locale, OutputFormat, PriceFormat, RenderSink, SnapshotSink};
use crate::pipeline::{SearchFields, SortMode, ViewState, DEFAULT_PAGE_SIZE};
use crate::runner::{self, CatalogLoad, Runner};
use crate::tui::{self, ScreenSink, SearchBox};

fn print_banner() {
    const BANNER: &str = r#"
       __           __           _     __
  ____/ /__  ____ _/ /___ ______(_)___/ /
 / __  / _ \/ __ `/ / __ `/ ___/ / __  /
/ /_/ /  __/ /_/ / / /_/ / /  / / /_/ /
\__,_/\___/\__,_/_/\__, /_/  /_/\__,_/
                  /____/
"#;
    eprint!("{}", BANNER.bold().blue());
    eprintln!(
        "       v{} - {}\n",
        env!("CARGO_PKG_VERSION"),
        "search, sort and page through deals".dimmed()
    );
}

fn format_kv_line(label: &str, value: &str) {
    eprintln!(":: {:<10}: {}", label, value);
}

fn render_custom_help() -> String {
    let cmd = CliArgs::command();
    let mut out = String::new();

    out.push_str(cmd.get_name());
    if let Some(version) = cmd.get_version() {
        out.push(' ');
        out.push_str(version);
    }
    out.push('\n');

    if let Some(about) = cmd.get_about() {
        out.push_str(&about.to_string());
        out.push('\n');
    }

    if let Some(long_about) = cmd.get_long_about() {
        out.push('\n');
        out.push_str(&long_about.to_string());
        out.push('\n');
    }

    out.push_str("\nUsage: ");
    out.push_str(cmd.get_name());
    out.push_str(" [OPTIONS]\n\n");

    let mut sections: Vec<(String, Vec<&clap::Arg>)> = Vec::new();
    let mut section_idx: HashMap<String, usize> = HashMap::new();

    for arg in cmd.get_arguments() {
        if arg.is_hide_set() {
            continue;
        }
        let heading = arg.get_help_heading().unwrap_or("Options").to_string();
        let idx = *section_idx.entry(heading.clone()).or_insert_with(|| {
            sections.push((heading, Vec::new()));
            sections.len() - 1
        });
        sections[idx].1.push(arg);
    }

    for (heading, args) in sections {
        out.push_str(&heading);
        out.push_str(":\n");

        for arg in args {
            let mut parts: Vec<String> = Vec::new();
            if let Some(short) = arg.get_short() {
                parts.push(format!("-{short}"));
            }
            if let Some(long) = arg.get_long() {
                parts.push(format!("--{long}"));
            }
            if let Some(aliases) = arg.get_visible_aliases() {
                for alias in aliases {
                    let rendered = format!("--{alias}");
                    if !parts.contains(&rendered) {
                        parts.push(rendered);
                    }
                }
            }

            let mut flags = parts.join(", ");
            if arg.get_action().takes_values() {
                let value_name = arg
                    .get_value_names()
                    .and_then(|names| names.first())
                    .map(|name| name.as_str())
                    .unwrap_or("VALUE");
                flags.push_str(&format!(" <{value_name}>"));
            }

            out.push_str("  ");
            out.push_str(&flags);
            out.push('\n');

            if let Some(help) = arg.get_help() {
                let help = help.to_string();
                if !help.trim().is_empty() {
                    out.push_str("          ");
                    out.push_str(help.trim());
                    out.push('\n');
                }
            }
            out.push('\n');
        }
    }

    out
}

#[derive(Clone, Debug)]
struct RunConfig {
    runner: runner::Options,
    initial: ViewState,
    price: PriceFormat,
    once: bool,
    format: Option<OutputFormat>,
    output: Option<String>,
    no_color: bool,
    verbose: u8,
    log_file: Option<PathBuf>,
}

fn build_run_config(args: CliArgs, cfg: ConfigFile) -> Result<RunConfig, String> {
    validation::validate(&args)?;

    let no_color = if args.color {
        false
    } else {
        args.no_color || cfg.no_color.unwrap_or(false)
    };

    let source_raw = args
        .source
        .or(cfg.source)
        .unwrap_or_else(|| DEFAULT_SOURCE.to_string());
    if source_raw.trim().is_empty() {
        return Err("invalid source, expected a URL or file path".to_string());
    }
    let source = CatalogSource::parse(source_raw.trim());

    let page_size = args.page_size.or(cfg.page_size).unwrap_or(DEFAULT_PAGE_SIZE);
    if page_size == 0 {
        return Err("invalid page_size, expected positive integer".to_string());
    }

    let sort = match args.sort.or(cfg.sort) {
        Some(raw) => validation::parse_sort(&raw)?,
        None => SortMode::Default,
    };

    let search_fields = match args.search_fields.or(cfg.search_fields) {
        Some(raw) => SearchFields::parse_csv(&raw)
            .map_err(|e| format!("invalid search_fields '{raw}': {e}"))?,
        None => SearchFields::default(),
    };

    let debounce = args
        .debounce_ms
        .or(cfg.debounce_ms)
        .map(Duration::from_millis)
        .unwrap_or(DEFAULT_QUIET);

    let load_failure = match args.on_load_error.or(cfg.on_load_error) {
        Some(raw) => validation::parse_load_failure(&raw)?,
        None => LoadFailurePolicy::default(),
    };
    let placeholder_count = args
        .placeholder_count
        .or(cfg.placeholder_count)
        .unwrap_or(DEFAULT_PLACEHOLDER_COUNT);

    let locale = match args.locale.or(cfg.locale) {
        Some(raw) => validation::parse_locale(&raw)?,
        None => Locale::default(),
    };
    let currency = args
        .currency
        .or(cfg.currency)
        .unwrap_or_else(|| "€".to_string());

    let timeout = args.timeout.or(cfg.timeout).unwrap_or(10);
    let proxy = args.proxy.or(cfg.proxy).filter(|p| !p.trim().is_empty());

    let output = args
        .output
        .map(|p| config::expand_tilde_string(&p))
        .filter(|p| !p.trim().is_empty());
    let format = match args.format.as_deref() {
        Some(raw) => Some(validation::parse_format(raw)?),
        None => output.as_deref().and_then(output::infer_format_from_path),
    };

    let log_file = args
        .log_file
        .or(cfg.log_file)
        .filter(|p| !p.trim().is_empty())
        .map(|p| config::expand_tilde(&p));

    Ok(RunConfig {
        runner: runner::Options {
            source,
            page_size,
            search_fields,
            debounce,
            load_failure,
            placeholder_count,
            timeout_seconds: timeout,
            proxy,
        },
        initial: ViewState {
            search_term: args.search.unwrap_or_default(),
            sort_mode: sort,
            current_page: args.page.unwrap_or(1),
        },
        price: PriceFormat::new(locale, currency),
        once: args.once || output.is_some(),
        format,
        output,
        no_color,
        verbose: args.verbose,
        log_file,
    })
}

fn loading_spinner(source: &CatalogSource) -> Result<ProgressBar, String> {
    let pb = ProgressBar::new_spinner();
    pb.set_draw_target(ProgressDrawTarget::stderr());
    pb.set_style(
        ProgressStyle::with_template(":: {spinner} {msg} :: [{elapsed_precise}]")
            .map_err(|e| format!("failed to build progress bar style: {e}"))?,
    );
    pb.set_message(format!("Loading {}", source.describe()));
    pb.enable_steady_tick(Duration::from_millis(80));
    Ok(pb)
}

async fn write_output(path: &str, rendered: &[u8]) -> Result<(), String> {
    let mut outfile = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(path)
        .await
        .map_err(|e| format!("failed to open output file: {e}"))?;
    outfile
        .write_all(rendered)
        .await
        .map_err(|_| "failed to write output file".to_string())?;
    Ok(())
}

async fn run_once(run: &RunConfig, runner: &Runner, load: CatalogLoad) -> Result<(), String> {
    let format = run.format.unwrap_or(OutputFormat::Text);
    let mut sink = SnapshotSink::new(format, run.price.clone());

    let rendered = match load.products() {
        Some(products) => {
            let mut controller = runner
                .controller(products, sink)
                .with_state(run.initial.clone());
            controller.start();
            controller.into_sink().into_bytes()
        }
        None => {
            let message = load.error().map(|e| e.to_string()).unwrap_or_default();
            sink.render_error(&message);
            sink.into_bytes()
        }
    };

    match run.output.as_deref() {
        Some(path) => {
            write_output(path, &rendered).await?;
            tracing::info!(path, format = ?format, "page written");
        }
        None => {
            let mut stdout = tokio::io::stdout();
            stdout
                .write_all(&rendered)
                .await
                .map_err(|e| format!("failed to write to stdout: {e}"))?;
            stdout
                .flush()
                .await
                .map_err(|e| format!("failed to write to stdout: {e}"))?;
        }
    }
    Ok(())
}

async fn run_interactive(
    run: &RunConfig,
    runner: &Runner,
    load: CatalogLoad,
) -> Result<(), String> {
    if let CatalogLoad::Placeholder { error, .. } = &load {
        eprintln!(
            "{} {}",
            "[WRN]".bold().yellow(),
            format!("showing placeholder deals: {error}").white()
        );
    }

    let mut terminal =
        tui::setup_terminal().map_err(|e| format!("failed to set up terminal: {e}"))?;
    let guard = tui::RestoreOnDrop::new(tui::restore_screen);
    let mut sink = ScreenSink::new(run.price.clone());

    let result = match load.products() {
        Some(products) => {
            let mut controller = runner.controller(products, sink).with_state(run.initial.clone());
            let search = SearchBox::new(run.initial.search_term.clone());
            tui::run(&mut terminal, &mut controller, search).await
        }
        None => {
            let message = load.error().map(|e| e.to_string()).unwrap_or_default();
            tui::show_error(&mut terminal, &mut sink, &message).await
        }
    };

    drop(guard);
    result.map_err(|e| format!("terminal error: {e}"))
}

async fn run_async(run: RunConfig) -> Result<(), String> {
    let runner = Runner::new(run.runner.clone()).map_err(|e| e.to_string())?;
    let interactive = !run.once && std::io::stdout().is_terminal();

    if interactive {
        print_banner();
        format_kv_line("Source", &run.runner.source.describe());
        format_kv_line("Sort", run.initial.sort_mode.as_str());
        format_kv_line("Page size", &run.runner.page_size.to_string());
        format_kv_line("Search in", &run.runner.search_fields.label());
        format_kv_line("On error", run.runner.load_failure.as_str());
        eprintln!();
    }

    let spinner = if interactive {
        Some(loading_spinner(&run.runner.source)?)
    } else {
        None
    };
    let load = runner.load().await.map_err(|e| e.to_string())?;
    if let Some(pb) = spinner {
        pb.finish_and_clear();
    }

    if interactive {
        run_interactive(&run, &runner, load).await
    } else {
        run_once(&run, &runner, load).await
    }
}

pub fn run_cli() -> Result<(), String> {
    let args = match CliArgs::try_parse() {
        Ok(args) => args,
        Err(e) => match e.kind() {
            ErrorKind::DisplayHelp => {
                print!("{}", render_custom_help());
                return Ok(());
            }
            ErrorKind::DisplayVersion => {
                let cmd = CliArgs::command();
                print!("{}", cmd.render_version());
                return Ok(());
            }
            _ => return Err(e.to_string()),
        },
    };

    let (config_path, allow_missing) = match args.config.as_deref() {
        Some(p) => (Some(config::expand_tilde(p)), false),
        None => (config::default_config_path(), true),
    };

    if args.init_config {
        let path = config_path.ok_or_else(|| "could not determine home directory".to_string())?;
        if config::ensure_default_config_file(&path)? {
            println!(":: Wrote default config to {}", path.display());
        } else {
            println!(":: Config already exists at {}", path.display());
        }
        return Ok(());
    }

    let cfg = match config_path.as_ref() {
        Some(path) => config::load_config(path, allow_missing)?,
        None => ConfigFile::default(),
    };

    let run = build_run_config(args, cfg)?;
    if run.no_color {
        colored::control::set_override(false);
    }
    crate::logging::init(run.verbose, run.log_file.as_deref())?;

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| format!("failed to build runtime: {e}"))?;

    rt.block_on(run_async(run))
}
