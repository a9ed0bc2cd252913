use clap::{ArgAction, Parser};

#[derive(Parser, Debug, Clone)]
#[command(
    name = "dealgrid",
    version,
    about = "terminal browser for product deal catalogs",
    long_about = "dealgrid fetches a product catalog once and lets you search, sort and page through it in the terminal.\n\nExamples:\n  dealgrid\n  dealgrid -s ./deals.json --sort discount-desc\n  dealgrid --once --search shoe --format json\n  dealgrid --once --page 2 -o page2.html\n\nTip: Use --init-config to write ~/.dealgrid/config.yml and keep invocations short."
)]
pub struct CliArgs {
    #[arg(
        short = 'v',
        long = "vb",
        visible_alias = "verbose",
        action = ArgAction::Count,
        help_heading = "Output",
        help = "Increase log verbosity (-v, -vv)."
    )]
    pub verbose: u8,

    #[arg(
        short = 'c',
        long = "clr",
        visible_alias = "color",
        help_heading = "Output",
        help = "Enable colored output (overrides --no-color)."
    )]
    pub color: bool,

    #[arg(
        short = 'n',
        long = "nc",
        visible_alias = "no-color",
        help_heading = "Output",
        help = "Disable colored output."
    )]
    pub no_color: bool,

    #[arg(
        short = 's',
        long = "src",
        visible_alias = "source",
        value_name = "URL|FILE",
        help_heading = "Input",
        help = "Catalog to load: an http(s) URL or a local JSON file."
    )]
    pub source: Option<String>,

    #[arg(
        short = 'C',
        long = "cfg",
        visible_alias = "config",
        value_name = "FILE",
        help_heading = "Input",
        help = "Path to config file (defaults to ~/.dealgrid/config.yml)."
    )]
    pub config: Option<String>,

    #[arg(
        long = "init-config",
        help_heading = "Input",
        help = "Write a commented default config file and exit."
    )]
    pub init_config: bool,

    #[arg(
        long = "ole",
        visible_alias = "on-load-error",
        value_name = "POLICY",
        help_heading = "Input",
        help = "What to show when the catalog cannot be loaded (error or placeholder)."
    )]
    pub on_load_error: Option<String>,

    #[arg(
        long = "phc",
        visible_alias = "placeholder-count",
        value_name = "N",
        help_heading = "Input",
        help = "Number of placeholder deals used by --on-load-error placeholder."
    )]
    pub placeholder_count: Option<usize>,

    #[arg(
        short = 'q',
        long = "q",
        visible_alias = "search",
        value_name = "TERM",
        help_heading = "View",
        help = "Initial search term."
    )]
    pub search: Option<String>,

    #[arg(
        long = "sf",
        visible_alias = "search-fields",
        value_name = "LIST",
        help_heading = "View",
        help = "Fields the search matches against (comma-separated: title,category,brand,description)."
    )]
    pub search_fields: Option<String>,

    #[arg(
        short = 'S',
        long = "srt",
        visible_alias = "sort",
        value_name = "MODE",
        help_heading = "View",
        help = "Sort mode (default, price-asc, price-desc, discount-desc, rating-desc)."
    )]
    pub sort: Option<String>,

    #[arg(
        short = 'p',
        long = "pg",
        visible_alias = "page",
        value_name = "N",
        help_heading = "View",
        help = "Initial page (1-based)."
    )]
    pub page: Option<usize>,

    #[arg(
        short = 'P',
        long = "ps",
        visible_alias = "page-size",
        value_name = "N",
        help_heading = "View",
        help = "Deals per page."
    )]
    pub page_size: Option<usize>,

    #[arg(
        long = "db",
        visible_alias = "debounce-ms",
        value_name = "MS",
        help_heading = "View",
        help = "Quiet interval before a typed search is applied, in milliseconds."
    )]
    pub debounce_ms: Option<u64>,

    #[arg(
        short = 'l',
        long = "lc",
        visible_alias = "locale",
        value_name = "LOCALE",
        help_heading = "View",
        help = "Label and price locale (de or en)."
    )]
    pub locale: Option<String>,

    #[arg(
        long = "cur",
        visible_alias = "currency",
        value_name = "SYMBOL",
        help_heading = "View",
        help = "Currency symbol shown with prices."
    )]
    pub currency: Option<String>,

    #[arg(
        long = "once",
        help_heading = "Output",
        help = "Render one page and exit instead of starting the interactive view."
    )]
    pub once: bool,

    #[arg(
        short = 'f',
        long = "fmt",
        visible_alias = "format",
        value_name = "FORMAT",
        help_heading = "Output",
        help = "One-shot output format (text, json, html)."
    )]
    pub format: Option<String>,

    #[arg(
        short = 'o',
        long = "out",
        visible_alias = "output",
        value_name = "FILE",
        help_heading = "Output",
        help = "Write the one-shot page to a file (format inferred from extension)."
    )]
    pub output: Option<String>,

    #[arg(
        long = "lf",
        visible_alias = "log-file",
        value_name = "FILE",
        help_heading = "Output",
        help = "Write log lines to a file instead of stderr."
    )]
    pub log_file: Option<String>,

    #[arg(
        short = 'T',
        long = "to",
        visible_alias = "timeout",
        value_name = "SECONDS",
        help_heading = "HTTP",
        help = "Catalog request timeout in seconds."
    )]
    pub timeout: Option<usize>,

    #[arg(
        short = 'x',
        long = "px",
        visible_alias = "proxy",
        value_name = "URL",
        help_heading = "HTTP",
        help = "HTTP proxy URL (e.g. http://127.0.0.1:8080)."
    )]
    pub proxy: Option<String>,
}
