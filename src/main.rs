use std::process::exit;

use colored::Colorize;

fn main() {
    if let Err(e) = dealgrid::app::run_cli() {
        eprintln!(
            "{}{}{} {}",
            "[".bold().white(),
            "ERR".bold().red(),
            "]".bold().white(),
            e.bold().white()
        );
        exit(1);
    }
}
