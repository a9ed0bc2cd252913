use crate::catalog::LoadFailurePolicy;
use crate::cli::args::CliArgs;
use crate::output::{Locale, OutputFormat};
use crate::pipeline::{SearchFields, SortMode};

pub fn validate(args: &CliArgs) -> Result<(), String> {
    if let Some(raw) = args.sort.as_deref() {
        parse_sort(raw)?;
    }
    if let Some(raw) = args.search_fields.as_deref() {
        SearchFields::parse_csv(raw).map_err(|e| format!("invalid --search-fields '{raw}': {e}"))?;
    }
    if let Some(raw) = args.on_load_error.as_deref() {
        parse_load_failure(raw)?;
    }
    if let Some(raw) = args.locale.as_deref() {
        parse_locale(raw)?;
    }
    if let Some(raw) = args.format.as_deref() {
        parse_format(raw)?;
    }
    if let Some(page_size) = args.page_size {
        if page_size == 0 {
            return Err("invalid page-size, expected positive integer".to_string());
        }
    }
    if let Some(page) = args.page {
        if page == 0 {
            return Err("invalid page, pages start at 1".to_string());
        }
    }
    if let Some(count) = args.placeholder_count {
        if count == 0 {
            return Err("invalid placeholder-count, expected positive integer".to_string());
        }
    }
    if let Some(timeout) = args.timeout {
        if timeout == 0 {
            return Err("invalid timeout, expected positive integer".to_string());
        }
    }
    if args.init_config && args.once {
        return Err("--init-config cannot be combined with --once".to_string());
    }
    Ok(())
}

pub fn parse_sort(raw: &str) -> Result<SortMode, String> {
    SortMode::parse(raw).ok_or_else(|| {
        let modes: Vec<&str> = SortMode::ALL.iter().map(|m| m.as_str()).collect();
        format!("invalid sort '{raw}', expected one of {}", modes.join(", "))
    })
}

pub fn parse_load_failure(raw: &str) -> Result<LoadFailurePolicy, String> {
    LoadFailurePolicy::parse(raw)
        .ok_or_else(|| format!("invalid on-load-error '{raw}', expected error or placeholder"))
}

pub fn parse_locale(raw: &str) -> Result<Locale, String> {
    Locale::parse(raw).ok_or_else(|| format!("invalid locale '{raw}', expected de or en"))
}

pub fn parse_format(raw: &str) -> Result<OutputFormat, String> {
    OutputFormat::parse(raw)
        .ok_or_else(|| format!("invalid format '{raw}', expected text, json or html"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn args(argv: &[&str]) -> CliArgs {
        CliArgs::parse_from(std::iter::once("dealgrid").chain(argv.iter().copied()))
    }

    #[test]
    fn accepts_defaults() {
        assert!(validate(&args(&[])).is_ok());
    }

    #[test]
    fn rejects_unknown_sort() {
        let err = validate(&args(&["--sort", "cheapest"])).unwrap_err();
        assert!(err.contains("price-asc"));
    }

    #[test]
    fn rejects_zero_page_size_and_page() {
        assert!(validate(&args(&["--page-size", "0"])).is_err());
        assert!(validate(&args(&["--page", "0"])).is_err());
    }

    #[test]
    fn rejects_unknown_search_field() {
        assert!(validate(&args(&["--search-fields", "title,color"])).is_err());
        assert!(validate(&args(&["--search-fields", "title,brand"])).is_ok());
    }

    #[test]
    fn rejects_unknown_locale_and_policy() {
        assert!(validate(&args(&["--locale", "fr"])).is_err());
        assert!(validate(&args(&["--on-load-error", "retry"])).is_err());
        assert!(validate(&args(&["--on-load-error", "placeholder"])).is_ok());
    }
}
