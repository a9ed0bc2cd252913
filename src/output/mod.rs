pub mod report;
pub mod terminal;

use serde::Serialize;

use crate::catalog::Product;
use crate::pipeline::{derived_discount, SortMode};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
    Html,
}

impl OutputFormat {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "text" | "txt" => Some(Self::Text),
            "json" => Some(Self::Json),
            "html" | "htm" => Some(Self::Html),
            _ => None,
        }
    }
}

pub fn infer_format_from_path(path: &str) -> Option<OutputFormat> {
    let lower = path.trim().to_lowercase();
    if lower.ends_with(".json") {
        return Some(OutputFormat::Json);
    }
    if lower.ends_with(".html") || lower.ends_with(".htm") {
        return Some(OutputFormat::Html);
    }
    if lower.ends_with(".txt") {
        return Some(OutputFormat::Text);
    }
    None
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Locale {
    #[default]
    De,
    En,
}

impl Locale {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "de" | "de-de" | "de_de" => Some(Self::De),
            "en" | "en-us" | "en_us" | "en-gb" | "en_gb" => Some(Self::En),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::De => "de",
            Self::En => "en",
        }
    }

    fn separators(&self) -> (char, char) {
        match self {
            Self::De => (',', '.'),
            Self::En => ('.', ','),
        }
    }

    pub fn no_results(&self) -> &'static str {
        match self {
            Self::De => "Keine Angebote zu deiner Suche gefunden.",
            Self::En => "No deals match your search.",
        }
    }

    pub fn call_to_action(&self) -> &'static str {
        match self {
            Self::De => "Zum Angebot",
            Self::En => "View deal",
        }
    }

    pub fn fallback_category(&self) -> &'static str {
        match self {
            Self::De => "Angebot",
            Self::En => "Deal",
        }
    }

    pub fn load_error_title(&self) -> &'static str {
        match self {
            Self::De => "Ups! Die Angebote konnten nicht geladen werden.",
            Self::En => "Oops! The deals could not be loaded.",
        }
    }

    pub fn load_error_hint(&self) -> &'static str {
        match self {
            Self::De => "Prüfe deine Internetverbindung oder versuche es später erneut.",
            Self::En => "Check your connection or try again later.",
        }
    }

    pub fn deals(&self) -> &'static str {
        match self {
            Self::De => "Deals",
            Self::En => "deals",
        }
    }

    pub fn search(&self) -> &'static str {
        match self {
            Self::De => "Suche",
            Self::En => "Search",
        }
    }

    pub fn sort(&self) -> &'static str {
        match self {
            Self::De => "Sortierung",
            Self::En => "Sort",
        }
    }

    pub fn page(&self) -> &'static str {
        match self {
            Self::De => "Seite",
            Self::En => "Page",
        }
    }

    pub fn sort_label(&self, mode: SortMode) -> &'static str {
        match self {
            Self::De => mode.label(),
            Self::En => match mode {
                SortMode::Default => "Recommended",
                SortMode::PriceAsc => "Price: low to high",
                SortMode::PriceDesc => "Price: high to low",
                SortMode::DiscountDesc => "Biggest discount",
                SortMode::RatingDesc => "Best rated",
            },
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PriceFormat {
    pub locale: Locale,
    pub currency: String,
}

impl Default for PriceFormat {
    fn default() -> Self {
        Self {
            locale: Locale::De,
            currency: "€".to_string(),
        }
    }
}

impl PriceFormat {
    pub fn new(locale: Locale, currency: impl Into<String>) -> Self {
        Self {
            locale,
            currency: currency.into(),
        }
    }

    /// `1.299,00 €` for German, `€1,299.00` for English.
    pub fn format(&self, amount: f64) -> String {
        let (decimal, group) = self.locale.separators();
        let cents = (amount.abs() * 100.0).round() as u64;
        let whole = (cents / 100).to_string();
        let frac = cents % 100;

        let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
        for (i, ch) in whole.chars().enumerate() {
            if i > 0 && (whole.len() - i) % 3 == 0 {
                grouped.push(group);
            }
            grouped.push(ch);
        }
        let sign = if amount < 0.0 && cents > 0 { "-" } else { "" };

        match self.locale {
            Locale::De => format!("{sign}{grouped}{decimal}{frac:02} {}", self.currency),
            Locale::En => format!("{sign}{}{grouped}{decimal}{frac:02}", self.currency),
        }
    }
}

/// Five-star bar for a 0–5 rating, rounded to whole stars.
pub fn rating_stars(rating: f64) -> String {
    let filled = rating.round().clamp(0.0, 5.0) as usize;
    format!("{}{}", "★".repeat(filled), "☆".repeat(5 - filled))
}

/// Everything a sink needs to draw one page.
#[derive(Clone, Debug)]
pub struct PageView<'a> {
    pub items: &'a [&'a Product],
    pub page: usize,
    pub page_size: usize,
    pub total_pages: usize,
    pub total_matches: usize,
    pub search_term: &'a str,
    pub sort_mode: SortMode,
}

impl PageView<'_> {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// 1-based position of the first item on this page within all matches.
    pub fn first_ordinal(&self) -> usize {
        (self.page.max(1) - 1) * self.page_size + 1
    }

    pub fn controls(&self) -> PageControls {
        page_controls(self.page, self.total_pages)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct PageButton {
    pub number: usize,
    pub current: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct PageControls {
    pub buttons: Vec<PageButton>,
    /// Target of the "previous" control; `None` renders it disabled.
    pub prev: Option<usize>,
    pub next: Option<usize>,
}

impl PageControls {
    pub fn is_empty(&self) -> bool {
        self.buttons.is_empty()
    }
}

/// One button per page plus prev/next. A single page (or none) gets no
/// controls at all.
pub fn page_controls(current: usize, total_pages: usize) -> PageControls {
    if total_pages <= 1 {
        return PageControls::default();
    }
    let buttons = (1..=total_pages)
        .map(|number| PageButton {
            number,
            current: number == current,
        })
        .collect();
    PageControls {
        buttons,
        prev: if current > 1 { Some(current - 1) } else { None },
        next: if current < total_pages {
            Some(current + 1)
        } else {
            None
        },
    }
}

pub trait RenderSink {
    fn render(&mut self, view: &PageView<'_>);

    /// Replaces the card area with a load failure message.
    fn render_error(&mut self, message: &str);

    fn scroll_to_top(&mut self) {}

    /// Moves the visible part of a page that is taller than the screen.
    fn scroll(&mut self, _lines: isize) {}
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CardRecord {
    pub title: String,
    pub category: String,
    pub price: f64,
    pub price_label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub old_price_label: Option<String>,
    pub discount: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stars: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl CardRecord {
    pub fn from_product(product: &Product, price: &PriceFormat) -> Self {
        Self {
            title: product.title.clone(),
            category: product
                .category
                .clone()
                .unwrap_or_else(|| price.locale.fallback_category().to_string()),
            price: product.current_price,
            price_label: price.format(product.current_price),
            old_price_label: product.old_price.map(|p| price.format(p)),
            discount: derived_discount(product),
            rating: product.rating,
            stars: product.rating.map(rating_stars),
            image: product.image.clone(),
            url: product.url.clone(),
        }
    }
}

pub fn build_cards(view: &PageView<'_>, price: &PriceFormat) -> Vec<CardRecord> {
    view.items
        .iter()
        .map(|p| CardRecord::from_product(p, price))
        .collect()
}

#[derive(Serialize)]
struct PageRecord<'a> {
    page: usize,
    total_pages: usize,
    total_matches: usize,
    search_term: &'a str,
    sort: &'static str,
    controls: PageControls,
    cards: Vec<CardRecord>,
}

pub fn render_json(view: &PageView<'_>, price: &PriceFormat) -> Vec<u8> {
    let record = PageRecord {
        page: view.page,
        total_pages: view.total_pages,
        total_matches: view.total_matches,
        search_term: view.search_term,
        sort: view.sort_mode.as_str(),
        controls: view.controls(),
        cards: build_cards(view, price),
    };
    serde_json::to_vec_pretty(&record).unwrap_or_else(|_| b"{}\n".to_vec())
}

pub fn render_text(view: &PageView<'_>, price: &PriceFormat) -> Vec<u8> {
    let mut sink = terminal::TerminalSink::new(Vec::new(), price.clone());
    sink.render(view);
    sink.into_inner()
}

pub fn render_html(view: &PageView<'_>, price: &PriceFormat) -> Vec<u8> {
    report::render_html(view, price)
}

pub fn render_page(format: OutputFormat, view: &PageView<'_>, price: &PriceFormat) -> Vec<u8> {
    match format {
        OutputFormat::Text => render_text(view, price),
        OutputFormat::Json => render_json(view, price),
        OutputFormat::Html => render_html(view, price),
    }
}

pub fn render_error_page(format: OutputFormat, message: &str, price: &PriceFormat) -> Vec<u8> {
    match format {
        OutputFormat::Text => {
            let mut sink = terminal::TerminalSink::new(Vec::new(), price.clone());
            sink.render_error(message);
            sink.into_inner()
        }
        OutputFormat::Json => {
            let record = serde_json::json!({
                "error": price.locale.load_error_title(),
                "detail": message,
            });
            serde_json::to_vec_pretty(&record).unwrap_or_else(|_| b"{}\n".to_vec())
        }
        OutputFormat::Html => report::render_error_html(message, price.locale),
    }
}

/// Keeps the most recent frame as bytes in one output format.
pub struct SnapshotSink {
    format: OutputFormat,
    price: PriceFormat,
    last: Vec<u8>,
}

impl SnapshotSink {
    pub fn new(format: OutputFormat, price: PriceFormat) -> Self {
        Self {
            format,
            price,
            last: Vec::new(),
        }
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.last
    }
}

impl RenderSink for SnapshotSink {
    fn render(&mut self, view: &PageView<'_>) {
        self.last = render_page(self.format, view, &self.price);
    }

    fn render_error(&mut self, message: &str) {
        self.last = render_error_page(self.format, message, &self.price);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_german_prices() {
        let fmt = PriceFormat::default();
        assert_eq!(fmt.format(19.99), "19,99 €");
        assert_eq!(fmt.format(1299.0), "1.299,00 €");
        assert_eq!(fmt.format(0.0), "0,00 €");
    }

    #[test]
    fn formats_english_prices() {
        let fmt = PriceFormat::new(Locale::En, "$");
        assert_eq!(fmt.format(19.99), "$19.99");
        assert_eq!(fmt.format(1234567.5), "$1,234,567.50");
    }

    #[test]
    fn stars_round_to_whole() {
        assert_eq!(rating_stars(4.4), "★★★★☆");
        assert_eq!(rating_stars(4.5), "★★★★★");
        assert_eq!(rating_stars(0.0), "☆☆☆☆☆");
        assert_eq!(rating_stars(9.0), "★★★★★");
    }

    #[test]
    fn controls_mark_current_and_disable_edges() {
        let c = page_controls(1, 3);
        assert_eq!(c.buttons.len(), 3);
        assert!(c.buttons[0].current);
        assert_eq!(c.prev, None);
        assert_eq!(c.next, Some(2));

        let c = page_controls(3, 3);
        assert_eq!(c.prev, Some(2));
        assert_eq!(c.next, None);
    }

    #[test]
    fn no_controls_for_zero_or_one_page() {
        assert!(page_controls(1, 0).is_empty());
        assert!(page_controls(1, 1).is_empty());
    }

    #[test]
    fn card_falls_back_for_missing_fields() {
        let product = Product::new("Nur Titel", 5.0);
        let card = CardRecord::from_product(&product, &PriceFormat::default());
        assert_eq!(card.category, "Angebot");
        assert_eq!(card.old_price_label, None);
        assert_eq!(card.discount, 0);
        assert_eq!(card.stars, None);
    }

    #[test]
    fn json_page_carries_paging_metadata() {
        let products = [Product {
            old_price: Some(40.0),
            ..Product::new("A", 20.0)
        }];
        let items: Vec<&Product> = products.iter().collect();
        let view = PageView {
            items: &items,
            page: 1,
            page_size: 12,
            total_pages: 1,
            total_matches: 1,
            search_term: "a",
            sort_mode: SortMode::PriceAsc,
        };
        let json: serde_json::Value =
            serde_json::from_slice(&render_json(&view, &PriceFormat::default())).unwrap();
        assert_eq!(json["total_matches"], 1);
        assert_eq!(json["sort"], "price-asc");
        assert_eq!(json["cards"][0]["discount"], 50);
        assert_eq!(json["cards"][0]["price_label"], "20,00 €");
    }

    #[test]
    fn infers_format_from_extension() {
        assert_eq!(infer_format_from_path("page.html"), Some(OutputFormat::Html));
        assert_eq!(infer_format_from_path("page.JSON"), Some(OutputFormat::Json));
        assert_eq!(infer_format_from_path("page"), None);
    }
}
