use std::io::Write;

use colored::Colorize;

use super::{CardRecord, PageControls, PageView, PriceFormat, RenderSink};

const RULE_WIDTH: usize = 56;

/// Writes each rendered page as colored text blocks, one after another.
pub struct TerminalSink<W: Write> {
    out: W,
    price: PriceFormat,
}

impl<W: Write> TerminalSink<W> {
    pub fn new(out: W, price: PriceFormat) -> Self {
        Self { out, price }
    }

    pub fn price_format(&self) -> &PriceFormat {
        &self.price
    }

    pub fn writer(&mut self) -> &mut W {
        &mut self.out
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn emit(&mut self, lines: &[String]) {
        let mut buf = String::new();
        for line in lines {
            buf.push_str(line);
            buf.push('\n');
        }
        if let Err(e) = self.out.write_all(buf.as_bytes()).and_then(|_| self.out.flush()) {
            tracing::warn!(error = %e, "failed to write to terminal");
        }
    }

    fn header(&self, view: &PageView<'_>) -> String {
        let locale = self.price.locale;
        let mut parts = vec![format!(
            "{} {}",
            view.total_matches.to_string().bold(),
            locale.deals()
        )];
        if !view.search_term.is_empty() {
            parts.push(format!("{}: \"{}\"", locale.search(), view.search_term));
        }
        parts.push(format!(
            "{}: {}",
            locale.sort(),
            locale.sort_label(view.sort_mode)
        ));
        if view.total_pages > 0 {
            parts.push(format!(
                "{} {}/{}",
                locale.page(),
                view.page,
                view.total_pages
            ));
        }
        let sep = format!(" {} ", "·".dimmed());
        format!("{} {}", "dealgrid".bold().blue(), parts.join(sep.as_str()))
    }

    fn card_lines(&self, ordinal: usize, card: &CardRecord) -> Vec<String> {
        let mut lines = Vec::new();
        let mut title = format!("{:>3}. ", ordinal).dimmed().to_string();
        if card.discount > 0 {
            let badge = format!(" -{}% ", card.discount);
            title.push_str(&badge.on_magenta().white().bold().to_string());
            title.push(' ');
        }
        title.push_str(&card.title.bold().to_string());
        lines.push(title);

        lines.push(format!("     {}", card.category.to_uppercase().dimmed()));

        let mut price = format!("     {}", card.price_label.bold().blue());
        if let Some(old) = card.old_price_label.as_deref() {
            price.push_str("  ");
            price.push_str(&old.strikethrough().dimmed().to_string());
        }
        if let Some(stars) = card.stars.as_deref() {
            price.push_str("  ");
            price.push_str(&stars.yellow().to_string());
        }
        lines.push(price);

        if let Some(url) = card.url.as_deref() {
            lines.push(format!(
                "     {} {}",
                format!("{} →", self.price.locale.call_to_action()).green().bold(),
                url.underline()
            ));
        }
        if let Some(image) = card.image.as_deref() {
            lines.push(format!("     {}", image.dimmed()));
        }
        lines
    }

    fn controls_line(controls: &PageControls) -> Option<String> {
        if controls.is_empty() {
            return None;
        }
        let mut parts: Vec<String> = Vec::with_capacity(controls.buttons.len() + 2);
        parts.push(match controls.prev {
            Some(_) => "‹".bold().to_string(),
            None => "‹".dimmed().to_string(),
        });
        for button in controls.buttons.iter() {
            if button.current {
                parts.push(format!("[{}]", button.number).on_blue().white().bold().to_string());
            } else {
                parts.push(format!(" {} ", button.number));
            }
        }
        parts.push(match controls.next {
            Some(_) => "›".bold().to_string(),
            None => "›".dimmed().to_string(),
        });
        Some(parts.join(" "))
    }
}

impl<W: Write> RenderSink for TerminalSink<W> {
    fn render(&mut self, view: &PageView<'_>) {
        let mut lines = vec![self.header(view), "─".repeat(RULE_WIDTH).dimmed().to_string()];

        if view.is_empty() {
            lines.push(String::new());
            lines.push(format!("  {}", self.price.locale.no_results().dimmed()));
            lines.push(String::new());
        } else {
            let offset = view.first_ordinal() - 1;
            for (i, product) in view.items.iter().enumerate() {
                let card = CardRecord::from_product(product, &self.price);
                lines.push(String::new());
                lines.extend(self.card_lines(offset + i + 1, &card));
            }
            lines.push(String::new());
        }

        lines.push("─".repeat(RULE_WIDTH).dimmed().to_string());
        if let Some(controls) = Self::controls_line(&view.controls()) {
            lines.push(controls);
        }
        self.emit(&lines);
    }

    fn render_error(&mut self, message: &str) {
        let locale = self.price.locale;
        let lines = vec![
            "dealgrid".bold().blue().to_string(),
            "─".repeat(RULE_WIDTH).dimmed().to_string(),
            String::new(),
            format!("  {}", locale.load_error_title().red().bold()),
            format!("  {}", locale.load_error_hint().dimmed()),
            format!("  {}", message.dimmed()),
            String::new(),
        ];
        self.emit(&lines);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Product;
    use crate::pipeline::SortMode;

    fn render(view: &PageView<'_>) -> String {
        colored::control::set_override(false);
        let mut sink = TerminalSink::new(Vec::new(), PriceFormat::default());
        sink.render(view);
        String::from_utf8(sink.into_inner()).unwrap()
    }

    #[test]
    fn renders_card_fields() {
        let products = [Product {
            old_price: Some(40.0),
            category: Some("Schuhe".to_string()),
            rating: Some(4.0),
            url: Some("https://shop.example/1".to_string()),
            ..Product::new("Laufschuh", 20.0)
        }];
        let items: Vec<&Product> = products.iter().collect();
        let out = render(&PageView {
            items: &items,
            page: 1,
            page_size: 12,
            total_pages: 1,
            total_matches: 1,
            search_term: "",
            sort_mode: SortMode::Default,
        });
        assert!(out.contains("Laufschuh"));
        assert!(out.contains("SCHUHE"));
        assert!(out.contains("20,00 €"));
        assert!(out.contains("40,00 €"));
        assert!(out.contains("-50%"));
        assert!(out.contains("★★★★☆"));
        assert!(out.contains("Zum Angebot →"));
        assert!(out.contains("https://shop.example/1"));
    }

    #[test]
    fn empty_page_renders_single_no_results_line() {
        let items: Vec<&Product> = Vec::new();
        let out = render(&PageView {
            items: &items,
            page: 1,
            page_size: 12,
            total_pages: 0,
            total_matches: 0,
            search_term: "shoe",
            sort_mode: SortMode::Default,
        });
        assert_eq!(out.matches("Keine Angebote").count(), 1);
        assert!(!out.contains('‹'));
    }

    #[test]
    fn renders_error_message() {
        colored::control::set_override(false);
        let mut sink = TerminalSink::new(Vec::new(), PriceFormat::default());
        sink.render_error("status 503");
        let out = String::from_utf8(sink.into_inner()).unwrap();
        assert!(out.contains("konnten nicht geladen werden"));
        assert!(out.contains("status 503"));
    }
}
