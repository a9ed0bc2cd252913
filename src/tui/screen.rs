use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

use crate::output::{CardRecord, PageControls, PageView, PriceFormat, RenderSink};
use crate::pipeline::SortMode;

use super::SearchBox;

/// The last page handed over by the controller, kept as plain data so a
/// frame can be drawn from it at any time.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Screen {
    pub total_matches: usize,
    pub search_term: String,
    pub sort_mode: SortMode,
    pub page: usize,
    pub total_pages: usize,
    pub first_ordinal: usize,
    pub cards: Vec<CardRecord>,
    pub controls: PageControls,
    pub error: Option<String>,
}

impl Screen {
    fn from_view(view: &PageView<'_>, price: &PriceFormat) -> Self {
        Self {
            total_matches: view.total_matches,
            search_term: view.search_term.to_string(),
            sort_mode: view.sort_mode,
            page: view.page,
            total_pages: view.total_pages,
            first_ordinal: view.first_ordinal(),
            cards: crate::output::build_cards(view, price),
            controls: view.controls(),
            error: None,
        }
    }

    fn shows_other_content(&self, other: &Screen) -> bool {
        self.page != other.page
            || self.total_matches != other.total_matches
            || self.sort_mode != other.sort_mode
            || self.search_term != other.search_term
            || self.error != other.error
    }
}

/// Render sink for the full-screen view. Rendering only records the page;
/// [`draw`] turns it into a frame with a fixed header, a scrolling card
/// area, the page buttons and the search prompt.
#[derive(Debug)]
pub struct ScreenSink {
    price: PriceFormat,
    screen: Screen,
    scroll: u16,
    viewport: u16,
}

impl ScreenSink {
    pub fn new(price: PriceFormat) -> Self {
        Self {
            price,
            screen: Screen::default(),
            scroll: 0,
            viewport: 0,
        }
    }

    pub fn price_format(&self) -> &PriceFormat {
        &self.price
    }

    pub fn screen(&self) -> &Screen {
        &self.screen
    }

    pub fn scroll_offset(&self) -> u16 {
        self.scroll
    }

    fn max_scroll(&self) -> u16 {
        let lines = self.body_lines().len();
        let max = lines.saturating_sub(self.viewport as usize);
        u16::try_from(max).unwrap_or(u16::MAX)
    }

    fn header_line(&self) -> Line<'static> {
        let locale = self.price.locale;
        let sep = || Span::styled(" · ", Style::default().fg(Color::DarkGray));
        let mut spans = vec![
            Span::styled(
                "dealgrid",
                Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD),
            ),
            sep(),
            Span::styled(
                self.screen.total_matches.to_string(),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::raw(format!(" {}", locale.deals())),
        ];
        if !self.screen.search_term.is_empty() {
            spans.push(sep());
            spans.push(Span::raw(format!(
                "{}: \"{}\"",
                locale.search(),
                self.screen.search_term
            )));
        }
        spans.push(sep());
        spans.push(Span::raw(format!(
            "{}: {}",
            locale.sort(),
            locale.sort_label(self.screen.sort_mode)
        )));
        if self.screen.total_pages > 0 {
            spans.push(sep());
            spans.push(Span::raw(format!(
                "{} {}/{}",
                locale.page(),
                self.screen.page,
                self.screen.total_pages
            )));
        }
        Line::from(spans)
    }

    fn card_lines(&self, ordinal: usize, card: &CardRecord, lines: &mut Vec<Line<'static>>) {
        let dim = Style::default().fg(Color::DarkGray);

        let mut title = vec![Span::styled(format!("{ordinal:>3}. "), dim)];
        if card.discount > 0 {
            title.push(Span::styled(
                format!(" -{}% ", card.discount),
                Style::default()
                    .bg(Color::Magenta)
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD),
            ));
            title.push(Span::raw(" "));
        }
        title.push(Span::styled(
            card.title.clone(),
            Style::default().add_modifier(Modifier::BOLD),
        ));
        lines.push(Line::from(title));

        lines.push(Line::from(Span::styled(
            format!("     {}", card.category.to_uppercase()),
            dim,
        )));

        let mut price = vec![
            Span::raw("     "),
            Span::styled(
                card.price_label.clone(),
                Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD),
            ),
        ];
        if let Some(old) = card.old_price_label.as_deref() {
            price.push(Span::raw("  "));
            price.push(Span::styled(
                old.to_string(),
                dim.add_modifier(Modifier::CROSSED_OUT),
            ));
        }
        if let Some(stars) = card.stars.as_deref() {
            price.push(Span::raw("  "));
            price.push(Span::styled(stars.to_string(), Style::default().fg(Color::Yellow)));
        }
        lines.push(Line::from(price));

        if let Some(url) = card.url.as_deref() {
            lines.push(Line::from(vec![
                Span::raw("     "),
                Span::styled(
                    format!("{} → ", self.price.locale.call_to_action()),
                    Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
                ),
                Span::styled(
                    url.to_string(),
                    Style::default().add_modifier(Modifier::UNDERLINED),
                ),
            ]));
        }
    }

    fn body_lines(&self) -> Vec<Line<'static>> {
        let locale = self.price.locale;
        let dim = Style::default().fg(Color::DarkGray);
        let mut lines = Vec::new();

        if let Some(message) = self.screen.error.as_deref() {
            lines.push(Line::default());
            lines.push(Line::from(Span::styled(
                format!("  {}", locale.load_error_title()),
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            )));
            lines.push(Line::from(Span::styled(
                format!("  {}", locale.load_error_hint()),
                dim,
            )));
            lines.push(Line::from(Span::styled(format!("  {message}"), dim)));
            return lines;
        }

        if self.screen.cards.is_empty() {
            lines.push(Line::default());
            lines.push(Line::from(Span::styled(
                format!("  {}", locale.no_results()),
                dim,
            )));
            return lines;
        }

        for (i, card) in self.screen.cards.iter().enumerate() {
            if i > 0 {
                lines.push(Line::default());
            }
            self.card_lines(self.screen.first_ordinal + i, card, &mut lines);
        }
        lines
    }

    fn controls_line(&self) -> Line<'static> {
        let controls = &self.screen.controls;
        if controls.is_empty() {
            return Line::default();
        }
        let edge = |label: &'static str, target: Option<usize>| match target {
            Some(_) => Span::styled(label, Style::default().add_modifier(Modifier::BOLD)),
            None => Span::styled(label, Style::default().fg(Color::DarkGray)),
        };
        let mut spans = vec![edge("‹", controls.prev), Span::raw(" ")];
        for button in controls.buttons.iter() {
            if button.current {
                spans.push(Span::styled(
                    format!("[{}]", button.number),
                    Style::default()
                        .bg(Color::Blue)
                        .fg(Color::White)
                        .add_modifier(Modifier::BOLD),
                ));
            } else {
                spans.push(Span::raw(format!(" {} ", button.number)));
            }
            spans.push(Span::raw(" "));
        }
        spans.push(edge("›", controls.next));
        Line::from(spans)
    }

    fn prompt_line(&self, search: &SearchBox) -> Line<'static> {
        Line::from(vec![
            Span::styled(
                format!("{} › ", self.price.locale.search()),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::raw(search.text().to_string()),
            Span::styled("▏", Style::default().fg(Color::Blue)),
            Span::styled(
                "   Tab sort · ←/→ page · ↑/↓ scroll · Enter apply · Esc quit",
                Style::default().fg(Color::DarkGray),
            ),
        ])
    }
}

impl RenderSink for ScreenSink {
    fn render(&mut self, view: &PageView<'_>) {
        let next = Screen::from_view(view, &self.price);
        if next.shows_other_content(&self.screen) {
            self.scroll = 0;
        }
        self.screen = next;
    }

    fn render_error(&mut self, message: &str) {
        self.screen.error = Some(message.to_string());
        self.scroll = 0;
    }

    fn scroll_to_top(&mut self) {
        self.scroll = 0;
    }

    fn scroll(&mut self, lines: isize) {
        let target = (self.scroll as isize).saturating_add(lines);
        let max = self.max_scroll() as isize;
        self.scroll = target.clamp(0, max) as u16;
    }
}

/// Lays out one frame: header, scrolling cards, page buttons, prompt.
pub fn draw(frame: &mut Frame<'_>, sink: &mut ScreenSink, search: &SearchBox) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Min(1),
            Constraint::Length(1),
            Constraint::Length(2),
        ])
        .split(frame.area());

    let header = Paragraph::new(sink.header_line()).block(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_style(Style::default().fg(Color::DarkGray)),
    );
    frame.render_widget(header, chunks[0]);

    sink.viewport = chunks[1].height;
    sink.scroll = sink.scroll.min(sink.max_scroll());
    let body = Paragraph::new(sink.body_lines()).scroll((sink.scroll, 0));
    frame.render_widget(body, chunks[1]);

    frame.render_widget(Paragraph::new(sink.controls_line()), chunks[2]);

    let prompt = Paragraph::new(sink.prompt_line(search)).block(
        Block::default()
            .borders(Borders::TOP)
            .border_style(Style::default().fg(Color::DarkGray)),
    );
    frame.render_widget(prompt, chunks[3]);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Product;
    use crate::controller::Controller;
    use crate::pipeline::PipelineOptions;
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    fn catalog(count: usize) -> Vec<Product> {
        (1..=count)
            .map(|i| Product {
                old_price: Some(i as f64 * 2.0),
                url: Some(format!("https://shop.example/{i}")),
                rating: Some(4.0),
                ..Product::new(format!("Deal {i:02}"), i as f64)
            })
            .collect()
    }

    fn rows(terminal: &Terminal<TestBackend>) -> Vec<String> {
        let buffer = terminal.backend().buffer();
        let area = buffer.area;
        (0..area.height)
            .map(|y| {
                (0..area.width)
                    .map(|x| buffer[(x, y)].symbol())
                    .collect::<String>()
            })
            .collect()
    }

    fn frame(sink: &mut ScreenSink, search: &SearchBox) -> Vec<String> {
        let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();
        terminal.draw(|f| draw(f, sink, search)).unwrap();
        rows(&terminal)
    }

    #[test]
    fn full_page_keeps_header_and_prompt_on_screen() {
        let products = catalog(25);
        let mut c = Controller::new(
            &products,
            PipelineOptions::default(),
            ScreenSink::new(PriceFormat::default()),
        );
        c.start();
        let rows = frame(c.sink_mut(), &SearchBox::new("deal"));
        assert!(rows[0].contains("25 Deals"));
        assert!(rows[0].contains("Seite 1/3"));
        assert!(rows[2].contains("Deal 01"));
        assert!(rows[21].contains("[1]"));
        assert!(rows[23].starts_with("Suche › deal"));
    }

    #[test]
    fn page_change_scrolls_back_to_top() {
        let products = catalog(25);
        let mut c = Controller::new(
            &products,
            PipelineOptions::default(),
            ScreenSink::new(PriceFormat::default()),
        );
        c.start();
        let search = SearchBox::default();
        frame(c.sink_mut(), &search);

        c.sink_mut().scroll(10);
        assert_eq!(c.sink().scroll_offset(), 10);
        let scrolled = frame(c.sink_mut(), &search);
        assert!(!scrolled[2].contains("Deal 01"));

        c.next_page();
        assert_eq!(c.sink().scroll_offset(), 0);
        let rows = frame(c.sink_mut(), &search);
        assert!(rows[0].contains("Seite 2/3"));
        assert!(rows[2].contains("Deal 13"));
    }

    #[test]
    fn scroll_stops_at_last_line() {
        let products = catalog(3);
        let mut c = Controller::new(
            &products,
            PipelineOptions::default(),
            ScreenSink::new(PriceFormat::default()),
        );
        c.start();
        frame(c.sink_mut(), &SearchBox::default());
        c.sink_mut().scroll(100);
        assert_eq!(c.sink().scroll_offset(), 0);
        c.sink_mut().scroll(-5);
        assert_eq!(c.sink().scroll_offset(), 0);
    }

    #[test]
    fn empty_result_draws_single_message_without_buttons() {
        let products = catalog(25);
        let mut c = Controller::new(
            &products,
            PipelineOptions::default(),
            ScreenSink::new(PriceFormat::default()),
        );
        c.start();
        c.apply_search("shoe");
        let rows = frame(c.sink_mut(), &SearchBox::new("shoe"));
        let joined = rows.join("\n");
        assert_eq!(joined.matches("Keine Angebote").count(), 1);
        assert!(!joined.contains('‹'));
        assert!(rows[0].contains("0 Deals"));
    }

    #[test]
    fn error_replaces_cards() {
        let mut sink = ScreenSink::new(PriceFormat::default());
        sink.render_error("status 503");
        let joined = frame(&mut sink, &SearchBox::default()).join("\n");
        assert!(joined.contains("nicht geladen"));
        assert!(joined.contains("status 503"));
    }
}
