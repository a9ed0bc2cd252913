pub mod debounce;

use std::time::{Duration, Instant};

use crate::catalog::Product;
use crate::output::{PageView, RenderSink};
use crate::pipeline::{self, PipelineOptions, SortMode, ViewState};

pub use debounce::{Debouncer, DEFAULT_QUIET};

/// Owns the view state and drives Filter → Sort → Paginate → Render.
///
/// The filtered and sorted view is cached between runs so that switching
/// pages only re-renders; search and sort changes rebuild it from the
/// catalog.
pub struct Controller<'a, S: RenderSink> {
    catalog: &'a [Product],
    options: PipelineOptions,
    state: ViewState,
    view: Vec<&'a Product>,
    search: Debouncer<String>,
    sink: S,
}

impl<'a, S: RenderSink> Controller<'a, S> {
    pub fn new(catalog: &'a [Product], options: PipelineOptions, sink: S) -> Self {
        Self {
            catalog,
            options,
            state: ViewState::default(),
            view: Vec::new(),
            search: Debouncer::default(),
            sink,
        }
    }

    pub fn with_debounce(mut self, quiet: Duration) -> Self {
        self.search = Debouncer::new(quiet);
        self
    }

    /// Starting state, e.g. from command-line flags. Takes effect on
    /// [`Controller::start`].
    pub fn with_state(mut self, state: ViewState) -> Self {
        self.state = state;
        self
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn options(&self) -> &PipelineOptions {
        &self.options
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    pub fn total_matches(&self) -> usize {
        self.view.len()
    }

    pub fn total_pages(&self) -> usize {
        pipeline::total_pages(self.view.len(), self.options.page_size)
    }

    pub fn current_page_items(&self) -> &[&'a Product] {
        pipeline::page_window(&self.view, self.state.current_page, self.options.page_size)
    }

    pub fn start(&mut self) {
        tracing::debug!(catalog = self.catalog.len(), "controller started");
        self.refresh();
    }

    /// A keystroke in the search box. The term is applied once input has
    /// been quiet for the debounce interval; see [`Controller::poll`].
    pub fn on_search_input(&mut self, text: impl Into<String>, now: Instant) {
        self.search.arm(text.into(), now);
    }

    /// Applies a search term right away, dropping any pending keystrokes.
    pub fn apply_search(&mut self, term: impl Into<String>) {
        self.search.cancel();
        self.set_search(term.into());
    }

    /// Runs the pending search if its quiet interval has elapsed. Returns
    /// whether the pipeline re-ran.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.search.fire(now) {
            Some(term) => {
                self.set_search(term);
                true
            }
            None => false,
        }
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.search.deadline()
    }

    pub fn has_pending_search(&self) -> bool {
        self.search.is_pending()
    }

    pub fn on_sort_change(&mut self, mode: SortMode) {
        tracing::info!(sort = mode.as_str(), "sort changed");
        self.state.sort_mode = mode;
        self.state.current_page = 1;
        self.refresh();
    }

    /// Jumps to `page` without re-filtering. Pages outside `1..=total` are
    /// ignored and `false` is returned.
    pub fn on_page_select(&mut self, page: usize) -> bool {
        let total = self.total_pages();
        if page == 0 || page > total {
            tracing::debug!(page, total, "ignoring out-of-range page");
            return false;
        }
        self.state.current_page = page;
        self.sink.scroll_to_top();
        self.render();
        true
    }

    pub fn next_page(&mut self) -> bool {
        self.on_page_select(self.state.current_page + 1)
    }

    pub fn prev_page(&mut self) -> bool {
        match self.state.current_page.checked_sub(1) {
            Some(page) => self.on_page_select(page),
            None => false,
        }
    }

    pub fn first_page(&mut self) -> bool {
        self.state.current_page != 1 && self.on_page_select(1)
    }

    pub fn last_page(&mut self) -> bool {
        let last = self.total_pages();
        self.state.current_page != last && self.on_page_select(last)
    }

    fn set_search(&mut self, term: String) {
        tracing::info!(term = %term, "search applied");
        self.state.search_term = term;
        self.state.current_page = 1;
        self.refresh();
    }

    fn refresh(&mut self) {
        self.view = pipeline::apply(self.catalog, &self.state, &self.options);
        let total = self.total_pages();
        let clamped = pipeline::clamp_page(self.state.current_page, total);
        if clamped != self.state.current_page {
            tracing::debug!(
                from = self.state.current_page,
                to = clamped,
                "clamped page after result set shrank"
            );
            self.state.current_page = clamped;
        }
        self.render();
    }

    fn render(&mut self) {
        let page_size = self.options.page_size;
        let page = self.state.current_page;
        let items = pipeline::page_window(&self.view, page, page_size);
        let view = PageView {
            items,
            page,
            page_size,
            total_pages: pipeline::total_pages(self.view.len(), page_size),
            total_matches: self.view.len(),
            search_term: &self.state.search_term,
            sort_mode: self.state.sort_mode,
        };
        self.sink.render(&view);
    }
}
