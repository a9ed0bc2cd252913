//! Pure filter → sort → paginate stages. Nothing here touches the terminal
//! or the network; the controller feeds state in and renders what comes out.

pub mod discount;
pub mod filter;
pub mod paginate;
pub mod sort;

use crate::catalog::Product;

pub use discount::derived_discount;
pub use filter::{filter_products, SearchField, SearchFields};
pub use paginate::{clamp_page, page_window, total_pages, DEFAULT_PAGE_SIZE};
pub use sort::{sort_products, SortMode};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ViewState {
    pub search_term: String,
    pub sort_mode: SortMode,
    pub current_page: usize,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            search_term: String::new(),
            sort_mode: SortMode::Default,
            current_page: 1,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PipelineOptions {
    pub page_size: usize,
    pub search_fields: SearchFields,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            search_fields: SearchFields::default(),
        }
    }
}

/// Filter then sort the whole catalog for `state`. The result is rebuilt from
/// scratch on every call.
pub fn apply<'a>(
    catalog: &'a [Product],
    state: &ViewState,
    options: &PipelineOptions,
) -> Vec<&'a Product> {
    let mut view = filter_products(catalog, &state.search_term, &options.search_fields);
    sort_products(&mut view, state.sort_mode);
    tracing::debug!(
        term = %state.search_term,
        sort = state.sort_mode.as_str(),
        matches = view.len(),
        "pipeline applied"
    );
    view
}
