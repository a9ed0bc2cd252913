use std::path::PathBuf;
use std::time::Instant;

use crate::catalog::{parse_products, CatalogSource, LoadFailurePolicy, Product};
use crate::controller::Controller;
use crate::output::terminal::TerminalSink;
use crate::output::{OutputFormat, PriceFormat, SnapshotSink};
use crate::pipeline::{PipelineOptions, SortMode, ViewState};
use crate::runner::{CatalogLoad, Options, Runner};
use crate::tui::{apply_command, Command, SearchBox};

fn numbered(count: usize) -> Vec<Product> {
    (1..=count)
        .map(|i| Product {
            category: Some("Technik".to_string()),
            ..Product::new(format!("Deal {i:02}"), i as f64 * 3.0)
        })
        .collect()
}

fn json_page(catalog: &[Product], state: ViewState) -> serde_json::Value {
    let runner = Runner::new(Options::default()).unwrap();
    let sink = SnapshotSink::new(OutputFormat::Json, PriceFormat::default());
    let mut controller = runner.controller(catalog, sink).with_state(state);
    controller.start();
    serde_json::from_slice(&controller.into_sink().into_bytes()).unwrap()
}

#[test]
fn twenty_five_records_make_three_pages() {
    let catalog = numbered(25);
    let first = json_page(&catalog, ViewState::default());
    assert_eq!(first["total_pages"], 3);
    assert_eq!(first["cards"].as_array().unwrap().len(), 12);
    assert_eq!(first["cards"][0]["title"], "Deal 01");
    assert_eq!(first["controls"]["buttons"].as_array().unwrap().len(), 3);

    let third = json_page(
        &catalog,
        ViewState {
            current_page: 3,
            ..ViewState::default()
        },
    );
    let cards = third["cards"].as_array().unwrap();
    assert_eq!(cards.len(), 1);
    assert_eq!(cards[0]["title"], "Deal 25");
    assert!(third["controls"]["next"].is_null());
}

#[test]
fn unmatched_search_shows_one_message_and_no_controls() {
    colored::control::set_override(false);
    let catalog = numbered(25);
    let sink = TerminalSink::new(Vec::new(), PriceFormat::default());
    let mut controller = Runner::new(Options::default())
        .unwrap()
        .controller(&catalog, sink);
    controller.start();
    controller.sink_mut().writer().clear();

    controller.apply_search("shoe");
    let out = String::from_utf8(controller.sink_mut().writer().clone()).unwrap();
    assert_eq!(out.matches("Keine Angebote").count(), 1);
    assert!(!out.contains("Deal 01"));
    assert!(!out.contains('‹'));
    assert!(out.contains("0 Deals"));
}

#[test]
fn escape_codes_in_catalog_never_reach_the_terminal() {
    colored::control::set_override(false);
    let body = br#"[{
        "title": "Deal\u001b[2J",
        "currentPrice": 5,
        "category": "\u001b]0;x\u0007Technik"
    }]"#;
    let catalog = parse_products(body).unwrap();
    let sink = TerminalSink::new(Vec::new(), PriceFormat::default());
    let mut controller = Runner::new(Options::default())
        .unwrap()
        .controller(&catalog, sink);
    controller.start();
    let out = String::from_utf8(controller.into_sink().into_inner()).unwrap();
    assert!(!out.contains('\u{1b}'));
    assert!(!out.contains('\u{7}'));
    assert!(out.contains("Deal[2J"));
}

#[test]
fn sort_key_returns_to_first_page() {
    let catalog = numbered(25);
    let sink = SnapshotSink::new(OutputFormat::Json, PriceFormat::default());
    let mut controller = Controller::new(&catalog, PipelineOptions::default(), sink);
    controller.start();
    let mut search = SearchBox::default();
    apply_command(&mut controller, &mut search, Command::LastPage, Instant::now());
    assert_eq!(controller.state().current_page, 3);

    apply_command(&mut controller, &mut search, Command::NextSort, Instant::now());
    assert_eq!(controller.state().sort_mode, SortMode::PriceAsc);
    assert_eq!(controller.state().current_page, 1);
}

#[test]
fn price_orders_are_mirror_images() {
    let catalog = numbered(25);
    let options = PipelineOptions::default();
    let asc = crate::pipeline::apply(
        &catalog,
        &ViewState {
            sort_mode: SortMode::PriceAsc,
            ..ViewState::default()
        },
        &options,
    );
    let mut desc = crate::pipeline::apply(
        &catalog,
        &ViewState {
            sort_mode: SortMode::PriceDesc,
            ..ViewState::default()
        },
        &options,
    );
    desc.reverse();
    assert_eq!(asc, desc);
}

#[test]
fn search_then_page_stays_within_matches() {
    let catalog = numbered(25);
    let state = ViewState {
        search_term: "deal 1".to_string(),
        current_page: 2,
        ..ViewState::default()
    };
    let page = json_page(&catalog, state);
    // "Deal 10".."Deal 19" fit on one page, so page 2 clamps back to 1.
    assert_eq!(page["page"], 1);
    assert_eq!(page["total_matches"], 10);
}

#[tokio::test]
async fn missing_file_falls_back_to_placeholders() {
    let runner = Runner::new(Options {
        source: CatalogSource::File(PathBuf::from("/nonexistent/dealgrid/products.json")),
        load_failure: LoadFailurePolicy::Placeholder,
        ..Options::default()
    })
    .unwrap();
    let load = runner.load().await.unwrap();
    assert!(matches!(load, CatalogLoad::Placeholder { .. }));
    assert_eq!(load.products().unwrap().len(), 40);
}

#[tokio::test]
async fn missing_file_shows_error_by_default() {
    let runner = Runner::new(Options {
        source: CatalogSource::File(PathBuf::from("/nonexistent/dealgrid/products.json")),
        ..Options::default()
    })
    .unwrap();
    let load = runner.load().await.unwrap();
    assert!(load.products().is_none());

    colored::control::set_override(false);
    let bytes = crate::output::render_error_page(
        OutputFormat::Text,
        &load.error().unwrap().to_string(),
        &PriceFormat::default(),
    );
    let text = String::from_utf8(bytes).unwrap();
    assert!(text.contains("nicht geladen"));
}
