pub mod app;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod controller;
pub mod logging;
pub mod output;
pub mod pipeline;
pub mod runner;
pub mod tui;

#[cfg(test)]
mod tests;
