// livechart library - exposes the ingest loop, model and views for the
// binary and for tests

pub mod app;
pub mod config;
pub mod model;
pub mod services;
pub mod view;
