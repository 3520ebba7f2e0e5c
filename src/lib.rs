pub mod config;
pub mod error;
pub mod event;
pub mod feed;
pub mod flow;
pub mod input;
pub mod model;
pub mod refdata;
pub mod scan;
pub mod store;
pub mod ui;
