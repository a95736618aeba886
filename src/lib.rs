//! FunOlympics viewership dashboard.
//!
//! A CSV of viewership records is loaded once into a [`Dataset`]; each chart
//! view filters and groups it on demand through the [`Dashboard`] controller,
//! and the resulting [`Figure`] is served to a browser or drawn in the
//! terminal.

pub mod aggregate;
pub mod chart;
pub mod config;
pub mod controller;
pub mod csv_reader;
pub mod dataset;
pub mod error;
pub mod logging;
pub mod server;
pub mod terminal;

pub use chart::Figure;
pub use controller::{Control, Dashboard, Selection, View};
pub use csv_reader::Record;
pub use dataset::{Column, Dataset};
pub use error::{DashboardError, LoadError, ServeError};
