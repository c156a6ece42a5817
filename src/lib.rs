//! # Planche - Label Sheet Generator
//!
//! Planche turns a product spreadsheet into print-ready A4 sheets of price
//! labels. It provides:
//!
//! - **Import**: CSV, JSON or XLSX rows normalized into label items
//! - **Themes**: Colors, sizes and grid geometry, persisted with presets
//! - **Rendering**: One label layout for every item, laid out on fixed grids
//! - **Export**: SVG and PNG previews, multi-page PDF documents
//!
//! ## Quick Start
//!
//! ```no_run
//! use planche::{
//!     export::{export_file_name, export_pdf},
//!     import::load_records,
//!     item::normalize_all,
//!     render::{layout_sheets, raster::Rasterizer},
//!     theme::Theme,
//! };
//!
//! // Read the spreadsheet
//! let records = load_records("produits.csv".as_ref())?;
//! let items = normalize_all(&records, None);
//!
//! // Lay out 21 labels per page with the default theme
//! let sheets = layout_sheets(&items, &Theme::default());
//!
//! // Rasterize every page into one PDF
//! let pdf = export_pdf(&sheets, &mut Rasterizer::default())?;
//! std::fs::write(export_file_name(chrono::Local::now().date_naive()), pdf)?;
//!
//! # Ok::<(), planche::error::PlancheError>(())
//! ```
//!
//! ## Module Overview
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`import`] | CSV and JSON readers |
//! | [`item`] | Label items and column aliases |
//! | [`images`] | Product photos matched by reference |
//! | [`catalog`] | Imported items and the selection |
//! | [`format`] | Price formatting and title sizing |
//! | [`paginate`] | Fixed-size pages |
//! | [`theme`] | Theme, geometry profiles and persistence |
//! | [`render`] | Label and sheet layout, SVG and raster backends |
//! | [`export`] | PDF assembly |
//! | [`server`] | HTTP API |
//! | [`error`] | Error types |

pub mod catalog;
pub mod error;
pub mod export;
pub mod format;
pub mod images;
pub mod import;
pub mod item;
pub mod paginate;
pub mod render;
pub mod server;
pub mod theme;

// Re-exports for convenience
pub use error::PlancheError;
pub use item::LabelItem;
pub use theme::Theme;
