//! # Planche CLI
//!
//! Command-line interface for label sheets.
//!
//! ## Usage
//!
//! ```bash
//! # Render every row of a spreadsheet to etiquettes-YYYY-MM-DD.pdf
//! planche render produits.csv
//!
//! # Attach photos named after references, keep two items, preview as SVG
//! planche render produits.csv --images photos/ --select A1 B2 --svg out/
//!
//! # Switch to 24 labels per page and remember it
//! planche profile apply a4-3x8
//!
//! # Save and restore themes
//! planche preset save boutique
//! planche preset load boutique
//!
//! # Run the HTTP API
//! planche serve --listen 0.0.0.0:8080
//! ```

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use planche::{
    PlancheError,
    catalog::{Catalog, Selection},
    export::{export_file_name, export_pdf},
    images::ImageLookup,
    import::load_records,
    item::normalize_all,
    render::{
        layout_sheets,
        raster::{Rasterizer, encode_png},
        svg::sheet_svg,
    },
    server::{ServerConfig, serve},
    theme::{FileStore, GeometryProfile, ThemeStore},
};
use tracing_subscriber::EnvFilter;

/// Planche - Label sheet generator
#[derive(Parser, Debug)]
#[command(name = "planche")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Directory holding the saved theme and presets
    #[arg(long, global = true, env = "PLANCHE_STORE", default_value = ".planche")]
    store: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Render a spreadsheet to label sheets
    Render {
        /// CSV, JSON or XLSX file of products
        input: PathBuf,

        /// Directory of photos named after item references
        #[arg(long, value_name = "DIR")]
        images: Option<PathBuf>,

        /// Only render items with these references
        #[arg(long, num_args = 1.., value_name = "REF", conflicts_with = "rows")]
        select: Vec<String>,

        /// Only render items at these row positions (0-based)
        #[arg(long, num_args = 1.., value_name = "IDX")]
        rows: Vec<usize>,

        /// Geometry profile for this render only (e.g. a4-3x8, grid:2x5)
        #[arg(long, value_name = "NAME")]
        profile: Option<String>,

        /// Write the PDF here (defaults to etiquettes-YYYY-MM-DD.pdf)
        #[arg(long, value_name = "FILE", conflicts_with_all = ["svg", "png"])]
        pdf: Option<PathBuf>,

        /// Write one SVG per sheet into this directory
        #[arg(long, value_name = "DIR", conflicts_with = "png")]
        svg: Option<PathBuf>,

        /// Write one PNG per sheet into this directory
        #[arg(long, value_name = "DIR")]
        png: Option<PathBuf>,
    },

    /// Show, reset, export or import the current theme
    Theme {
        #[command(subcommand)]
        action: ThemeAction,
    },

    /// Save, load or list theme presets
    Preset {
        #[command(subcommand)]
        action: PresetAction,
    },

    /// List built-in geometry profiles
    Profiles,

    /// Apply a geometry profile to the saved theme
    Profile {
        #[command(subcommand)]
        action: ProfileAction,
    },

    /// Run the HTTP server
    Serve {
        /// Address to listen on
        #[arg(long, default_value = "127.0.0.1:8080")]
        listen: String,
    },
}

#[derive(Subcommand, Debug)]
enum ThemeAction {
    /// Print the current theme
    Show,
    /// Restore the default theme
    Reset,
    /// Write the theme document to a file (stdout when omitted)
    Export { file: Option<PathBuf> },
    /// Replace the theme with a document
    Import { file: PathBuf },
}

#[derive(Subcommand, Debug)]
enum PresetAction {
    /// Save the current theme under a name
    Save { name: String },
    /// Switch to a saved preset
    Load { name: String },
    /// List saved presets
    List,
}

#[derive(Subcommand, Debug)]
enum ProfileAction {
    /// Rewrite the label and grid geometry of the saved theme
    Apply { name: String },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("planche=info")))
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<(), PlancheError> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Render {
            input,
            images,
            select,
            rows,
            profile,
            pdf,
            svg,
            png,
        } => {
            let store = open_store(&cli.store)?;
            let mut theme = store.current().clone();
            if let Some(name) = profile {
                theme = GeometryProfile::parse(&name)?.apply(&theme);
            }

            let records = load_records(&input)?;
            let mut catalog = Catalog::new(normalize_all(&records, None));
            let lookup = match &images {
                Some(dir) => ImageLookup::from_dir(dir, &catalog.references())?,
                None => ImageLookup::new(),
            };
            if !select.is_empty() {
                catalog.select(Selection::References(select.into_iter().collect()));
            } else if !rows.is_empty() {
                catalog.select(Selection::Indices(rows.into_iter().collect()));
            }

            let items = catalog.selected_with_images(&lookup);
            let sheets = layout_sheets(&items, &theme);
            println!("{} items on {} sheet(s)", items.len(), sheets.len());

            let image_root = input.parent().map(Path::to_path_buf).unwrap_or_default();

            if let Some(dir) = svg {
                std::fs::create_dir_all(&dir)?;
                for sheet in &sheets {
                    let path = dir.join(format!("planche-{:02}.svg", sheet.number));
                    std::fs::write(&path, sheet_svg(sheet))?;
                    println!("Wrote {}", path.display());
                }
            } else if let Some(dir) = png {
                std::fs::create_dir_all(&dir)?;
                let mut rasterizer = Rasterizer::default().with_image_root(image_root);
                for sheet in &sheets {
                    let path = dir.join(format!("planche-{:02}.png", sheet.number));
                    std::fs::write(&path, encode_png(&rasterizer.sheet(sheet)?)?)?;
                    println!("Wrote {}", path.display());
                }
            } else {
                let path = pdf.unwrap_or_else(|| {
                    PathBuf::from(export_file_name(chrono::Local::now().date_naive()))
                });
                let mut rasterizer = Rasterizer::default().with_image_root(image_root);
                let document = export_pdf(&sheets, &mut rasterizer)?;
                std::fs::write(&path, document)?;
                println!("Wrote {}", path.display());
            }
            Ok(())
        }

        Commands::Theme { action } => {
            let mut store = open_store(&cli.store)?;
            match action {
                ThemeAction::Show => println!("{}", store.export()?),
                ThemeAction::Reset => {
                    store.reset()?;
                    println!("Theme reset to defaults");
                }
                ThemeAction::Export { file: Some(file) } => {
                    std::fs::write(&file, store.export()?)?;
                    println!("Wrote {}", file.display());
                }
                ThemeAction::Export { file: None } => println!("{}", store.export()?),
                ThemeAction::Import { file } => {
                    store.import(&std::fs::read_to_string(&file)?)?;
                    println!("Theme imported from {}", file.display());
                }
            }
            Ok(())
        }

        Commands::Preset { action } => {
            let mut store = open_store(&cli.store)?;
            match action {
                PresetAction::Save { name } => {
                    store.save_preset(&name)?;
                    println!("Saved preset '{}'", name);
                }
                PresetAction::Load { name } => {
                    if store.load_preset(&name)? {
                        println!("Loaded preset '{}'", name);
                    } else {
                        println!("No preset named '{}', theme unchanged", name);
                    }
                }
                PresetAction::List => {
                    for name in store.list_presets() {
                        println!("{}", name);
                    }
                }
            }
            Ok(())
        }

        Commands::Profiles => {
            println!("Available profiles:");
            for p in GeometryProfile::built_in() {
                println!(
                    "  {:<14} {}x{} labels of {} x {} mm ({} per page)",
                    p.name,
                    p.columns,
                    p.rows,
                    p.label_width_mm,
                    p.label_height_mm,
                    p.capacity()
                );
            }
            println!("  grid:COLSxROWS labels sized to fill A4");
            Ok(())
        }

        Commands::Profile {
            action: ProfileAction::Apply { name },
        } => {
            let profile = GeometryProfile::parse(&name)?;
            let mut store = open_store(&cli.store)?;
            let theme = profile.apply(store.current());
            store.replace(theme)?;
            println!("Applied profile '{}' ({} per page)", profile.name, profile.capacity());
            Ok(())
        }

        Commands::Serve { listen } => {
            let config = ServerConfig {
                listen_addr: listen,
                store_dir: cli.store,
            };
            println!("Starting planche server on http://{}", config.listen_addr);
            let runtime = tokio::runtime::Runtime::new()?;
            runtime.block_on(serve(config))
        }
    }
}

fn open_store(dir: &Path) -> Result<ThemeStore<FileStore>, PlancheError> {
    Ok(ThemeStore::open(FileStore::open(dir)?))
}
