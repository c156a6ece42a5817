//! # Document Export
//!
//! Turns rendered sheets into one multi-page PDF:
//!
//! ```text
//! Sheet 1 ──► PageRasterizer ──► RGB bitmap ──► DocumentAssembler (page 1)
//! Sheet 2 ──► PageRasterizer ──► RGB bitmap ──► DocumentAssembler (page 2)
//!   ...                                              │
//!                                                 finish() ──► PDF bytes
//! ```
//!
//! Pages are processed strictly one after another, in order. The first
//! failure aborts the export: no later page is rasterized and the assembler
//! is dropped without producing output.

use std::io::Write;

use chrono::NaiveDate;
use flate2::Compression;
use flate2::write::ZlibEncoder;
use image::RgbImage;
use pdf_writer::{Content, Filter, Finish, Name, Pdf, Rect as PdfRect, Ref};

use crate::error::PlancheError;
use crate::render::raster::Rasterizer;
use crate::render::sheet::Sheet;
use crate::theme::Paper;

/// PDF points per millimeter.
const PT_PER_MM: f32 = 72.0 / 25.4;

/// Produces the bitmap of one page.
pub trait PageRasterizer {
    fn rasterize(&mut self, sheet: &Sheet) -> Result<RgbImage, PlancheError>;
}

impl PageRasterizer for Rasterizer {
    fn rasterize(&mut self, sheet: &Sheet) -> Result<RgbImage, PlancheError> {
        self.sheet(sheet)
    }
}

/// Collects page bitmaps into a document.
pub trait DocumentAssembler {
    /// Append `page` as a new page of the given physical size.
    fn append_page(&mut self, page: &RgbImage, paper: Paper) -> Result<(), PlancheError>;

    fn finish(self) -> Result<Vec<u8>, PlancheError>;
}

/// Export `sheets` as one document, one page per sheet.
pub fn export_document<R, A>(
    sheets: &[Sheet],
    rasterizer: &mut R,
    mut assembler: A,
) -> Result<Vec<u8>, PlancheError>
where
    R: PageRasterizer,
    A: DocumentAssembler,
{
    for sheet in sheets {
        let bitmap = rasterizer.rasterize(sheet).map_err(|e| export_error(sheet.number, e))?;
        assembler
            .append_page(&bitmap, sheet.paper)
            .map_err(|e| export_error(sheet.number, e))?;
        tracing::info!(page = sheet.number, pages = sheets.len(), "page exported");
    }

    assembler.finish().map_err(|e| export_error(sheets.len(), e))
}

/// Export `sheets` as a PDF with the default rasterizer settings.
pub fn export_pdf(sheets: &[Sheet], rasterizer: &mut Rasterizer) -> Result<Vec<u8>, PlancheError> {
    export_document(sheets, rasterizer, PdfAssembler::new())
}

/// Download name of an export made on `date`.
pub fn export_file_name(date: NaiveDate) -> String {
    format!("etiquettes-{}.pdf", date.format("%Y-%m-%d"))
}

fn export_error(page: usize, error: PlancheError) -> PlancheError {
    match error {
        PlancheError::Export { .. } => error,
        other => PlancheError::Export {
            page,
            reason: other.to_string(),
        },
    }
}

/// Builds a PDF where every page is one full-bleed image.
pub struct PdfAssembler {
    pdf: Pdf,
    catalog_id: Ref,
    page_tree_id: Ref,
    next_ref_id: i32,
    pages: Vec<Ref>,
}

impl Default for PdfAssembler {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfAssembler {
    pub fn new() -> Self {
        Self {
            pdf: Pdf::new(),
            catalog_id: Ref::new(1),
            page_tree_id: Ref::new(2),
            next_ref_id: 3,
            pages: Vec::new(),
        }
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn next_ref(&mut self) -> Ref {
        let r = Ref::new(self.next_ref_id);
        self.next_ref_id += 1;
        r
    }
}

impl DocumentAssembler for PdfAssembler {
    fn append_page(&mut self, page: &RgbImage, paper: Paper) -> Result<(), PlancheError> {
        let page_id = self.next_ref();
        let content_id = self.next_ref();
        let image_id = self.next_ref();
        let image_name = Name(b"Im1");

        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(page.as_raw())?;
        let compressed = encoder.finish()?;

        {
            let mut xobject = self.pdf.image_xobject(image_id, &compressed);
            xobject.filter(Filter::FlateDecode);
            xobject.width(page.width() as i32);
            xobject.height(page.height() as i32);
            xobject.color_space().device_rgb();
            xobject.bits_per_component(8);
        }

        let width_pt = paper.width_mm * PT_PER_MM;
        let height_pt = paper.height_mm * PT_PER_MM;

        let mut content = Content::new();
        content.save_state();
        content.transform([width_pt, 0.0, 0.0, height_pt, 0.0, 0.0]);
        content.x_object(image_name);
        content.restore_state();
        self.pdf.stream(content_id, &content.finish());

        let mut pdf_page = self.pdf.page(page_id);
        pdf_page.media_box(PdfRect::new(0.0, 0.0, width_pt, height_pt));
        pdf_page.parent(self.page_tree_id);
        pdf_page.contents(content_id);
        pdf_page.resources().x_objects().pair(image_name, image_id);
        pdf_page.finish();

        self.pages.push(page_id);
        Ok(())
    }

    fn finish(mut self) -> Result<Vec<u8>, PlancheError> {
        self.pdf.catalog(self.catalog_id).pages(self.page_tree_id);
        let count = self.pages.len() as i32;
        self.pdf
            .pages(self.page_tree_id)
            .kids(self.pages.iter().copied())
            .count(count);
        Ok(self.pdf.finish())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::LabelItem;
    use crate::paginate::paginate;
    use crate::render::render_sheets;
    use crate::theme::Theme;

    /// Rasterizer stub that records calls and can fail on a given page.
    struct Recording {
        calls: Vec<usize>,
        fail_on: Option<usize>,
    }

    impl PageRasterizer for Recording {
        fn rasterize(&mut self, sheet: &Sheet) -> Result<RgbImage, PlancheError> {
            self.calls.push(sheet.number);
            if self.fail_on == Some(sheet.number) {
                return Err(PlancheError::Image("canvas exploded".to_string()));
            }
            Ok(RgbImage::new(21, 29))
        }
    }

    fn sheets(n: usize) -> Vec<Sheet> {
        let items: Vec<LabelItem> = (0..n)
            .map(|i| LabelItem {
                reference: format!("R{}", i),
                ..Default::default()
            })
            .collect();
        let theme = Theme::default();
        render_sheets(&paginate(&items, theme.capacity()), &theme)
    }

    #[test]
    fn test_pages_are_sequential_and_complete() {
        let sheets = sheets(50);
        let mut rasterizer = Recording { calls: Vec::new(), fail_on: None };
        let pdf = export_document(&sheets, &mut rasterizer, PdfAssembler::new()).unwrap();

        assert_eq!(rasterizer.calls, vec![1, 2, 3]);
        assert!(pdf.starts_with(b"%PDF-"));
        let text = String::from_utf8_lossy(&pdf);
        assert!(text.contains("/Count 3"));
        assert!(text.contains("/FlateDecode"));
    }

    #[test]
    fn test_failure_aborts_remaining_pages() {
        let sheets = sheets(50);
        let mut rasterizer = Recording { calls: Vec::new(), fail_on: Some(2) };
        let err = export_document(&sheets, &mut rasterizer, PdfAssembler::new()).unwrap_err();

        assert_eq!(rasterizer.calls, vec![1, 2]);
        match err {
            PlancheError::Export { page, reason } => {
                assert_eq!(page, 2);
                assert!(reason.contains("canvas exploded"));
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_real_rasterizer_single_page() {
        let sheets = sheets(3);
        let pdf = export_pdf(&sheets, &mut Rasterizer::new(48.0)).unwrap();
        let text = String::from_utf8_lossy(&pdf);
        assert!(text.contains("/Count 1"));
        assert!(text.contains("/Im1"));
    }

    #[test]
    fn test_export_file_name() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        assert_eq!(export_file_name(date), "etiquettes-2024-03-09.pdf");
    }
}
