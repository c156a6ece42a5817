//! SVG backend.
//!
//! One standalone document per sheet (or per label) in a millimeter
//! `viewBox`, so the browser preview and print dialog show true sizes.
//! Symbols that fail to encode are left out with a warning.

use std::fmt::Write as _;

use super::sheet::{CellContent, Sheet};
use super::symbols::{self, QUIET_MODULES};
use super::{
    Align, Content, Fit, LabelView, Node, Rect, TextStyle, logo, place_lines, place_price,
    pt_to_mm,
};

const PLACEHOLDER_STROKE: &str = "#bbbbbb";
const DASH: &str = "2 1.5";

/// SVG document for one sheet.
pub fn sheet_svg(sheet: &Sheet) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}mm" height="{h}mm" viewBox="0 0 {w} {h}">"#,
        w = num(sheet.paper.width_mm),
        h = num(sheet.paper.height_mm),
    );
    let _ = writeln!(
        out,
        r##"<rect width="{}" height="{}" fill="#ffffff"/>"##,
        num(sheet.paper.width_mm),
        num(sheet.paper.height_mm)
    );

    for (idx, cell) in sheet.cells.iter().enumerate() {
        match &cell.content {
            CellContent::Label(view) => {
                let _ = writeln!(
                    out,
                    r#"<g transform="translate({} {})">"#,
                    num(cell.rect.x),
                    num(cell.rect.y)
                );
                write_label(&mut out, view, &format!("c{}", idx));
                out.push_str("</g>\n");
            }
            CellContent::Empty => {
                let _ = writeln!(
                    out,
                    r#"<rect x="{}" y="{}" width="{}" height="{}" fill="none" stroke="{}" stroke-width="0.3" stroke-dasharray="{}"/>"#,
                    num(cell.rect.x),
                    num(cell.rect.y),
                    num(cell.rect.w),
                    num(cell.rect.h),
                    PLACEHOLDER_STROKE,
                    DASH,
                );
            }
        }
    }

    out.push_str("</svg>\n");
    out
}

/// Standalone SVG document for a single label.
pub fn label_svg(view: &LabelView) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}mm" height="{h}mm" viewBox="0 0 {w} {h}">"#,
        w = num(view.width_mm),
        h = num(view.height_mm),
    );
    write_label(&mut out, view, "l");
    out.push_str("</svg>\n");
    out
}

/// Label body in label coordinates. `id` keeps clip paths unique per document.
fn write_label(out: &mut String, view: &LabelView, id: &str) {
    let half = view.border_mm / 2.0;
    let stroke = if view.border_mm > 0.0 {
        format!(r#" stroke="{}" stroke-width="{}""#, attr(&view.border_color), num(view.border_mm))
    } else {
        String::new()
    };
    let _ = writeln!(
        out,
        r#"<rect x="{}" y="{}" width="{}" height="{}" fill="{}"{}/>"#,
        num(half),
        num(half),
        num(view.width_mm - view.border_mm),
        num(view.height_mm - view.border_mm),
        attr(&view.background),
        stroke,
    );

    let _ = writeln!(
        out,
        r#"<g font-family="{}">"#,
        attr(&view.font_family)
    );
    for (idx, node) in view.nodes.iter().enumerate() {
        write_node(out, node, &format!("{}n{}", id, idx));
    }
    out.push_str("</g>\n");
}

fn write_node(out: &mut String, node: &Node, id: &str) {
    let r = &node.rect;
    match &node.content {
        Content::Logo { color, opacity } => {
            let _ = writeln!(
                out,
                r#"<polygon points="{}" fill="{}" fill-opacity="{}"/>"#,
                logo::svg_points(r.x, r.y, r.w.min(r.h)),
                attr(color),
                num(*opacity),
            );
        }
        Content::Text { lines, style } => write_text(out, r, lines, style),
        Content::Price {
            amount,
            currency,
            size_pt,
            currency_pt,
            color,
        } => {
            let (amount_at, currency_at) = place_price(r, amount, currency, *size_pt, *currency_pt);
            let _ = writeln!(
                out,
                r#"<text x="{}" y="{}" font-size="{}" font-weight="bold" fill="{}">{}</text>"#,
                num(amount_at.x),
                num(amount_at.baseline()),
                num(amount_at.size),
                attr(color),
                escape(amount),
            );
            let _ = writeln!(
                out,
                r#"<text x="{}" y="{}" font-size="{}" font-weight="bold" fill="{}">{}</text>"#,
                num(currency_at.x),
                num(currency_at.baseline()),
                num(currency_at.size),
                attr(color),
                escape(currency),
            );
        }
        Content::Image { source, fit } => {
            let aspect = match fit {
                Fit::Contain => "xMidYMid meet",
                Fit::Cover => "xMidYMid slice",
            };
            let _ = writeln!(
                out,
                r#"<clipPath id="{id}"><rect x="{}" y="{}" width="{}" height="{}"/></clipPath>"#,
                num(r.x),
                num(r.y),
                num(r.w),
                num(r.h),
            );
            let _ = writeln!(
                out,
                r#"<image href="{}" x="{}" y="{}" width="{}" height="{}" preserveAspectRatio="{}" clip-path="url(#{id})"/>"#,
                attr(source),
                num(r.x),
                num(r.y),
                num(r.w),
                num(r.h),
                aspect,
            );
        }
        Content::ImagePlaceholder { caption } => {
            let _ = writeln!(
                out,
                r#"<rect x="{}" y="{}" width="{}" height="{}" fill="none" stroke="{}" stroke-width="0.3" stroke-dasharray="{}"/>"#,
                num(r.x),
                num(r.y),
                num(r.w),
                num(r.h),
                PLACEHOLDER_STROKE,
                DASH,
            );
            let style = TextStyle {
                size_pt: 7.0_f32.min(r.h / pt_to_mm(1.0)),
                color: PLACEHOLDER_STROKE.to_string(),
                bold: true,
                align: Align::Center,
            };
            let size = pt_to_mm(style.size_pt);
            let line_rect = Rect::new(r.x, r.y + (r.h - size) / 2.0, r.w, size);
            write_text(out, &line_rect, std::slice::from_ref(caption), &style);
        }
        Content::Barcode { data } => match symbols::code128(data) {
            Ok(modules) => {
                let total = modules.len() + 2 * QUIET_MODULES;
                let module = r.w / total as f32;
                let mut path = String::new();
                for (start, width) in symbols::bar_runs(&modules) {
                    let x = r.x + (start + QUIET_MODULES) as f32 * module;
                    let _ = write!(
                        path,
                        "M{} {}h{}v{}h-{}z",
                        num(x),
                        num(r.y),
                        num(width as f32 * module),
                        num(r.h),
                        num(width as f32 * module),
                    );
                }
                let _ = writeln!(out, r##"<path d="{}" fill="#000000"/>"##, path);
            }
            Err(e) => tracing::warn!(error = %e, "barcode skipped"),
        },
        Content::Qr { payload } => match symbols::qr(payload) {
            Ok(matrix) => {
                let side = r.w.min(r.h);
                let module = side / matrix.width() as f32;
                let mut path = String::new();
                for y in 0..matrix.width() {
                    for x in 0..matrix.width() {
                        if matrix.is_dark(x, y) {
                            let _ = write!(
                                path,
                                "M{} {}h{}v{}h-{}z",
                                num(r.x + x as f32 * module),
                                num(r.y + y as f32 * module),
                                num(module),
                                num(module),
                                num(module),
                            );
                        }
                    }
                }
                let _ = writeln!(out, r##"<path d="{}" fill="#000000"/>"##, path);
            }
            Err(e) => tracing::warn!(error = %e, "QR code skipped"),
        },
    }
}

fn write_text(out: &mut String, rect: &Rect, lines: &[String], style: &TextStyle) {
    let weight = if style.bold { r#" font-weight="bold""# } else { "" };
    for (line, at) in lines.iter().zip(place_lines(rect, lines, style)) {
        let _ = writeln!(
            out,
            r#"<text x="{}" y="{}" font-size="{}" fill="{}"{} xml:space="preserve">{}</text>"#,
            num(at.x),
            num(at.baseline()),
            num(at.size),
            attr(&style.color),
            weight,
            escape(line),
        );
    }
}

/// Compact number formatting: at most three decimals, no trailing zeros.
fn num(value: f32) -> String {
    let text = format!("{:.3}", value);
    let text = text.trim_end_matches('0').trim_end_matches('.');
    match text {
        "" | "-0" => "0".to_string(),
        other => other.to_string(),
    }
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c => out.push(c),
        }
    }
    out
}

fn attr(text: &str) -> String {
    escape(text)
}
