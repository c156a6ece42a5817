//! # Label Renderer
//!
//! One [`LabelItem`] and one [`Theme`] in, one [`LabelView`] out. Pure: the
//! same inputs always give the same view.
//!
//! ## Layout
//!
//! ```text
//! ┌──────────────────────────────────────────┐
//! │ ★  TITLE, UPPER-CASED,                   │  header: logo + title (≤ 2 lines)
//! │    SECOND LINE                           │
//! │ ┌─────────────┐                          │
//! │ │   image     │       12,50 €            │  body: image (contain) + price
//! │ └─────────────┘                          │
//! │ Réf : A1                        ┌──────┐ │
//! │ ║║│║║│║│║║│║║│║                 │  QR  │ │  footer: reference, barcode, QR
//! │                                 SCAN ME! │
//! └──────────────────────────────────────────┘
//! ```
//!
//! Every zone is positioned from the theme's layout block; the footer height
//! is always reserved so labels with and without barcodes line up on a sheet.

use crate::format::{CURRENCY, TitleSize, fmt_price};
use crate::item::LabelItem;
use crate::theme::Theme;

use super::{
    Align, CHAR_ADVANCE_EM, Content, Fit, LINE_HEIGHT, LabelView, Node, Rect, TextStyle, Zone,
    pt_to_mm,
};

/// Shown in the reference zone when an item has no reference.
pub const EMPTY_REFERENCE: &str = "\u{a0}";
pub const REFERENCE_PREFIX: &str = "Réf : ";
pub const QR_CAPTION: &str = "SCAN ME!";
pub const QR_CAPTION_PT: f32 = 5.0;
pub const IMAGE_PLACEHOLDER: &str = "IMAGE";
/// Width of the image zone, in millimeters, before clamping to the label.
pub const IMAGE_WIDTH_MM: f32 = 35.0;
/// Currency glyph size relative to the price body.
pub const CURRENCY_SCALE: f32 = 0.4;
pub const TITLE_MAX_LINES: usize = 2;

/// Render one label.
pub fn render_label(item: &LabelItem, theme: &Theme) -> LabelView {
    let label = &theme.layout.label;
    let gap = label.gap_mm;
    let bounds = Rect::new(0.0, 0.0, label.width_mm, label.height_mm);
    let inner = bounds.inset(label.padding_mm);

    let mut nodes = Vec::new();

    if theme.watermark.enabled {
        let side = bounds.w.min(bounds.h) * 0.6;
        nodes.push(Node {
            zone: Zone::Watermark,
            rect: Rect::new((bounds.w - side) / 2.0, (bounds.h - side) / 2.0, side, side),
            content: Content::Logo {
                color: theme.colors.price.clone(),
                opacity: theme.watermark.opacity,
            },
        });
    }

    // Header
    let header_h = theme.layout.logo.height_mm.min(inner.h * 0.3);
    nodes.push(Node {
        zone: Zone::Logo,
        rect: Rect::new(inner.x, inner.y, header_h, header_h),
        content: Content::Logo {
            color: theme.colors.price.clone(),
            opacity: 1.0,
        },
    });

    let title_rect = Rect::new(
        inner.x + header_h + gap,
        inner.y,
        inner.right() - (inner.x + header_h + gap),
        header_h,
    );
    if !item.title.trim().is_empty() {
        let tier = TitleSize::for_title(&item.title);
        let fit_pt = header_h / (TITLE_MAX_LINES as f32 * LINE_HEIGHT) / pt_to_mm(1.0);
        let size_pt = (theme.sizes.title_pt * tier.scale()).min(fit_pt);
        let lines = wrap(
            &item.title.trim().to_uppercase(),
            chars_per_line(title_rect.w, size_pt),
            TITLE_MAX_LINES,
        );
        nodes.push(Node {
            zone: Zone::Title,
            rect: title_rect,
            content: Content::Text {
                lines,
                style: TextStyle {
                    size_pt,
                    color: theme.colors.text.clone(),
                    bold: true,
                    align: Align::Left,
                },
            },
        });
    }

    // Footer
    let ref_h = pt_to_mm(theme.sizes.ref_pt) * LINE_HEIGHT;
    let barcode_h = theme.layout.barcode.height_mm.min(inner.h * 0.25);
    let footer_h = ref_h + gap / 2.0 + barcode_h;
    let footer_top = inner.bottom() - footer_h;

    let mut left_w = inner.w;
    if item.has_qr() {
        let caption_h = pt_to_mm(QR_CAPTION_PT) * LINE_HEIGHT;
        let side = theme
            .layout
            .qr
            .size_mm
            .min(footer_h - caption_h)
            .min(inner.w * 0.4)
            .max(0.0);
        let qr_x = inner.right() - side;
        left_w = qr_x - gap - inner.x;

        nodes.push(Node {
            zone: Zone::Qr,
            rect: Rect::new(qr_x, footer_top, side, side),
            content: Content::Qr {
                payload: item.qr_payload.clone().unwrap_or_default(),
            },
        });
        nodes.push(Node {
            zone: Zone::QrCaption,
            rect: Rect::new(qr_x, footer_top + side, side, caption_h),
            content: Content::Text {
                lines: vec![QR_CAPTION.to_string()],
                style: TextStyle {
                    size_pt: QR_CAPTION_PT.min(
                        side / (QR_CAPTION.chars().count() as f32 * CHAR_ADVANCE_EM) / pt_to_mm(1.0),
                    ),
                    color: theme.colors.text.clone(),
                    bold: true,
                    align: Align::Center,
                },
            },
        });
    }

    let reference = if item.reference.trim().is_empty() {
        EMPTY_REFERENCE.to_string()
    } else {
        format!("{}{}", REFERENCE_PREFIX, item.reference.trim())
    };
    nodes.push(Node {
        zone: Zone::Reference,
        rect: Rect::new(inner.x, footer_top, left_w, ref_h),
        content: Content::Text {
            lines: vec![reference],
            style: TextStyle {
                size_pt: theme.sizes.ref_pt,
                color: theme.colors.text.clone(),
                bold: false,
                align: Align::Left,
            },
        },
    });

    if item.has_barcode() {
        nodes.push(Node {
            zone: Zone::Barcode,
            rect: Rect::new(
                inner.x,
                footer_top + ref_h + gap / 2.0,
                theme.layout.barcode.width_mm.min(left_w),
                barcode_h,
            ),
            content: Content::Barcode {
                data: item.barcode.trim().to_string(),
            },
        });
    }

    // Body, between header and footer
    let body_top = inner.y + header_h + gap;
    let body_h = footer_top - gap - body_top;
    let image_w = IMAGE_WIDTH_MM.min(inner.w * 0.5);
    let image_rect = Rect::new(inner.x, body_top, image_w, body_h);
    let image_content = match &item.image_ref {
        Some(source) => Content::Image {
            source: source.clone(),
            fit: Fit::Contain,
        },
        None => Content::ImagePlaceholder {
            caption: IMAGE_PLACEHOLDER.to_string(),
        },
    };
    nodes.push(Node {
        zone: Zone::Image,
        rect: image_rect,
        content: image_content,
    });

    let amount = fmt_price(&item.price);
    if !amount.is_empty() {
        let price_rect = Rect::new(
            image_rect.right() + gap,
            body_top,
            inner.right() - (image_rect.right() + gap),
            body_h,
        );
        let advance_em = (amount.chars().count() as f32 + CURRENCY_SCALE + 0.2) * CHAR_ADVANCE_EM;
        let size_pt = theme
            .sizes
            .price_pt
            .min(price_rect.h / LINE_HEIGHT / pt_to_mm(1.0))
            .min(price_rect.w / advance_em / pt_to_mm(1.0));
        nodes.push(Node {
            zone: Zone::Price,
            rect: price_rect,
            content: Content::Price {
                amount,
                currency: CURRENCY.to_string(),
                size_pt,
                currency_pt: size_pt * CURRENCY_SCALE,
                color: theme.colors.price.clone(),
            },
        });
    }

    nodes.sort_by_key(|node| node.zone);

    LabelView {
        width_mm: label.width_mm,
        height_mm: label.height_mm,
        border_mm: label.border_mm,
        border_color: theme.colors.border.clone(),
        background: theme.colors.background.clone(),
        font_family: theme.font_family.clone(),
        nodes,
    }
}

/// How many characters of `size_pt` text fit in `width_mm`.
pub fn chars_per_line(width_mm: f32, size_pt: f32) -> usize {
    let advance = pt_to_mm(size_pt) * CHAR_ADVANCE_EM;
    if advance <= 0.0 {
        return 0;
    }
    (width_mm / advance).floor().max(1.0) as usize
}

/// Greedy word wrap into at most `max_lines` lines of `max_chars` characters.
///
/// Words longer than a line are split. Text that does not fit is dropped.
pub fn wrap(text: &str, max_chars: usize, max_lines: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let mut lines: Vec<String> = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let mut word: Vec<char> = word.chars().collect();
        loop {
            let used = current.chars().count();
            let needed = if used == 0 { word.len() } else { used + 1 + word.len() };
            if needed <= max_chars {
                if used > 0 {
                    current.push(' ');
                }
                current.extend(word.iter());
                break;
            }
            if used > 0 {
                lines.push(std::mem::take(&mut current));
            } else {
                let rest = word.split_off(max_chars);
                lines.push(word.into_iter().collect());
                word = rest;
            }
            if lines.len() >= max_lines {
                return lines;
            }
        }
    }

    if !current.is_empty() && lines.len() < max_lines {
        lines.push(current);
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::Price;
    use pretty_assertions::assert_eq;

    fn full_item() -> LabelItem {
        LabelItem {
            reference: "A1".to_string(),
            barcode: "3760001234567".to_string(),
            title: "Chaise pliante".to_string(),
            price: Price::Text("12,5".to_string()),
            image_ref: Some("data:image/png;base64,AAAA".to_string()),
            qr_payload: Some("https://example.com/a1".to_string()),
        }
    }

    fn zones(view: &LabelView) -> Vec<Zone> {
        view.nodes.iter().map(|n| n.zone).collect()
    }

    fn text_of(view: &LabelView, zone: Zone) -> Vec<String> {
        match view.node(zone).map(|n| &n.content) {
            Some(Content::Text { lines, .. }) => lines.clone(),
            other => panic!("expected text in {:?}, got {:?}", zone, other),
        }
    }

    #[test]
    fn test_full_item_has_every_zone() {
        let view = render_label(&full_item(), &Theme::default());
        assert_eq!(
            zones(&view),
            vec![
                Zone::Logo,
                Zone::Title,
                Zone::Image,
                Zone::Price,
                Zone::Reference,
                Zone::Barcode,
                Zone::Qr,
                Zone::QrCaption,
            ]
        );
        assert_eq!(text_of(&view, Zone::Reference), vec!["Réf : A1"]);
        assert_eq!(text_of(&view, Zone::QrCaption), vec!["SCAN ME!"]);
    }

    #[test]
    fn test_empty_item_degrades() {
        let view = render_label(&LabelItem::default(), &Theme::default());
        assert_eq!(zones(&view), vec![Zone::Logo, Zone::Image, Zone::Reference]);
        assert_eq!(text_of(&view, Zone::Reference), vec!["\u{a0}"]);
        assert!(matches!(
            view.node(Zone::Image).map(|n| &n.content),
            Some(Content::ImagePlaceholder { caption }) if caption == "IMAGE"
        ));
    }

    #[test]
    fn test_blank_qr_payload_draws_no_qr_or_caption() {
        let item = LabelItem {
            qr_payload: Some("  ".to_string()),
            ..full_item()
        };
        let view = render_label(&item, &Theme::default());
        assert!(view.node(Zone::Qr).is_none());
        assert!(view.node(Zone::QrCaption).is_none());
    }

    #[test]
    fn test_title_is_uppercased_and_capped() {
        let item = LabelItem {
            title: "a very long product designation that keeps going well past two lines of text"
                .to_string(),
            ..full_item()
        };
        let view = render_label(&item, &Theme::default());
        let lines = text_of(&view, Zone::Title);
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("A VERY LONG"));
        assert!(lines.iter().all(|l| l == &l.to_uppercase()));
    }

    #[test]
    fn test_price_zone() {
        let view = render_label(&full_item(), &Theme::default());
        match view.node(Zone::Price).map(|n| &n.content) {
            Some(Content::Price { amount, currency, size_pt, currency_pt, color }) => {
                assert_eq!(amount, "12,50");
                assert_eq!(currency, "€");
                assert!((currency_pt / size_pt - 0.4).abs() < 1e-5);
                assert!(*size_pt <= 28.0);
                assert_eq!(color, "#f47c20");
            }
            other => panic!("unexpected price content {:?}", other),
        }
    }

    #[test]
    fn test_image_uses_contain() {
        let view = render_label(&full_item(), &Theme::default());
        assert!(matches!(
            view.node(Zone::Image).map(|n| &n.content),
            Some(Content::Image { fit: Fit::Contain, .. })
        ));
    }

    #[test]
    fn test_zones_stay_inside_label() {
        for theme in [Theme::default(), {
            let mut t = Theme::default();
            t.layout.label.width_mm = 70.0;
            t.layout.label.height_mm = 42.0;
            t
        }] {
            let view = render_label(&full_item(), &theme);
            let inner = view.bounds().inset(theme.layout.label.padding_mm);
            for node in view.nodes.iter().filter(|n| n.zone != Zone::Watermark) {
                assert!(inner.contains(&node.rect), "{:?} escapes {:?}", node, inner);
            }
        }
    }

    #[test]
    fn test_watermark() {
        let mut theme = Theme::default();
        assert!(render_label(&full_item(), &theme).node(Zone::Watermark).is_none());

        theme.watermark.enabled = true;
        let view = render_label(&full_item(), &theme);
        assert_eq!(view.nodes[0].zone, Zone::Watermark);
        assert!(matches!(
            view.nodes[0].content,
            Content::Logo { opacity, .. } if (opacity - 0.08).abs() < 1e-6
        ));
    }

    #[test]
    fn test_render_is_idempotent() {
        let theme = Theme::default();
        assert_eq!(render_label(&full_item(), &theme), render_label(&full_item(), &theme));
    }

    #[test]
    fn test_wrap() {
        assert_eq!(wrap("AB CD EF", 5, 2), vec!["AB CD", "EF"]);
        assert_eq!(wrap("AB CD EF GH IJ", 5, 2), vec!["AB CD", "EF GH"]);
        assert_eq!(wrap("ABCDEFGHIJK", 4, 2), vec!["ABCD", "EFGH"]);
        assert_eq!(wrap("ABCDEF", 4, 3), vec!["ABCD", "EF"]);
        assert!(wrap("   ", 4, 2).is_empty());
    }
}
