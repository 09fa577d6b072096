//! Zone panel rendering
//!
//! Rasterises a zone into a premultiplied pixmap with tiny-skia and draws
//! text with ab_glyph. Layout calculation is separate from rendering so the
//! geometry can be tested without a font or a window.

use std::path::Path;

use ab_glyph::{Font, FontArc, PxScale, ScaleFont, point};
use tiny_skia::{Color, FillRule, Paint, PathBuilder, Pixmap, PremultipliedColorU8, Rect as SkiaRect, Transform};

use crate::app::zone::Zone;
use crate::config::HexColor;
use crate::domain::entries::EntryKind;
use crate::domain::grid::ZoneGrid;

/// Rendering errors
#[derive(Debug, thiserror::Error)]
pub enum RendererError {
    #[error("Failed to create pixmap for rendering")]
    PixmapCreationFailed,

    #[error("Invalid canvas dimensions: {width}x{height}")]
    InvalidCanvas { width: i32, height: i32 },

    #[error("Invalid layout rectangle at ({x}, {y})")]
    InvalidRect { x: f32, y: f32 },

    #[error("Invalid font data: {0}")]
    InvalidFont(String),
}

const TITLE_PADDING: f32 = 2.0;
const FOLDER_COLOR: HexColor = HexColor::rgb(0xe8, 0xb8, 0x4a);
const FOLDER_TAB_COLOR: HexColor = HexColor::rgb(0xc9, 0x96, 0x2e);
const FILE_COLOR: HexColor = HexColor::rgb(0xdf, 0xe4, 0xea);
const FILE_FOLD_COLOR: HexColor = HexColor::rgb(0xa9, 0xb1, 0xbb);
const BADGE_COLOR: HexColor = HexColor::rgb(0x3a, 0x46, 0x55);
const SEARCH_BG: HexColor = HexColor::rgb(0xf4, 0xf4, 0xf4);
const SEARCH_TEXT: HexColor = HexColor::rgb(0x20, 0x20, 0x20);
const SEARCH_PLACEHOLDER: HexColor = HexColor::rgb(0x90, 0x90, 0x90);
const SCROLL_THUMB_ALPHA: u8 = 0x60;

/// Font files tried by [`ZoneRenderer::with_system_font`]
const SYSTEM_FONT_CANDIDATES: &[&str] = &[
    r"C:\Windows\Fonts\segoeui.ttf",
    r"C:\Windows\Fonts\arial.ttf",
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAlign {
    Left,
    Center,
}

/// A run of text drawn inside a box, vertically centred
#[derive(Debug, Clone, PartialEq)]
pub struct TextItem {
    pub text: String,
    pub bounds: SkiaRect,
    pub size: f32,
    pub color: Color,
    pub align: TextAlign,
}

/// Placeholder glyph drawn in place of a shell icon
#[derive(Debug, Clone, PartialEq)]
pub struct CellLayout {
    pub cell: SkiaRect,
    pub icon: SkiaRect,
    pub kind: EntryKind,
    /// Uppercased extension shown on file icons
    pub badge: Option<TextItem>,
    pub label: TextItem,
}

/// Pre-calculated layout of one zone panel
#[derive(Debug, Clone, PartialEq)]
pub struct ZoneLayout {
    pub canvas_width: u32,
    pub canvas_height: u32,
    pub title_rect: SkiaRect,
    pub title_bg: Color,
    pub title: TextItem,
    /// None while the zone is collapsed
    pub body: Option<SkiaRect>,
    pub background: Color,
    pub search: Option<(SkiaRect, TextItem)>,
    pub cells: Vec<CellLayout>,
    pub scroll_thumb: Option<SkiaRect>,
}

impl ZoneLayout {
    /// Lays out a zone at its current geometry
    pub fn from_zone(zone: &Zone) -> Result<Self, RendererError> {
        let geometry = zone.geometry();
        if geometry.w <= 0 || geometry.h <= 0 {
            return Err(RendererError::InvalidCanvas {
                width: geometry.w,
                height: geometry.h,
            });
        }

        let settings = zone.settings();
        let grid = zone.grid();
        let width = geometry.w as f32;
        let height = geometry.h as f32;
        let title_height = (grid.title_height() as f32).min(height);

        let title_rect = skia_rect(0.0, 0.0, width, title_height)?;
        let title = TextItem {
            text: zone.name().to_string(),
            bounds: skia_rect(TITLE_PADDING, 0.0, width - 2.0 * TITLE_PADDING, title_height)?,
            size: settings.title_text_size as f32,
            color: skia_color(settings.title_text),
            align: TextAlign::Left,
        };

        let mut layout = Self {
            canvas_width: geometry.w as u32,
            canvas_height: geometry.h as u32,
            title_rect,
            title_bg: skia_color(settings.title_bg),
            title,
            body: None,
            background: skia_color(settings.bg_color),
            search: None,
            cells: Vec::new(),
            scroll_thumb: None,
        };

        if zone.is_collapsed() || height <= title_height {
            return Ok(layout);
        }
        layout.body = Some(skia_rect(0.0, title_height, width, height - title_height)?);

        if let (Some(rect), Some(query)) = (grid.search_rect(), zone.search()) {
            let bounds = to_skia(rect)?;
            let (text, color) = if query.is_empty() {
                ("Search...".to_string(), SEARCH_PLACEHOLDER)
            } else {
                (query.to_string(), SEARCH_TEXT)
            };
            let text_bounds = skia_rect(bounds.x() + 4.0, bounds.y(), bounds.width() - 8.0, bounds.height())?;
            layout.search = Some((
                bounds,
                TextItem {
                    text,
                    bounds: text_bounds,
                    size: settings.text_size as f32,
                    color: skia_color(color),
                    align: TextAlign::Left,
                },
            ));
        }

        let cell_size = grid.cell_size() as i32;
        let icon_size = settings.cell_icon_size.min(cell_size) as f32;
        let label_height = settings.label_height as f32;
        let name_color = skia_color(settings.name_color);

        for (slot, entry) in zone.visible_entries() {
            let Ok(cell) = grid.cell_rect(slot) else {
                continue;
            };
            let cell = to_skia(cell)?;
            let icon = skia_rect(
                cell.x() + (cell.width() - icon_size) / 2.0,
                cell.y(),
                icon_size,
                icon_size,
            )?;
            let label = TextItem {
                text: entry.label(cell_size),
                bounds: skia_rect(cell.x(), icon.bottom(), cell.width(), label_height)?,
                size: settings.text_size as f32,
                color: name_color,
                align: TextAlign::Center,
            };
            let badge = match entry.kind {
                EntryKind::File => extension_badge(&entry.path, icon, settings.text_size as f32),
                EntryKind::Directory => None,
            };
            layout.cells.push(CellLayout {
                cell,
                icon,
                kind: entry.kind,
                badge,
                label,
            });
        }

        layout.scroll_thumb = scroll_thumb(zone, grid, width, title_height, height);
        Ok(layout)
    }
}

fn extension_badge(path: &Path, icon: SkiaRect, text_size: f32) -> Option<TextItem> {
    let extension = path.extension()?.to_string_lossy().to_uppercase();
    if extension.is_empty() {
        return None;
    }
    let text: String = extension.chars().take(4).collect();
    let band_height = (icon.height() / 3.0).max(1.0);
    Some(TextItem {
        text,
        bounds: skia_rect(icon.x() + icon.width() * 0.2, icon.bottom() - band_height * 1.5, icon.width() * 0.6, band_height).ok()?,
        size: text_size.min(band_height),
        color: skia_color(FILE_COLOR),
        align: TextAlign::Center,
    })
}

fn scroll_thumb(zone: &Zone, grid: &ZoneGrid, width: f32, top: f32, height: f32) -> Option<SkiaRect> {
    let visible_total = zone
        .entries()
        .iter()
        .filter(|entry| entry.matches(zone.search().unwrap_or("")))
        .count();
    let total_rows = grid.total_rows(visible_total);
    let page_rows = grid.page_rows();
    if total_rows <= page_rows {
        return None;
    }

    let track = height - top;
    let thumb = (track * page_rows as f32 / total_rows as f32).max(8.0);
    let offset = (track - thumb) * zone.scroll_row() as f32 / grid.max_scroll(visible_total).max(1) as f32;
    let x = width - ZoneGrid::SCROLLBAR_EXTENT as f32 + 5.0;
    SkiaRect::from_xywh(x, top + offset, 6.0, thumb)
}

fn skia_color(color: HexColor) -> Color {
    Color::from_rgba8(color.r, color.g, color.b, 0xff)
}

/// Builds a rectangle at least one pixel wide and high
fn skia_rect(x: f32, y: f32, w: f32, h: f32) -> Result<SkiaRect, RendererError> {
    SkiaRect::from_xywh(x, y, w.max(1.0), h.max(1.0)).ok_or(RendererError::InvalidRect { x, y })
}

fn to_skia(rect: crate::domain::core::Rect) -> Result<SkiaRect, RendererError> {
    skia_rect(rect.x as f32, rect.y as f32, rect.w as f32, rect.h as f32)
}

/// Renders zone layouts to pixmaps
#[derive(Debug, Clone, Default)]
pub struct ZoneRenderer {
    font: Option<FontArc>,
}

impl ZoneRenderer {
    /// Renderer without a font; text is skipped
    pub fn new() -> Self {
        Self { font: None }
    }

    pub fn with_font_bytes(data: Vec<u8>) -> Result<Self, RendererError> {
        let font = FontArc::try_from_vec(data).map_err(|err| RendererError::InvalidFont(err.to_string()))?;
        Ok(Self { font: Some(font) })
    }

    /// Loads the first available system font, or none
    pub fn with_system_font() -> Self {
        for candidate in SYSTEM_FONT_CANDIDATES {
            let Ok(data) = std::fs::read(candidate) else {
                continue;
            };
            match Self::with_font_bytes(data) {
                Ok(renderer) => {
                    log::debug!("Using font {candidate}");
                    return renderer;
                }
                Err(err) => log::warn!("Skipping font {candidate}: {err}"),
            }
        }
        log::warn!("No usable system font found; zone text will not be drawn");
        Self::new()
    }

    pub fn has_font(&self) -> bool {
        self.font.is_some()
    }

    /// Render a zone layout to a pixmap
    pub fn render(&self, layout: &ZoneLayout) -> Result<Pixmap, RendererError> {
        let mut pixmap =
            Pixmap::new(layout.canvas_width, layout.canvas_height).ok_or(RendererError::PixmapCreationFailed)?;
        pixmap.fill(Color::TRANSPARENT);

        if let Some(body) = layout.body {
            fill_rect(&mut pixmap, body, layout.background);
        }
        fill_rect(&mut pixmap, layout.title_rect, layout.title_bg);
        self.draw_text(&mut pixmap, &layout.title);

        if let Some((bounds, text)) = &layout.search {
            fill_rect(&mut pixmap, *bounds, skia_color(SEARCH_BG));
            self.draw_text(&mut pixmap, text);
        }

        for cell in &layout.cells {
            draw_icon(&mut pixmap, cell);
            if let Some(badge) = &cell.badge {
                self.draw_text(&mut pixmap, badge);
            }
            self.draw_text(&mut pixmap, &cell.label);
        }

        if let Some(thumb) = layout.scroll_thumb {
            fill_rect(&mut pixmap, thumb, Color::from_rgba8(0xff, 0xff, 0xff, SCROLL_THUMB_ALPHA));
        }

        Ok(pixmap)
    }

    /// Rasterises one text item with per-pixel coverage blending
    fn draw_text(&self, pixmap: &mut Pixmap, item: &TextItem) {
        let Some(font) = &self.font else {
            return;
        };
        if item.text.is_empty() || item.size <= 0.0 {
            return;
        }

        let scale = PxScale::from(item.size);
        let scaled = font.as_scaled(scale);

        let mut width = 0.0;
        let mut previous = None;
        for c in item.text.chars() {
            let id = scaled.glyph_id(c);
            if let Some(prev) = previous {
                width += scaled.kern(prev, id);
            }
            width += scaled.h_advance(id);
            previous = Some(id);
        }

        let bounds = item.bounds;
        let mut caret = match item.align {
            TextAlign::Left => bounds.x(),
            TextAlign::Center => bounds.x() + ((bounds.width() - width) / 2.0).max(0.0),
        };
        let line_height = scaled.ascent() - scaled.descent();
        let baseline = bounds.y() + (bounds.height() - line_height) / 2.0 + scaled.ascent();

        let clip_left = bounds.left().max(0.0) as i32;
        let clip_top = bounds.top().max(0.0) as i32;
        let clip_right = (bounds.right() as i32).min(pixmap.width() as i32);
        let clip_bottom = (bounds.bottom() as i32).min(pixmap.height() as i32);
        let stride = pixmap.width() as i32;
        let color = item.color.premultiply().to_color_u8();
        let pixels = pixmap.pixels_mut();

        let mut previous = None;
        for c in item.text.chars() {
            let id = scaled.glyph_id(c);
            if let Some(prev) = previous {
                caret += scaled.kern(prev, id);
            }
            let glyph = id.with_scale_and_position(scale, point(caret, baseline));
            caret += scaled.h_advance(id);
            previous = Some(id);

            let Some(outlined) = font.outline_glyph(glyph) else {
                continue;
            };
            let glyph_bounds = outlined.px_bounds();
            outlined.draw(|gx, gy, coverage| {
                let x = glyph_bounds.min.x as i32 + gx as i32;
                let y = glyph_bounds.min.y as i32 + gy as i32;
                if x < clip_left || x >= clip_right || y < clip_top || y >= clip_bottom {
                    return;
                }
                let index = (y * stride + x) as usize;
                if let Some(pixel) = pixels.get_mut(index) {
                    *pixel = blend(*pixel, color, coverage);
                }
            });
        }
    }
}

/// Source-over blend of a premultiplied colour scaled by `coverage`
fn blend(dst: PremultipliedColorU8, src: PremultipliedColorU8, coverage: f32) -> PremultipliedColorU8 {
    let alpha = coverage.clamp(0.0, 1.0) * src.alpha() as f32 / 255.0;
    let inverse = 1.0 - alpha;
    let channel = |s: u8, d: u8| (s as f32 * coverage.clamp(0.0, 1.0) + d as f32 * inverse).round();

    let a = (255.0 * alpha + dst.alpha() as f32 * inverse).round().min(255.0);
    let r = channel(src.red(), dst.red()).min(a);
    let g = channel(src.green(), dst.green()).min(a);
    let b = channel(src.blue(), dst.blue()).min(a);

    PremultipliedColorU8::from_rgba(r as u8, g as u8, b as u8, a as u8).unwrap_or(dst)
}

fn fill_rect(pixmap: &mut Pixmap, rect: SkiaRect, color: Color) {
    let mut paint = Paint::default();
    paint.set_color(color);
    pixmap.fill_rect(rect, &paint, Transform::identity(), None);
}

fn fill_path(pixmap: &mut Pixmap, builder: PathBuilder, color: Color) {
    if let Some(path) = builder.finish() {
        let mut paint = Paint::default();
        paint.set_color(color);
        paint.anti_alias = true;
        pixmap.fill_path(&path, &paint, FillRule::Winding, Transform::identity(), None);
    }
}

fn draw_icon(pixmap: &mut Pixmap, cell: &CellLayout) {
    let icon = cell.icon;
    let (x, y, w, h) = (icon.x(), icon.y(), icon.width(), icon.height());

    match cell.kind {
        EntryKind::Directory => {
            let mut tab = PathBuilder::new();
            tab.move_to(x + w * 0.08, y + h * 0.22);
            tab.line_to(x + w * 0.40, y + h * 0.22);
            tab.line_to(x + w * 0.48, y + h * 0.30);
            tab.line_to(x + w * 0.08, y + h * 0.30);
            tab.close();
            fill_path(pixmap, tab, skia_color(FOLDER_TAB_COLOR));

            if let Some(body) = SkiaRect::from_xywh(x + w * 0.08, y + h * 0.30, w * 0.84, h * 0.52) {
                fill_rect(pixmap, body, skia_color(FOLDER_COLOR));
            }
        }
        EntryKind::File => {
            let left = x + w * 0.2;
            let right = x + w * 0.8;
            let top = y + h * 0.08;
            let bottom = y + h * 0.92;
            let fold = w * 0.18;

            let mut page = PathBuilder::new();
            page.move_to(left, top);
            page.line_to(right - fold, top);
            page.line_to(right, top + fold);
            page.line_to(right, bottom);
            page.line_to(left, bottom);
            page.close();
            fill_path(pixmap, page, skia_color(FILE_COLOR));

            let mut corner = PathBuilder::new();
            corner.move_to(right - fold, top);
            corner.line_to(right, top + fold);
            corner.line_to(right - fold, top + fold);
            corner.close();
            fill_path(pixmap, corner, skia_color(FILE_FOLD_COLOR));

            if let Some(badge) = &cell.badge {
                fill_rect(pixmap, badge.bounds, skia_color(BADGE_COLOR));
            }
        }
    }
}

/// Converts a premultiplied RGBA pixmap to the BGRA layout of a Win32 DIB
pub fn pixmap_to_bgra(pixmap: &Pixmap) -> Vec<u8> {
    let mut data = pixmap.data().to_vec();
    for pixel in data.chunks_exact_mut(4) {
        pixel.swap(0, 2);
    }
    data
}
