// src/core/canvas.rs
//! Immediate-mode 2D drawing surface over an `RgbaImage`.
//!
//! Only the handful of primitives a 2D stage needs: blit, filled rect,
//! filled path and a clear. Colours are straight (non-premultiplied)
//! RGBA8 and everything composites source-over, sampled at pixel centres.
use cgmath::Point2;
use image::{Rgba, RgbaImage};
use log::debug;

use crate::config::MAX_SURFACE_DIMENSION;
use crate::error::OverlayError;
use crate::ui::color::parse_css_rgba;

/// Drawing API a live stage surface exposes.
pub trait DrawContext {
    fn width(&self) -> u32;
    fn height(&self) -> u32;
    /// Current pixels.
    fn image(&self) -> &RgbaImage;

    fn clear_rect(&mut self, x: f32, y: f32, w: f32, h: f32);
    fn draw_image(&mut self, src: &RgbaImage, dx: i32, dy: i32);
    fn set_fill_style(&mut self, style: &str) -> Result<(), OverlayError>;
    fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32);

    fn begin_path(&mut self);
    fn move_to(&mut self, x: f32, y: f32);
    fn line_to(&mut self, x: f32, y: f32);
    fn close_path(&mut self);
    /// Fills the current path (non-zero winding). The path is kept.
    fn fill(&mut self);
}

#[derive(Clone, Debug)]
struct SubPath {
    points: Vec<Point2<f32>>,
    closed: bool,
}

#[derive(Clone, Debug)]
pub struct Canvas {
    pixels: RgbaImage,
    fill: [u8; 4],
    path: Vec<SubPath>,
}

impl Canvas {
    pub fn new(width: u32, height: u32) -> Result<Self, OverlayError> {
        let fail = |reason| OverlayError::ResourceCreation { width, height, reason };
        if width == 0 || height == 0 {
            return Err(fail("zero-sized surface"));
        }
        if width > MAX_SURFACE_DIMENSION || height > MAX_SURFACE_DIMENSION {
            return Err(fail("dimension exceeds surface limit"));
        }
        (width as usize)
            .checked_mul(height as usize)
            .and_then(|n| n.checked_mul(4))
            .ok_or_else(|| fail("pixel buffer size overflow"))?;

        debug!("Allocated {}x{} canvas", width, height);
        Ok(Self::from_image(RgbaImage::new(width, height)))
    }

    pub fn from_image(pixels: RgbaImage) -> Self {
        Self { pixels, fill: [0, 0, 0, 255], path: Vec::new() }
    }

    pub fn fill_color(&self) -> [u8; 4] {
        self.fill
    }

    /// Points of the current path, one slice per sub-path.
    pub fn path_points(&self) -> Vec<&[Point2<f32>]> {
        self.path.iter().map(|s| s.points.as_slice()).collect()
    }

    pub fn path_closed(&self) -> bool {
        self.path.last().is_some_and(|s| s.closed)
    }

    #[inline(always)]
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        self.pixels.get_pixel(x, y).0
    }

    pub fn fill_all(&mut self, rgba: [u8; 4]) {
        for p in self.pixels.pixels_mut() {
            *p = Rgba(rgba);
        }
    }

    // Pixel index range whose centres fall in [lo, hi).
    fn span(lo: f32, hi: f32, limit: u32) -> (u32, u32) {
        let (lo, hi) = if lo <= hi { (lo, hi) } else { (hi, lo) };
        let start = (lo - 0.5).ceil().max(0.0);
        let end = (hi - 0.5).ceil().clamp(0.0, limit as f32);
        (start.min(limit as f32) as u32, end as u32)
    }

    fn rect_pixels(&self, x: f32, y: f32, w: f32, h: f32) -> (std::ops::Range<u32>, std::ops::Range<u32>) {
        let (x0, x1) = Self::span(x, x + w, self.pixels.width());
        let (y0, y1) = Self::span(y, y + h, self.pixels.height());
        (x0..x1, y0..y1)
    }

    fn blend_at(&mut self, x: u32, y: u32, src: [u8; 4]) {
        let dst = self.pixels.get_pixel_mut(x, y);
        dst.0 = source_over(src, dst.0);
    }

    fn edges(&self) -> Vec<(Point2<f32>, Point2<f32>)> {
        let mut edges = Vec::new();
        for sub in &self.path {
            let pts = &sub.points;
            if pts.len() < 2 {
                continue;
            }
            for w in pts.windows(2) {
                edges.push((w[0], w[1]));
            }
            // fill closes every sub-path implicitly
            edges.push((pts[pts.len() - 1], pts[0]));
        }
        edges
    }
}

/// Source-over composite of straight-alpha RGBA8 colours.
pub fn source_over(src: [u8; 4], dst: [u8; 4]) -> [u8; 4] {
    match (src[3], dst[3]) {
        (_, 0) | (255, _) => src,
        (0, _) => dst,
        (sa, da) => {
            let sa = sa as f32 / 255.0;
            let da = da as f32 / 255.0;
            let out_a = sa + da * (1.0 - sa);
            let mut out = [0u8; 4];
            for i in 0..3 {
                let c = (src[i] as f32 * sa + dst[i] as f32 * da * (1.0 - sa)) / out_a;
                out[i] = c.round().clamp(0.0, 255.0) as u8;
            }
            out[3] = (out_a * 255.0).round().clamp(0.0, 255.0) as u8;
            out
        }
    }
}

impl DrawContext for Canvas {
    fn width(&self) -> u32 {
        self.pixels.width()
    }

    fn height(&self) -> u32 {
        self.pixels.height()
    }

    fn image(&self) -> &RgbaImage {
        &self.pixels
    }

    fn clear_rect(&mut self, x: f32, y: f32, w: f32, h: f32) {
        let (xs, ys) = self.rect_pixels(x, y, w, h);
        for py in ys {
            for px in xs.clone() {
                self.pixels.put_pixel(px, py, Rgba([0, 0, 0, 0]));
            }
        }
    }

    fn draw_image(&mut self, src: &RgbaImage, dx: i32, dy: i32) {
        let (w, h) = (self.pixels.width() as i64, self.pixels.height() as i64);
        for (sx, sy, p) in src.enumerate_pixels() {
            let tx = dx as i64 + sx as i64;
            let ty = dy as i64 + sy as i64;
            if tx < 0 || ty < 0 || tx >= w || ty >= h {
                continue;
            }
            self.blend_at(tx as u32, ty as u32, p.0);
        }
    }

    fn set_fill_style(&mut self, style: &str) -> Result<(), OverlayError> {
        self.fill = parse_css_rgba(style)?;
        Ok(())
    }

    fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32) {
        let (xs, ys) = self.rect_pixels(x, y, w, h);
        let fill = self.fill;
        for py in ys {
            for px in xs.clone() {
                self.blend_at(px, py, fill);
            }
        }
    }

    fn begin_path(&mut self) {
        self.path.clear();
    }

    fn move_to(&mut self, x: f32, y: f32) {
        self.path.push(SubPath { points: vec![Point2::new(x, y)], closed: false });
    }

    fn line_to(&mut self, x: f32, y: f32) {
        match self.path.last_mut() {
            Some(sub) if !sub.closed => sub.points.push(Point2::new(x, y)),
            _ => self.move_to(x, y),
        }
    }

    fn close_path(&mut self) {
        if let Some(sub) = self.path.last_mut() {
            sub.closed = true;
        }
    }

    fn fill(&mut self) {
        let edges = self.edges();
        if edges.is_empty() {
            return;
        }
        let fill = self.fill;
        let width = self.pixels.width();
        let mut crossings: Vec<(f32, i32)> = Vec::new();

        for py in 0..self.pixels.height() {
            let y = py as f32 + 0.5;
            crossings.clear();
            for &(a, b) in &edges {
                let dir = if a.y <= y && y < b.y {
                    1
                } else if b.y <= y && y < a.y {
                    -1
                } else {
                    continue;
                };
                let x = a.x + (y - a.y) * (b.x - a.x) / (b.y - a.y);
                crossings.push((x, dir));
            }
            if crossings.is_empty() {
                continue;
            }
            crossings.sort_by(|l, r| l.0.partial_cmp(&r.0).unwrap_or(std::cmp::Ordering::Equal));

            let mut winding = 0;
            for pair in crossings.windows(2) {
                winding += pair[0].1;
                if winding == 0 {
                    continue;
                }
                let (x0, x1) = Self::span(pair[0].0, pair[1].0, width);
                for px in x0..x1 {
                    self.blend_at(px, py, fill);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reports_requested_dimensions() {
        for (w, h) in [(1, 1), (800, 600), (801, 601), (3, 4096)] {
            let c = Canvas::new(w, h).unwrap();
            assert_eq!((c.width(), c.height()), (w, h));
        }
    }

    #[test]
    fn refuses_unallocatable_surfaces() {
        for (w, h) in [(0, 10), (10, 0), (MAX_SURFACE_DIMENSION + 1, 1)] {
            assert!(matches!(Canvas::new(w, h), Err(OverlayError::ResourceCreation { .. })));
        }
    }

    #[test]
    fn fill_rect_blends_over_opaque_pixels() {
        let mut c = Canvas::new(4, 4).unwrap();
        c.fill_all([200, 100, 50, 255]);
        c.set_fill_style("rgba(0, 0, 0, 0.4)").unwrap();
        c.fill_rect(0.0, 0.0, 2.0, 4.0);
        // 0.4 quantises to 102/255
        let k: f32 = 1.0 - 102.0 / 255.0;
        let expect = [(200.0 * k).round() as u8, (100.0 * k).round() as u8, (50.0 * k).round() as u8, 255];
        assert_eq!(c.pixel(0, 0), expect);
        assert_eq!(c.pixel(1, 3), expect);
        assert_eq!(c.pixel(2, 0), [200, 100, 50, 255]);
    }

    #[test]
    fn clear_rect_makes_pixels_transparent() {
        let mut c = Canvas::new(3, 3).unwrap();
        c.fill_all([1, 2, 3, 255]);
        c.clear_rect(1.0, 1.0, 5.0, 5.0);
        assert_eq!(c.pixel(0, 0), [1, 2, 3, 255]);
        assert_eq!(c.pixel(2, 2), [0, 0, 0, 0]);
    }

    #[test]
    fn draw_image_onto_cleared_surface_is_exact() {
        let mut src = RgbaImage::new(3, 2);
        src.put_pixel(0, 0, Rgba([10, 20, 30, 40]));
        src.put_pixel(2, 1, Rgba([250, 1, 2, 255]));
        let mut c = Canvas::new(3, 2).unwrap();
        c.fill_all([9, 9, 9, 255]);
        c.clear_rect(0.0, 0.0, 3.0, 2.0);
        c.draw_image(&src, 0, 0);
        assert_eq!(c.image(), &src);
    }

    #[test]
    fn draw_image_clips_at_edges() {
        let mut src = RgbaImage::new(2, 2);
        for p in src.pixels_mut() {
            *p = Rgba([7, 7, 7, 255]);
        }
        let mut c = Canvas::new(3, 3).unwrap();
        c.draw_image(&src, 2, -1);
        assert_eq!(c.pixel(2, 0), [7, 7, 7, 255]);
        assert_eq!(c.pixel(1, 0), [0, 0, 0, 0]);
        assert_eq!(c.pixel(2, 1), [0, 0, 0, 0]);
    }

    #[test]
    fn fills_a_triangle_by_pixel_centres() {
        let mut c = Canvas::new(10, 10).unwrap();
        c.set_fill_style("#ffffff").unwrap();
        c.begin_path();
        c.move_to(0.0, 0.0);
        c.line_to(0.0, 10.0);
        c.line_to(10.0, 5.0);
        c.fill();
        c.close_path();

        assert_eq!(c.pixel(0, 5), [255, 255, 255, 255]);
        assert_eq!(c.pixel(8, 4), [255, 255, 255, 255]);
        assert_eq!(c.pixel(9, 0), [0, 0, 0, 0]);
        assert_eq!(c.pixel(5, 9), [0, 0, 0, 0]);
        assert_eq!(c.path_points(), vec![&[Point2::new(0.0, 0.0), Point2::new(0.0, 10.0), Point2::new(10.0, 5.0)][..]]);
        assert!(c.path_closed());
    }

    #[test]
    fn source_over_extremes() {
        assert_eq!(source_over([1, 2, 3, 0], [4, 5, 6, 7]), [4, 5, 6, 7]);
        assert_eq!(source_over([1, 2, 3, 255], [4, 5, 6, 7]), [1, 2, 3, 255]);
        assert_eq!(source_over([1, 2, 3, 9], [0, 0, 0, 0]), [1, 2, 3, 9]);
        let out = source_over([255, 255, 255, 204], [0, 0, 0, 255]);
        assert_eq!(out, [204, 204, 204, 255]);
    }
}
