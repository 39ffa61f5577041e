/// Zoom level and render geometry.
///
/// The viewport dimensions are owned by the external Presenter (the canvas
/// widget) and pushed in via `set_viewport`; everything else is derived on
/// demand and never cached across frames.

/// Multiplicative zoom step per zoom-in/zoom-out.
pub const ZOOM_STEP: f32 = 1.2;

/// Zoom never reaches zero; below this the image would vanish.
pub const MIN_ZOOM: f32 = 0.01;

/// Fit-to-window leaves a 5% margin around the image.
pub const FIT_MARGIN: f32 = 0.95;

#[derive(Debug, Clone)]
pub struct ViewportState {
    zoom: f32,
    viewport_width: u32,
    viewport_height: u32,
}

impl Default for ViewportState {
    fn default() -> Self {
        ViewportState {
            zoom: 1.0,
            // Unmeasured; tk reports 1x1 before layout settles and the
            // original treated <= 1 as "not ready yet".
            viewport_width: 1,
            viewport_height: 1,
        }
    }
}

impl ViewportState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    /// Called by the Presenter whenever the canvas is resized.
    pub fn set_viewport(&mut self, width: u32, height: u32) {
        self.viewport_width = width;
        self.viewport_height = height;
    }

    pub fn viewport(&self) -> (u32, u32) {
        (self.viewport_width, self.viewport_height)
    }

    fn measured(&self) -> bool {
        self.viewport_width > 1 && self.viewport_height > 1
    }

    pub fn zoom_in(&mut self) {
        self.zoom *= ZOOM_STEP;
    }

    pub fn zoom_out(&mut self) {
        self.zoom /= ZOOM_STEP;
        if self.zoom < MIN_ZOOM {
            self.zoom = MIN_ZOOM;
        }
    }

    pub fn actual_size(&mut self) {
        self.zoom = 1.0;
    }

    /// Scale so the whole image is visible with a small margin.
    ///
    /// Returns false without changing anything while the viewport has not
    /// been measured yet; the caller retries after layout settles.
    pub fn fit_to_window(&mut self, img_width: u32, img_height: u32) -> bool {
        if !self.measured() || img_width == 0 || img_height == 0 {
            return false;
        }
        let wr = self.viewport_width as f32 / img_width as f32;
        let hr = self.viewport_height as f32 / img_height as f32;
        self.zoom = wr.min(hr) * FIT_MARGIN;
        true
    }

    /// Scale so the image covers the viewport, possibly cropping edges.
    /// Used once on initial file open.
    pub fn fill_to_window(&mut self, img_width: u32, img_height: u32) -> bool {
        if !self.measured() || img_width == 0 || img_height == 0 {
            return false;
        }
        let wr = self.viewport_width as f32 / img_width as f32;
        let hr = self.viewport_height as f32 / img_height as f32;
        self.zoom = wr.max(hr);
        true
    }

    pub fn reset(&mut self) {
        self.zoom = 1.0;
    }

    /// On-screen size of the image at the current zoom, clamped so the
    /// Presenter never receives a zero-sized surface.
    pub fn render_size(&self, img_width: u32, img_height: u32) -> (u32, u32) {
        let w = (img_width as f32 * self.zoom).round() as u32;
        let h = (img_height as f32 * self.zoom).round() as u32;
        (w.max(1), h.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zoom_in_three_times() {
        let mut vp = ViewportState::new();
        vp.zoom_in();
        vp.zoom_in();
        vp.zoom_in();
        assert!((vp.zoom() - 1.728).abs() < 1e-4);
    }

    #[test]
    fn test_zoom_out_floor() {
        let mut vp = ViewportState::new();
        for _ in 0..100 {
            vp.zoom_out();
        }
        assert!(vp.zoom() >= MIN_ZOOM);
        assert!((vp.zoom() - MIN_ZOOM).abs() < 1e-6);
    }

    #[test]
    fn test_fit_to_window_with_margin() {
        let mut vp = ViewportState::new();
        vp.set_viewport(1000, 500);
        assert!(vp.fit_to_window(2000, 500));
        // Width is the constraining side: 1000/2000 = 0.5, with margin.
        assert!((vp.zoom() - 0.5 * FIT_MARGIN).abs() < 1e-6);
    }

    #[test]
    fn test_fit_noop_while_unmeasured() {
        let mut vp = ViewportState::new();
        vp.zoom_in();
        let before = vp.zoom();
        assert!(!vp.fit_to_window(800, 600));
        assert!(!vp.fill_to_window(800, 600));
        assert_eq!(vp.zoom(), before);
    }

    #[test]
    fn test_fill_covers_viewport() {
        let mut vp = ViewportState::new();
        vp.set_viewport(1000, 500);
        assert!(vp.fill_to_window(2000, 500));
        // Height ratio (1.0) wins over width ratio (0.5).
        assert!((vp.zoom() - 1.0).abs() < 1e-6);
        let (rw, rh) = vp.render_size(2000, 500);
        assert!(rw >= 1000 && rh >= 500);
    }

    #[test]
    fn test_actual_size() {
        let mut vp = ViewportState::new();
        vp.zoom_in();
        vp.actual_size();
        assert_eq!(vp.zoom(), 1.0);
    }

    #[test]
    fn test_render_size_clamps_to_one() {
        let mut vp = ViewportState::new();
        for _ in 0..50 {
            vp.zoom_out();
        }
        let (w, h) = vp.render_size(10, 10);
        assert_eq!((w, h), (1, 1));
    }
}
