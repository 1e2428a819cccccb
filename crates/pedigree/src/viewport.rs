//! Zoom, pan and pointer mapping for an interactive view.

use crate::drop::DropTarget;
use pedigree_core::{IndividualId, PedigreeConfig};
use pedigree_layout::PedigreeLayout;
use pedigree_render::ViewBox;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportOptions {
    pub min_zoom: f64,
    pub max_zoom: f64,
    pub zoom_step: f64,
    /// Space kept around the node extents by [`Viewport::fit`].
    pub fit_margin: f64,
    /// Extra pick distance beyond a node's radius.
    pub hit_slack: f64,
}

impl Default for ViewportOptions {
    fn default() -> Self {
        Self {
            min_zoom: 0.3,
            max_zoom: 3.0,
            zoom_step: 0.1,
            fit_margin: 80.0,
            hit_slack: 8.0,
        }
    }
}

impl ViewportOptions {
    pub fn from_config(config: &PedigreeConfig) -> Self {
        let d = Self::default();
        Self {
            min_zoom: config.get_f64("viewport.minZoom").unwrap_or(d.min_zoom),
            max_zoom: config.get_f64("viewport.maxZoom").unwrap_or(d.max_zoom),
            zoom_step: config.get_f64("viewport.zoomStep").unwrap_or(d.zoom_step),
            fit_margin: config.get_f64("viewport.fitMargin").unwrap_or(d.fit_margin),
            hit_slack: config.get_f64("viewport.hitSlack").unwrap_or(d.hit_slack),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewportKey {
    ZoomIn,
    ZoomOut,
    Fit,
}

impl ViewportKey {
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "+" | "=" => Some(Self::ZoomIn),
            "-" => Some(Self::ZoomOut),
            "r" | "R" => Some(Self::Fit),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Drag {
    last_x: f64,
    last_y: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Viewport {
    /// viewBox min corner in SVG units.
    pub origin_x: f64,
    pub origin_y: f64,
    zoom: f64,
    /// Container size in client pixels.
    pub width: f64,
    pub height: f64,
    drag: Option<Drag>,
    options: ViewportOptions,
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

impl Viewport {
    pub fn new(width: f64, height: f64, options: ViewportOptions) -> Self {
        Self {
            origin_x: 0.0,
            origin_y: 0.0,
            zoom: 1.0,
            width,
            height,
            drag: None,
            options,
        }
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    pub fn options(&self) -> &ViewportOptions {
        &self.options
    }

    pub fn resize(&mut self, width: f64, height: f64) {
        self.width = width;
        self.height = height;
    }

    pub fn view_box(&self) -> ViewBox {
        ViewBox {
            x: self.origin_x,
            y: self.origin_y,
            width: self.width / self.zoom,
            height: self.height / self.zoom,
        }
    }

    /// Applies `f` to the current zoom and clamps the result.
    pub fn set_zoom(&mut self, f: impl FnOnce(f64) -> f64) {
        let next = f(self.zoom);
        let next = if next.is_finite() { next } else { self.zoom };
        self.zoom = next.clamp(self.options.min_zoom, self.options.max_zoom);
    }

    pub fn zoom_in(&mut self) {
        let step = self.options.zoom_step;
        self.set_zoom(|z| round2(z + step));
    }

    pub fn zoom_out(&mut self) {
        let step = self.options.zoom_step;
        self.set_zoom(|z| round2(z - step));
    }

    /// One wheel notch; scrolling up zooms in.
    pub fn wheel(&mut self, delta_y: f64) {
        if delta_y < 0.0 {
            self.zoom_in();
        } else if delta_y > 0.0 {
            self.zoom_out();
        }
    }

    /// Handles a keyboard shortcut. Returns false for keys the viewport does not use.
    pub fn handle_key(&mut self, key: &str, layout: &PedigreeLayout) -> bool {
        match ViewportKey::from_key(key) {
            Some(ViewportKey::ZoomIn) => self.zoom_in(),
            Some(ViewportKey::ZoomOut) => self.zoom_out(),
            Some(ViewportKey::Fit) => self.fit(layout),
            None => return false,
        }
        true
    }

    /// Tight view over every node extent plus the fit margin, centered in the container.
    pub fn fit(&mut self, layout: &PedigreeLayout) {
        let target = ViewBox::around(&layout.bounds, self.options.fit_margin);
        if self.width <= 0.0 || self.height <= 0.0 {
            self.origin_x = target.x;
            self.origin_y = target.y;
            return;
        }
        let zoom = (self.width / target.width).min(self.height / target.height);
        self.set_zoom(|_| zoom);
        let vb = self.view_box();
        self.origin_x = target.x + (target.width - vb.width) / 2.0;
        self.origin_y = target.y + (target.height - vb.height) / 2.0;
    }

    pub fn pointer_down(&mut self, client_x: f64, client_y: f64) {
        self.drag = Some(Drag {
            last_x: client_x,
            last_y: client_y,
        });
    }

    pub fn pointer_move(&mut self, client_x: f64, client_y: f64) {
        let Some(drag) = self.drag.as_mut() else {
            return;
        };
        let (dx, dy) = (client_x - drag.last_x, client_y - drag.last_y);
        drag.last_x = client_x;
        drag.last_y = client_y;
        self.origin_x -= dx / self.zoom;
        self.origin_y -= dy / self.zoom;
    }

    pub fn pointer_up(&mut self) {
        self.drag = None;
    }

    pub fn pointer_leave(&mut self) {
        self.drag = None;
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    /// Maps container-relative client coordinates to SVG coordinates.
    pub fn client_to_svg(&self, client_x: f64, client_y: f64) -> (f64, f64) {
        (
            self.origin_x + client_x / self.zoom,
            self.origin_y + client_y / self.zoom,
        )
    }

    pub fn node_at(&self, layout: &PedigreeLayout, x: f64, y: f64) -> Option<IndividualId> {
        layout
            .nodes
            .iter()
            .map(|n| (n, (n.x - x).hypot(n.y - y)))
            .filter(|(n, d)| *d <= n.r + self.options.hit_slack)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(n, _)| n.id.clone())
    }

    /// The node under a client point, or the free-space point in SVG coordinates.
    pub fn resolve_drop(&self, layout: &PedigreeLayout, client_x: f64, client_y: f64) -> DropTarget {
        let (x, y) = self.client_to_svg(client_x, client_y);
        DropTarget {
            x,
            y,
            node: self.node_at(layout, x, y),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn viewport() -> Viewport {
        Viewport::new(800.0, 600.0, ViewportOptions::default())
    }

    #[test]
    fn zoom_steps_round_and_clamp() {
        let mut v = viewport();
        for _ in 0..40 {
            v.zoom_in();
        }
        assert_eq!(v.zoom(), 3.0);
        for _ in 0..40 {
            v.zoom_out();
        }
        assert_eq!(v.zoom(), 0.3);
        v.set_zoom(|_| 1.0);
        v.zoom_in();
        v.zoom_in();
        v.zoom_in();
        assert_eq!(v.zoom(), 1.3);
    }

    #[test]
    fn view_box_scales_with_zoom() {
        let mut v = viewport();
        v.set_zoom(|_| 2.0);
        let vb = v.view_box();
        assert_eq!((vb.width, vb.height), (400.0, 300.0));
    }

    #[test]
    fn drag_translates_origin_by_delta_over_zoom() {
        let mut v = viewport();
        v.set_zoom(|_| 2.0);
        v.pointer_move(50.0, 50.0);
        assert_eq!((v.origin_x, v.origin_y), (0.0, 0.0));

        v.pointer_down(100.0, 100.0);
        v.pointer_move(140.0, 80.0);
        assert_eq!((v.origin_x, v.origin_y), (-20.0, 10.0));
        v.pointer_leave();
        v.pointer_move(0.0, 0.0);
        assert_eq!((v.origin_x, v.origin_y), (-20.0, 10.0));
        assert_eq!(v.client_to_svg(100.0, 100.0), (30.0, 60.0));
    }
}
