use super::theme::{Bounds, Color, FontRole, Point};

/// Which point of the text box `(x, y)` refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    LeftTop,
    RightTop,
    RightBaseline,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    Text {
        text: String,
        at: Point,
        role: FontRole,
        color: Color,
        anchor: Anchor,
    },
    FilledEllipse {
        bounds: Bounds,
        color: Color,
    },
    Line {
        bounds: Bounds,
        color: Color,
    },
    /// Chart image pasted with its top-left corner at `at`.
    Chart {
        at: Point,
    },
}

/// Ordered draw operations for one frame, before rasterization.
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    pub width: u32,
    pub height: u32,
    pub background: Color,
    pub ops: Vec<DrawOp>,
}

impl Scene {
    pub fn new(width: u32, height: u32, background: Color) -> Self {
        Self {
            width,
            height,
            background,
            ops: Vec::new(),
        }
    }

    pub fn text(&mut self, text: impl Into<String>, at: Point, role: FontRole, color: Color) {
        self.text_anchored(text, at, role, color, Anchor::LeftTop);
    }

    pub fn text_anchored(
        &mut self,
        text: impl Into<String>,
        at: Point,
        role: FontRole,
        color: Color,
        anchor: Anchor,
    ) {
        self.ops.push(DrawOp::Text {
            text: text.into(),
            at,
            role,
            color,
            anchor,
        });
    }

    pub fn line(&mut self, bounds: Bounds, color: Color) {
        self.ops.push(DrawOp::Line { bounds, color });
    }

    pub fn ellipse(&mut self, bounds: Bounds, color: Color) {
        self.ops.push(DrawOp::FilledEllipse { bounds, color });
    }

    pub fn chart(&mut self, at: Point) {
        self.ops.push(DrawOp::Chart { at });
    }

    /// All text operations in draw order.
    pub fn texts(&self) -> impl Iterator<Item = (&str, Point, Color)> + '_ {
        self.ops.iter().filter_map(|op| match op {
            DrawOp::Text { text, at, color, .. } => Some((text.as_str(), *at, *color)),
            _ => None,
        })
    }

    pub fn find_text(&self, needle: &str) -> Option<(Point, Color)> {
        self.texts()
            .find(|(text, _, _)| *text == needle)
            .map(|(_, at, color)| (at, color))
    }

    pub fn font_role(&self, needle: &str) -> Option<FontRole> {
        self.ops.iter().find_map(|op| match op {
            DrawOp::Text { text, role, .. } if text == needle => Some(*role),
            _ => None,
        })
    }

    pub fn has_chart(&self) -> bool {
        self.ops.iter().any(|op| matches!(op, DrawOp::Chart { .. }))
    }
}
