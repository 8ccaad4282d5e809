//! Rectangle geometry in PDF user space.
//!
//! Coordinates use the PDF convention: the origin is at the lower left and
//! a rectangle is stored as its lower-left and upper-right corners.

/// An axis-aligned rectangle in PDF user space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    /// Lower-left x.
    pub llx: f64,
    /// Lower-left y.
    pub lly: f64,
    /// Upper-right x.
    pub urx: f64,
    /// Upper-right y.
    pub ury: f64,
}

impl Rect {
    pub fn new(llx: f64, lly: f64, urx: f64, ury: f64) -> Self {
        Self { llx, lly, urx, ury }
    }

    /// Build a rectangle from `re` operands (x, y, width, height).
    pub fn from_re_operands(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            llx: x,
            lly: y,
            urx: x + width,
            ury: y + height,
        }
    }

    /// Reorder the corners so lower-left is actually ≤ upper-right.
    pub fn normalized(self) -> Self {
        Self {
            llx: self.llx.min(self.urx),
            lly: self.lly.min(self.ury),
            urx: self.llx.max(self.urx),
            ury: self.lly.max(self.ury),
        }
    }

    /// Width of the rectangle.
    pub fn width(&self) -> f64 {
        self.urx - self.llx
    }

    /// Height of the rectangle.
    pub fn height(&self) -> f64 {
        self.ury - self.lly
    }

    /// Shrink the rectangle by `padding` on every side.
    ///
    /// Used to derive the padding edge and content area from a widget's
    /// bounding box.
    pub fn apply_padding(&self, padding: f64) -> Rect {
        Rect {
            llx: self.llx + padding,
            lly: self.lly + padding,
            urx: self.urx - padding,
            ury: self.ury - padding,
        }
    }

    /// Translate the rectangle so its lower-left corner sits at the origin.
    ///
    /// Widget rectangles are in page space; appearance bounding boxes are
    /// in form space starting at (0, 0).
    pub fn retranslated(&self) -> Rect {
        Rect {
            llx: 0.0,
            lly: 0.0,
            urx: self.width(),
            ury: self.height(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rect_dimensions() {
        let r = Rect::new(10.0, 20.0, 110.0, 50.0);
        assert_eq!(r.width(), 100.0);
        assert_eq!(r.height(), 30.0);
    }

    #[test]
    fn rect_from_re_operands() {
        let r = Rect::from_re_operands(5.0, 6.0, 90.0, 10.0);
        assert_eq!(r.llx, 5.0);
        assert_eq!(r.lly, 6.0);
        assert_eq!(r.urx, 95.0);
        assert_eq!(r.ury, 16.0);
    }

    #[test]
    fn rect_normalized_swaps_corners() {
        let r = Rect::new(100.0, 50.0, 10.0, 20.0).normalized();
        assert_eq!(r, Rect::new(10.0, 20.0, 100.0, 50.0));
    }

    #[test]
    fn rect_normalized_keeps_ordered_corners() {
        let r = Rect::new(1.0, 2.0, 3.0, 4.0);
        assert_eq!(r.normalized(), r);
    }

    #[test]
    fn rect_apply_padding() {
        let r = Rect::new(0.0, 0.0, 100.0, 20.0).apply_padding(1.0);
        assert_eq!(r, Rect::new(1.0, 1.0, 99.0, 19.0));
    }

    #[test]
    fn rect_retranslated_starts_at_origin() {
        let r = Rect::new(72.0, 600.0, 172.0, 620.0).retranslated();
        assert_eq!(r, Rect::new(0.0, 0.0, 100.0, 20.0));
    }
}
