//! Built-in metrics for the standard Type1 fonts.
//!
//! AcroForm default appearance strings overwhelmingly reference the
//! standard fonts (`/Helv`, `/Cour`, `/TiRo`), whose dictionaries usually
//! ship without a `/Widths` array. The width data here (Adobe AFM values
//! indexed by WinAnsiEncoding codes) lets the layout engine measure text
//! for those fonts anyway. Families not tabled here fall back to the
//! default metrics in [`crate::font_metrics`].

/// Metrics for one standard Type1 font.
#[derive(Debug, Clone)]
pub struct StandardFontData {
    /// Glyph widths indexed by character code, 1/1000 em units.
    pub widths: [u16; 256],
    /// Font bounding box `[llx, lly, urx, ury]`, 1/1000 em units.
    pub font_bbox: [i16; 4],
    /// Ascent above the baseline, 1/1000 em units.
    pub ascent: i16,
    /// Descent below the baseline (negative), 1/1000 em units.
    pub descent: i16,
}

/// Look up standard font metrics by `/BaseFont` name.
///
/// The AcroForm resource abbreviations (`Helv`, `HeBo`, `Cour`, `TiRo`)
/// are accepted alongside the full PostScript names, since malformed
/// documents sometimes put the resource key where the font name belongs.
pub fn lookup(name: &str) -> Option<&'static StandardFontData> {
    match name {
        "Helvetica" | "Helvetica-Oblique" | "Helv" | "HeOb" => Some(&HELVETICA),
        "Helvetica-Bold" | "Helvetica-BoldOblique" | "HeBo" | "HeBO" => Some(&HELVETICA_BOLD),
        "Courier" | "Courier-Bold" | "Courier-Oblique" | "Courier-BoldOblique" | "Cour"
        | "CoBo" | "CoOb" | "CoBO" => Some(&COURIER),
        "Times-Roman" | "Times-Italic" | "TiRo" | "TiIt" => Some(&TIMES_ROMAN),
        _ => None,
    }
}

// Courier is monospaced; every printable code is 600.
static COURIER: StandardFontData = StandardFontData {
    widths: {
        let mut w = [600u16; 256];
        let mut i = 0;
        while i < 32 {
            w[i] = 0;
            i += 1;
        }
        w
    },
    font_bbox: [-23, -250, 715, 805],
    ascent: 629,
    descent: -157,
};

#[rustfmt::skip]
static HELVETICA: StandardFontData = StandardFontData {
    widths: [
        0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
        0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
        // 0x20: space through slash
        278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
        // 0x30: digits, punctuation
        556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556,
        // 0x40: @ and uppercase
        1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778,
        667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556,
        // 0x60: backtick and lowercase
        333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556,
        556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584, 0,
        // 0x80: WinAnsi extensions
        556, 0, 222, 556, 333, 1000, 556, 556, 333, 1000, 667, 333, 1000, 0, 611, 0,
        0, 222, 222, 333, 333, 350, 556, 1000, 333, 1000, 500, 333, 944, 0, 500, 667,
        // 0xA0: Latin-1 supplement
        278, 333, 556, 556, 556, 556, 260, 556, 333, 737, 370, 556, 584, 333, 737, 333,
        400, 584, 333, 333, 333, 556, 537, 278, 333, 333, 365, 556, 834, 834, 834, 611,
        // 0xC0: accented capitals
        667, 667, 667, 667, 667, 667, 1000, 722, 667, 667, 667, 667, 278, 278, 278, 278,
        722, 722, 778, 778, 778, 778, 778, 584, 778, 722, 722, 722, 722, 667, 667, 611,
        // 0xE0: accented lowercase
        556, 556, 556, 556, 556, 556, 889, 500, 556, 556, 556, 556, 278, 278, 278, 278,
        556, 556, 556, 556, 556, 556, 556, 584, 611, 556, 556, 556, 556, 500, 556, 500,
    ],
    font_bbox: [-166, -225, 1000, 931],
    ascent: 718,
    descent: -207,
};

#[rustfmt::skip]
static HELVETICA_BOLD: StandardFontData = StandardFontData {
    widths: [
        0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
        0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
        278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
        556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611,
        975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778,
        667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556,
        333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611,
        611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584, 0,
        556, 0, 278, 556, 500, 1000, 556, 556, 333, 1000, 667, 333, 1000, 0, 611, 0,
        0, 278, 278, 500, 500, 350, 556, 1000, 333, 1000, 556, 333, 944, 0, 500, 667,
        278, 333, 556, 556, 556, 556, 280, 556, 333, 737, 370, 556, 584, 333, 737, 333,
        400, 584, 333, 333, 333, 611, 556, 278, 333, 333, 365, 556, 834, 834, 834, 611,
        722, 722, 722, 722, 722, 722, 1000, 722, 667, 667, 667, 667, 278, 278, 278, 278,
        722, 722, 778, 778, 778, 778, 778, 584, 778, 722, 722, 722, 722, 667, 667, 611,
        556, 556, 556, 556, 556, 556, 889, 556, 556, 556, 556, 556, 278, 278, 278, 278,
        611, 611, 611, 611, 611, 611, 611, 584, 611, 611, 611, 611, 611, 556, 611, 556,
    ],
    font_bbox: [-170, -228, 1003, 962],
    ascent: 718,
    descent: -207,
};

#[rustfmt::skip]
static TIMES_ROMAN: StandardFontData = StandardFontData {
    widths: [
        0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
        0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
        250, 333, 408, 500, 500, 833, 778, 180, 333, 333, 500, 564, 250, 333, 250, 278,
        500, 500, 500, 500, 500, 500, 500, 500, 500, 500, 278, 278, 564, 564, 564, 444,
        921, 722, 667, 667, 722, 611, 556, 722, 722, 333, 389, 722, 611, 889, 722, 722,
        556, 722, 667, 556, 611, 722, 722, 944, 722, 722, 611, 333, 278, 333, 469, 500,
        333, 444, 500, 444, 500, 444, 333, 500, 500, 278, 278, 500, 278, 778, 500, 500,
        500, 500, 333, 389, 278, 500, 500, 722, 500, 500, 444, 480, 200, 480, 541, 0,
        500, 0, 333, 500, 444, 1000, 500, 500, 333, 1000, 556, 333, 889, 0, 611, 0,
        0, 333, 333, 444, 444, 350, 500, 1000, 333, 980, 389, 333, 722, 0, 444, 722,
        250, 333, 500, 500, 500, 500, 200, 500, 333, 760, 276, 500, 564, 333, 760, 333,
        400, 564, 300, 300, 333, 500, 453, 250, 333, 300, 310, 500, 750, 750, 750, 444,
        722, 722, 722, 722, 722, 722, 889, 667, 611, 611, 611, 611, 333, 333, 333, 333,
        722, 722, 722, 722, 722, 722, 722, 564, 722, 722, 722, 722, 722, 722, 556, 500,
        444, 444, 444, 444, 444, 444, 667, 444, 444, 444, 444, 444, 278, 278, 278, 278,
        500, 500, 500, 500, 500, 500, 500, 564, 500, 500, 500, 500, 500, 500, 500, 500,
    ],
    font_bbox: [-168, -218, 1000, 898],
    ascent: 683,
    descent: -217,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_by_postscript_name() {
        assert!(lookup("Helvetica").is_some());
        assert!(lookup("Helvetica-Bold").is_some());
        assert!(lookup("Courier-BoldOblique").is_some());
        assert!(lookup("Times-Roman").is_some());
        assert!(lookup("Wingdings").is_none());
    }

    #[test]
    fn lookup_by_acroform_abbreviation() {
        assert!(lookup("Helv").is_some());
        assert!(lookup("HeBo").is_some());
        assert!(lookup("Cour").is_some());
        assert!(lookup("TiRo").is_some());
    }

    #[test]
    fn helvetica_known_widths() {
        let helv = lookup("Helvetica").unwrap();
        assert_eq!(helv.widths[b' ' as usize], 278);
        assert_eq!(helv.widths[b'H' as usize], 722);
        assert_eq!(helv.widths[b'e' as usize], 556);
        assert_eq!(helv.widths[b'l' as usize], 222);
        assert_eq!(helv.widths[b'o' as usize], 556);
    }

    #[test]
    fn courier_is_monospaced() {
        let cour = lookup("Courier").unwrap();
        assert!(cour.widths[0x20..].iter().all(|&w| w == 600));
        assert_eq!(cour.widths[0], 0);
    }

    #[test]
    fn metrics_carry_vertical_extents() {
        let helv = lookup("Helv").unwrap();
        assert_eq!(helv.ascent, 718);
        assert_eq!(helv.descent, -207);
        assert_eq!(helv.font_bbox[3] - helv.font_bbox[1], 931 + 225);
    }
}
