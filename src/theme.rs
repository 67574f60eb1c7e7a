//! Immutable presentation configuration shared by the assembler and the chart factory.
//!
//! A [`Theme`] bundles the color palette, the page geometry and the raster
//! resolution used for charts. It is constructed once per render and passed by
//! reference, so colors and page measurements are never duplicated as
//! literals across modules.

use genpdf::style::Color;

/// An opaque RGB color.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const WHITE: Rgb = Rgb::new(0xff, 0xff, 0xff);
    pub const BLACK: Rgb = Rgb::new(0x00, 0x00, 0x00);

    /// Creates a color from its channels.
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Creates a color from a `0xRRGGBB` literal.
    pub const fn from_u32(hex: u32) -> Self {
        Self::new((hex >> 16) as u8, (hex >> 8) as u8, hex as u8)
    }

    /// Paints this color with the given opacity over `background`.
    ///
    /// Charts are rasterized without an alpha channel, so translucent fills are
    /// flattened up front.
    pub fn over(self, background: Rgb, alpha: f64) -> Rgb {
        let alpha = alpha.clamp(0.0, 1.0);
        let mix = |fg: u8, bg: u8| -> u8 {
            (fg as f64 * alpha + bg as f64 * (1.0 - alpha))
                .round()
                .clamp(0.0, 255.0) as u8
        };
        Rgb::new(
            mix(self.r, background.r),
            mix(self.g, background.g),
            mix(self.b, background.b),
        )
    }
}

impl From<Rgb> for Color {
    fn from(rgb: Rgb) -> Self {
        Color::Rgb(rgb.r, rgb.g, rgb.b)
    }
}

/// The fixed report palette.
#[derive(Clone, Debug, PartialEq)]
pub struct Palette {
    /// Brand color used for the title and highlights.
    pub primary: Rgb,
    /// Table headers, level-one headings and table borders.
    pub dark: Rgb,
    /// Level-two headings.
    pub accent: Rgb,
    /// Zebra stripe background.
    pub light_background: Rgb,
    /// Subtitles, footers and axis decorations.
    pub muted: Rgb,
    /// Body text.
    pub text: Rgb,
    /// Level-three headings.
    pub info: Rgb,
    /// Inner table grid lines.
    pub grid: Rgb,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            primary: Rgb::from_u32(0xFF8E53),
            dark: Rgb::from_u32(0x1A1A2E),
            accent: Rgb::from_u32(0xE94560),
            light_background: Rgb::from_u32(0xF8F9FA),
            muted: Rgb::from_u32(0x6C757D),
            text: Rgb::from_u32(0x212529),
            info: Rgb::from_u32(0x0D6EFD),
            grid: Rgb::from_u32(0xDEE2E6),
        }
    }
}

/// Page size and margins in millimetres.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PageGeometry {
    pub width_mm: f64,
    pub height_mm: f64,
    pub margin_top_mm: f64,
    pub margin_right_mm: f64,
    pub margin_bottom_mm: f64,
    pub margin_left_mm: f64,
    /// Height reserved at the bottom of the body for the page footer.
    pub footer_height_mm: f64,
}

impl PageGeometry {
    /// A4 portrait with 15 mm top/bottom and 20 mm left/right margins.
    pub const fn a4() -> Self {
        Self {
            width_mm: 210.0,
            height_mm: 297.0,
            margin_top_mm: 15.0,
            margin_right_mm: 20.0,
            margin_bottom_mm: 15.0,
            margin_left_mm: 20.0,
            footer_height_mm: 8.0,
        }
    }

    /// Width available to content between the side margins.
    pub fn usable_width_mm(&self) -> f64 {
        self.width_mm - self.margin_left_mm - self.margin_right_mm
    }

    /// Height available to content once margins and the footer band are removed.
    pub fn body_height_mm(&self) -> f64 {
        self.height_mm - self.margin_top_mm - self.margin_bottom_mm - self.footer_height_mm
    }
}

impl Default for PageGeometry {
    fn default() -> Self {
        Self::a4()
    }
}

/// Palette, page geometry and chart resolution for one render.
#[derive(Clone, Debug, PartialEq)]
pub struct Theme {
    pub palette: Palette,
    pub page: PageGeometry,
    /// Raster resolution of generated charts.
    pub chart_dpi: u32,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            palette: Palette::default(),
            page: PageGeometry::a4(),
            chart_dpi: 150,
        }
    }
}
