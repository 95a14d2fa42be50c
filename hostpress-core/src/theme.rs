//! Deterministic per-host visual themes.
//!
//! The MD5 digest of the raw host string is sliced byte by byte; each byte
//! either parameterises a colour or indexes one of the constant tables
//! below (`byte % table.len()`). The output is bit-for-bit compatible with
//! the themes already served to existing tenants, which is why the hue is
//! the raw byte (0-255) and is not rescaled to 360 degrees.

use std::fmt;

use md5::{Digest, Md5};
use serde::{Serialize, Serializer};

const FONTS: [&str; 8] = [
    "Georgia, serif",
    "Helvetica, Arial, sans-serif",
    "Palatino, serif",
    "Verdana, sans-serif",
    "Courier New, monospace",
    "Trebuchet MS, sans-serif",
    "Times New Roman, serif",
    "Arial Black, sans-serif",
];

const SPACING_UNITS: [&str; 6] = ["0.5rem", "0.75rem", "1rem", "1.25rem", "1.5rem", "2rem"];
const BORDER_RADII: [&str; 7] = ["0px", "4px", "8px", "12px", "16px", "24px", "32px"];
const CONTAINER_WIDTHS: [&str; 5] = ["768px", "900px", "1024px", "1200px", "1400px"];

const FONT_SIZES: [&str; 5] = ["1.8rem", "2rem", "2.2rem", "2.4rem", "2.6rem"];
const MARGINS: [&str; 5] = ["1rem", "1.5rem", "2rem", "2.5rem", "3rem"];
const FONT_WEIGHTS: [&str; 5] = ["500", "600", "700", "800", "900"];
const LINE_HEIGHTS: [&str; 5] = ["1.4", "1.5", "1.6", "1.7", "1.8"];
const LETTER_SPACINGS: [&str; 5] = ["-0.5px", "-0.25px", "0", "0.25px", "0.5px"];

const HEADER_HEIGHT: &str = "60px";
const FOOTER_HEIGHT: &str = "40px";
const PARAGRAPH_FONT_SIZE: &str = "1rem";

/// An `hsl()` colour. Saturation is fractional for the background tint.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HslColor {
    pub hue: u16,
    pub saturation: f64,
    pub lightness: f64,
}

impl fmt::Display for HslColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "hsl({}, {}%, {}%)",
            self.hue, self.saturation, self.lightness
        )
    }
}

impl Serialize for HslColor {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct H1Style {
    pub font_size: &'static str,
    pub margin_bottom: &'static str,
    pub font_weight: &'static str,
    pub letter_spacing: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HeadingStyle {
    pub font_size: &'static str,
    pub margin_top: &'static str,
    pub margin_bottom: &'static str,
    pub font_weight: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParagraphStyle {
    pub font_size: &'static str,
    pub line_height: &'static str,
    pub margin_bottom: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Typography {
    pub h1: H1Style,
    pub h2: HeadingStyle,
    pub h3: HeadingStyle,
    pub paragraph: ParagraphStyle,
}

/// The visual styling bundle for one host. Derived, never stored.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ThemeDescriptor {
    pub primary: HslColor,
    pub secondary: HslColor,
    pub accent: HslColor,
    pub background: HslColor,
    pub text: HslColor,
    pub font_family: &'static str,
    pub border_radius: &'static str,
    pub spacing: &'static str,
    pub container_width: &'static str,
    pub header_height: &'static str,
    pub footer_height: &'static str,
    pub typography: Typography,
}

fn pick<const N: usize>(table: &[&'static str; N], index: usize) -> &'static str {
    table[index % N]
}

/// Derive the theme for a host. Pure and total: the empty string is a valid host.
pub fn derive_theme(host: &str) -> ThemeDescriptor {
    let digest = Md5::digest(host.as_bytes());
    let byte = |i: usize| digest[i] as usize;

    let hue = digest[0] as u16;
    let saturation = (30 + byte(1) % 70) as f64;
    let lightness = (40 + byte(2) % 40) as f64;

    let color = |hue: u16| HslColor {
        hue,
        saturation,
        lightness,
    };

    let h1 = byte(7) % FONT_SIZES.len();
    let h2 = byte(8) % FONT_SIZES.len();
    let h3 = byte(9) % FONT_SIZES.len();
    let margin = byte(10);
    let weight = byte(11);

    ThemeDescriptor {
        primary: color(hue),
        secondary: color((hue + 120) % 360),
        accent: color((hue + 240) % 360),
        background: HslColor {
            hue,
            saturation: saturation * 0.2,
            lightness: 95.0,
        },
        text: HslColor {
            hue,
            saturation: 10.0,
            lightness: 20.0,
        },
        font_family: pick(&FONTS, byte(3)),
        spacing: pick(&SPACING_UNITS, byte(4)),
        border_radius: pick(&BORDER_RADII, byte(5)),
        container_width: pick(&CONTAINER_WIDTHS, byte(6)),
        header_height: HEADER_HEIGHT,
        footer_height: FOOTER_HEIGHT,
        typography: Typography {
            h1: H1Style {
                font_size: FONT_SIZES[h1],
                margin_bottom: pick(&MARGINS, margin),
                font_weight: pick(&FONT_WEIGHTS, weight),
                letter_spacing: LETTER_SPACINGS[h1],
            },
            h2: HeadingStyle {
                font_size: FONT_SIZES[h2],
                margin_top: pick(&MARGINS, margin),
                margin_bottom: pick(&MARGINS, margin % MARGINS.len() + 1),
                font_weight: pick(&FONT_WEIGHTS, weight % FONT_WEIGHTS.len() + 1),
            },
            h3: HeadingStyle {
                font_size: FONT_SIZES[h3],
                margin_top: pick(&MARGINS, margin % MARGINS.len() + 2),
                margin_bottom: pick(&MARGINS, margin % MARGINS.len() + 3),
                font_weight: pick(&FONT_WEIGHTS, weight % FONT_WEIGHTS.len() + 2),
            },
            paragraph: ParagraphStyle {
                font_size: PARAGRAPH_FONT_SIZE,
                line_height: pick(&LINE_HEIGHTS, margin),
                margin_bottom: pick(&MARGINS, margin % MARGINS.len() + 4),
            },
        },
    }
}

impl ThemeDescriptor {
    /// `:root` custom properties consumed by the page stylesheet.
    pub fn to_css_variables(&self) -> String {
        format!(
            ":root {{\n  --primary-color: {};\n  --secondary-color: {};\n  --accent-color: {};\n  --background-color: {};\n  --text-color: {};\n  --font-family: {};\n  --border-radius: {};\n  --spacing: {};\n}}\n",
            self.primary,
            self.secondary,
            self.accent,
            self.background,
            self.text,
            self.font_family,
            self.border_radius,
            self.spacing,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn example_com_matches_published_theme() {
        let theme = derive_theme("example.com");
        assert_eq!(theme.primary.to_string(), "hsl(90, 76%, 69%)");
        assert_eq!(theme.secondary.to_string(), "hsl(210, 76%, 69%)");
        assert_eq!(theme.accent.to_string(), "hsl(330, 76%, 69%)");
        assert_eq!(theme.background.to_string(), "hsl(90, 15.200000000000001%, 95%)");
        assert_eq!(theme.text.to_string(), "hsl(90, 10%, 20%)");
        assert_eq!(theme.font_family, "Georgia, serif");
        assert_eq!(theme.spacing, "2rem");
        assert_eq!(theme.border_radius, "32px");
        assert_eq!(theme.container_width, "768px");

        let t = &theme.typography;
        assert_eq!(
            (t.h1.font_size, t.h1.margin_bottom, t.h1.font_weight, t.h1.letter_spacing),
            ("2.4rem", "1.5rem", "600", "0.25px")
        );
        assert_eq!(
            (t.h2.font_size, t.h2.margin_top, t.h2.margin_bottom, t.h2.font_weight),
            ("2.2rem", "1.5rem", "2rem", "700")
        );
        assert_eq!(
            (t.h3.font_size, t.h3.margin_top, t.h3.margin_bottom, t.h3.font_weight),
            ("2rem", "2.5rem", "3rem", "800")
        );
        assert_eq!(
            (t.paragraph.font_size, t.paragraph.line_height, t.paragraph.margin_bottom),
            ("1rem", "1.5", "1rem")
        );
    }

    #[test]
    fn empty_host_is_well_formed() {
        let theme = derive_theme("");
        assert_eq!(theme.primary.to_string(), "hsl(212, 59%, 60%)");
        assert_eq!(theme.secondary.to_string(), "hsl(332, 59%, 60%)");
        assert_eq!(theme.accent.to_string(), "hsl(92, 59%, 60%)");
        assert_eq!(theme.background.to_string(), "hsl(212, 11.8%, 95%)");
        assert_eq!(theme.font_family, "Helvetica, Arial, sans-serif");
        assert_eq!(theme.container_width, "1200px");
        assert_eq!(theme.typography.h1.font_size, "2.6rem");
        assert_eq!(theme.typography.paragraph.margin_bottom, "2.5rem");
        assert_eq!(theme.header_height, "60px");
        assert_eq!(theme.footer_height, "40px");
    }

    #[test]
    fn derived_hues_wrap_at_360() {
        let theme = derive_theme("blog1.example.com");
        assert_eq!(theme.primary.hue, 243);
        assert_eq!(theme.secondary.hue, 3);
        assert_eq!(theme.accent.hue, 123);
    }

    #[test]
    fn port_suffix_changes_the_theme() {
        let plain = derive_theme("example.com");
        let with_port = derive_theme("example.com:8080");
        assert_ne!(plain, with_port);
        assert_eq!(with_port.primary.to_string(), "hsl(199, 92%, 74%)");
        assert_eq!(with_port.border_radius, "4px");
    }

    #[test]
    fn repeated_calls_are_identical() {
        for host in ["", "a", "blog7.localhost:3000", "例え.jp"] {
            assert_eq!(derive_theme(host), derive_theme(host));
        }
    }

    #[test]
    fn distinct_hosts_get_distinct_themes() {
        let hosts: Vec<String> = (1..=50).map(|i| format!("blog{i}.example.com")).collect();
        let themes: Vec<ThemeDescriptor> = hosts.iter().map(|h| derive_theme(h)).collect();
        for (i, a) in themes.iter().enumerate() {
            for b in &themes[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn serializes_colors_as_css_strings() {
        let json = serde_json::to_value(derive_theme("example.com")).unwrap();
        assert_eq!(json["primary"], "hsl(90, 76%, 69%)");
        assert_eq!(json["fontFamily"], "Georgia, serif");
        assert_eq!(json["typography"]["h1"]["letterSpacing"], "0.25px");
        assert_eq!(json["typography"]["paragraph"]["lineHeight"], "1.5");
    }

    #[test]
    fn css_variables_cover_the_palette() {
        let css = derive_theme("example.com").to_css_variables();
        assert!(css.starts_with(":root {"));
        assert!(css.contains("--primary-color: hsl(90, 76%, 69%);"));
        assert!(css.contains("--font-family: Georgia, serif;"));
        assert!(css.contains("--spacing: 2rem;"));
    }
}
