//! Font descriptor for measurement labels and text annotations.

/// Font configuration for label rendering.
///
/// Labels on the annotation surface are sized in surface pixels (not points)
/// so that they scale together with the image when the canvas is zoomed.
#[derive(Debug, Clone, PartialEq)]
pub struct FontDescriptor {
    /// Font family name (e.g., "Sans", "Monospace")
    pub family: String,

    /// Font weight (e.g., "normal", "bold" or numeric 100-900)
    pub weight: String,

    /// Font style (e.g., "normal", "italic", "oblique")
    pub style: String,

    /// Absolute size in surface pixels
    pub size_px: f64,
}

impl Default for FontDescriptor {
    /// Bold 14 px sans, the label font of the measurement overlay.
    fn default() -> Self {
        Self {
            family: "Sans".to_string(),
            weight: "bold".to_string(),
            style: "normal".to_string(),
            size_px: 14.0,
        }
    }
}

impl FontDescriptor {
    pub fn new(family: String, weight: String, style: String, size_px: f64) -> Self {
        Self {
            family,
            weight,
            style,
            size_px,
        }
    }

    /// Converts this descriptor to a Pango description string without a size.
    ///
    /// Format: "Family Style Weight", e.g. "Sans Bold" or "Monospace Italic".
    pub fn to_pango_string(&self) -> String {
        let mut parts = vec![self.family.clone()];

        if !self.style.eq_ignore_ascii_case("normal") {
            parts.push(capitalize_first(&self.style));
        }

        if !self.weight.eq_ignore_ascii_case("normal") {
            parts.push(capitalize_first(&self.weight));
        }

        parts.join(" ")
    }

    /// Builds the Pango description with the absolute pixel size applied.
    pub fn to_pango(&self) -> pango::FontDescription {
        let mut desc = pango::FontDescription::from_string(&self.to_pango_string());
        desc.set_absolute_size(self.size_px * pango::SCALE as f64);
        desc
    }
}

fn capitalize_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
    }
}
