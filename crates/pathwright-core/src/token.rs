//! The moving piece: its footprint in grid units and its elevation layer.

/// Size and layer of the token a path is computed for.
///
/// `width` and `height` are measured in grid cells (1×1 is a medium
/// creature, 0.5×0.5 a tiny one). `layer` is the elevation layer the token
/// occupies; it only matters when vertical layering is in use.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Token {
    pub width: f64,
    pub height: f64,
    #[cfg_attr(feature = "serde", serde(default))]
    pub layer: u16,
}

impl Token {
    /// A token of the given size on layer 0.
    pub const fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            layer: 0,
        }
    }

    /// A 1×1 token.
    pub const fn medium() -> Self {
        Self::new(1.0, 1.0)
    }

    /// Same token on another elevation layer.
    pub const fn on_layer(self, layer: u16) -> Self {
        Self { layer, ..self }
    }

    /// Diameter of the token in grid units: the larger of its two sides.
    #[inline]
    pub fn footprint(&self) -> f64 {
        self.width.max(self.height)
    }

    /// Whether both sides are finite and strictly positive.
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }
}

impl Default for Token {
    fn default() -> Self {
        Self::medium()
    }
}
