//! Technology description: routing layers and placement sites.

use serde::{Deserialize, Serialize};

/// The preferred routing direction of a layer.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum RoutingDirection {
    /// Horizontal tracks.
    Horizontal,
    /// Vertical tracks.
    Vertical,
    /// No preferred direction (e.g. a cut layer).
    None,
}

/// The kind of mask layer.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum LayerType {
    /// A routing (metal) layer.
    Routing,
    /// A via/cut layer connecting two routing layers.
    Cut,
    /// The masterslice (diffusion/poly) layer cells sit on.
    Masterslice,
}

/// A single routing or masterslice layer's technology parameters.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LayerInfo {
    /// Layer name, e.g. `"metal2"`.
    pub name: String,
    /// Preferred routing direction.
    pub direction: RoutingDirection,
    /// Layer type.
    pub layer_type: LayerType,
    /// Track pitch in nanometers, `(x, y)`.
    pub pitch: (i64, i64),
    /// Track offset from the origin, in nanometers.
    pub offset: (i64, i64),
    /// Minimum drawn width, nanometers.
    pub min_width: i64,
    /// Maximum drawn width, nanometers.
    pub max_width: i64,
    /// Minimum spacing between shapes, nanometers.
    pub min_spacing: i64,
    /// Minimum shape area, square nanometers.
    pub min_area: i64,
    /// Sheet resistance, ohms per square.
    pub resistance: f64,
    /// Capacitance per unit area, farads per square micron.
    pub capacitance: f64,
}

/// Placement-site symmetry flags.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, Serialize, Deserialize)]
pub struct Symmetry {
    /// Symmetric under reflection across the X axis.
    pub x: bool,
    /// Symmetric under reflection across the Y axis.
    pub y: bool,
    /// Symmetric under 90-degree rotation.
    pub r90: bool,
}

/// The class of a placement site.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum SiteClass {
    /// A standard-cell core row site.
    Core,
    /// An I/O pad ring site.
    Pad,
}

/// A placement site description: the unit grid cells snap to.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SiteInfo {
    /// Site name.
    pub name: String,
    /// Site size in nanometers, `(width, height)`.
    pub size: (i64, i64),
    /// Supported symmetries.
    pub symmetry: Symmetry,
    /// Site class.
    pub class: SiteClass,
}

impl SiteInfo {
    /// Site width in nanometers.
    pub fn width(&self) -> i64 {
        self.size.0
    }

    /// Site height in nanometers.
    pub fn height(&self) -> i64 {
        self.size.1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn site_width_height() {
        let site = SiteInfo {
            name: "core_site".into(),
            size: (460, 2720),
            symmetry: Symmetry { x: true, y: false, r90: false },
            class: SiteClass::Core,
        };
        assert_eq!(site.width(), 460);
        assert_eq!(site.height(), 2720);
    }
}
