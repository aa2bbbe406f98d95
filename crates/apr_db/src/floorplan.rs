//! Floorplan: die outline, core margins, placement regions and rows.

use crate::ids::ObjectKey;
use crate::registry::Registry;
use apr_common::{Coord, Rect};

/// Margins reserved for I/O, in nanometers.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct IoMargins {
    /// Top margin.
    pub top: i64,
    /// Bottom margin.
    pub bottom: i64,
    /// Left margin.
    pub left: i64,
    /// Right margin.
    pub right: i64,
}

/// A single placement row within a [`Region`].
#[derive(Clone, Debug)]
pub struct Row {
    /// The row's extent.
    pub rect: Rect,
    /// Back-reference to the owning region.
    pub region: ObjectKey,
}

/// A named placement area within the floorplan.
#[derive(Clone, Debug)]
pub struct Region {
    /// Region name.
    pub name: String,
    /// Region extents.
    pub extents: Rect,
    /// Halo margin kept clear around the region's contents, nanometers.
    pub halo: i64,
    /// Name of the site this region's rows are built from.
    pub site_name: String,
    /// The region's rows, left-to-right bottom-to-top.
    pub rows: Vec<Row>,
}

/// Die outline, I/O margins, and the regions carved out of the core area.
pub struct Floorplan {
    die_size: (i64, i64),
    io_margins: IoMargins,
    core_rect_cache: Option<Rect>,
    regions: Registry<Region>,
}

impl Floorplan {
    /// Creates a floorplan with the given die size and I/O margins.
    pub fn new(die_size: (i64, i64), io_margins: IoMargins) -> Self {
        Self {
            die_size,
            io_margins,
            core_rect_cache: None,
            regions: Registry::new(),
        }
    }

    /// Die size in nanometers, `(width, height)`.
    pub fn die_size(&self) -> (i64, i64) {
        self.die_size
    }

    /// Sets the die size, invalidating the cached core rect.
    pub fn set_die_size(&mut self, die_size: (i64, i64)) {
        self.die_size = die_size;
        self.core_rect_cache = None;
    }

    /// The current I/O margins.
    pub fn io_margins(&self) -> IoMargins {
        self.io_margins
    }

    /// Sets the I/O margins, invalidating the cached core rect.
    pub fn set_io_margins(&mut self, io_margins: IoMargins) {
        self.io_margins = io_margins;
        self.core_rect_cache = None;
    }

    /// The core rectangle derived from die size and I/O margins, recomputed
    /// lazily and cached until the next mutation.
    pub fn core_rect(&mut self) -> Rect {
        if let Some(cached) = self.core_rect_cache {
            return cached;
        }
        let ll = Coord::new(self.io_margins.left, self.io_margins.bottom);
        let ur = Coord::new(
            (self.die_size.0 - self.io_margins.right).max(ll.x),
            (self.die_size.1 - self.io_margins.top).max(ll.y),
        );
        let rect = Rect::new(ll, ur);
        self.core_rect_cache = Some(rect);
        rect
    }

    /// Access to the regions container.
    pub fn regions(&self) -> &Registry<Region> {
        &self.regions
    }

    /// Mutable access to the regions container.
    pub fn regions_mut(&mut self) -> &mut Registry<Region> {
        &mut self.regions
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn core_rect_derivation() {
        let mut fp = Floorplan::new(
            (100_000, 80_000),
            IoMargins { top: 1000, bottom: 2000, left: 1500, right: 2500 },
        );
        let core = fp.core_rect();
        assert_eq!(core.ll, Coord::new(1500, 2000));
        assert_eq!(core.ur, Coord::new(97_500, 79_000));
    }

    #[test]
    fn core_rect_is_cached_until_mutation() {
        let mut fp = Floorplan::new((100_000, 100_000), IoMargins::default());
        let first = fp.core_rect();
        assert_eq!(first, Rect::new(Coord::ORIGIN, Coord::new(100_000, 100_000)));

        fp.set_die_size((200_000, 200_000));
        let second = fp.core_rect();
        assert_eq!(second, Rect::new(Coord::ORIGIN, Coord::new(200_000, 200_000)));
    }

    #[test]
    fn region_registry_round_trip() {
        let mut fp = Floorplan::new((10_000, 10_000), IoMargins::default());
        let key = fp
            .regions_mut()
            .add(
                "core",
                Region {
                    name: "core".into(),
                    extents: Rect::new(Coord::ORIGIN, Coord::new(10_000, 10_000)),
                    halo: 0,
                    site_name: "core_site".into(),
                    rows: Vec::new(),
                },
            )
            .unwrap();
        assert_eq!(fp.regions().get(key).unwrap().name, "core");
    }
}
