//! Zone catalog: immutable per-zone configuration and boundaries

use std::collections::BTreeMap;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::Rect;
use crate::consts::HOME_ZONE;
use crate::sim::bounds::Fence;

/// Default distance from an edge at which a side boundary fires
pub const DEFAULT_TRIGGER_DISTANCE: f32 = 20.0;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ZoneId(String);

impl ZoneId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ZoneId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl std::fmt::Display for ZoneId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Which edge (or area) of a zone a boundary sits on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Left,
    Right,
    Top,
    Bottom,
    Area,
}

impl Side {
    /// Unit direction of travel when leaving through this side (y grows down)
    pub fn direction(&self) -> Vec2 {
        match self {
            Side::Left => Vec2::NEG_X,
            Side::Right => Vec2::X,
            Side::Top => Vec2::NEG_Y,
            Side::Bottom => Vec2::Y,
            Side::Area => Vec2::ZERO,
        }
    }
}

/// Trigger that moves the player into another zone
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Boundary {
    pub side: Side,
    pub target: ZoneId,
    /// Absolute arrival point, or the base point when `relative` is set
    pub exit: Vec2,
    pub trigger_distance: f32,
    /// Trigger rectangle for [`Side::Area`] boundaries
    pub area: Option<Rect>,
    /// Offset arrival from `exit` along the direction the player left in
    pub relative: bool,
    /// Distance from `exit` used by relative arrivals
    pub offset: f32,
}

impl Boundary {
    /// Boundary along one edge of the zone
    pub fn edge(side: Side, target: impl Into<ZoneId>, exit: Vec2) -> Self {
        Self {
            side,
            target: target.into(),
            exit,
            trigger_distance: DEFAULT_TRIGGER_DISTANCE,
            area: None,
            relative: false,
            offset: 0.0,
        }
    }

    /// Boundary that fires while the player stands inside `area`
    pub fn area(area: Rect, target: impl Into<ZoneId>, exit: Vec2) -> Self {
        Self {
            side: Side::Area,
            target: target.into(),
            exit,
            trigger_distance: 0.0,
            area: Some(area),
            relative: false,
            offset: 0.0,
        }
    }

    /// Arrive `offset` away from `exit`, in the direction the player left
    pub fn relative(mut self, offset: f32) -> Self {
        self.relative = true;
        self.offset = offset;
        self
    }

    pub fn with_trigger_distance(mut self, distance: f32) -> Self {
        self.trigger_distance = distance;
        self
    }

    /// Whether `pos` in a `width x height` zone satisfies this boundary
    pub fn is_triggered(&self, pos: Vec2, width: f32, height: f32) -> bool {
        match self.side {
            Side::Left => pos.x <= self.trigger_distance,
            Side::Right => width - pos.x <= self.trigger_distance,
            Side::Top => pos.y <= self.trigger_distance,
            Side::Bottom => height - pos.y <= self.trigger_distance,
            Side::Area => self.area.is_some_and(|a| a.contains(pos)),
        }
    }
}

/// Immutable description of a zone
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoneConfig {
    pub id: ZoneId,
    pub name: String,
    pub width: f32,
    pub height: f32,
    /// 0xRRGGBB
    pub background: u32,
    /// Intrinsic clock multiplier
    pub time_scale: f32,
    pub spawn: Vec2,
    pub fence: Fence,
    /// Checked in order; the first satisfied boundary fires
    pub boundaries: Vec<Boundary>,
}

impl ZoneConfig {
    pub fn new(id: impl Into<ZoneId>, name: impl Into<String>, width: f32, height: f32) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            width,
            height,
            background: 0x2b_3a_2f,
            time_scale: 1.0,
            spawn: Vec2::new(width / 2.0, height / 2.0),
            fence: Fence::Rect,
            boundaries: Vec::new(),
        }
    }

    pub fn with_spawn(mut self, spawn: Vec2) -> Self {
        self.spawn = spawn;
        self
    }

    pub fn with_fence(mut self, fence: Fence) -> Self {
        self.fence = fence;
        self
    }

    pub fn with_time_scale(mut self, scale: f32) -> Self {
        self.time_scale = scale;
        self
    }

    pub fn with_background(mut self, rgb: u32) -> Self {
        self.background = rgb;
        self
    }

    pub fn with_boundary(mut self, boundary: Boundary) -> Self {
        self.boundaries.push(boundary);
        self
    }

    /// First boundary satisfied by `pos`
    pub fn triggered_boundary(&self, pos: Vec2) -> Option<&Boundary> {
        self.boundaries
            .iter()
            .find(|b| b.is_triggered(pos, self.width, self.height))
    }
}

/// Static catalog of zones
#[derive(Debug, Clone)]
pub struct ZoneRegistry {
    zones: BTreeMap<ZoneId, ZoneConfig>,
    home: ZoneId,
}

impl Default for ZoneRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl ZoneRegistry {
    /// Empty registry with `home` as the distinguished home zone
    pub fn new(home: impl Into<ZoneId>) -> Self {
        Self {
            zones: BTreeMap::new(),
            home: home.into(),
        }
    }

    /// Register (or replace) a zone
    pub fn register(&mut self, config: ZoneConfig) {
        self.zones.insert(config.id.clone(), config);
    }

    pub fn get(&self, id: &ZoneId) -> Option<&ZoneConfig> {
        self.zones.get(id)
    }

    pub fn contains(&self, id: &ZoneId) -> bool {
        self.zones.contains_key(id)
    }

    pub fn home(&self) -> &ZoneId {
        &self.home
    }

    pub fn ids(&self) -> impl Iterator<Item = &ZoneId> {
        self.zones.keys()
    }

    pub fn len(&self) -> usize {
        self.zones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }

    /// The built-in world: a town hub with a riverside, a market and a park
    pub fn with_defaults() -> Self {
        let town_base = Vec2::new(800.0, 600.0);
        let park_center = Vec2::new(1000.0, 1000.0);

        let mut registry = Self::new(HOME_ZONE);
        registry.register(
            ZoneConfig::new(HOME_ZONE, "Town", 1600.0, 1200.0)
                .with_background(0x3a_3f_4a)
                .with_boundary(Boundary::edge(Side::Left, "riverside", Vec2::new(1100.0, 400.0)))
                .with_boundary(Boundary::edge(Side::Right, "market", Vec2::new(100.0, 400.0)))
                .with_boundary(Boundary::area(
                    Rect::new(1500.0, 1100.0, 80.0, 80.0),
                    "park",
                    Vec2::new(1000.0, 1800.0),
                )),
        );
        registry.register(
            ZoneConfig::new("riverside", "Riverside", 1200.0, 800.0)
                .with_background(0x2f_4f_6f)
                .with_boundary(Boundary::edge(Side::Right, HOME_ZONE, town_base).relative(400.0)),
        );
        registry.register(
            ZoneConfig::new("market", "Night Market", 1000.0, 800.0)
                .with_background(0x5a_2d_3c)
                .with_time_scale(1.2)
                .with_boundary(Boundary::edge(Side::Left, HOME_ZONE, town_base).relative(400.0)),
        );
        registry.register(
            ZoneConfig::new("park", "Ring Park", 2000.0, 2000.0)
                .with_background(0x2b_5a_2f)
                .with_time_scale(0.8)
                .with_spawn(park_center)
                .with_fence(Fence::Circle {
                    center: park_center,
                    radius: 950.0,
                })
                .with_boundary(Boundary::area(
                    Rect::new(960.0, 1880.0, 80.0, 80.0),
                    HOME_ZONE,
                    Vec2::new(1450.0, 1000.0),
                )),
        );
        registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edge_triggers_by_distance() {
        let b = Boundary::edge(Side::Right, "x", Vec2::ZERO);
        assert!(b.is_triggered(Vec2::new(785.0, 10.0), 800.0, 600.0));
        assert!(!b.is_triggered(Vec2::new(700.0, 10.0), 800.0, 600.0));

        let top = Boundary::edge(Side::Top, "x", Vec2::ZERO);
        assert!(top.is_triggered(Vec2::new(400.0, 20.0), 800.0, 600.0));
    }

    #[test]
    fn area_triggers_inside_rect_only() {
        let b = Boundary::area(Rect::new(10.0, 10.0, 20.0, 20.0), "x", Vec2::ZERO);
        assert!(b.is_triggered(Vec2::new(15.0, 15.0), 100.0, 100.0));
        assert!(!b.is_triggered(Vec2::new(5.0, 15.0), 100.0, 100.0));
    }

    #[test]
    fn first_matching_boundary_wins() {
        let zone = ZoneConfig::new("a", "A", 100.0, 100.0)
            .with_boundary(Boundary::edge(Side::Left, "first", Vec2::ZERO))
            .with_boundary(Boundary::edge(Side::Top, "second", Vec2::ZERO));
        let fired = zone.triggered_boundary(Vec2::new(5.0, 5.0)).unwrap();
        assert_eq!(fired.target, ZoneId::from("first"));
    }

    #[test]
    fn default_catalog_targets_are_registered() {
        let registry = ZoneRegistry::with_defaults();
        assert!(registry.contains(registry.home()));
        for id in registry.ids() {
            let zone = registry.get(id).unwrap();
            for boundary in &zone.boundaries {
                assert!(registry.contains(&boundary.target), "{} -> {}", id, boundary.target);
            }
            // Spawn points never sit on a boundary
            assert!(zone.triggered_boundary(zone.spawn).is_none(), "{id}");
        }
    }

    #[test]
    fn directions_follow_screen_axes() {
        assert_eq!(Side::Left.direction(), Vec2::new(-1.0, 0.0));
        assert_eq!(Side::Bottom.direction(), Vec2::new(0.0, 1.0));
        assert_eq!(Side::Area.direction(), Vec2::ZERO);
    }
}
