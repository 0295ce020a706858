use std::time::{Duration, Instant};
use tracing::debug;

use crate::data::{GeoPoint, Organization};
use crate::selection::{is_selected, Selection};

/// Center between Odesa, Mykolaiv and Kherson. Used whenever a computed
/// center turns out to be unusable.
pub const REGION_CENTROID: GeoPoint = GeoPoint::new(46.9750, 31.9946);

/// Zoom showing all three cities
pub const OVERVIEW_ZOOM: f64 = 8.0;

/// Street-level zoom used when an organization is focused
pub const FOCUS_ZOOM: f64 = 13.0;

/// Number of 256px tiles that fit across the map panel
const TILES_ACROSS: f64 = 4.0;

/// Externally supplied view parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapDefaults {
    pub center: GeoPoint,
    pub zoom: f64,
    pub focus_zoom: f64,
}

impl Default for MapDefaults {
    fn default() -> Self {
        Self {
            center: REGION_CENTROID,
            zoom: OVERVIEW_ZOOM,
            focus_zoom: FOCUS_ZOOM,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub center: GeoPoint,
    pub zoom: f64,
}

/// What the camera is aimed at
#[derive(Debug, Clone, PartialEq)]
pub enum Focus {
    /// The selected organization, found in the collection with usable coordinates
    Organization(String),
    /// No resolvable selection: default center and zoom
    Overview,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CameraTarget {
    pub focus: Focus,
    pub camera: Camera,
}

/// One map marker
#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    pub id: String,
    pub position: GeoPoint,
    pub selected: bool,
}

/// Markers for every organization with usable coordinates. Records without
/// them are skipped here and nowhere else.
pub fn markers(organizations: &[&Organization], selection: Option<&str>) -> Vec<Marker> {
    organizations
        .iter()
        .filter_map(|org| {
            org.location().map(|position| Marker {
                id: org.id.clone(),
                position,
                selected: is_selected(&org.id, selection),
            })
        })
        .collect()
}

/// Where the camera should go for this collection and selection
pub fn compute_target(
    organizations: &[&Organization],
    selection: Option<&str>,
    defaults: &MapDefaults,
) -> CameraTarget {
    let focused = selection.and_then(|id| {
        organizations
            .iter()
            .find(|org| org.id == id)
            .and_then(|org| org.location().map(|loc| (org.id.clone(), loc)))
    });

    let target = match focused {
        Some((id, center)) => CameraTarget {
            focus: Focus::Organization(id),
            camera: Camera {
                center,
                zoom: defaults.focus_zoom,
            },
        },
        None => CameraTarget {
            focus: Focus::Overview,
            camera: Camera {
                center: defaults.center,
                zoom: defaults.zoom,
            },
        },
    };

    sanitize(target)
}

/// Never let an invalid center or zoom reach the renderer
fn sanitize(mut target: CameraTarget) -> CameraTarget {
    if !target.camera.center.is_valid() {
        debug!(target: "map", "Invalid target center, using region centroid");
        target.camera.center = REGION_CENTROID;
    }
    if !target.camera.zoom.is_finite() {
        target.camera.zoom = match target.focus {
            Focus::Organization(_) => FOCUS_ZOOM,
            Focus::Overview => OVERVIEW_ZOOM,
        };
    }
    target
}

/// An animated pan/zoom between two cameras
#[derive(Debug, Clone)]
pub struct Transition {
    from: Camera,
    to: Camera,
    started: Instant,
    duration: Duration,
}

impl Transition {
    pub fn camera_at(&self, now: Instant) -> Camera {
        let progress = self.progress(now);
        if progress >= 1.0 {
            return self.to;
        }
        let t = ease_in_out(progress);
        Camera {
            center: GeoPoint::new(
                lerp(self.from.center.lat, self.to.center.lat, t),
                lerp(self.from.center.lng, self.to.center.lng, t),
            ),
            zoom: lerp(self.from.zoom, self.to.zoom, t),
        }
    }

    pub fn is_finished(&self, now: Instant) -> bool {
        self.progress(now) >= 1.0
    }

    pub fn target(&self) -> Camera {
        self.to
    }

    fn progress(&self, now: Instant) -> f64 {
        if self.duration.is_zero() {
            return 1.0;
        }
        let elapsed = now.saturating_duration_since(self.started);
        (elapsed.as_secs_f64() / self.duration.as_secs_f64()).min(1.0)
    }
}

fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

fn ease_in_out(t: f64) -> f64 {
    if t < 0.5 {
        2.0 * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
    }
}

/// Inputs whose change triggers a new camera transition
#[derive(Debug, Clone, PartialEq)]
struct SyncKey {
    selection: Option<String>,
    ids: Vec<String>,
    defaults: MapDefaults,
}

/// Map projection of the filtered collection plus the animated camera
#[derive(Debug, Clone)]
pub struct MapAdapter {
    defaults: MapDefaults,
    fly_duration: Duration,
    camera: Camera,
    target: CameraTarget,
    transition: Option<Transition>,
    last_sync: Option<SyncKey>,
    transitions_issued: u64,
}

impl MapAdapter {
    pub fn new(defaults: MapDefaults, fly_duration: Duration) -> Self {
        let target = sanitize(CameraTarget {
            focus: Focus::Overview,
            camera: Camera {
                center: defaults.center,
                zoom: defaults.zoom,
            },
        });
        Self {
            defaults,
            fly_duration,
            camera: target.camera,
            target,
            transition: None,
            last_sync: None,
            transitions_issued: 0,
        }
    }

    pub fn defaults(&self) -> &MapDefaults {
        &self.defaults
    }

    pub fn set_defaults(&mut self, defaults: MapDefaults) {
        self.defaults = defaults;
    }

    pub fn sync(&mut self, organizations: &[&Organization], selection: &Selection) -> bool {
        self.sync_at(organizations, selection, Instant::now())
    }

    /// Recompute the target when the selection, the collection or the
    /// defaults changed, and start a transition towards it. A transition
    /// already running is replaced, starting from wherever it had got to.
    /// Returns true when a transition was issued.
    pub fn sync_at(&mut self, organizations: &[&Organization], selection: &Selection, now: Instant) -> bool {
        let key = SyncKey {
            selection: selection.selected_id().map(str::to_string),
            ids: organizations.iter().map(|org| org.id.clone()).collect(),
            defaults: self.defaults,
        };
        if self.last_sync.as_ref() == Some(&key) {
            return false;
        }

        let target = compute_target(organizations, selection.selected_id(), &self.defaults);
        let from = self.camera_at(now);
        debug!(
            target: "map",
            "Flying to {:?} at ({:.4}, {:.4}) zoom {}",
            target.focus, target.camera.center.lat, target.camera.center.lng, target.camera.zoom
        );

        self.transition = Some(Transition {
            from,
            to: target.camera,
            started: now,
            duration: self.fly_duration,
        });
        self.camera = from;
        self.target = target;
        self.last_sync = Some(key);
        self.transitions_issued += 1;
        true
    }

    /// Advance the animation and return the camera to draw
    pub fn tick_at(&mut self, now: Instant) -> Camera {
        self.camera = self.camera_at(now);
        if self
            .transition
            .as_ref()
            .map(|t| t.is_finished(now))
            .unwrap_or(false)
        {
            self.transition = None;
        }
        self.camera
    }

    pub fn tick(&mut self) -> Camera {
        self.tick_at(Instant::now())
    }

    fn camera_at(&self, now: Instant) -> Camera {
        match &self.transition {
            Some(transition) => transition.camera_at(now),
            None => self.camera,
        }
    }

    pub fn camera(&self) -> Camera {
        self.camera
    }

    pub fn target(&self) -> &CameraTarget {
        &self.target
    }

    pub fn is_animating(&self) -> bool {
        self.transition.is_some()
    }

    pub fn transitions_issued(&self) -> u64 {
        self.transitions_issued
    }

    /// Select the organization behind marker `id`. Organizations that are
    /// not drawn on the map cannot be clicked.
    pub fn click_marker(&self, organizations: &[&Organization], id: &str, selection: &mut Selection) -> bool {
        let clickable = organizations
            .iter()
            .any(|org| org.id == id && org.is_mappable());
        if clickable {
            selection.select(id);
        }
        clickable
    }
}

/// Geographic window shown in a panel of `width` x `height` terminal cells
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub camera: Camera,
    pub width: u16,
    pub height: u16,
}

impl Viewport {
    pub fn new(camera: Camera, width: u16, height: u16) -> Self {
        Self {
            camera,
            width: width.max(1),
            height: height.max(1),
        }
    }

    pub fn lng_span(&self) -> f64 {
        360.0 / 2f64.powf(self.camera.zoom) * TILES_ACROSS
    }

    /// Terminal cells are about twice as tall as wide
    pub fn lat_span(&self) -> f64 {
        let aspect = (self.height as f64 * 2.0) / self.width as f64;
        self.lng_span() * aspect * self.camera.center.lat.to_radians().cos()
    }

    /// ([west, east], [south, north])
    pub fn bounds(&self) -> ([f64; 2], [f64; 2]) {
        let half_lng = self.lng_span() / 2.0;
        let half_lat = self.lat_span() / 2.0;
        let c = self.camera.center;
        (
            [c.lng - half_lng, c.lng + half_lng],
            [c.lat - half_lat, c.lat + half_lat],
        )
    }

    /// Cell (column, row) of `point`, relative to the panel origin
    pub fn project(&self, point: GeoPoint) -> Option<(f64, f64)> {
        let ([west, east], [south, north]) = self.bounds();
        if point.lng < west || point.lng > east || point.lat < south || point.lat > north {
            return None;
        }
        let x = (point.lng - west) / (east - west) * self.width as f64;
        let y = (north - point.lat) / (north - south) * self.height as f64;
        Some((x, y))
    }

    /// Marker closest to a clicked cell, within `radius` cells
    pub fn marker_at<'a>(&self, markers: &'a [Marker], column: u16, row: u16, radius: f64) -> Option<&'a Marker> {
        let click_x = column as f64 + 0.5;
        let click_y = row as f64 + 0.5;
        markers
            .iter()
            .filter_map(|marker| {
                self.project(marker.position).map(|(x, y)| {
                    let dx = x - click_x;
                    let dy = (y - click_y) * 2.0;
                    (marker, (dx * dx + dy * dy).sqrt())
                })
            })
            .filter(|(_, dist)| *dist <= radius)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(marker, _)| marker)
    }
}
