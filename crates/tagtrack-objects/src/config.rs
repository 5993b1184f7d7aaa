use std::collections::BTreeMap;

use nalgebra::{Point3, Rotation3, Vector3};
use serde::Deserialize;

use tagtrack_core::{TagId, Transform};

/// Highest identifier the tag design space supports.
const MAX_TAG_ID: TagId = 1023;

/// One marker entry as written in the configuration document.
#[derive(Debug, Deserialize)]
struct MarkerEntry {
    marker: TagId,
    size: f64,
    #[serde(default)]
    translation: [f64; 3],
    /// XYZ Euler angles, degrees.
    #[serde(default)]
    rotation: [f64; 3],
    #[serde(default)]
    keep: bool,
}

/// A marker binding with its precomputed corner geometry.
#[derive(Clone, Debug)]
pub struct MarkerConfig {
    pub id: TagId,
    /// Physical edge length of the printed marker.
    pub size: f64,
    /// Offset of the marker origin in the object frame.
    pub translation: Vector3<f64>,
    /// XYZ Euler rotation of the marker in the object frame, degrees
    /// (applied X, then Y, then Z).
    pub rotation: Vector3<f64>,
    /// Whether the marker's own pose should still be published alongside
    /// the fused object pose.
    pub keep: bool,
    /// The 4 corners in the object frame, precomputed at load time.
    pub corners: [Point3<f64>; 4],
    /// The 4 corners in the marker's own frame.
    pub local_corners: [Point3<f64>; 4],
}

impl MarkerConfig {
    fn from_entry(entry: &MarkerEntry) -> Self {
        let translation = Vector3::from(entry.translation);
        let rotation = Vector3::from(entry.rotation);
        let local_corners = default_tag_corners(entry.size);
        let transform = marker_transform(&translation, &rotation);
        let corners = local_corners
            .map(|corner| Point3::from((transform * corner.to_homogeneous()).xyz()));
        Self {
            id: entry.marker,
            size: entry.size,
            translation,
            rotation,
            keep: entry.keep,
            corners,
            local_corners,
        }
    }

    /// Rigid transform from the marker frame to the object frame.
    pub fn transform(&self) -> Transform {
        marker_transform(&self.translation, &self.rotation)
    }
}

/// A named rigid object and its ordered marker bindings.
#[derive(Clone, Debug)]
pub struct Object {
    pub name: String,
    pub markers: Vec<MarkerConfig>,
}

/// Errors reported while loading an object configuration.
#[derive(thiserror::Error, Debug)]
pub enum ObjectConfigError {
    #[error("malformed object configuration: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("marker {id} is bound to both '{first}' and '{second}'")]
    DuplicateMarker {
        id: TagId,
        first: String,
        second: String,
    },
    #[error("marker {id} in '{object}' is outside the tag design space (0..={MAX_TAG_ID})")]
    InvalidMarkerId { id: TagId, object: String },
}

/// Parsed, immutable object configuration with per-marker lookup.
#[derive(Clone, Debug, Default)]
pub struct ObjectConfig {
    objects: Vec<Object>,
    /// marker id -> (object index, marker index within the object)
    index: BTreeMap<TagId, (usize, usize)>,
}

impl ObjectConfig {
    /// Parses a configuration document.
    ///
    /// Empty or whitespace-only input is valid and yields zero objects:
    /// every marker is then its own unnamed object, a degradation handled
    /// by the caller.
    pub fn parse(text: &str) -> Result<Self, ObjectConfigError> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }

        let document: BTreeMap<String, Vec<MarkerEntry>> = serde_json::from_str(text)?;

        let mut objects: Vec<Object> = Vec::with_capacity(document.len());
        let mut index: BTreeMap<TagId, (usize, usize)> = BTreeMap::new();
        for (object_position, (name, entries)) in document.into_iter().enumerate() {
            let markers: Vec<MarkerConfig> =
                entries.iter().map(MarkerConfig::from_entry).collect();
            for (marker_position, marker) in markers.iter().enumerate() {
                if marker.id > MAX_TAG_ID {
                    return Err(ObjectConfigError::InvalidMarkerId {
                        id: marker.id,
                        object: name,
                    });
                }
                if let Some(&(previous, _)) = index.get(&marker.id) {
                    return Err(ObjectConfigError::DuplicateMarker {
                        id: marker.id,
                        first: objects[previous].name.clone(),
                        second: name,
                    });
                }
                index.insert(marker.id, (object_position, marker_position));
            }
            objects.push(Object { name, markers });
        }

        log::debug!(
            "loaded {} object(s), {} marker binding(s)",
            objects.len(),
            index.len()
        );
        Ok(Self { objects, index })
    }

    /// Read-only view of all parsed objects.
    pub fn objects(&self) -> &[Object] {
        &self.objects
    }

    /// The object a marker belongs to, if any.
    pub fn used_by(&self, marker_id: TagId) -> Option<&Object> {
        self.index
            .get(&marker_id)
            .map(|&(object, _)| &self.objects[object])
    }

    /// Precomputed geometry of a registered marker.
    ///
    /// # Panics
    ///
    /// Panics if `marker_id` was never registered; callers are expected to
    /// check [`used_by`](Self::used_by) first, so an unknown id here is a
    /// caller bug.
    pub fn marker(&self, marker_id: TagId) -> &MarkerConfig {
        let &(object, marker) = self
            .index
            .get(&marker_id)
            .unwrap_or_else(|| panic!("marker {marker_id} is not in the configuration"));
        &self.objects[object].markers[marker]
    }

    /// Number of registered marker bindings across all objects.
    pub fn marker_count(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

/// The 4 corners of a tag of edge length `size` in its own frame: the tag
/// lies in the z=0 plane with its first corner at the origin.
pub fn default_tag_corners(size: f64) -> [Point3<f64>; 4] {
    [
        Point3::new(0.0, 0.0, 0.0),
        Point3::new(size, 0.0, 0.0),
        Point3::new(size, size, 0.0),
        Point3::new(0.0, size, 0.0),
    ]
}

/// Rigid transform from marker frame to object frame: XYZ Euler rotation
/// (degrees, applied X, then Y, then Z) followed by a translation.
fn marker_transform(translation: &Vector3<f64>, rotation_deg: &Vector3<f64>) -> Transform {
    let radians = rotation_deg.map(f64::to_radians);
    let rotation = Rotation3::from_axis_angle(&Vector3::x_axis(), radians.x)
        * Rotation3::from_axis_angle(&Vector3::y_axis(), radians.y)
        * Rotation3::from_axis_angle(&Vector3::z_axis(), radians.z);

    let mut transform = Transform::identity();
    transform
        .fixed_view_mut::<3, 3>(0, 0)
        .copy_from(rotation.matrix());
    transform.fixed_view_mut::<3, 1>(0, 3).copy_from(translation);
    transform
}
