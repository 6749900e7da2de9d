//! IsoGeomError: unified error type for isogeom public APIs
//!
//! Every fallible operation in the crate returns `Result<_, IsoGeomError>`.
//! Anomalies that the pipeline recovers from locally are not errors; they are
//! reported as [`Warning`] values on the finished run.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

use crate::topology::point::EntityId;

/// Kind of arena entity named by a [`IsoGeomError::StaleReference`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Vertex,
    Triangle,
    Set,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            EntityKind::Vertex => "vertex",
            EntityKind::Triangle => "triangle",
            EntityKind::Set => "mesh set",
        })
    }
}

/// Unified error type for isogeom operations.
#[derive(Debug, Error)]
pub enum IsoGeomError {
    /// Attempted to construct a handle with a zero value (invalid).
    #[error("entity handles must be non-zero (0 is reserved as the none sentinel)")]
    InvalidEntityId,
    /// A band file parsed but holds no triangles. The extraction stage is
    /// expected to widen the band and retry.
    #[error("band {band}: mesh contains no triangles")]
    EmptyMesh { band: usize },
    /// A band file could not be turned into a valid triangle mesh.
    #[error("band {band}: malformed mesh: {details}")]
    MalformedMesh { band: usize, details: String },
    /// A band file could not be opened or read.
    #[error("band {band}: cannot read {}: {source}", path.display())]
    BandIo {
        band: usize,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// A removed vertex, triangle or set was read.
    #[error("stale reference: {kind} {id} is no longer in the mesh store")]
    StaleReference { kind: EntityKind, id: u64 },
    /// Fatal error raised while working on one patch of one band.
    #[error("band {band}, patch {patch}: {source}")]
    InPatch {
        band: usize,
        patch: EntityId,
        #[source]
        source: Box<IsoGeomError>,
    },
    /// Band ranks on disk are not contiguous from 0.
    #[error("band {band} has no mesh file")]
    MissingBand { band: usize },
    #[error("invalid level schedule: {0}")]
    InvalidLevels(String),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    /// The hierarchy builder was handed zero volumes.
    #[error("cannot build a geometry hierarchy with no volumes")]
    EmptyHierarchy,
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl IsoGeomError {
    /// Attach the band and patch being processed. Errors that already carry
    /// context, or that name their own band, are returned unchanged.
    pub fn in_patch(self, band: usize, patch: EntityId) -> Self {
        match self {
            e @ (IsoGeomError::InPatch { .. }
            | IsoGeomError::EmptyMesh { .. }
            | IsoGeomError::MalformedMesh { .. }
            | IsoGeomError::BandIo { .. }) => e,
            e => IsoGeomError::InPatch {
                band,
                patch,
                source: Box::new(e),
            },
        }
    }

    /// True for the degenerate-band signal the caller may recover from.
    pub fn is_empty_mesh(&self) -> bool {
        matches!(self, IsoGeomError::EmptyMesh { .. })
    }
}

/// Recoverable anomaly recorded during a run.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub enum Warning {
    /// Adjacent bands produced a shared surface but have no bound in common;
    /// the surface value fell back to 0.
    UnmatchedBounds {
        lower_band: usize,
        upper_band: usize,
        surface: EntityId,
    },
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::UnmatchedBounds {
                lower_band,
                upper_band,
                surface,
            } => write!(
                f,
                "bands {lower_band} and {upper_band} share surface {surface} \
                 but no bound value; tagged 0"
            ),
        }
    }
}
