//! Indexed triangle soups and the STL band-file reader.
//!
//! The upstream isovolume extraction writes one STL file per band, named by
//! band rank (`0.stl` is the lowest band). A zero-byte file, or one that
//! parses to zero facets, is the degenerate-band signal.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read, Seek, Write};
use std::path::Path;

use log::debug;

use crate::mesh_error::IsoGeomError;

/// Bit-exact hashable key for a coordinate. `-0.0` and `0.0` share a key.
pub(crate) fn coord_key(p: [f64; 3]) -> [u64; 3] {
    p.map(|c| if c == 0.0 { 0.0f64.to_bits() } else { c.to_bits() })
}

/// Indexed triangle soup: shared vertex coordinates plus vertex-index
/// triples. Orientation follows index order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TriangleSoup {
    pub vertices: Vec<[f64; 3]>,
    pub faces: Vec<[usize; 3]>,
}

impl TriangleSoup {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a soup from explicit triangles, welding exactly equal corners.
    pub fn from_triangles<I>(triangles: I) -> Self
    where
        I: IntoIterator<Item = [[f64; 3]; 3]>,
    {
        let mut soup = Self::default();
        let mut index: HashMap<[u64; 3], usize> = HashMap::new();
        for tri in triangles {
            let face = tri.map(|p| {
                *index.entry(coord_key(p)).or_insert_with(|| {
                    soup.vertices.push(p);
                    soup.vertices.len() - 1
                })
            });
            soup.faces.push(face);
        }
        soup
    }

    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }

    pub fn triangle_count(&self) -> usize {
        self.faces.len()
    }

    /// Corner coordinates of every face.
    pub fn triangles(&self) -> impl Iterator<Item = [[f64; 3]; 3]> + '_ {
        self.faces.iter().map(|f| f.map(|i| self.vertices[i]))
    }

    /// Writes the soup as binary STL (single precision, zero normals).
    pub fn write_stl<W: Write>(&self, mut writer: W) -> Result<(), IsoGeomError> {
        let triangles: Vec<stl_io::Triangle> = self
            .triangles()
            .map(|tri| stl_io::Triangle {
                normal: stl_io::Normal::new([0.0, 0.0, 0.0]),
                vertices: tri.map(|p| stl_io::Vertex::new(p.map(|c| c as f32))),
            })
            .collect();
        stl_io::write_stl(&mut writer, triangles.iter())?;
        Ok(())
    }
}

/// Reads band `band` from an STL stream (ASCII or binary).
pub fn read_stl_from<R: Read + Seek>(
    mut reader: R,
    band: usize,
) -> Result<TriangleSoup, IsoGeomError> {
    let stl = stl_io::read_stl(&mut reader).map_err(|e| IsoGeomError::MalformedMesh {
        band,
        details: e.to_string(),
    })?;
    debug!(
        "band {band}: STL holds {} vertices, {} triangles",
        stl.vertices.len(),
        stl.faces.len()
    );
    if stl.faces.is_empty() {
        return Err(IsoGeomError::EmptyMesh { band });
    }
    Ok(TriangleSoup {
        vertices: stl
            .vertices
            .iter()
            .map(|v| [v.0[0] as f64, v.0[1] as f64, v.0[2] as f64])
            .collect(),
        faces: stl.faces.iter().map(|f| f.vertices).collect(),
    })
}

/// Reads band `band` from the STL file at `path`.
pub fn read_stl(path: &Path, band: usize) -> Result<TriangleSoup, IsoGeomError> {
    let band_io = |source| IsoGeomError::BandIo {
        band,
        path: path.to_path_buf(),
        source,
    };
    let file = File::open(path).map_err(band_io)?;
    if file.metadata().map_err(band_io)?.len() == 0 {
        return Err(IsoGeomError::EmptyMesh { band });
    }
    read_stl_from(BufReader::new(file), band)
}
