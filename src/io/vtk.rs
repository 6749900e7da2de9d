//! Legacy VTK (`.vtk`) writer for geometry hierarchies.
//!
//! Output is an ASCII `UNSTRUCTURED_GRID`: every live vertex as a point,
//! every surface triangle as a VTK triangle (type 5) and every curve edge as
//! a VTK line (type 3). Per-cell tags go into `CELL_DATA` field arrays and
//! root tags into a dataset-level `FIELD` block.

use std::collections::HashMap;
use std::io::Write;

use crate::hierarchy::Hierarchy;
use crate::io::HierarchyWriter;
use crate::mesh::MeshStore;
use crate::mesh_error::{EntityKind, IsoGeomError};
use crate::topology::point::{EntityId, VertexId};

const VTK_LINE: i32 = 3;
const VTK_TRIANGLE: i32 = 5;

pub const FIELD_GEOM_DIMENSION: &str = "GEOM_DIMENSION";
pub const FIELD_GLOBAL_ID: &str = "GLOBAL_ID";
pub const FIELD_SENSE_FORWARD: &str = "SENSE_FORWARD";
pub const FIELD_SENSE_BACKWARD: &str = "SENSE_BACKWARD";

#[derive(Debug, Clone)]
pub struct VtkWriter {
    /// Name of the surface value array.
    pub data_name: String,
}

impl Default for VtkWriter {
    fn default() -> Self {
        Self::new("data")
    }
}

/// One output cell and the entity it belongs to.
struct Cell {
    vtk_type: i32,
    conn: Vec<VertexId>,
    dim: i32,
    owner: EntityId,
    value: f64,
}

impl VtkWriter {
    pub fn new(data_name: impl Into<String>) -> Self {
        Self {
            data_name: data_name.into(),
        }
    }

    fn write_field_array<W: Write>(
        writer: &mut W,
        name: &str,
        num_tuples: usize,
        data_type: &str,
        values: &[String],
    ) -> Result<(), IsoGeomError> {
        writeln!(writer, "{name} 1 {num_tuples} {data_type}")?;
        let mut line_len = 0usize;
        for value in values {
            if line_len + value.len() + 1 > 70 {
                writeln!(writer)?;
                line_len = 0;
            }
            if line_len > 0 {
                write!(writer, " ")?;
                line_len += 1;
            }
            write!(writer, "{value}")?;
            line_len += value.len();
        }
        writeln!(writer)?;
        Ok(())
    }

    fn collect_cells(store: &MeshStore, h: &Hierarchy) -> Result<Vec<Cell>, IsoGeomError> {
        let mut cells = Vec::new();
        for &s in &h.surfaces {
            let surface_value = h.value(s).unwrap_or(0.0);
            for &t in store.set(s)?.triangles() {
                cells.push(Cell {
                    vtk_type: VTK_TRIANGLE,
                    conn: store.connectivity(t)?.to_vec(),
                    dim: 2,
                    owner: s,
                    value: h.tags.triangle_value(t).unwrap_or(surface_value),
                });
            }
        }
        for &c in &h.curves {
            for e in store.set(c)?.edges() {
                cells.push(Cell {
                    vtk_type: VTK_LINE,
                    conn: e.to_vec(),
                    dim: 1,
                    owner: c,
                    value: 0.0,
                });
            }
        }
        Ok(cells)
    }
}

impl HierarchyWriter for VtkWriter {
    fn extension(&self) -> &'static str {
        "vtk"
    }

    fn write<W: Write>(
        &self,
        mut writer: W,
        store: &MeshStore,
        hierarchy: &Hierarchy,
    ) -> Result<(), IsoGeomError> {
        let cells = Self::collect_cells(store, hierarchy)?;

        writeln!(writer, "# vtk DataFile Version 3.0")?;
        writeln!(writer, "isogeom")?;
        writeln!(writer, "ASCII")?;
        writeln!(writer, "DATASET UNSTRUCTURED_GRID")?;

        if !hierarchy.root_tags.is_empty() {
            writeln!(writer, "FIELD FieldData {}", hierarchy.root_tags.len())?;
            for (name, value) in &hierarchy.root_tags {
                Self::write_field_array(&mut writer, name, 1, "double", &[value.to_string()])?;
            }
        }

        let mut point_index = HashMap::with_capacity(store.vertex_count());
        writeln!(writer, "POINTS {} double", store.vertex_count())?;
        for (idx, (v, p)) in store.vertices().enumerate() {
            point_index.insert(v, idx);
            writeln!(writer, "{} {} {}", p[0], p[1], p[2])?;
        }

        let total_size: usize = cells.iter().map(|c| c.conn.len() + 1).sum();
        writeln!(writer, "CELLS {} {}", cells.len(), total_size)?;
        for cell in &cells {
            write!(writer, "{}", cell.conn.len())?;
            for v in &cell.conn {
                let idx = point_index.get(v).ok_or(IsoGeomError::StaleReference {
                    kind: EntityKind::Vertex,
                    id: v.get(),
                })?;
                write!(writer, " {idx}")?;
            }
            writeln!(writer)?;
        }

        writeln!(writer, "CELL_TYPES {}", cells.len())?;
        for cell in &cells {
            writeln!(writer, "{}", cell.vtk_type)?;
        }

        if cells.is_empty() {
            return Ok(());
        }
        let gid = |e: EntityId| hierarchy.global_id(e).unwrap_or(0);
        let sense_gids = |e: EntityId| {
            hierarchy.sense(e).map_or([0, 0], |s| {
                [gid(s.forward), s.backward.map_or(0, gid)]
            })
        };

        let n = cells.len();
        writeln!(writer, "CELL_DATA {n}")?;
        writeln!(writer, "FIELD FieldData 5")?;
        let dims: Vec<String> = cells.iter().map(|c| c.dim.to_string()).collect();
        Self::write_field_array(&mut writer, FIELD_GEOM_DIMENSION, n, "int", &dims)?;
        let gids: Vec<String> = cells.iter().map(|c| gid(c.owner).to_string()).collect();
        Self::write_field_array(&mut writer, FIELD_GLOBAL_ID, n, "int", &gids)?;
        let values: Vec<String> = cells.iter().map(|c| c.value.to_string()).collect();
        Self::write_field_array(&mut writer, &self.data_name, n, "double", &values)?;
        let senses: Vec<[u32; 2]> = cells.iter().map(|c| sense_gids(c.owner)).collect();
        let fwd: Vec<String> = senses.iter().map(|s| s[0].to_string()).collect();
        Self::write_field_array(&mut writer, FIELD_SENSE_FORWARD, n, "int", &fwd)?;
        let bwd: Vec<String> = senses.iter().map(|s| s[1].to_string()).collect();
        Self::write_field_array(&mut writer, FIELD_SENSE_BACKWARD, n, "int", &bwd)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algs::imprint::ImprintOutcome;
    use crate::config::GeometryOpts;
    use crate::hierarchy::build_hierarchy;
    use crate::mesh::TriangleSoup;
    use crate::topology::point::TriangleId;
    use crate::topology::tags::Sense;
    use crate::topology::volume::{Band, Volume};

    fn one_surface() -> (MeshStore, Hierarchy) {
        let mut store = MeshStore::new();
        let soup = TriangleSoup::from_triangles([
            [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [1.0, 1.0, 0.0]],
            [[0.0, 0.0, 0.0], [1.0, 1.0, 0.0], [0.0, 1.0, 0.0]],
        ]);
        let fs = store.load_soup(0, &soup).unwrap();
        let tris: Vec<TriangleId> = store.set(fs).unwrap().triangles().iter().copied().collect();
        let verts = store.set(fs).unwrap().vertices().clone();
        let s = store.create_set();
        store.add_to_set(s, &tris, &verts).unwrap();
        let mut vol = Volume::new(fs, Band::new(0, None, None));
        vol.surfaces.push(s);
        let mut outcome = ImprintOutcome::default();
        outcome.tags.set_value(s, 2.5);
        outcome.tags.set_sense(s, Sense::unshared(fs));
        let mut opts = GeometryOpts::default();
        opts.root_tags.insert("E_BOUNDS".into(), 7.0);
        let h = build_hierarchy(&store, &[vol], &outcome, &opts).unwrap();
        (store, h)
    }

    #[test]
    fn writes_cells_and_tags() {
        let (store, h) = one_surface();
        let mut buf = Vec::new();
        VtkWriter::new("flux").write(&mut buf, &store, &h).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "# vtk DataFile Version 3.0");
        assert!(lines.contains(&"POINTS 4 double"));
        assert!(lines.contains(&"CELLS 2 8"));
        assert!(lines.contains(&"CELL_DATA 2"));
        let at = |name: &str| lines.iter().position(|l| l.starts_with(name)).unwrap();
        assert_eq!(lines[at("GEOM_DIMENSION") + 1], "2 2");
        assert_eq!(lines[at("flux") + 1], "2.5 2.5");
        assert_eq!(lines[at("SENSE_FORWARD") + 1], "1 1");
        assert_eq!(lines[at("SENSE_BACKWARD") + 1], "0 0");
        assert_eq!(lines[at("E_BOUNDS") + 1], "7");
    }

    #[test]
    fn long_arrays_wrap() {
        let mut buf = Vec::new();
        let values: Vec<String> = (0..100).map(|i| i.to_string()).collect();
        VtkWriter::write_field_array(&mut buf, "X", 100, "int", &values).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.lines().count() > 2);
        assert!(text.lines().all(|l| l.len() <= 70));
    }
}
