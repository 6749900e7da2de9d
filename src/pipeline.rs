//! Top-level driver for one geometry run.
//!
//! [`IsoGeometry`] owns the mesh store, the per-band volumes and, once
//! [`IsoGeometry::create_geometry`] has run, the finished hierarchy.
//!
//! ```no_run
//! use isogeom::prelude::*;
//!
//! let levels = Levels::new([1.0, 2.0])?;
//! let mut geom = IsoGeometry::load_dir("bands/", levels, GeometryOpts::default())?;
//! geom.create_geometry()?;
//! geom.write_geometry("geom.vtk")?;
//! # Ok::<(), isogeom::mesh_error::IsoGeomError>(())
//! ```

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use log::{info, warn};

use crate::algs::imprint::imprint_merge;
use crate::algs::separate::separate_components;
use crate::config::GeometryOpts;
use crate::hierarchy::{Hierarchy, build_hierarchy};
use crate::io::HierarchyWriter;
use crate::io::vtk::VtkWriter;
use crate::levels::Levels;
use crate::mesh::soup::read_stl;
use crate::mesh::{MeshStore, TriangleSoup};
use crate::mesh_error::{IsoGeomError, Warning};
use crate::topology::point::EntityId;
use crate::topology::volume::Volume;

#[derive(Debug)]
pub struct IsoGeometry {
    levels: Levels,
    opts: GeometryOpts,
    store: MeshStore,
    volumes: Vec<Volume>,
    hierarchy: Option<Hierarchy>,
    warnings: Vec<Warning>,
}

impl IsoGeometry {
    pub fn new(levels: Levels, opts: GeometryOpts) -> Result<Self, IsoGeomError> {
        opts.validate()?;
        Ok(Self {
            levels,
            opts,
            store: MeshStore::new(),
            volumes: Vec::new(),
            hierarchy: None,
            warnings: Vec::new(),
        })
    }

    /// Loads one in-memory mesh per band, lowest band first.
    pub fn from_soups<I>(levels: Levels, soups: I, opts: GeometryOpts) -> Result<Self, IsoGeomError>
    where
        I: IntoIterator<Item = TriangleSoup>,
    {
        let mut geom = Self::new(levels, opts)?;
        for soup in soups {
            geom.add_band(&soup)?;
        }
        Ok(geom)
    }

    /// Loads `<rank>.stl` band files from `dir`.
    ///
    /// Ranks must run contiguously from 0 and may not exceed the number of
    /// levels. Files with other names are ignored.
    pub fn load_dir(
        dir: impl AsRef<Path>,
        levels: Levels,
        opts: GeometryOpts,
    ) -> Result<Self, IsoGeomError> {
        let files = band_files(dir.as_ref())?;
        if files.len() > levels.band_count() {
            return Err(IsoGeomError::InvalidConfig(format!(
                "{} band files for {} levels",
                files.len(),
                levels.len()
            )));
        }
        let mut geom = Self::new(levels, opts)?;
        for (rank, path) in files.iter().enumerate() {
            info!("loading band {rank} from {}", path.display());
            let soup = read_stl(path, rank)?;
            geom.add_band(&soup)?;
        }
        Ok(geom)
    }

    /// Loads the next band and separates it into surface patches.
    ///
    /// # Errors
    /// [`IsoGeomError::EmptyMesh`] names the band when `soup` has no
    /// triangles; the geometry is left as it was.
    pub fn add_band(&mut self, soup: &TriangleSoup) -> Result<EntityId, IsoGeomError> {
        if self.hierarchy.is_some() {
            return Err(IsoGeomError::InvalidConfig(
                "geometry already created; no more bands can be added".into(),
            ));
        }
        let rank = self.volumes.len();
        let band = self.levels.band_bounds(rank).ok_or_else(|| {
            IsoGeomError::InvalidConfig(format!(
                "band {rank} exceeds the {} bands of the level schedule",
                self.levels.band_count()
            ))
        })?;
        let file_set = self.store.load_soup(rank, soup)?;
        let mut volume = Volume::new(file_set, band);
        volume.surfaces = separate_components(&mut self.store, file_set, rank)?;
        self.volumes.push(volume);
        Ok(file_set)
    }

    /// Imprints adjacent bands and builds the hierarchy. Later calls return
    /// the hierarchy built by the first one.
    pub fn create_geometry(&mut self) -> Result<&Hierarchy, IsoGeomError> {
        if self.hierarchy.is_none() {
            if self.volumes.is_empty() {
                return Err(IsoGeomError::EmptyHierarchy);
            }
            let outcome =
                imprint_merge(&mut self.store, &mut self.volumes, &self.opts.imprint_opts())?;
            let hierarchy = build_hierarchy(&self.store, &self.volumes, &outcome, &self.opts)?;
            self.warnings = outcome.warnings;
            self.hierarchy = Some(hierarchy);
        }
        self.hierarchy.as_ref().ok_or(IsoGeomError::EmptyHierarchy)
    }

    pub fn hierarchy(&self) -> Option<&Hierarchy> {
        self.hierarchy.as_ref()
    }

    pub fn store(&self) -> &MeshStore {
        &self.store
    }

    pub fn volumes(&self) -> &[Volume] {
        &self.volumes
    }

    pub fn levels(&self) -> &Levels {
        &self.levels
    }

    pub fn opts(&self) -> &GeometryOpts {
        &self.opts
    }

    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    /// Serializes the hierarchy with `writer`.
    pub fn write_with<H, W>(&self, writer: &H, out: W) -> Result<(), IsoGeomError>
    where
        H: HierarchyWriter,
        W: Write,
    {
        let hierarchy = self.hierarchy.as_ref().ok_or_else(|| {
            IsoGeomError::InvalidConfig("create_geometry must run before writing".into())
        })?;
        writer.write(out, &self.store, hierarchy)
    }

    /// Writes the geometry to `path` and returns the path actually written.
    /// An extension other than `.vtk` is replaced.
    pub fn write_geometry(&self, path: impl AsRef<Path>) -> Result<PathBuf, IsoGeomError> {
        let writer = VtkWriter::new(self.opts.data_name.clone());
        let mut path = path.as_ref().to_path_buf();
        let ext_ok = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case(writer.extension()));
        if !ext_ok {
            warn!(
                "unrecognised extension on {}; writing .{} instead",
                path.display(),
                writer.extension()
            );
            path.set_extension(writer.extension());
        }
        let mut out = BufWriter::new(File::create(&path)?);
        self.write_with(&writer, &mut out)?;
        out.flush()?;
        info!("geometry written to {}", path.display());
        Ok(path)
    }
}

/// `<rank>.stl` files of `dir`, ordered by rank.
fn band_files(dir: &Path) -> Result<Vec<PathBuf>, IsoGeomError> {
    let mut ranked = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        let is_stl = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("stl"));
        let rank = path
            .file_stem()
            .and_then(|s| s.to_str())
            .and_then(|s| s.parse::<usize>().ok());
        if let (true, Some(rank)) = (is_stl, rank) {
            ranked.push((rank, path));
        }
    }
    ranked.sort();
    for (expected, (rank, _)) in ranked.iter().enumerate() {
        if *rank != expected {
            return Err(IsoGeomError::MissingBand { band: expected });
        }
    }
    if ranked.is_empty() {
        return Err(IsoGeomError::MissingBand { band: 0 });
    }
    Ok(ranked.into_iter().map(|(_, p)| p).collect())
}
