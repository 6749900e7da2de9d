//! Run configuration for geometry construction.

use std::collections::BTreeMap;
use std::io::Read;

use serde::{Deserialize, Serialize};

use crate::algs::imprint::ImprintOpts;
use crate::mesh_error::IsoGeomError;

/// Options for building a geometry from band meshes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GeometryOpts {
    /// Absolute per-axis tolerance for coincident vertices.
    pub merge_tol: f64,
    /// Every surface value is multiplied by this factor.
    pub norm: f64,
    /// Copy each surface's value onto its triangles.
    pub tag_triangles: bool,
    /// Name of the value tag in written output.
    pub data_name: String,
    /// Scalars attached to the root of the hierarchy.
    pub root_tags: BTreeMap<String, f64>,
}

impl Default for GeometryOpts {
    fn default() -> Self {
        Self {
            merge_tol: 1e-5,
            norm: 1.0,
            tag_triangles: false,
            data_name: "data".to_owned(),
            root_tags: BTreeMap::new(),
        }
    }
}

impl GeometryOpts {
    /// Reads options from JSON; missing fields keep their defaults.
    pub fn from_json_reader<R: Read>(reader: R) -> Result<Self, IsoGeomError> {
        let opts: Self = serde_json::from_reader(reader)
            .map_err(|e| IsoGeomError::InvalidConfig(e.to_string()))?;
        opts.validate()?;
        Ok(opts)
    }

    pub fn validate(&self) -> Result<(), IsoGeomError> {
        if !(self.merge_tol.is_finite() && self.merge_tol > 0.0) {
            return Err(IsoGeomError::InvalidConfig(format!(
                "merge_tol must be finite and positive, got {}",
                self.merge_tol
            )));
        }
        if !self.norm.is_finite() {
            return Err(IsoGeomError::InvalidConfig(format!(
                "norm must be finite, got {}",
                self.norm
            )));
        }
        if self.data_name.trim().is_empty() || self.data_name.contains(char::is_whitespace) {
            return Err(IsoGeomError::InvalidConfig(format!(
                "data_name {:?} must be a non-empty word",
                self.data_name
            )));
        }
        if let Some((name, v)) = self.root_tags.iter().find(|(_, v)| !v.is_finite()) {
            return Err(IsoGeomError::InvalidConfig(format!(
                "root tag {name} is not finite: {v}"
            )));
        }
        Ok(())
    }

    pub fn imprint_opts(&self) -> ImprintOpts {
        ImprintOpts {
            merge_tol: self.merge_tol,
            norm: self.norm,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let o = GeometryOpts::default();
        assert_eq!(o.merge_tol, 1e-5);
        assert_eq!(o.norm, 1.0);
        assert!(!o.tag_triangles);
        assert_eq!(o.data_name, "data");
        assert!(o.validate().is_ok());
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let json = r#"{ "norm": 2.5, "root_tags": { "E_MAX": 14.1 } }"#;
        let o = GeometryOpts::from_json_reader(json.as_bytes()).unwrap();
        assert_eq!(o.norm, 2.5);
        assert_eq!(o.merge_tol, 1e-5);
        assert_eq!(o.root_tags["E_MAX"], 14.1);
    }

    #[test]
    fn rejects_bad_values() {
        let bad_tol = GeometryOpts {
            merge_tol: 0.0,
            ..Default::default()
        };
        assert!(matches!(bad_tol.validate(), Err(IsoGeomError::InvalidConfig(_))));
        let bad_name = GeometryOpts {
            data_name: "two words".into(),
            ..Default::default()
        };
        assert!(bad_name.validate().is_err());
        assert!(GeometryOpts::from_json_reader(r#"{ "tolerance": 1 }"#.as_bytes()).is_err());
    }
}
