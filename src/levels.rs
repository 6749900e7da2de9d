//! Level schedule: the sorted isovalues separating adjacent bands.
//!
//! `n` levels define `n + 1` bands. Band 0 lies below the first level and
//! band `n` above the last; both have one open end.

use std::io::BufRead;

use crate::mesh_error::IsoGeomError;
use crate::topology::volume::Band;

/// How [`Levels::generate`] spaces its values.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LevelMode {
    /// `count` evenly spaced values, both ends included.
    Linear { count: usize },
    /// `count` values evenly spaced in log10, both ends included.
    Log { count: usize },
    /// `min`, `min * ratio`, `min * ratio^2`, ... while `<= max`.
    Ratio { ratio: f64 },
}

/// Strictly increasing, finite isovalues.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct Levels {
    values: Vec<f64>,
}

impl Levels {
    /// Sorts `values` ascending.
    ///
    /// # Errors
    /// [`IsoGeomError::InvalidLevels`] if `values` is empty, holds a
    /// non-finite value or a duplicate.
    pub fn new(values: impl IntoIterator<Item = f64>) -> Result<Self, IsoGeomError> {
        let mut values: Vec<f64> = values.into_iter().collect();
        if values.is_empty() {
            return Err(IsoGeomError::InvalidLevels("no levels given".into()));
        }
        if let Some(bad) = values.iter().find(|v| !v.is_finite()) {
            return Err(IsoGeomError::InvalidLevels(format!(
                "level {bad} is not finite"
            )));
        }
        values.sort_by(f64::total_cmp);
        if let Some(w) = values.windows(2).find(|w| w[0] == w[1]) {
            return Err(IsoGeomError::InvalidLevels(format!(
                "level {} appears twice",
                w[0]
            )));
        }
        Ok(Self { values })
    }

    /// Reads one level per line; blank lines are skipped.
    pub fn read<R: BufRead>(reader: R) -> Result<Self, IsoGeomError> {
        let mut values = Vec::new();
        for (lineno, line) in reader.lines().enumerate() {
            let line = line?;
            let text = line.trim();
            if text.is_empty() {
                continue;
            }
            let v = text.parse::<f64>().map_err(|e| {
                IsoGeomError::InvalidLevels(format!("line {}: {text:?}: {e}", lineno + 1))
            })?;
            values.push(v);
        }
        Self::new(values)
    }

    /// Generates levels between `min` and `max`.
    pub fn generate(mode: LevelMode, min: f64, max: f64) -> Result<Self, IsoGeomError> {
        if !(min.is_finite() && max.is_finite()) || min > max {
            return Err(IsoGeomError::InvalidLevels(format!(
                "bad range [{min}, {max}]"
            )));
        }
        let values = match mode {
            LevelMode::Linear { count } => spaced(count, min, max)?,
            LevelMode::Log { count } => {
                if min <= 0.0 {
                    return Err(IsoGeomError::InvalidLevels(
                        "log spacing needs a positive minimum".into(),
                    ));
                }
                spaced(count, min.log10(), max.log10())?
                    .into_iter()
                    .map(|e| 10f64.powf(e))
                    .collect()
            }
            LevelMode::Ratio { ratio } => {
                if !(ratio.is_finite() && ratio > 1.0) || min <= 0.0 {
                    return Err(IsoGeomError::InvalidLevels(format!(
                        "ratio spacing needs ratio > 1 and a positive minimum, got ratio {ratio}"
                    )));
                }
                let mut values = vec![min];
                let mut next = min * ratio;
                while next <= max {
                    values.push(next);
                    next *= ratio;
                }
                values
            }
        };
        Self::new(values)
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn band_count(&self) -> usize {
        self.values.len() + 1
    }

    /// Bounds of band `rank`, or `None` past the last band.
    pub fn band_bounds(&self, rank: usize) -> Option<Band> {
        if rank > self.values.len() {
            return None;
        }
        let lower = rank.checked_sub(1).map(|i| self.values[i]);
        let upper = self.values.get(rank).copied();
        Some(Band::new(rank, lower, upper))
    }

    /// All bands in rank order.
    pub fn bands(&self) -> impl Iterator<Item = Band> + '_ {
        (0..self.band_count()).filter_map(|r| self.band_bounds(r))
    }

    /// Drops `value`, merging the two bands it separated. Returns whether it
    /// was present. The last level is never removed.
    pub fn remove(&mut self, value: f64) -> bool {
        if self.values.len() == 1 {
            return false;
        }
        match self.values.iter().position(|&v| v == value) {
            Some(i) => {
                self.values.remove(i);
                true
            }
            None => false,
        }
    }
}

fn spaced(count: usize, start: f64, stop: f64) -> Result<Vec<f64>, IsoGeomError> {
    match count {
        0 => Err(IsoGeomError::InvalidLevels("level count must be at least 1".into())),
        1 => Ok(vec![start]),
        n => {
            let step = (stop - start) / (n - 1) as f64;
            Ok((0..n)
                .map(|i| if i == n - 1 { stop } else { start + step * i as f64 })
                .collect())
        }
    }
}
