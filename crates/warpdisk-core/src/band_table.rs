// ─────────────────────────────────────────────────────────────────────
// SCPN Warp Disk — Band Fraction Table
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Tabulated blackbody band fraction against log10 temperature, and a
//! keyed read-through cache that builds each table at most once.
//!
//! Tables persist as `.npz` archives holding `band` (`[low, high]` keV),
//! `log_t` and `fraction`.

use std::collections::HashMap;
use std::fs::{self, File};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use ndarray::{Array1, Ix1, OwnedRepr};
use ndarray_npy::{NpzReader, NpzWriter};
use warpdisk_math::interp::interp_uniform;
use warpdisk_types::config::SpectralConfig;
use warpdisk_types::constants::{TABLE_T_MAX_K, TABLE_T_MIN_K};
use warpdisk_types::error::{DiskError, DiskResult};

use crate::blackbody::{band_fraction_exact, Band, EnergyGrid};

/// Relative tolerance on the spacing of a loaded temperature grid.
const GRID_TOLERANCE: f64 = 1e-9;

#[derive(Debug, Clone)]
pub struct BandFractionTable {
    band: Band,
    log_t: Array1<f64>,
    fraction: Array1<f64>,
    dlog_t: f64,
}

impl BandFractionTable {
    /// Integrate the band fraction at `n_points` temperatures spaced
    /// uniformly in log10 T over the table range.
    pub fn build(band: Band, n_points: usize, energy: &EnergyGrid) -> DiskResult<Self> {
        if n_points < 2 {
            return Err(DiskError::ConfigError(format!(
                "band table needs at least 2 temperatures, got {n_points}"
            )));
        }
        let log_t = Array1::linspace(TABLE_T_MIN_K.log10(), TABLE_T_MAX_K.log10(), n_points);
        // Serial: this runs under the cache lock, possibly on a rayon worker.
        let fraction =
            log_t.mapv(|lt| band_fraction_exact(10f64.powf(lt), energy, band).unwrap_or(0.0));
        BandFractionTable::from_parts(band, log_t, fraction)
    }

    pub fn from_parts(band: Band, log_t: Array1<f64>, fraction: Array1<f64>) -> DiskResult<Self> {
        let n = log_t.len();
        if n < 2 || fraction.len() != n {
            return Err(DiskError::CacheCorrupt(format!(
                "table arrays must share a length >= 2, got log_t={n}, fraction={}",
                fraction.len()
            )));
        }
        let dlog_t = (log_t[n - 1] - log_t[0]) / (n - 1) as f64;
        if !(dlog_t > 0.0) || !dlog_t.is_finite() {
            return Err(DiskError::CacheCorrupt(
                "table temperatures must increase".to_string(),
            ));
        }
        let uniform = log_t.iter().enumerate().all(|(k, &v)| {
            let expected = log_t[0] + k as f64 * dlog_t;
            (v - expected).abs() <= GRID_TOLERANCE * dlog_t.max(v.abs())
        });
        if !uniform {
            return Err(DiskError::CacheCorrupt(
                "table temperatures are not uniformly spaced in log10 T".to_string(),
            ));
        }
        if fraction.iter().any(|f| !f.is_finite() || *f < 0.0) {
            return Err(DiskError::CacheCorrupt(
                "table fractions must be finite and >= 0".to_string(),
            ));
        }
        Ok(BandFractionTable {
            band,
            log_t,
            fraction,
            dlog_t,
        })
    }

    pub fn band(&self) -> Band {
        self.band
    }

    pub fn log_t(&self) -> &Array1<f64> {
        &self.log_t
    }

    pub fn fractions(&self) -> &Array1<f64> {
        &self.fraction
    }

    pub fn len(&self) -> usize {
        self.log_t.len()
    }

    pub fn is_empty(&self) -> bool {
        self.log_t.is_empty()
    }

    /// Linear in log10 T, clamped to the end values.
    pub fn fraction_at_log10(&self, log_t: f64) -> Option<f64> {
        let values = self.fraction.as_slice()?;
        interp_uniform(self.log_t[0], self.dlog_t, values, log_t)
    }

    /// `None` for a non-positive or non-finite temperature.
    pub fn fraction(&self, temperature: f64) -> Option<f64> {
        if !(temperature > 0.0) || !temperature.is_finite() {
            return None;
        }
        self.fraction_at_log10(temperature.log10())
    }

    pub fn save_npz(&self, path: &Path) -> DiskResult<()> {
        let band = Array1::from_vec(vec![self.band.low_kev, self.band.high_kev]);
        let file = File::create(path)?;
        let mut npz = NpzWriter::new(file);
        let write_err = |e: ndarray_npy::WriteNpzError| {
            DiskError::Io(std::io::Error::other(format!(
                "failed to write band table '{}': {e}",
                path.display()
            )))
        };
        npz.add_array("band", &band).map_err(write_err)?;
        npz.add_array("log_t", &self.log_t).map_err(write_err)?;
        npz.add_array("fraction", &self.fraction).map_err(write_err)?;
        npz.finish().map_err(write_err)?;
        Ok(())
    }

    /// Load a persisted table. A missing file surfaces as
    /// [`DiskError::Io`] with kind `NotFound`.
    pub fn load_npz(path: &Path) -> DiskResult<Self> {
        let file = File::open(path)?;
        let mut npz = NpzReader::new(file).map_err(|e| {
            DiskError::CacheCorrupt(format!("failed to open '{}': {e}", path.display()))
        })?;
        let edges = read_array1(&mut npz, "band")?;
        if edges.len() != 2 {
            return Err(DiskError::CacheCorrupt(format!(
                "band array must hold 2 values, found {}",
                edges.len()
            )));
        }
        let band = Band::new(edges[0], edges[1])
            .map_err(|e| DiskError::CacheCorrupt(e.to_string()))?;
        let log_t = read_array1(&mut npz, "log_t")?;
        let fraction = read_array1(&mut npz, "fraction")?;
        BandFractionTable::from_parts(band, log_t, fraction)
    }
}

fn read_array1(npz: &mut NpzReader<File>, key: &str) -> DiskResult<Array1<f64>> {
    npz.by_name::<OwnedRepr<f64>, Ix1>(&format!("{key}.npy"))
        .or_else(|_| npz.by_name::<OwnedRepr<f64>, Ix1>(key))
        .map_err(|e| DiskError::CacheCorrupt(format!("failed to read {key} from npz: {e}")))
}

fn describe(band: Band) -> String {
    format!("[{}, {}] keV", band.low_kev, band.high_kev)
}

/// Read-through store of band tables keyed by the exact band edges.
///
/// The lock is held across a miss, so concurrent first use of a band
/// builds it once. Entries are never evicted.
#[derive(Debug)]
pub struct BandTableCache {
    dir: Option<PathBuf>,
    n_points: usize,
    energy: EnergyGrid,
    tables: Mutex<HashMap<(u64, u64), Arc<BandFractionTable>>>,
    builds: AtomicUsize,
}

impl BandTableCache {
    pub fn in_memory(n_points: usize) -> Self {
        BandTableCache {
            dir: None,
            n_points,
            energy: EnergyGrid::default(),
            tables: Mutex::new(HashMap::new()),
            builds: AtomicUsize::new(0),
        }
    }

    /// Tables are looked up in, and written to, `dir`.
    pub fn persistent(dir: impl Into<PathBuf>, n_points: usize) -> Self {
        BandTableCache {
            dir: Some(dir.into()),
            ..BandTableCache::in_memory(n_points)
        }
    }

    pub fn from_config(cfg: &SpectralConfig) -> Self {
        match &cfg.cache_dir {
            Some(dir) => BandTableCache::persistent(dir, cfg.table_points),
            None => BandTableCache::in_memory(cfg.table_points),
        }
    }

    /// Where the table for `band` lives on disk, if persistence is on.
    pub fn table_path(&self, band: Band) -> Option<PathBuf> {
        self.dir.as_ref().map(|d| d.join(band.table_file_name()))
    }

    /// Number of tables integrated from scratch so far.
    pub fn build_count(&self) -> usize {
        self.builds.load(Ordering::SeqCst)
    }

    pub fn get(&self, band: Band) -> DiskResult<Arc<BandFractionTable>> {
        let mut tables = self
            .tables
            .lock()
            .map_err(|_| DiskError::CacheCorrupt("band table cache lock poisoned".to_string()))?;
        if let Some(table) = tables.get(&band.key()) {
            return Ok(Arc::clone(table));
        }
        let table = Arc::new(self.load_or_build(band)?);
        tables.insert(band.key(), Arc::clone(&table));
        Ok(table)
    }

    fn load_or_build(&self, band: Band) -> DiskResult<BandFractionTable> {
        let Some(path) = self.table_path(band) else {
            return self.build(band);
        };
        match BandFractionTable::load_npz(&path) {
            Ok(table) if table.band().key() == band.key() => {
                log::info!("loaded band table {} from {}", describe(band), path.display());
                Ok(table)
            }
            Ok(table) => Err(DiskError::CacheMismatch {
                expected: describe(band),
                found: describe(table.band()),
            }),
            Err(DiskError::Io(e)) if e.kind() == ErrorKind::NotFound => {
                let table = self.build(band)?;
                if let Err(e) = persist(&table, &path) {
                    log::warn!("band table not persisted to {}: {e}", path.display());
                }
                Ok(table)
            }
            Err(e) => Err(e),
        }
    }

    fn build(&self, band: Band) -> DiskResult<BandFractionTable> {
        log::info!(
            "building band table {} over {} temperatures",
            describe(band),
            self.n_points
        );
        let table = BandFractionTable::build(band, self.n_points, &self.energy)?;
        self.builds.fetch_add(1, Ordering::SeqCst);
        Ok(table)
    }
}

fn persist(table: &BandFractionTable, path: &Path) -> DiskResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    table.save_npz(path)
}
