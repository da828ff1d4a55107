//! Reading and writing NumPy array files.
//!
//! The model matrix, its averaged variants and the `lons_lats` coordinate
//! array are stored as `.npz` archives. Entries are looked up by key the way
//! `numpy.load(path)[key]` does, so `matrix` resolves to `matrix.npy` inside
//! the archive.

use crate::{FieldError, OceanField, Result};
use ndarray::{ArrayBase, Dimension, Ix3, Ix4, OwnedRepr};
use ndarray_npy::{read_npy, write_npy, NpzReader, NpzWriter, WritableElement};
use ocean_common::{Chemical, LonLatGrid};
use std::fs::File;
use std::path::Path;
use tracing::{debug, info};

/// Default archive key of the model matrix.
pub const MATRIX_KEY: &str = "matrix";

/// Default archive key of the coordinate array.
pub const LONS_LATS_KEY: &str = "lons_lats";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ArrayFormat {
    Npz,
    Npy,
}

fn detect_format(path: &Path) -> Result<ArrayFormat> {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .as_deref()
    {
        Some("npz") => Ok(ArrayFormat::Npz),
        Some("npy") => Ok(ArrayFormat::Npy),
        _ => Err(FieldError::UnsupportedFormat(path.display().to_string())),
    }
}

/// Name of an entry inside an `.npz` archive.
fn entry_name(key: &str) -> String {
    if key.ends_with(".npy") {
        key.to_string()
    } else {
        format!("{}.npy", key)
    }
}

/// Read an f64 array from an archive, accepting f32 storage as well.
fn read_npz_entry<D: Dimension>(path: &Path, key: &str) -> Result<ArrayBase<OwnedRepr<f64>, D>> {
    let mut npz = NpzReader::new(File::open(path)?)?;
    let names = npz.names()?;
    let name = entry_name(key);
    if !names.iter().any(|n| *n == name) {
        return Err(FieldError::MissingEntry {
            name: key.to_string(),
            available: names,
        });
    }

    match npz.by_name::<OwnedRepr<f64>, D>(&name) {
        Ok(array) => Ok(array),
        Err(f64_err) => {
            debug!(entry = %name, error = %f64_err, "Entry is not f64, retrying as f32");
            let array = npz
                .by_name::<OwnedRepr<f32>, D>(&name)
                .map_err(|_| FieldError::ReadNpz(f64_err))?;
            Ok(array.mapv(f64::from))
        }
    }
}

fn read_npy_entry<D: Dimension>(path: &Path) -> Result<ArrayBase<OwnedRepr<f64>, D>> {
    match read_npy::<_, ArrayBase<OwnedRepr<f64>, D>>(path) {
        Ok(array) => Ok(array),
        Err(f64_err) => {
            let array: ArrayBase<OwnedRepr<f32>, D> =
                read_npy(path).map_err(|_| FieldError::ReadNpy(f64_err))?;
            Ok(array.mapv(f64::from))
        }
    }
}

/// Load the `(time, lat, lon, chemical)` model matrix.
///
/// `key` selects the archive entry for `.npz` files and is ignored for
/// `.npy` files.
pub fn load_field(path: impl AsRef<Path>, key: &str) -> Result<OceanField> {
    let path = path.as_ref();
    let data = match detect_format(path)? {
        ArrayFormat::Npz => read_npz_entry::<Ix4>(path, key)?,
        ArrayFormat::Npy => read_npy_entry::<Ix4>(path)?,
    };
    let field = OceanField::new(data)?;
    info!(
        path = %path.display(),
        times = field.n_times(),
        lat = field.n_lat(),
        lon = field.n_lon(),
        chemicals = field.n_chemicals(),
        missing = %format!("{:.1}%", field.missing_fraction() * 100.0),
        "Loaded field"
    );
    Ok(field)
}

/// Load a field whose chemical axis holds `chemicals` (e.g. a cached
/// average computed over a subset of channels).
pub fn load_field_with_chemicals(
    path: impl AsRef<Path>,
    key: &str,
    chemicals: Vec<Chemical>,
) -> Result<OceanField> {
    let field = load_field(path, key)?;
    OceanField::with_chemicals(field.into_inner(), chemicals)
}

/// Load the `(lat, lon, 2)` coordinate array.
pub fn load_lons_lats(path: impl AsRef<Path>, key: &str) -> Result<LonLatGrid> {
    let path = path.as_ref();
    let coords = match detect_format(path)? {
        ArrayFormat::Npz => read_npz_entry::<Ix3>(path, key)?,
        ArrayFormat::Npy => read_npy_entry::<Ix3>(path)?,
    };
    let grid = LonLatGrid::new(coords)?;
    debug!(path = %path.display(), shape = ?grid.shape(), "Loaded coordinates");
    Ok(grid)
}

/// Save a field as a compressed `.npz` archive under `key`.
pub fn save_field(path: impl AsRef<Path>, key: &str, field: &OceanField) -> Result<()> {
    let path = path.as_ref();
    let mut npz = NpzWriter::new_compressed(File::create(path)?);
    // The writer appends the ".npy" suffix itself.
    npz.add_array(key.trim_end_matches(".npy"), field.data())?;
    npz.finish()?;
    info!(path = %path.display(), key = %key, "Saved field");
    Ok(())
}

/// Save any array as a plain `.npy` file.
pub fn save_array_npy<A, D>(path: impl AsRef<Path>, array: &ArrayBase<OwnedRepr<A>, D>) -> Result<()>
where
    A: WritableElement,
    D: Dimension,
{
    write_npy(path, array)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_name() {
        assert_eq!(entry_name("matrix"), "matrix.npy");
        assert_eq!(entry_name("matrix.npy"), "matrix.npy");
    }

    #[test]
    fn test_detect_format() {
        assert_eq!(detect_format(Path::new("a/b.NPZ")).unwrap(), ArrayFormat::Npz);
        assert_eq!(detect_format(Path::new("b.npy")).unwrap(), ArrayFormat::Npy);
        assert!(matches!(
            detect_format(Path::new("data.nc")),
            Err(FieldError::UnsupportedFormat(_))
        ));
    }
}
