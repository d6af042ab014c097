// Provider alias map loading

use std::path::{Path, PathBuf};

use commrec_recon::{AliasMap, ReconError};

/// File names probed, in order, when no alias file is configured.
pub const ALIAS_FILE_CANDIDATES: &[&str] = &["unique_providers.json", "unique_proveedores.json"];

/// Read a JSON object of raw name -> canonical name.
pub fn load_alias_map(path: &Path) -> Result<AliasMap, ReconError> {
    let text = crate::csv::read_file_as_utf8(path)?;
    AliasMap::from_json(&text, path.display())
}

/// First candidate alias file that exists under `base`.
pub fn discover_alias_file(base: &Path) -> Option<PathBuf> {
    ALIAS_FILE_CANDIDATES
        .iter()
        .map(|name| base.join(name))
        .find(|p| p.is_file())
}

/// Resolve the alias map for a run.
///
/// An explicitly configured file must exist. Without one, the candidate
/// names are probed under `base`; finding none yields an empty map.
pub fn resolve_alias_map(base: &Path, configured: Option<&str>) -> Result<AliasMap, ReconError> {
    let path = match configured {
        Some(file) => {
            let path = base.join(file);
            if !path.is_file() {
                return Err(ReconError::Io(format!(
                    "provider map file not found: {}",
                    path.display()
                )));
            }
            path
        }
        None => match discover_alias_file(base) {
            Some(path) => path,
            None => {
                log::debug!("no provider alias file under {}", base.display());
                return Ok(AliasMap::new());
            }
        },
    };

    let map = load_alias_map(&path)?;
    log::info!("loaded {} provider aliases from {}", map.len(), path.display());
    Ok(map)
}
