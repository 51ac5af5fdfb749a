use std::{
    collections::HashMap,
    path::{Path, PathBuf},
};

use anyhow::Context;

use crate::{
    assets::decode::decode_image,
    foundation::error::{AssetRole, DrapeError, DrapeResult},
    raster::buffer::RasterBuffer,
};

/// Resolves graphic and base identifiers to decoded buffers.
///
/// Implementations return [`DrapeError::MissingAsset`] for identifiers they cannot resolve. Any
/// other error (IO, decode) is reported as-is. Lookups may run from several batch workers at once.
pub trait AssetLookup: Send + Sync {
    /// Resolve a foreground graphic.
    fn graphic(&self, id: &str) -> DrapeResult<RasterBuffer>;
    /// Resolve a background garment photo.
    fn base(&self, id: &str) -> DrapeResult<RasterBuffer>;
}

/// Filesystem-backed lookup with one root directory per asset role.
///
/// Identifiers are relative paths below the role's root. An identifier without an extension gets
/// `default_extension` appended, so catalog ids like `ABC123` resolve to `ABC123.png`.
#[derive(Clone, Debug)]
pub struct DirAssetStore {
    graphics_root: PathBuf,
    bases_root: PathBuf,
    default_extension: String,
}

impl DirAssetStore {
    /// Store reading graphics from `graphics_root` and bases from `bases_root`.
    pub fn new(graphics_root: impl Into<PathBuf>, bases_root: impl Into<PathBuf>) -> Self {
        Self {
            graphics_root: graphics_root.into(),
            bases_root: bases_root.into(),
            default_extension: "png".to_string(),
        }
    }

    /// Replace the extension appended to bare identifiers (without the leading dot).
    pub fn with_default_extension(mut self, ext: impl Into<String>) -> Self {
        self.default_extension = ext.into().trim_start_matches('.').to_string();
        self
    }

    /// Root directory for `role`.
    pub fn root(&self, role: AssetRole) -> &Path {
        match role {
            AssetRole::Graphic => &self.graphics_root,
            AssetRole::Base => &self.bases_root,
        }
    }

    /// Absolute path an identifier resolves to, without touching the filesystem.
    pub fn path_for(&self, role: AssetRole, id: &str) -> DrapeResult<PathBuf> {
        let mut norm = normalize_rel_path(id)?;
        let has_ext = Path::new(&norm).extension().is_some();
        if !has_ext && !self.default_extension.is_empty() {
            norm.push('.');
            norm.push_str(&self.default_extension);
        }
        Ok(self.root(role).join(Path::new(&norm)))
    }

    fn load(&self, role: AssetRole, id: &str) -> DrapeResult<RasterBuffer> {
        let path = self.path_for(role, id)?;
        if !path.is_file() {
            return Err(DrapeError::missing(role, id));
        }
        let bytes = std::fs::read(&path)
            .with_context(|| format!("read {role} bytes from '{}'", path.display()))?;
        decode_image(&bytes)
    }
}

impl AssetLookup for DirAssetStore {
    fn graphic(&self, id: &str) -> DrapeResult<RasterBuffer> {
        self.load(AssetRole::Graphic, id)
    }

    fn base(&self, id: &str) -> DrapeResult<RasterBuffer> {
        self.load(AssetRole::Base, id)
    }
}

/// In-memory lookup for tests and embedding.
#[derive(Clone, Debug, Default)]
pub struct MemoryAssetStore {
    graphics: HashMap<String, RasterBuffer>,
    bases: HashMap<String, RasterBuffer>,
}

impl MemoryAssetStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a graphic under `id`, replacing any previous one.
    pub fn insert_graphic(&mut self, id: impl Into<String>, buf: RasterBuffer) -> &mut Self {
        self.graphics.insert(id.into(), buf);
        self
    }

    /// Register a base under `id`, replacing any previous one.
    pub fn insert_base(&mut self, id: impl Into<String>, buf: RasterBuffer) -> &mut Self {
        self.bases.insert(id.into(), buf);
        self
    }
}

impl AssetLookup for MemoryAssetStore {
    fn graphic(&self, id: &str) -> DrapeResult<RasterBuffer> {
        self.graphics
            .get(id)
            .cloned()
            .ok_or_else(|| DrapeError::missing(AssetRole::Graphic, id))
    }

    fn base(&self, id: &str) -> DrapeResult<RasterBuffer> {
        self.bases
            .get(id)
            .cloned()
            .ok_or_else(|| DrapeError::missing(AssetRole::Base, id))
    }
}

/// Normalize an asset identifier into a stable relative path.
///
/// The normalized result uses `/` separators, removes `.` segments, and rejects absolute paths or
/// any `..` traversal.
pub fn normalize_rel_path(source: &str) -> DrapeResult<String> {
    let s = source.trim().replace('\\', "/");
    if s.starts_with('/') || s.get(1..2) == Some(":") {
        return Err(DrapeError::validation("asset paths must be relative"));
    }
    if s.is_empty() {
        return Err(DrapeError::validation("asset path must be non-empty"));
    }

    let mut out = Vec::<&str>::new();
    for part in s.split('/') {
        if part.is_empty() || part == "." {
            continue;
        }
        if part == ".." {
            return Err(DrapeError::validation("asset paths must not contain '..'"));
        }
        out.push(part);
    }

    if out.is_empty() {
        return Err(DrapeError::validation(
            "asset path must contain a file name",
        ));
    }

    Ok(out.join("/"))
}

#[cfg(test)]
#[path = "../../tests/unit/assets/store.rs"]
mod tests;
