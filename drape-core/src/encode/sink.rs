use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::{
    assets::decode::{encode_jpeg, encode_png},
    assets::store::normalize_rel_path,
    foundation::error::DrapeResult,
    raster::buffer::RasterBuffer,
};

/// Consumer of finished composites.
///
/// Ordering contract: `write` is called in job order, once per successful job. A failing `write`
/// fails that job only; the batch keeps going. `finish` runs once after the last job.
pub trait OutputSink {
    /// Accept the composite for output identifier `id`.
    fn write(&mut self, id: &str, image: &RasterBuffer) -> DrapeResult<()>;

    /// Flush whatever the sink buffers.
    fn finish(&mut self) -> DrapeResult<()> {
        Ok(())
    }
}

/// On-disk encoding used by [`DirSink`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OutputFormat {
    /// Lossless, alpha preserved.
    Png,
    /// Alpha flattened onto white.
    Jpeg {
        /// Encoder quality, 1..=100.
        quality: u8,
    },
}

impl OutputFormat {
    /// File extension without the dot.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg { .. } => "jpg",
        }
    }
}

/// Writes `<dir>/<id>.<ext>` per composite, creating parent directories as needed.
#[derive(Clone, Debug)]
pub struct DirSink {
    dir: PathBuf,
    format: OutputFormat,
    written: Vec<PathBuf>,
}

impl DirSink {
    /// Sink rooted at `dir`.
    pub fn new(dir: impl Into<PathBuf>, format: OutputFormat) -> Self {
        Self {
            dir: dir.into(),
            format,
            written: Vec::new(),
        }
    }

    /// Output directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Files written so far, in write order.
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }

    /// Target path for `id`; ids are normalized like asset identifiers.
    pub fn path_for(&self, id: &str) -> DrapeResult<PathBuf> {
        let norm = normalize_rel_path(id)?;
        Ok(self
            .dir
            .join(format!("{norm}.{}", self.format.extension())))
    }
}

impl OutputSink for DirSink {
    fn write(&mut self, id: &str, image: &RasterBuffer) -> DrapeResult<()> {
        let path = self.path_for(id)?;
        let bytes = match self.format {
            OutputFormat::Png => encode_png(image)?,
            OutputFormat::Jpeg { quality } => encode_jpeg(image, quality)?,
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create output directory '{}'", parent.display()))?;
        }
        std::fs::write(&path, bytes)
            .with_context(|| format!("write output '{}'", path.display()))?;
        tracing::debug!(path = %path.display(), "wrote composite");
        self.written.push(path);
        Ok(())
    }
}

/// In-memory sink for tests and embedding.
#[derive(Debug, Default)]
pub struct MemorySink {
    /// Composites in write order.
    pub outputs: Vec<(String, RasterBuffer)>,
    finished: bool,
}

impl MemorySink {
    /// Empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether [`OutputSink::finish`] has run.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Composite stored under `id`, if any.
    pub fn get(&self, id: &str) -> Option<&RasterBuffer> {
        self.outputs
            .iter()
            .find(|(k, _)| k == id)
            .map(|(_, buf)| buf)
    }
}

impl OutputSink for MemorySink {
    fn write(&mut self, id: &str, image: &RasterBuffer) -> DrapeResult<()> {
        self.outputs.push((id.to_string(), image.clone()));
        Ok(())
    }

    fn finish(&mut self) -> DrapeResult<()> {
        self.finished = true;
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/sink.rs"]
mod tests;
