use std::{
    collections::HashMap,
    sync::{
        Arc, Mutex, OnceLock, PoisonError,
        atomic::{AtomicUsize, Ordering},
    },
};

use crate::{
    foundation::error::{DrapeError, DrapeResult},
    raster::buffer::RasterBuffer,
};

/// Per-pixel opacity of a base garment photo.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AlphaMask {
    width: u32,
    height: u32,
    alpha: Vec<u8>,
    opaque: bool,
}

impl AlphaMask {
    /// Alpha plane of `base`; fully opaque for RGB bases.
    pub fn from_base(base: &RasterBuffer) -> Self {
        let alpha = base.alpha_channel();
        let opaque = alpha.iter().all(|&a| a == 255);
        Self {
            width: base.width(),
            height: base.height(),
            alpha,
            opaque,
        }
    }

    /// `(width, height)`.
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// One byte per pixel, row-major.
    pub fn as_bytes(&self) -> &[u8] {
        &self.alpha
    }

    /// Whether every pixel is fully opaque.
    pub fn is_opaque(&self) -> bool {
        self.opaque
    }

    /// Restore this mask onto a composite of the same size.
    ///
    /// An opaque mask leaves RGB composites as RGB; otherwise the result is RGBA with the mask's
    /// alpha, so areas outside the garment stay transparent even where the logo spilled over.
    pub fn apply(&self, composite: &RasterBuffer) -> DrapeResult<RasterBuffer> {
        if composite.dimensions() != self.dimensions() {
            return Err(DrapeError::invalid_dimension(format!(
                "alpha mask {:?} does not match composite {:?}",
                self.dimensions(),
                composite.dimensions()
            )));
        }
        if self.opaque && !composite.layout().has_alpha() {
            return Ok(composite.clone());
        }
        composite.with_alpha(&self.alpha)
    }
}

type Slot = Arc<OnceLock<Arc<AlphaMask>>>;

/// Alpha masks keyed by base identifier, derived at most once per key.
///
/// The map lock is held only to fetch or insert a key's slot; derivation runs inside the slot's
/// once cell, so concurrent jobs on different bases never wait on each other and concurrent jobs
/// on the same base wait for a single derivation.
#[derive(Debug, Default)]
pub struct MaskCache {
    slots: Mutex<HashMap<String, Slot>>,
    derivations: AtomicUsize,
}

impl MaskCache {
    /// Empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Mask for `base_id`, deriving it from `base` on first use.
    pub fn get_or_derive(&self, base_id: &str, base: &RasterBuffer) -> Arc<AlphaMask> {
        let slot = {
            let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
            Arc::clone(slots.entry(base_id.to_string()).or_default())
        };
        let mut derived = false;
        let mask = slot.get_or_init(|| {
            derived = true;
            self.derivations.fetch_add(1, Ordering::Relaxed);
            Arc::new(AlphaMask::from_base(base))
        });
        if derived {
            tracing::debug!(base_id, "alpha mask derived");
        } else {
            tracing::debug!(base_id, "alpha mask cache hit");
        }
        Arc::clone(mask)
    }

    /// How many masks have been derived so far.
    pub fn derivations(&self) -> usize {
        self.derivations.load(Ordering::Relaxed)
    }

    /// Number of cached keys.
    pub fn len(&self) -> usize {
        self.slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether nothing has been cached yet.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every cached mask. The derivation counter keeps counting.
    pub fn clear(&self) {
        self.slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

#[cfg(test)]
#[path = "../../tests/unit/batch/mask_cache.rs"]
mod tests;
