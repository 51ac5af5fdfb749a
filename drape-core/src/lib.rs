//! Drape composites logo artwork onto garment photos and makes it look printed on the fabric.
//!
//! The engine takes a base image (the garment) and a logo, resolves where the logo goes, scales
//! it, optionally bends it through the fabric, and alpha-composites it onto a copy of the base.
//!
//! # Pipeline overview
//!
//! 1. **Resolve**: `Placement + LogoSize -> LogoLayout` (scaled size and clamped top-left)
//! 2. **Resize**: the logo is resampled to the layout size
//! 3. **Wrap** (optional): one [`WrapStrategy`] (displacement, light blend or perspective warp)
//!    reads the base region under the logo and reshapes the scaled logo
//! 4. **Composite**: straight-alpha "over" onto a copy of the base
//!
//! [`BatchDriver`] runs job lists through the same engine: it resolves assets through an
//! [`AssetLookup`], caches each base's alpha mask, restores that mask onto the composite and hands
//! results to an [`OutputSink`]. Failures are collected per job.
//!
//! Key constraints:
//!
//! - **No unsafe**: `unsafe` is forbidden in this crate.
//! - **Buffer in, buffer out**: every transform borrows its inputs and returns a new
//!   [`RasterBuffer`].
//! - **Straight alpha at the API**: buffers are non-premultiplied; samplers premultiply
//!   internally so transparent texels never bleed color.
//! - **No global state**: constants live in [`EngineConfig`], logging goes through `tracing`
//!   and the library never installs a subscriber.
#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![allow(missing_docs_in_private_items)]

mod assets;
mod batch;
mod effects;
mod encode;
mod engine;
mod foundation;
mod geometry;
mod raster;

pub use kurbo::Point;

pub use assets::decode::{decode_image, encode_jpeg, encode_png};
pub use assets::store::{AssetLookup, DirAssetStore, MemoryAssetStore, normalize_rel_path};
pub use batch::driver::{BatchDriver, BatchFailure, BatchOptions, BatchReport, run_batch};
pub use batch::job::{BatchJob, JobList, JobPlacement, JobRecord, JobSize, catalog_jobs};
pub use batch::mask_cache::{AlphaMask, MaskCache};
pub use effects::composite::composite;
pub use effects::displacement::{displace, displacement_map};
pub use effects::light_blend::{LightBlendMode, light_blend, light_map};
pub use effects::perspective::{logo_corners, perspective_warp};
pub use encode::sink::{DirSink, MemorySink, OutputFormat, OutputSink};
pub use engine::compose::{CompositionEngine, LogoLayout, LogoSize, WrapStrategy};
pub use foundation::config::{EngineConfig, ResampleFilter};
pub use foundation::error::{AssetRole, DrapeError, DrapeResult};
pub use geometry::homography::Homography;
pub use geometry::placement::{AnchorMode, Placement, ReferencePoint, clamp_top_left};
pub use raster::blur::{blur_plane, sigma_for_radius};
pub use raster::buffer::{ChannelLayout, RasterBuffer};
pub use raster::plane::Plane;
pub use raster::resample::{ResizeTarget, resize};
