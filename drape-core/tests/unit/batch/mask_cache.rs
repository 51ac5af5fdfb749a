use super::*;
use crate::raster::buffer::ChannelLayout;

fn cutout() -> RasterBuffer {
    // 2x1: left pixel opaque, right pixel transparent.
    RasterBuffer::new(2, 1, ChannelLayout::Rgba, vec![10, 10, 10, 255, 0, 0, 0, 0]).unwrap()
}

#[test]
fn rgb_base_gives_opaque_mask() {
    let base = RasterBuffer::filled(3, 2, ChannelLayout::Rgb, &[1, 2, 3]).unwrap();
    let mask = AlphaMask::from_base(&base);
    assert!(mask.is_opaque());
    assert_eq!(mask.as_bytes(), &[255; 6]);
    assert_eq!(mask.apply(&base).unwrap(), base);
}

#[test]
fn apply_restores_transparency() {
    let mask = AlphaMask::from_base(&cutout());
    let composite = RasterBuffer::filled(2, 1, ChannelLayout::Rgb, &[200, 0, 0]).unwrap();
    let out = mask.apply(&composite).unwrap();
    assert_eq!(out.layout(), ChannelLayout::Rgba);
    assert_eq!(out.data(), &[200, 0, 0, 255, 200, 0, 0, 0]);

    let wrong = RasterBuffer::filled(1, 1, ChannelLayout::Rgb, &[0, 0, 0]).unwrap();
    assert!(matches!(
        mask.apply(&wrong),
        Err(DrapeError::InvalidDimension(_))
    ));
}

#[test]
fn derives_once_per_key() {
    let cache = MaskCache::new();
    let base = cutout();
    let a = cache.get_or_derive("tee", &base);
    let b = cache.get_or_derive("tee", &base);
    let _ = cache.get_or_derive("hoodie", &base);
    assert!(Arc::ptr_eq(&a, &b));
    assert_eq!(cache.derivations(), 2);
    assert_eq!(cache.len(), 2);

    cache.clear();
    assert!(cache.is_empty());
    let _ = cache.get_or_derive("tee", &base);
    assert_eq!(cache.derivations(), 3);
}

#[test]
fn concurrent_lookups_share_one_derivation() {
    let cache = MaskCache::new();
    let base = cutout();
    std::thread::scope(|s| {
        for _ in 0..8 {
            s.spawn(|| {
                let _ = cache.get_or_derive("tee", &base);
            });
        }
    });
    assert_eq!(cache.derivations(), 1);
}
