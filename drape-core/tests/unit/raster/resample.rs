use super::*;

fn solid_rgba(w: u32, h: u32, px: [u8; 4]) -> RasterBuffer {
    RasterBuffer::filled(w, h, ChannelLayout::Rgba, &px).unwrap()
}

#[test]
fn width_target_preserves_aspect() {
    assert_eq!(ResizeTarget::Width(100).resolve(400, 200).unwrap(), (100, 50));
    assert_eq!(ResizeTarget::Height(100).resolve(400, 200).unwrap(), (200, 100));
    assert_eq!(
        ResizeTarget::Exact {
            width: 7,
            height: 3
        }
        .resolve(400, 200)
        .unwrap(),
        (7, 3)
    );
}

#[test]
fn zero_targets_are_invalid() {
    assert!(matches!(
        ResizeTarget::Width(0).resolve(10, 10),
        Err(DrapeError::InvalidDimension(_))
    ));
    assert!(matches!(
        ResizeTarget::Exact {
            width: 5,
            height: 0
        }
        .resolve(10, 10),
        Err(DrapeError::InvalidDimension(_))
    ));
    // Derived side truncates to zero.
    assert!(matches!(
        ResizeTarget::Width(1).resolve(1000, 10),
        Err(DrapeError::InvalidDimension(_))
    ));

    let img = solid_rgba(4, 4, [1, 2, 3, 255]);
    assert!(resize(&img, ResizeTarget::Height(0), ResampleFilter::Area).is_err());
}

#[test]
fn downscale_and_upscale_keep_solid_color() {
    let img = solid_rgba(40, 20, [10, 200, 30, 255]);
    for filter in [
        ResampleFilter::Area,
        ResampleFilter::Bilinear,
        ResampleFilter::Lanczos,
    ] {
        for target in [ResizeTarget::Width(10), ResizeTarget::Width(90)] {
            let out = resize(&img, target, filter).unwrap();
            let (w, h) = target.resolve(40, 20).unwrap();
            assert_eq!(out.dimensions(), (w, h));
            assert_eq!(out.layout(), ChannelLayout::Rgba);
            for px in out.data().chunks_exact(4) {
                for c in 0..3 {
                    assert!((i16::from(px[c]) - i16::from([10u8, 200, 30][c])).abs() <= 1);
                }
                assert_eq!(px[3], 255);
            }
        }
    }
}

#[test]
fn rgb_layout_is_preserved() {
    let img = RasterBuffer::filled(8, 8, ChannelLayout::Rgb, &[50, 60, 70]).unwrap();
    for filter in [ResampleFilter::Area, ResampleFilter::Bilinear] {
        let out = resize(&img, ResizeTarget::Height(3), filter).unwrap();
        assert_eq!(out.layout(), ChannelLayout::Rgb);
        assert_eq!(out.dimensions(), (3, 3));
        assert_eq!(out.pixel(1, 1), &[50, 60, 70]);
    }
}

#[test]
fn same_size_is_a_copy() {
    let img = solid_rgba(3, 2, [9, 8, 7, 6]);
    let out = resize(&img, ResizeTarget::Width(3), ResampleFilter::Area).unwrap();
    assert_eq!(out, img);
}

#[test]
fn input_is_not_modified() {
    let img = solid_rgba(6, 6, [100, 100, 100, 128]);
    let before = img.clone();
    let _ = resize(&img, ResizeTarget::Width(2), ResampleFilter::Area).unwrap();
    assert_eq!(img, before);
}
