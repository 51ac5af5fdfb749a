use super::*;

#[test]
fn new_checks_length_and_dimensions() {
    assert!(RasterBuffer::new(2, 2, ChannelLayout::Rgb, vec![0; 12]).is_ok());
    assert!(matches!(
        RasterBuffer::new(2, 2, ChannelLayout::Rgba, vec![0; 12]),
        Err(DrapeError::InvalidDimension(_))
    ));
    assert!(matches!(
        RasterBuffer::new(0, 2, ChannelLayout::Rgb, vec![]),
        Err(DrapeError::InvalidDimension(_))
    ));
}

#[test]
fn layout_from_channels() {
    assert_eq!(ChannelLayout::from_channels(3).unwrap(), ChannelLayout::Rgb);
    assert_eq!(ChannelLayout::from_channels(4).unwrap(), ChannelLayout::Rgba);
    assert!(matches!(
        ChannelLayout::from_channels(1),
        Err(DrapeError::ChannelMismatch(_))
    ));
}

#[test]
fn to_rgba_adds_opaque_alpha() {
    let rgb = RasterBuffer::filled(2, 1, ChannelLayout::Rgb, &[1, 2, 3]).unwrap();
    let rgba = rgb.to_rgba();
    assert_eq!(rgba.layout(), ChannelLayout::Rgba);
    assert_eq!(rgba.data(), &[1, 2, 3, 255, 1, 2, 3, 255]);
    assert_eq!(rgb.alpha_channel(), vec![255, 255]);
}

#[test]
fn with_alpha_replaces_plane() {
    let img = RasterBuffer::filled(2, 1, ChannelLayout::Rgba, &[9, 9, 9, 255]).unwrap();
    let masked = img.with_alpha(&[0, 128]).unwrap();
    assert_eq!(masked.alpha_channel(), vec![0, 128]);
    assert_eq!(img.alpha_channel(), vec![255, 255]);
    assert!(img.with_alpha(&[0]).is_err());
}

#[test]
fn crop_clamped_repeats_edges() {
    let data = vec![
        0, 0, 0, 10, 10, 10, //
        20, 20, 20, 30, 30, 30,
    ];
    let img = RasterBuffer::new(2, 2, ChannelLayout::Rgb, data).unwrap();
    let crop = img.crop_clamped(1, -1, 2, 2).unwrap();
    assert_eq!(crop.dimensions(), (2, 2));
    assert_eq!(crop.pixel(0, 0), &[10, 10, 10]);
    assert_eq!(crop.pixel(1, 0), &[10, 10, 10]);
    assert_eq!(crop.pixel(0, 1), &[10, 10, 10]);
    assert_eq!(crop.pixel(1, 1), &[10, 10, 10]);

    let inner = img.crop_clamped(0, 1, 2, 1).unwrap();
    assert_eq!(inner.data(), &[20, 20, 20, 30, 30, 30]);
}

#[test]
fn flatten_onto_white() {
    let img = RasterBuffer::new(2, 1, ChannelLayout::Rgba, vec![0, 0, 0, 0, 200, 0, 0, 255])
        .unwrap();
    let flat = img.flatten_onto([255, 255, 255]);
    assert_eq!(flat.layout(), ChannelLayout::Rgb);
    assert_eq!(flat.data(), &[255, 255, 255, 200, 0, 0]);
}

#[test]
fn dynamic_image_conversions_keep_layout() {
    let img = RasterBuffer::filled(3, 2, ChannelLayout::Rgba, &[1, 2, 3, 4]).unwrap();
    let dynamic = img.to_dynamic().unwrap();
    assert!(dynamic.color().has_alpha());
    let back = RasterBuffer::from_dynamic(dynamic).unwrap();
    assert_eq!(back, img);

    let rgb = RasterBuffer::filled(1, 1, ChannelLayout::Rgb, &[5, 6, 7]).unwrap();
    let back = RasterBuffer::from_dynamic(rgb.to_dynamic().unwrap()).unwrap();
    assert_eq!(back.layout(), ChannelLayout::Rgb);
}

#[test]
fn luma_of_gray_pixels() {
    let img = RasterBuffer::filled(2, 2, ChannelLayout::Rgb, &[100, 100, 100]).unwrap();
    let l = img.luma();
    assert!(l.data().iter().all(|&v| (v - 100.0).abs() < 1e-3));
}
