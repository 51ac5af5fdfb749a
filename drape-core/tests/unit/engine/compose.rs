use super::*;
use crate::{
    effects::perspective::logo_corners,
    geometry::placement::{AnchorMode, ReferencePoint},
    raster::buffer::ChannelLayout,
};

const BASE_PX: [u8; 3] = [230, 225, 210];

fn base_1000x800() -> RasterBuffer {
    RasterBuffer::filled(1000, 800, ChannelLayout::Rgb, &BASE_PX).unwrap()
}

fn red_logo() -> RasterBuffer {
    RasterBuffer::filled(200, 100, ChannelLayout::Rgba, &[255, 0, 0, 255]).unwrap()
}

fn engine() -> CompositionEngine {
    CompositionEngine::default()
}

#[test]
fn centered_red_logo_scenario() {
    let base = base_1000x800();
    let placement = Placement::centered();
    let size = LogoSize::HeightFraction(0.125);

    let layout = engine()
        .layout(base.dimensions(), (200, 100), &placement, size)
        .unwrap();
    assert_eq!(layout.size, (200, 100));
    assert_eq!(layout.top_left, (400, 350));

    let out = engine()
        .compose(&base, &red_logo(), &placement, size, &WrapStrategy::None)
        .unwrap();
    assert_eq!(out.dimensions(), (1000, 800));
    assert_eq!(out.pixel(500, 400), &[255, 0, 0]);
    assert_eq!(out.pixel(0, 0), &BASE_PX);
    assert_eq!(out.pixel(400, 350), &[255, 0, 0]);
    assert_eq!(out.pixel(599, 449), &[255, 0, 0]);
    assert_eq!(out.pixel(399, 350), &BASE_PX);
    assert_eq!(out.pixel(600, 449), &BASE_PX);
    assert_eq!(out.pixel(400, 450), &BASE_PX);
}

#[test]
fn pixels_outside_footprint_are_untouched() {
    let mut data = Vec::new();
    for y in 0..60u32 {
        for x in 0..80u32 {
            data.extend_from_slice(&[(x * 3) as u8, (y * 4) as u8, 7]);
        }
    }
    let base = RasterBuffer::new(80, 60, ChannelLayout::Rgb, data).unwrap();
    let logo = RasterBuffer::filled(10, 10, ChannelLayout::Rgba, &[0, 0, 0, 200]).unwrap();
    let placement = Placement::explicit(13, 21, AnchorMode::TopLeft);

    let out = engine()
        .compose(
            &base,
            &logo,
            &placement,
            LogoSize::Width(10),
            &WrapStrategy::None,
        )
        .unwrap();
    for y in 0..60 {
        for x in 0..80 {
            let inside = (13..23).contains(&x) && (21..31).contains(&y);
            if !inside {
                assert_eq!(out.pixel(x, y), base.pixel(x, y), "({x}, {y})");
            } else {
                assert_ne!(out.pixel(x, y), base.pixel(x, y), "({x}, {y})");
            }
        }
    }
}

#[test]
fn base_input_is_not_mutated() {
    let base = base_1000x800();
    let before = base.clone();
    let _ = engine()
        .compose(
            &base,
            &red_logo(),
            &Placement::centered(),
            LogoSize::HeightFraction(0.2),
            &WrapStrategy::LightBlend {
                intensity: 0.4,
                mode: LightBlendMode::Unconditional,
            },
        )
        .unwrap();
    assert_eq!(base, before);
}

#[test]
fn rgba_base_keeps_layout() {
    let base = RasterBuffer::filled(50, 40, ChannelLayout::Rgba, &[9, 9, 9, 255]).unwrap();
    let out = engine()
        .compose(
            &base,
            &red_logo(),
            &Placement::at(ReferencePoint::UpperLeft),
            LogoSize::Exact {
                width: 10,
                height: 5,
            },
            &WrapStrategy::None,
        )
        .unwrap();
    assert_eq!(out.layout(), ChannelLayout::Rgba);
    // Margin 50 pushes past the 50x40 base, clamping slides it back in.
    assert_eq!(out.pixel(40, 35), &[255, 0, 0, 255]);
    assert_eq!(out.pixel(39, 35), &[9, 9, 9, 255]);
}

#[test]
fn oversized_logo_is_cropped_not_an_error() {
    let base = RasterBuffer::filled(20, 10, ChannelLayout::Rgb, &[1, 1, 1]).unwrap();
    let out = engine()
        .compose(
            &base,
            &red_logo(),
            &Placement::centered(),
            LogoSize::Width(100),
            &WrapStrategy::Displacement { intensity: 5.0 },
        )
        .unwrap();
    assert_eq!(out.dimensions(), (20, 10));
    assert_eq!(out.pixel(19, 9), &[255, 0, 0]);
}

#[test]
fn each_strategy_keeps_opaque_solid_logo_color_on_flat_base() {
    let base = base_1000x800();
    let strategies = [
        WrapStrategy::Displacement { intensity: 15.0 },
        WrapStrategy::LightBlend {
            intensity: 0.45,
            mode: LightBlendMode::Unconditional,
        },
        WrapStrategy::LightBlend {
            intensity: 0.45,
            mode: LightBlendMode::Thresholded,
        },
        WrapStrategy::PerspectiveWarp {
            corners: logo_corners(200, 100),
            offset: None,
        },
    ];
    for strategy in &strategies {
        let out = engine()
            .compose(
                &base,
                &red_logo(),
                &Placement::centered(),
                LogoSize::HeightFraction(0.125),
                strategy,
            )
            .unwrap();
        assert_eq!(out.pixel(500, 400), &[255, 0, 0], "{strategy:?}");
        assert_eq!(out.pixel(10, 10), &BASE_PX, "{strategy:?}");
    }
}

#[test]
fn perspective_offset_overrides_placement() {
    let base = RasterBuffer::filled(100, 100, ChannelLayout::Rgb, &[0, 0, 0]).unwrap();
    let logo = RasterBuffer::filled(10, 10, ChannelLayout::Rgba, &[0, 255, 0, 255]).unwrap();
    let out = engine()
        .compose(
            &base,
            &logo,
            &Placement::centered(),
            LogoSize::Width(10),
            &WrapStrategy::PerspectiveWarp {
                corners: logo_corners(10, 10),
                offset: Some((0, 0)),
            },
        )
        .unwrap();
    assert_eq!(out.pixel(5, 5), &[0, 255, 0]);
    assert_eq!(out.pixel(50, 50), &[0, 0, 0]);
}

#[test]
fn light_blend_darkens_over_shadowed_fabric() {
    let mut data = Vec::new();
    for _y in 0..100u32 {
        for x in 0..100u32 {
            let v = if x < 50 { 40 } else { 240 };
            data.extend_from_slice(&[v, v, v]);
        }
    }
    let base = RasterBuffer::new(100, 100, ChannelLayout::Rgb, data).unwrap();
    let logo = RasterBuffer::filled(80, 80, ChannelLayout::Rgba, &[250, 250, 250, 255]).unwrap();
    let out = engine()
        .compose(
            &base,
            &logo,
            &Placement::centered(),
            LogoSize::Width(80),
            &WrapStrategy::LightBlend {
                intensity: 1.0,
                mode: LightBlendMode::Unconditional,
            },
        )
        .unwrap();
    assert!(out.pixel(15, 50)[0] < 60);
    assert!(out.pixel(85, 50)[0] > 240);
}

#[test]
fn invalid_sizes_and_strategies_fail() {
    let base = base_1000x800();
    for size in [
        LogoSize::HeightFraction(0.0),
        LogoSize::HeightFraction(-0.3),
        LogoSize::HeightFraction(f64::NAN),
        LogoSize::Width(0),
    ] {
        assert!(matches!(
            engine().compose(
                &base,
                &red_logo(),
                &Placement::centered(),
                size,
                &WrapStrategy::None
            ),
            Err(DrapeError::InvalidDimension(_))
        ));
    }

    assert!(matches!(
        engine().compose(
            &base,
            &red_logo(),
            &Placement::centered(),
            LogoSize::Width(20),
            &WrapStrategy::LightBlend {
                intensity: 2.0,
                mode: LightBlendMode::Unconditional
            }
        ),
        Err(DrapeError::Validation(_))
    ));

    let flat = [Point::new(0.0, 0.0); 4];
    assert!(matches!(
        engine().compose(
            &base,
            &red_logo(),
            &Placement::centered(),
            LogoSize::Width(20),
            &WrapStrategy::PerspectiveWarp {
                corners: flat,
                offset: None
            }
        ),
        Err(DrapeError::DegenerateGeometry(_))
    ));
}

#[test]
fn strategy_json_round_trips_tagged() {
    let s: WrapStrategy =
        serde_json::from_str(r#"{ "kind": "light_blend", "intensity": 0.3, "mode": "thresholded" }"#)
            .unwrap();
    assert_eq!(
        s,
        WrapStrategy::LightBlend {
            intensity: 0.3,
            mode: LightBlendMode::Thresholded
        }
    );
    let s: WrapStrategy = serde_json::from_str(r#"{ "kind": "none" }"#).unwrap();
    assert_eq!(s, WrapStrategy::None);
}
