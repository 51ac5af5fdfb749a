use super::*;

const BASE: (u32, u32) = (1000, 800);
const LOGO: (u32, u32) = (200, 100);

#[test]
fn center_scenario_resolves_to_400_350() {
    let p = Placement::centered();
    assert_eq!(p.resolve_top_left(BASE, LOGO, 50), (400, 350));

    let tl = Placement {
        reference: ReferencePoint::Center,
        anchor: AnchorMode::TopLeft,
    };
    assert_eq!(tl.resolve_top_left(BASE, LOGO, 50), (400, 350));
}

#[test]
fn corners_use_margin() {
    let m = 50;
    let at = |r| Placement::at(r).resolve_top_left(BASE, LOGO, m);
    assert_eq!(at(ReferencePoint::UpperLeft), (50, 50));
    assert_eq!(at(ReferencePoint::UpperRight), (750, 50));
    assert_eq!(at(ReferencePoint::LowerLeft), (50, 650));
    assert_eq!(at(ReferencePoint::LowerRight), (750, 650));
}

#[test]
fn explicit_anchor_modes_differ_by_half_logo() {
    let c = Placement::explicit(300, 300, AnchorMode::Center);
    assert_eq!(c.resolve_top_left(BASE, LOGO, 0), (200, 250));

    let t = Placement::explicit(300, 300, AnchorMode::TopLeft);
    assert_eq!(t.resolve_top_left(BASE, LOGO, 0), (300, 300));
}

#[test]
fn out_of_bounds_slides_back_in() {
    let p = Placement::explicit(-500, 5000, AnchorMode::TopLeft);
    assert_eq!(p.resolve_top_left(BASE, LOGO, 0), (0, 700));

    let p = Placement::explicit(990, 790, AnchorMode::Center);
    assert_eq!(p.resolve_top_left(BASE, LOGO, 0), (800, 700));
}

#[test]
fn clamped_offsets_keep_logo_inside_when_it_fits() {
    let logos = [(1u32, 1u32), (200, 100), (999, 1), (1000, 800)];
    for &logo in &logos {
        for x in [-10_000i64, -1, 0, 17, 499, 1000, 99_999] {
            for y in [-3i64, 0, 400, 801, 12_345] {
                for anchor in [AnchorMode::Center, AnchorMode::TopLeft] {
                    let (tx, ty) = Placement::explicit(x, y, anchor).resolve_top_left(BASE, logo, 0);
                    assert!(tx + logo.0 <= BASE.0, "x {tx} for {logo:?}");
                    assert!(ty + logo.1 <= BASE.1, "y {ty} for {logo:?}");
                }
            }
        }
    }
}

#[test]
fn oversized_logo_pins_to_origin() {
    let p = Placement::centered();
    assert_eq!(p.resolve_top_left((100, 100), (300, 50), 0), (0, 25));
    assert_eq!(clamp_top_left(40, 40, (100, 100), (300, 300)), (0, 0));
}

#[test]
fn anchor_point_matches_resolution() {
    let p = Placement::at(ReferencePoint::LowerRight);
    let pt = p.anchor_point(BASE, LOGO, 50);
    assert_eq!((pt.x, pt.y), (850.0, 700.0));
}

#[test]
fn reference_point_parses_names() {
    assert_eq!(
        "Upper Left".parse::<ReferencePoint>().unwrap(),
        ReferencePoint::UpperLeft
    );
    assert_eq!(
        "bottom-right".parse::<ReferencePoint>().unwrap(),
        ReferencePoint::LowerRight
    );
    assert_eq!(
        "CENTER".parse::<ReferencePoint>().unwrap(),
        ReferencePoint::Center
    );
    assert!("middle".parse::<ReferencePoint>().is_err());
}

#[test]
fn placement_json_defaults_anchor_to_center() {
    let p: Placement =
        serde_json::from_str(r#"{ "reference": { "explicit": { "x": 3, "y": 4 } } }"#).unwrap();
    assert_eq!(p, Placement::explicit(3, 4, AnchorMode::Center));
}
