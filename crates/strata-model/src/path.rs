//! Vector path translation.
//!
//! Anchors become one `Move` per subpath followed by a cubic curve per anchor
//! pair. Missing handles collapse onto their anchor, which yields a straight
//! segment written as a degenerate curve. Points are never resampled.

use strata_core::{BuildError, BuildResult, PathCommand, Point};

use crate::input::{Anchor, Subpath};

/// Round a coordinate to one decimal place.
pub fn round1(value: f64) -> f64 {
    let rounded = (value * 10.0).round() / 10.0;
    if rounded == 0.0 {
        0.0
    } else {
        rounded
    }
}

fn round_point(p: Point) -> Point {
    Point::new(round1(p.x), round1(p.y))
}

/// Translate all subpaths of one shape layer.
pub fn translate(subpaths: &[Subpath], layer: &str) -> BuildResult<Vec<PathCommand>> {
    if subpaths.is_empty() {
        return Err(BuildError::malformed_path(layer, "shape has no subpaths"));
    }

    let capacity = subpaths.iter().map(|s| s.anchors.len() + 2).sum();
    let mut commands = Vec::with_capacity(capacity);
    for (index, subpath) in subpaths.iter().enumerate() {
        translate_subpath(subpath, index, layer, &mut commands)?;
    }
    Ok(commands)
}

fn translate_subpath(
    subpath: &Subpath,
    index: usize,
    layer: &str,
    out: &mut Vec<PathCommand>,
) -> BuildResult<()> {
    let anchors = &subpath.anchors;
    if anchors.len() < 2 {
        return Err(BuildError::malformed_path(
            layer,
            format!("subpath {} has {} anchor(s), need at least 2", index, anchors.len()),
        ));
    }
    if let Some(bad) = anchors.iter().position(|a| !is_finite(a)) {
        return Err(BuildError::malformed_path(
            layer,
            format!("subpath {} anchor {} has a non-finite coordinate", index, bad),
        ));
    }

    out.push(PathCommand::Move(round_point(anchors[0].point)));
    for pair in anchors.windows(2) {
        out.push(curve(&pair[0], &pair[1]));
    }
    if subpath.closed {
        out.push(curve(&anchors[anchors.len() - 1], &anchors[0]));
        out.push(PathCommand::Close);
    }
    Ok(())
}

fn curve(from: &Anchor, to: &Anchor) -> PathCommand {
    PathCommand::CubicCurve {
        end: round_point(to.point),
        control1: round_point(from.outgoing.unwrap_or(from.point)),
        control2: round_point(to.incoming.unwrap_or(to.point)),
    }
}

fn is_finite(anchor: &Anchor) -> bool {
    let finite = |p: Point| p.is_finite();
    finite(anchor.point)
        && anchor.incoming.map_or(true, finite)
        && anchor.outgoing.map_or(true, finite)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn pt(x: f64, y: f64) -> Point {
        Point::new(x, y)
    }

    #[test]
    fn test_corner_anchors_make_degenerate_curves() {
        let subpath = Subpath {
            anchors: vec![Anchor::corner(0.0, 0.0), Anchor::corner(10.0, 0.0)],
            closed: false,
        };
        let cmds = translate(&[subpath], "line").unwrap();
        assert_eq!(
            cmds,
            vec![
                PathCommand::Move(pt(0.0, 0.0)),
                PathCommand::CubicCurve {
                    end: pt(10.0, 0.0),
                    control1: pt(0.0, 0.0),
                    control2: pt(10.0, 0.0),
                },
            ]
        );
    }

    #[test]
    fn test_closed_subpath_returns_to_start() {
        let subpath = Subpath {
            anchors: vec![
                Anchor::smooth(pt(0.0, 0.0), pt(-5.0, 0.0), pt(5.0, 0.0)),
                Anchor::corner(10.0, 10.0),
            ],
            closed: true,
        };
        let cmds = translate(&[subpath], "blob").unwrap();
        assert_eq!(cmds.len(), 4);
        assert_eq!(
            cmds[2],
            PathCommand::CubicCurve {
                end: pt(0.0, 0.0),
                control1: pt(10.0, 10.0),
                control2: pt(-5.0, 0.0),
            }
        );
        assert_eq!(cmds[3], PathCommand::Close);
    }

    #[test]
    fn test_multiple_subpaths() {
        let a = Subpath::rectangle(strata_core::Frame::new(0.0, 0.0, 5.0, 5.0));
        let b = Subpath::rectangle(strata_core::Frame::new(10.0, 10.0, 5.0, 5.0));
        let cmds = translate(&[a, b], "pair").unwrap();
        let moves = cmds
            .iter()
            .filter(|c| matches!(c, PathCommand::Move(_)))
            .count();
        assert_eq!(moves, 2);
        assert_eq!(cmds[6], PathCommand::Move(pt(10.0, 10.0)));
    }

    #[test]
    fn test_rounds_to_one_decimal() {
        let subpath = Subpath {
            anchors: vec![Anchor::corner(1.04, 2.06), Anchor::corner(-0.04, 3.0)],
            closed: false,
        };
        let cmds = translate(&[subpath], "r").unwrap();
        assert_eq!(cmds[0], PathCommand::Move(pt(1.0, 2.1)));
        match cmds[1] {
            PathCommand::CubicCurve { end, .. } => assert_eq!(end, pt(0.0, 3.0)),
            _ => panic!("expected curve"),
        }
    }

    #[test]
    fn test_malformed_inputs() {
        assert!(matches!(
            translate(&[], "empty"),
            Err(BuildError::MalformedPath { .. })
        ));
        let single = Subpath {
            anchors: vec![Anchor::corner(1.0, 1.0)],
            closed: true,
        };
        assert!(matches!(
            translate(&[single], "dot"),
            Err(BuildError::MalformedPath { .. })
        ));
        let nan = Subpath {
            anchors: vec![Anchor::corner(f64::NAN, 0.0), Anchor::corner(1.0, 1.0)],
            closed: false,
        };
        assert!(matches!(
            translate(&[nan], "nan"),
            Err(BuildError::MalformedPath { .. })
        ));
    }

    fn anchor_strategy() -> impl Strategy<Value = Anchor> {
        let coord = -1000i32..1000;
        (
            (coord.clone(), coord.clone()),
            proptest::option::of((coord.clone(), coord.clone())),
            proptest::option::of((coord.clone(), coord)),
        )
            .prop_map(|(p, i, o)| {
                let to_point = |(x, y): (i32, i32)| Point::new(x as f64 / 10.0, y as f64 / 10.0);
                Anchor {
                    point: to_point(p),
                    incoming: i.map(to_point),
                    outgoing: o.map(to_point),
                }
            })
    }

    proptest! {
        #[test]
        fn prop_endpoints_and_controls_are_kept(
            anchors in proptest::collection::vec(anchor_strategy(), 2..12),
            closed in any::<bool>(),
        ) {
            let subpath = Subpath { anchors: anchors.clone(), closed };
            let cmds = translate(&[subpath], "p").unwrap();

            let expected_len = 1 + (anchors.len() - 1) + if closed { 2 } else { 0 };
            prop_assert_eq!(cmds.len(), expected_len);

            for (i, pair) in anchors.windows(2).enumerate() {
                match cmds[i + 1] {
                    PathCommand::CubicCurve { end, control1, control2 } => {
                        prop_assert!(end.abs_diff_eq(pair[1].point, 1e-9));
                        prop_assert!(control1.abs_diff_eq(pair[0].outgoing.unwrap_or(pair[0].point), 1e-9));
                        prop_assert!(control2.abs_diff_eq(pair[1].incoming.unwrap_or(pair[1].point), 1e-9));
                    }
                    other => prop_assert!(false, "unexpected command {:?}", other),
                }
            }
        }
    }
}
