use super::*;
use crate::error::AcpError;
use crate::graph::{DependencyGraph, NodeId, ParameterSource, SignPredicate};
use crate::param::context::{self, AcpCfg, Session};

fn session(delta: f64) -> Session {
    Session::with_cfg(AcpCfg {
        delta,
        ..AcpCfg::default()
    })
    .unwrap()
}

fn insert_points(g: &mut DependencyGraph, pts: &[(f64, f64)], exact: bool) -> Vec<NodeId> {
    pts.iter()
        .map(|&(x, y)| {
            let node = if exact {
                InputPoint::exact(x, y)
            } else {
                InputPoint::new(x, y)
            };
            g.insert(node).unwrap()
        })
        .collect()
}

#[test]
fn unit_triangle_turns_left() {
    let _s = session(2f64.powi(-27));
    let mut g = DependencyGraph::new();
    let p = insert_points(&mut g, &[(0.0, 0.0), (1.0, 0.0), (0.0, 1.0)], false);
    assert_eq!(LeftTurn::new(p[0], p[1], p[2]).eval(&mut g), Ok(1));
    assert_eq!(LeftTurn::new(p[0], p[2], p[1]).eval(&mut g), Ok(-1));
    assert_eq!(g.stats().escalations, 0);
}

#[test]
fn collinear_inputs_get_a_definite_turn() {
    let _s = session(2f64.powi(-27));
    let mut g = DependencyGraph::new();
    let p = insert_points(&mut g, &[(0.0, 0.0), (1.0, 1.0), (2.0, 2.0)], false);
    let s = LeftTurn::new(p[0], p[1], p[2]).eval(&mut g).unwrap();
    assert!(s == 1 || s == -1);
    assert!(g.stats().rounds <= 3);
}

#[test]
fn tiny_perturbation_forces_escalation_but_still_decides() {
    let _s = session(2f64.powi(-60));
    let mut g = DependencyGraph::new();
    let p = insert_points(&mut g, &[(0.0, 0.0), (1.0, 1.0), (2.0, 2.0)], false);
    let s = LeftTurn::new(p[0], p[1], p[2]).eval(&mut g).unwrap();
    assert!(s == 1 || s == -1);
    let stats = g.stats();
    assert!(stats.rounds >= 1 && stats.rounds <= 3, "{stats:?}");
    // Mirror image flips the sign through the same escalation.
    assert_eq!(LeftTurn::new(p[2], p[1], p[0]).eval(&mut g), Ok(-s));
    assert_eq!(context::ceiling(), 53);
}

#[test]
fn unperturbed_collinear_points_exhaust_the_precision() {
    let _s = session(0.0);
    let mut g = DependencyGraph::new();
    let p = insert_points(&mut g, &[(0.0, 0.0), (1.0, 1.0), (2.0, 2.0)], true);
    assert_eq!(
        LeftTurn::new(p[0], p[1], p[2]).eval(&mut g),
        Err(AcpError::AmbiguousAtMaxPrecision { bits: 848 })
    );
    assert!(p.iter().all(|&id| g.parameters(id).iter().all(|x| x.bits() == 53)));
}

#[test]
fn orders_and_ccw_follow_coordinates() {
    let _s = session(0.0);
    let mut g = DependencyGraph::new();
    let p = insert_points(&mut g, &[(1.0, 0.0), (0.0, 1.0), (2.0, 3.0)], true);
    assert!(XOrder::new(p[1], p[0]).holds(&mut g).unwrap());
    assert!(!XOrder::new(p[0], p[1]).holds(&mut g).unwrap());
    assert!(YOrder::new(p[0], p[1]).holds(&mut g).unwrap());
    assert_eq!(Ccw::new(p[0], p[1]).eval(&mut g), Ok(1));
    assert_eq!(Ccw::new(p[1], p[0]).eval(&mut g), Ok(-1));
    assert_eq!(Ccw::new(p[0], p[1]).dependencies(), vec![p[0], p[1]]);
}

#[test]
fn vector_and_normal_nodes() {
    let _s = session(0.0);
    let mut g = DependencyGraph::new();
    let p = insert_points(&mut g, &[(1.0, 2.0), (4.0, 6.0)], true);
    let v = g.insert(Vector::new(p[0], p[1])).unwrap();
    let n = g.insert(Normal::new(p[0], p[1])).unwrap();
    assert_eq!(point(&g, v).mid(), nalgebra::Vector2::new(3.0, 4.0));
    assert_eq!(point(&g, n).mid(), nalgebra::Vector2::new(-4.0, 3.0));
    assert_eq!(point(&g, v).dot(&point(&g, n)).mid(), 0.0);
}

#[test]
fn diagonals_meet_in_the_middle() {
    let _s = session(2f64.powi(-27));
    let mut g = DependencyGraph::new();
    let p = insert_points(&mut g, &[(0.0, 0.0), (2.0, 2.0), (0.0, 2.0), (2.0, 0.0)], false);
    let x = g.insert(LineIntersection::new(p[0], p[1], p[2], p[3])).unwrap();
    let m = point(&g, x).mid();
    assert!((m.x - 1.0).abs() < 1e-6 && (m.y - 1.0).abs() < 1e-6, "{m}");
    let s = LineSegment::new(p[0], p[1]);
    let t = LineSegment::new(p[2], p[3]);
    assert!(s.intersects(&mut g, &t).unwrap());
    assert!(t.intersects(&mut g, &s).unwrap());
}

#[test]
fn near_parallel_lines_escalate_on_insert() {
    let _s = session(0.0);
    let mut g = DependencyGraph::new();
    // u = (3, 1) and v = (0.3, 0.1): u × v = 3·0.1 − 0.3 = 2^-55 exactly,
    // which tier 0 cannot separate from zero.
    let p = insert_points(&mut g, &[(0.0, 1.0), (3.0, 2.0), (0.0, 0.0), (0.3, 0.1)], true);
    let x = g.insert(LineIntersection::new(p[0], p[1], p[2], p[3])).unwrap();
    assert_eq!(g.stats().escalations, 1);
    let q = point(&g, x);
    assert_eq!(q.x().bits(), 53);
    assert!(q.x().lb() > 1e16 && q.y().lb() > 1e15, "{}", q.x());
}

#[test]
fn parallel_lines_are_rejected() {
    let _s = session(0.0);
    let mut g = DependencyGraph::new();
    let p = insert_points(&mut g, &[(0.0, 0.0), (1.0, 1.0), (0.0, 1.0), (1.0, 2.0)], true);
    let len = g.len();
    let err = g
        .insert(LineIntersection::new(p[0], p[1], p[2], p[3]))
        .unwrap_err();
    assert!(matches!(err, AcpError::AmbiguousAtMaxPrecision { .. }));
    assert_eq!(g.len(), len);
}

#[test]
fn segment_queries() {
    let _s = session(2f64.powi(-27));
    let mut g = DependencyGraph::new();
    let p = insert_points(
        &mut g,
        &[(0.0, 0.0), (1.0, 0.5), (2.0, 0.0), (3.0, 1.0), (0.5, 2.0), (0.5, -2.0), (5.0, 5.0)],
        false,
    );
    let a = LineSegment::new(p[0], p[1]);
    let b = LineSegment::new(p[2], p[3]);
    let vertical = LineSegment::new(p[4], p[5]);
    assert!(!a.intersects(&mut g, &b).unwrap());
    assert!(a.intersects(&mut g, &vertical).unwrap());
    assert!(naive_intersects(&mut g, &[b, a], &vertical).unwrap());
    assert!(!naive_intersects(&mut g, &[b], &vertical).unwrap());
    assert!(a.left_of(&mut g, p[6]).unwrap());
    assert!(a.below(&mut g, p[6]).unwrap());
    assert!(!b.left_of(&mut g, p[1]).unwrap());
}

#[test]
fn pv2_arithmetic_matches_doubles() {
    let _s = session(0.0);
    let a = PV2::constant(1.5, -2.0);
    let b = PV2::constant(0.5, 4.0);
    assert_eq!((&a + &b).mid(), nalgebra::Vector2::new(2.0, 2.0));
    assert_eq!((a.clone() - b.clone()).mid(), nalgebra::Vector2::new(1.0, -6.0));
    assert_eq!((-&a).mid(), nalgebra::Vector2::new(-1.5, 2.0));
    assert_eq!(a.cross(&b).mid(), 1.5 * 4.0 + 2.0 * 0.5);
    assert_eq!(a.dot(&b).mid(), 0.75 - 8.0);
    assert_eq!(a.perp().mid(), nalgebra::Vector2::new(2.0, 1.5));
    let k = crate::param::Parameter::constant(2.0);
    assert_eq!(a.scale(&k).mid(), nalgebra::Vector2::new(3.0, -4.0));
}
