mod util;

use isogeom::prelude::*;
use util::*;

#[test]
fn coincident_squares_give_one_shared_surface_and_one_curve() {
    let lower = square(1.0, 0.0, 4);
    let upper = shift(&lower, [0.0, 0.0, 2e-6]);
    let levels = Levels::new([0.5]).unwrap();
    let opts = GeometryOpts {
        norm: 4.0,
        ..Default::default()
    };
    let mut geom = IsoGeometry::from_soups(levels, [soup(lower), soup(upper)], opts).unwrap();
    let h = geom.create_geometry().unwrap().clone();

    assert_eq!(h.volumes.len(), 2);
    assert_eq!(h.surfaces.len(), 1);
    let surf = h.surfaces[0];
    let (v0, v1) = (h.volumes[0], h.volumes[1]);
    assert_eq!(h.children_of(v0), vec![surf]);
    assert_eq!(h.children_of(v1), vec![surf]);
    assert_eq!(h.shared_surfaces(v0, v1), vec![surf]);
    assert_eq!(h.sense(surf), Some(Sense::shared(v0, v1)));
    assert_eq!(h.value(surf), Some(2.0));

    // the square is open, so its boundary becomes a curve
    assert_eq!(h.curves.len(), 1);
    let curve = h.curves[0];
    assert_eq!(h.parents_of(curve), vec![surf]);
    assert_eq!(geom.store().set(curve).unwrap().edges().len(), 16);
    assert_eq!(h.tags.category(curve), Some(Category::Curve));

    // one copy of the square survives
    assert_eq!(geom.store().triangle_count(), 32);
    assert_eq!(geom.store().vertex_count(), 25);
    assert!(geom.warnings().is_empty());
}

#[test]
fn stacked_boxes_share_one_face() {
    let tol = 1e-5;
    let lower = box_shell([0.0, 0.0, -1.0], [1.0, 1.0, 0.0], 2);
    let upper = box_shell([0.0, 0.0, 0.0], [1.0, 1.0, 1.0], 2);
    let levels = Levels::new([7.0]).unwrap();
    let mut geom =
        IsoGeometry::from_soups(levels, [soup(lower), soup(upper)], GeometryOpts::default())
            .unwrap();
    let h = geom.create_geometry().unwrap().clone();
    let store = geom.store();

    // shared face plus the two five-sided remainders
    assert_eq!(h.surfaces.len(), 3);
    let (v0, v1) = (h.volumes[0], h.volumes[1]);
    let shared = h.shared_surfaces(v0, v1);
    assert_eq!(shared.len(), 1);
    assert_eq!(h.value(shared[0]), Some(7.0));
    assert_eq!(store.set(shared[0]).unwrap().triangles().len(), 8);

    for &s in &h.surfaces {
        assert!(h.value(s).is_some());
        assert!(h.sense(s).is_some());
        if s != shared[0] {
            assert_eq!(h.value(s), Some(0.0));
            assert_eq!(h.sense(s).unwrap().backward, None);
            assert_eq!(h.parents_of(s).len(), 1);
        }
    }

    // the seam curve hangs under all three surfaces
    assert_eq!(h.curves.len(), 1);
    assert_eq!(h.parents_of(h.curves[0]).len(), 3);

    // 2 * 6 * 8 triangles minus the duplicated face, no duplicate vertices
    assert_eq!(store.triangle_count(), 88);
    assert_eq!(coincident_vertices(store, tol), 0);

    // every remaining triangle references live vertices
    for &s in &h.surfaces {
        for &t in store.set(s).unwrap().triangles() {
            for v in store.connectivity(t).unwrap() {
                assert!(store.contains_vertex(v));
            }
        }
    }

    assert_dense(h.surfaces.iter().map(|&s| h.global_id(s).unwrap()).collect());
    assert_dense(h.volumes.iter().map(|&v| h.global_id(v).unwrap()).collect());
}

#[test]
fn separated_squares_stay_unshared() {
    let lower = square(1.0, 0.0, 1);
    let upper = square(1.0, 1.0, 1);
    let levels = Levels::new([1.0]).unwrap();
    let mut geom =
        IsoGeometry::from_soups(levels, [soup(lower), soup(upper)], GeometryOpts::default())
            .unwrap();
    let h = geom.create_geometry().unwrap();
    assert_eq!(h.surfaces.len(), 2);
    assert!(h.curves.is_empty());
    for (&v, &s) in h.volumes.iter().zip(&h.surfaces) {
        assert_eq!(h.sense(s), Some(Sense::unshared(v)));
        assert_eq!(h.value(s), Some(0.0));
    }
}
