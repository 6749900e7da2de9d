#![allow(dead_code)]
use isogeom::mesh::MeshStore;
use isogeom::mesh::TriangleSoup;

pub type Tri = [[f64; 3]; 3];

fn lerp(lo: f64, hi: f64, i: usize, n: usize) -> f64 {
    if i == n {
        hi
    } else {
        lo + (hi - lo) * i as f64 / n as f64
    }
}

/// Triangulated `n x n` grid on the face of a box where axis `axis` is fixed
/// to `at`.
fn box_face(min: [f64; 3], max: [f64; 3], axis: usize, at: f64, n: usize) -> Vec<Tri> {
    let (b, c) = ((axis + 1) % 3, (axis + 2) % 3);
    let point = |i: usize, j: usize| {
        let mut p = [0.0; 3];
        p[axis] = at;
        p[b] = lerp(min[b], max[b], i, n);
        p[c] = lerp(min[c], max[c], j, n);
        p
    };
    let mut tris = Vec::with_capacity(2 * n * n);
    for i in 0..n {
        for j in 0..n {
            let (p00, p10) = (point(i, j), point(i + 1, j));
            let (p11, p01) = (point(i + 1, j + 1), point(i, j + 1));
            tris.push([p00, p10, p11]);
            tris.push([p00, p11, p01]);
        }
    }
    tris
}

/// Closed surface of an axis-aligned box, each face split into `n x n` quads.
pub fn box_shell(min: [f64; 3], max: [f64; 3], n: usize) -> Vec<Tri> {
    let mut tris = Vec::new();
    for axis in 0..3 {
        tris.extend(box_face(min, max, axis, min[axis], n));
        tris.extend(box_face(min, max, axis, max[axis], n));
    }
    tris
}

/// Closed cube surface centred on the origin.
pub fn cube_shell(half: f64, n: usize) -> Vec<Tri> {
    box_shell([-half; 3], [half; 3], n)
}

/// Open `n x n` grid in the plane `z`, spanning `[0, size]^2`.
pub fn square(size: f64, z: f64, n: usize) -> Vec<Tri> {
    box_face([0.0, 0.0, z], [size, size, z], 2, z, n)
}

/// Moves every corner by a fixed offset.
pub fn shift(tris: &[Tri], by: [f64; 3]) -> Vec<Tri> {
    tris.iter()
        .map(|t| t.map(|p| [p[0] + by[0], p[1] + by[1], p[2] + by[2]]))
        .collect()
}

pub fn soup(tris: Vec<Tri>) -> TriangleSoup {
    TriangleSoup::from_triangles(tris)
}

/// Distinct live vertices closer than `tol` on every axis.
pub fn coincident_vertices(store: &MeshStore, tol: f64) -> usize {
    let verts: Vec<_> = store.vertices().collect();
    let mut hits = 0;
    for (i, (_, a)) in verts.iter().enumerate() {
        for (_, b) in &verts[i + 1..] {
            if (0..3).all(|k| (a[k] - b[k]).abs() <= tol) {
                hits += 1;
            }
        }
    }
    hits
}

/// Assert `ids` is exactly `1..=ids.len()` in some order.
pub fn assert_dense(mut ids: Vec<u32>) {
    ids.sort_unstable();
    let want: Vec<u32> = (1..=ids.len() as u32).collect();
    assert_eq!(ids, want, "global ids are not dense");
}
