//! Texture-less 3D simplex noise.
//!
//! This is the lattice/permutation-polynomial formulation popularised for
//! GPU shaders (Ashima Arts, Stefan Gustavson): the input is skewed into the
//! simplex grid, the four enclosing corners are hashed with a `mod 289`
//! polynomial instead of a lookup table, each hash picks a gradient on an
//! octahedron, and the corner contributions are blended with a
//! `(0.6 - r²)^4` falloff. All arithmetic is `f32` so results match what a
//! shader would produce on the GPU.

use glam::{Vec3, Vec4};

/// Skew factor into the simplex lattice.
const F3: f32 = 1.0 / 3.0;
/// Unskew factor back into Euclidean space.
const G3: f32 = 1.0 / 6.0;
/// Gradients are laid out on a 7x7 grid; must stay f32 so `7 * N7` rounds up to 1.
const N7: f32 = 1.0 / 7.0;
const FALLOFF_RADIUS_SQ: f32 = 0.6;
const OUTPUT_SCALE: f32 = 42.0;

/// Evaluates simplex noise at `p`.
///
/// Pure and deterministic; the result is continuous in `p` and lies in
/// roughly `[-1, 1]`.
pub fn noise3(p: Vec3) -> f32 {
    // Corner 0 of the enclosing simplex, and the offset from it.
    let i = (p + p.dot(Vec3::splat(F3))).floor();
    let x0 = p - i + i.dot(Vec3::splat(G3));

    // Rank the offset components to find the remaining two corners.
    let g = Vec3::new(step(x0.y, x0.x), step(x0.z, x0.y), step(x0.x, x0.z));
    let l = Vec3::ONE - g;
    let l_zxy = Vec3::new(l.z, l.x, l.y);
    let i1 = g.min(l_zxy);
    let i2 = g.max(l_zxy);

    let x1 = x0 - i1 + G3;
    let x2 = x0 - i2 + 2.0 * G3;
    let x3 = x0 - 0.5;

    let i = mod289_vec3(i);
    let p = permute(
        permute(
            permute(Vec4::splat(i.z) + Vec4::new(0.0, i1.z, i2.z, 1.0))
                + i.y
                + Vec4::new(0.0, i1.y, i2.y, 1.0),
        ) + i.x
            + Vec4::new(0.0, i1.x, i2.x, 1.0),
    );

    let ns = Vec3::new(2.0 * N7, 0.5 * N7 - 1.0, N7);

    // p mod 49, then split into a 7x7 gradient grid.
    let j = p - 49.0 * (p * ns.z * ns.z).floor();
    let x_ = (j * ns.z).floor();
    let y_ = (j - 7.0 * x_).floor();

    let x = x_ * ns.x + ns.y;
    let y = y_ * ns.x + ns.y;
    let h = Vec4::ONE - x.abs() - y.abs();

    let b0 = Vec4::new(x.x, x.y, y.x, y.y);
    let b1 = Vec4::new(x.z, x.w, y.z, y.w);
    let s0 = b0.floor() * 2.0 + 1.0;
    let s1 = b1.floor() * 2.0 + 1.0;
    let sh = -Vec4::new(
        step(h.x, 0.0),
        step(h.y, 0.0),
        step(h.z, 0.0),
        step(h.w, 0.0),
    );

    let a0 = Vec4::new(b0.x, b0.z, b0.y, b0.w)
        + Vec4::new(s0.x, s0.z, s0.y, s0.w) * Vec4::new(sh.x, sh.x, sh.y, sh.y);
    let a1 = Vec4::new(b1.x, b1.z, b1.y, b1.w)
        + Vec4::new(s1.x, s1.z, s1.y, s1.w) * Vec4::new(sh.z, sh.z, sh.w, sh.w);

    let mut g0 = Vec3::new(a0.x, a0.y, h.x);
    let mut g1 = Vec3::new(a0.z, a0.w, h.y);
    let mut g2 = Vec3::new(a1.x, a1.y, h.z);
    let mut g3 = Vec3::new(a1.z, a1.w, h.w);

    let norm = taylor_inv_sqrt(Vec4::new(
        g0.length_squared(),
        g1.length_squared(),
        g2.length_squared(),
        g3.length_squared(),
    ));
    g0 *= norm.x;
    g1 *= norm.y;
    g2 *= norm.z;
    g3 *= norm.w;

    let m = (Vec4::splat(FALLOFF_RADIUS_SQ)
        - Vec4::new(
            x0.length_squared(),
            x1.length_squared(),
            x2.length_squared(),
            x3.length_squared(),
        ))
    .max(Vec4::ZERO);
    let m = m * m;

    OUTPUT_SCALE * (m * m).dot(Vec4::new(g0.dot(x0), g1.dot(x1), g2.dot(x2), g3.dot(x3)))
}

/// GLSL `step(edge, x)`.
#[inline]
fn step(edge: f32, x: f32) -> f32 {
    if x < edge {
        0.0
    } else {
        1.0
    }
}

#[inline]
fn mod289_vec3(x: Vec3) -> Vec3 {
    x - (x * (1.0 / 289.0)).floor() * 289.0
}

#[inline]
fn mod289_vec4(x: Vec4) -> Vec4 {
    x - (x * (1.0 / 289.0)).floor() * 289.0
}

#[inline]
fn permute(x: Vec4) -> Vec4 {
    mod289_vec4((x * 34.0 + 1.0) * x)
}

#[inline]
fn taylor_inv_sqrt(r: Vec4) -> Vec4 {
    Vec4::splat(1.792_842_9) - 0.853_734_7 * r
}
