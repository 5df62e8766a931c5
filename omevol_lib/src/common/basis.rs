use nalgebra::{vector, Vector3};

/// Build two unit vectors `u`, `v` perpendicular to normal `n`
///
/// `n` must be unit length. `(u, v, n)` form a right handed orthonormal basis.
pub fn create_cs(n: &Vector3<f32>) -> (Vector3<f32>, Vector3<f32>) {
    if n.x == 0.0 && n.y == 0.0 {
        let u = if n.z < 0.0 {
            vector![-1.0, 0.0, 0.0]
        } else {
            vector![1.0, 0.0, 0.0]
        };
        (u, vector![0.0, 1.0, 0.0])
    } else {
        // n.x and n.y are not both zero, root is positive
        let d = 1.0 / f32::sqrt(n.y * n.y + n.x * n.x);
        let u = vector![n.y * d, -n.x * d, 0.0];
        let v = n.cross(&u);
        (u, v)
    }
}
