//! HEALPix nested-scheme pixelization for catalog cone queries.
//!
//! Converts sky positions to cell indices and back, and finds the cells
//! of one order lying within a cone around a position.

use std::collections::BTreeSet;
use std::f64::consts::{FRAC_PI_2, PI, TAU};

/// Side of an order-0 cell in degrees: `sqrt(4π / 12)` converted.
const BASE_CELL_SIDE_DEG: f64 = 58.632_301_428_350_4;

/// Upper bound on the distance from a cell's center to its furthest point,
/// in units of the cell side.
const CELL_RADIUS_FACTOR: f64 = 1.5;

/// Starting ring of each base face, in units of nside.
const JRLL: [i64; 12] = [2, 2, 2, 2, 3, 3, 3, 3, 4, 4, 4, 4];
/// Longitude offset of each base face, in units of nside / 2.
const JPLL: [i64; 12] = [1, 3, 5, 7, 0, 2, 4, 6, 1, 3, 5, 7];

/// Convert (RA, Dec) in degrees to a HEALPix nested cell index.
///
/// Implements the Gorski et al. (2005) algorithm for the nested scheme.
///
/// # Arguments
/// * `order` - HEALPix order (nside = 2^order)
/// * `ra_deg` - Right ascension in degrees
/// * `dec_deg` - Declination in degrees
///
/// # Returns
/// Nested cell index in range [0, 12*nside^2)
pub fn ang2pix_nest(order: u8, ra_deg: f64, dec_deg: f64) -> u64 {
    let phi = ra_deg.to_radians();
    let z = libm::sin(dec_deg.to_radians()).clamp(-1.0, 1.0);
    let nside = 1u64 << order;
    let (face, ix, iy) = compute_face_and_position(phi, z, nside);
    ((face as u64) << (2 * order as u32)) + xy2pix_nest(ix, iy, order)
}

/// Center of a nested cell as (RA, Dec) in degrees.
pub fn pix2ang_nest(order: u8, cell: u64) -> (f64, f64) {
    let nside = 1i64 << order;
    let face = (cell >> (2 * order as u32)) as usize;
    let (ix, iy) = pix2xy_nest(cell & ((1u64 << (2 * order as u32)) - 1), order);
    let (ix, iy) = (ix as i64, iy as i64);

    let jr = JRLL[face] * nside - ix - iy - 1;
    let nsq3 = 3.0 * (nside * nside) as f64;
    let (nr, z, kshift) = if jr < nside {
        (jr, 1.0 - (jr * jr) as f64 / nsq3, 0)
    } else if jr > 3 * nside {
        let nr = 4 * nside - jr;
        (nr, (nr * nr) as f64 / nsq3 - 1.0, 0)
    } else {
        let z = (2 * nside - jr) as f64 * 2.0 / (3 * nside) as f64;
        (nside, z, (jr - nside) & 1)
    };

    let mut jp = (JPLL[face] * nr + ix - iy + 1 + kshift) / 2;
    if jp > 4 * nside {
        jp -= 4 * nside;
    }
    if jp < 1 {
        jp += 4 * nside;
    }

    let phi = (jp as f64 - (kshift + 1) as f64 * 0.5) * (FRAC_PI_2 / nr as f64);
    (phi.to_degrees(), libm::asin(z).to_degrees())
}

/// Side length of a cell at `order`, in degrees.
pub fn cell_side_deg(order: u8) -> f64 {
    BASE_CELL_SIDE_DEG / (1u64 << order) as f64
}

/// Query the cells at `order` within a cone.
///
/// Without `inclusive`, a cell is selected when its center lies within
/// `radius_deg` of the cone center. With `inclusive`, the radius is widened
/// by a bound on the cell size so that every cell overlapping the cone is
/// selected, along with some that only come close.
///
/// The search descends from the 12 base cells and only refines cells that
/// can hold a selected descendant.
pub fn query_disc_nest(
    order: u8,
    ra_deg: f64,
    dec_deg: f64,
    radius_deg: f64,
    inclusive: bool,
) -> BTreeSet<u64> {
    let limit = if inclusive {
        radius_deg + CELL_RADIUS_FACTOR * cell_side_deg(order)
    } else {
        radius_deg
    };

    let mut cells = BTreeSet::new();
    let mut pending: Vec<(u8, u64)> = (0..12).map(|cell| (0, cell)).collect();

    while let Some((level, cell)) = pending.pop() {
        let (ra, dec) = pix2ang_nest(level, cell);
        let distance = angular_separation_deg(ra_deg, dec_deg, ra, dec);

        if level == order {
            if distance <= limit {
                cells.insert(cell);
            }
        } else if distance <= limit + CELL_RADIUS_FACTOR * cell_side_deg(level) {
            let first = cell << 2;
            pending.extend((first..first + 4).map(|child| (level + 1, child)));
        }
    }

    cells
}

/// Compute angular distance between two points on the sphere using the
/// Vincenty formula.
///
/// Accurate at all angular separations.
///
/// # Returns
/// Angular distance in degrees
pub fn angular_separation_deg(ra1_deg: f64, dec1_deg: f64, ra2_deg: f64, dec2_deg: f64) -> f64 {
    let (d1_sin, d1_cos) = libm::sincos(dec1_deg.to_radians());
    let (d2_sin, d2_cos) = libm::sincos(dec2_deg.to_radians());
    let (dl_sin, dl_cos) = libm::sincos((ra2_deg - ra1_deg).to_radians());

    let a = d2_cos * dl_sin;
    let b = d1_cos * d2_sin - d1_sin * d2_cos * dl_cos;
    let c = d1_sin * d2_sin + d1_cos * d2_cos * dl_cos;

    libm::atan2(libm::sqrt(a * a + b * b), c).to_degrees()
}

/// Determine which of the 12 HEALPix base faces contains the point,
/// and compute the (ix, iy) position within that face.
fn compute_face_and_position(phi: f64, z: f64, nside: u64) -> (u32, u64, u64) {
    let z_abs = libm::fabs(z);
    let tt = phi_to_tt(phi);
    if z_abs <= 2.0 / 3.0 {
        compute_equatorial_face(tt, z, nside)
    } else {
        compute_polar_face(tt, z, z_abs, nside)
    }
}

/// Convert phi to tt (0..4 range for the 4 quadrants).
fn phi_to_tt(phi: f64) -> f64 {
    let tt = phi.rem_euclid(TAU) * 2.0 / PI;
    if tt >= 4.0 {
        0.0
    } else {
        tt
    }
}

/// Compute face and position for equatorial belt (-2/3 <= z <= 2/3).
fn compute_equatorial_face(tt: f64, z: f64, nside: u64) -> (u32, u64, u64) {
    let temp1 = nside as f64 * (0.5 + tt);
    let temp2 = nside as f64 * z * 0.75;
    let jp = (temp1 - temp2) as u64;
    let jm = (temp1 + temp2) as u64;
    let order = nside.trailing_zeros();
    let ifp = jp >> order;
    let ifm = jm >> order;
    let face = if ifp == ifm {
        (ifp | 4) as u32
    } else if ifp < ifm {
        ifp as u32
    } else {
        (ifm + 8) as u32
    };
    let ix = jm & (nside - 1);
    let iy = nside - (jp & (nside - 1)) - 1;
    (face, ix, iy)
}

/// Compute face and position for polar caps (|z| > 2/3).
fn compute_polar_face(tt: f64, z: f64, z_abs: f64, nside: u64) -> (u32, u64, u64) {
    let ntt = (libm::floor(tt) as u32).min(3);
    let tp = tt - ntt as f64;
    let tmp = nside as f64 * libm::sqrt(3.0 * (1.0 - z_abs));
    let jp = ((tp * tmp) as u64).min(nside - 1);
    let jm = (((1.0 - tp) * tmp) as u64).min(nside - 1);
    if z > 0.0 {
        (ntt, nside - jm - 1, nside - jp - 1)
    } else {
        (ntt + 8, jp, jm)
    }
}

/// Convert (ix, iy) to nested pixel index within a base face using Z-order curve.
fn xy2pix_nest(ix: u64, iy: u64, order: u8) -> u64 {
    let mut result: u64 = 0;
    for i in 0..order as u32 {
        let bit_x = (ix >> i) & 1;
        let bit_y = (iy >> i) & 1;
        result |= (bit_x << (2 * i)) | (bit_y << (2 * i + 1));
    }
    result
}

/// Inverse of [`xy2pix_nest`].
fn pix2xy_nest(pix: u64, order: u8) -> (u64, u64) {
    let mut ix = 0;
    let mut iy = 0;
    for i in 0..order as u32 {
        ix |= ((pix >> (2 * i)) & 1) << i;
        iy |= ((pix >> (2 * i + 1)) & 1) << i;
    }
    (ix, iy)
}
