// Probability-based targeting over an observed view of the opponent board.
// Uses no_std; the density matrix lives on the stack.

use crate::{
    board::Board,
    common::{CellStatus, Coordinate},
    config::BOARD_SIZE,
    unit::Orientation,
};
use rand::Rng;

const GRID_SIZE: usize = BOARD_SIZE;

pub type Density = [[f64; GRID_SIZE]; GRID_SIZE];

/// Compute a probability density over all unresolved cells of `view` given
/// the sizes of units still afloat. Each entry sums the relative likelihood
/// of a unit segment occupying that cell; resolved cells stay at zero.
pub fn calc_pdf(view: &Board, remaining_sizes: &[usize]) -> Density {
    let mut matrix = [[0.0f64; GRID_SIZE]; GRID_SIZE];

    for &len in remaining_sizes.iter() {
        if len == 0 || len > GRID_SIZE {
            continue;
        }

        for orient in [Orientation::Horizontal, Orientation::Vertical] {
            for start in Coordinate::all() {
                // check placement validity and count hits
                let mut valid = true;
                let mut n_hits = 0i32;
                for k in 0..len {
                    match start.step(orient, k).map(|c| view.cell(c)) {
                        None | Some(CellStatus::Miss) => {
                            valid = false;
                            break;
                        }
                        Some(CellStatus::Hit) => n_hits += 1,
                        Some(_) => {}
                    }
                }
                if !valid {
                    continue;
                }

                // Placements covering observed hits get much more weight so
                // cells next to confirmed hits stand out.
                const HIT_BIAS: f64 = 10.0;
                let weight = libm::pow(HIT_BIAS, n_hits as f64);
                for k in 0..len {
                    if let Some(c) = start.step(orient, k) {
                        if !view.cell(c).is_resolved() {
                            matrix[c.row()][c.col()] += weight;
                        }
                    }
                }
            }
        }
    }

    normalize(view, matrix)
}

fn normalize(view: &Board, mut matrix: Density) -> Density {
    let total: f64 = matrix.iter().flat_map(|r| r.iter()).sum();
    if total == 0.0 {
        let open = Coordinate::all()
            .filter(|c| !view.cell(*c).is_resolved())
            .count();
        if open == 0 {
            return matrix;
        }
        let uniform = 1.0 / open as f64;
        for c in Coordinate::all().filter(|c| !view.cell(*c).is_resolved()) {
            matrix[c.row()][c.col()] = uniform;
        }
        return matrix;
    }
    for row in matrix.iter_mut() {
        for v in row.iter_mut() {
            *v /= total;
        }
    }
    matrix
}

/// Sample a cell from a density matrix using a temperature parameter.
/// Returns `None` when the matrix carries no mass.
pub fn sample_pdf<R: Rng + ?Sized>(
    pdf: &Density,
    temperature: f64,
    rng: &mut R,
) -> Option<Coordinate> {
    let mut adjusted = [[0.0f64; GRID_SIZE]; GRID_SIZE];
    let mut total = 0.0;
    for r in 0..GRID_SIZE {
        for c in 0..GRID_SIZE {
            let v = libm::pow(pdf[r][c], 1.0 / temperature);
            adjusted[r][c] = v;
            total += v;
        }
    }
    if total == 0.0 {
        return None;
    }
    let mut cumulative = 0.0;
    let threshold: f64 = rng.random_range(0.0..total);
    let mut last = None;
    for c in Coordinate::all() {
        let v = adjusted[c.row()][c.col()];
        if v > 0.0 {
            last = Some(c);
        }
        cumulative += v;
        if threshold < cumulative && v > 0.0 {
            return Some(c);
        }
    }
    last
}

/// Uniformly random cell not yet shot at on `view`.
pub fn random_untargeted<R: Rng + ?Sized>(view: &Board, rng: &mut R) -> Option<Coordinate> {
    let open = Coordinate::all()
        .filter(|c| !view.cell(*c).is_resolved())
        .count();
    if open == 0 {
        return None;
    }
    let pick = rng.random_range(0..open);
    Coordinate::all()
        .filter(|c| !view.cell(*c).is_resolved())
        .nth(pick)
}

/// Convenience wrapper that calculates the density and immediately selects
/// a target, falling back to a uniform pick when the density is empty.
pub fn calc_pdf_and_guess<R: Rng + ?Sized>(
    view: &Board,
    remaining_sizes: &[usize],
    rng: &mut R,
) -> Option<Coordinate> {
    let pdf = calc_pdf(view, remaining_sizes);
    // Lower temperature biases sampling towards likely unit locations.
    sample_pdf(&pdf, 0.5, rng).or_else(|| random_untargeted(view, rng))
}
