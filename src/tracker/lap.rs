//! Rectangular linear assignment solver.
//!
//! Shortest augmenting path variant of Jonker-Volgenant (D. F. Crouse, "On
//! implementing 2D rectangular assignment algorithms", 2016). Rows are
//! augmented in index order; when several columns tie on reduced cost the
//! first unassigned column in scan order wins, otherwise the first scanned.
//! Costs may be negative. Non-finite entries are treated as forbidden pairs.

use ndarray::{Array2, ArrayView2};

/// Minimum-cost one-to-one assignment.
///
/// Returns, for every row, the assigned column or `None`. When rows outnumber
/// columns some rows stay unassigned, and vice versa.
pub fn solve(cost: &Array2<f64>) -> Vec<Option<usize>> {
    let (rows, cols) = cost.dim();
    if rows == 0 || cols == 0 {
        return vec![None; rows];
    }

    if cols < rows {
        // Solve the transposed problem so every row of it can be assigned.
        let col_to_row = solve_wide(cost.t());
        let mut row_to_col = vec![None; rows];
        for (col, row) in col_to_row.into_iter().enumerate() {
            if let Some(row) = row {
                row_to_col[row] = Some(col);
            }
        }
        row_to_col
    } else {
        solve_wide(cost.view())
    }
}

/// Solve a problem with `rows <= cols`.
fn solve_wide(cost: ArrayView2<f64>) -> Vec<Option<usize>> {
    let (rows, cols) = cost.dim();
    let c = |i: usize, j: usize| {
        let v = cost[[i, j]];
        if v.is_finite() { v } else { f64::INFINITY }
    };

    let mut u = vec![0.0; rows];
    let mut v = vec![0.0; cols];
    let mut shortest = vec![f64::INFINITY; cols];
    let mut path = vec![usize::MAX; cols];
    let mut col4row: Vec<Option<usize>> = vec![None; rows];
    let mut row4col: Vec<Option<usize>> = vec![None; cols];
    let mut scanned_rows = vec![false; rows];
    let mut scanned_cols = vec![false; cols];
    let mut remaining = vec![0usize; cols];

    for cur_row in 0..rows {
        // Dijkstra-like search for the cheapest augmenting path from cur_row.
        let mut min_val = 0.0;
        let mut num_remaining = cols;
        for (it, slot) in remaining.iter_mut().enumerate() {
            *slot = cols - it - 1;
        }
        scanned_rows.fill(false);
        scanned_cols.fill(false);
        shortest.fill(f64::INFINITY);

        let mut i = cur_row;
        let mut sink = None;
        while sink.is_none() {
            scanned_rows[i] = true;

            let mut index = None;
            let mut lowest = f64::INFINITY;
            for (it, &j) in remaining[..num_remaining].iter().enumerate() {
                let reduced = min_val + c(i, j) - u[i] - v[j];
                if reduced < shortest[j] {
                    path[j] = i;
                    shortest[j] = reduced;
                }
                if shortest[j] < lowest || (shortest[j] == lowest && row4col[j].is_none()) {
                    lowest = shortest[j];
                    index = Some(it);
                }
            }

            min_val = lowest;
            let Some(index) = index.filter(|_| min_val.is_finite()) else {
                break;
            };

            let j = remaining[index];
            match row4col[j] {
                None => sink = Some(j),
                Some(row) => i = row,
            }
            scanned_cols[j] = true;
            num_remaining -= 1;
            remaining[index] = remaining[num_remaining];
        }

        // Every column reachable from this row is forbidden.
        let Some(sink) = sink else {
            continue;
        };

        // Dual update.
        u[cur_row] += min_val;
        for r in 0..rows {
            if scanned_rows[r] && r != cur_row {
                if let Some(col) = col4row[r] {
                    u[r] += min_val - shortest[col];
                }
            }
        }
        for j in 0..cols {
            if scanned_cols[j] {
                v[j] -= min_val - shortest[j];
            }
        }

        // Augment along the path back to cur_row.
        let mut j = sink;
        loop {
            let r = path[j];
            row4col[j] = Some(r);
            let prev = col4row[r].replace(j);
            if r == cur_row {
                break;
            }
            match prev {
                Some(p) => j = p,
                None => break,
            }
        }
    }

    col4row
}
