//! Board geometry
//!
//! Pure functions over the 10×10 grids: placement legality with a one-cell
//! buffer between ships, and sunk detection by flood fill over the
//! 4-connected occupied region around a hit. Ships are straight 1-wide runs
//! that never touch, so that region is exactly one ship's footprint.

/// Side length of every board
pub const BOARD_SIZE: usize = 10;

/// Occupancy of a single board cell
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Cell {
    #[default]
    Empty,
    Occupied,
}

/// Outcome recorded for a single shot cell
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Shot {
    #[default]
    Untried,
    Miss,
    Hit,
    SunkHit,
}

impl Shot {
    /// Hit or SunkHit
    pub fn is_hit(self) -> bool {
        matches!(self, Shot::Hit | Shot::SunkHit)
    }
}

/// A participant's own ship layout
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Board {
    cells: [[Cell; BOARD_SIZE]; BOARD_SIZE],
}

impl Board {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cell at (row, col), `None` when out of bounds
    pub fn get(&self, row: usize, col: usize) -> Option<Cell> {
        self.cells.get(row).and_then(|r| r.get(col)).copied()
    }

    pub fn is_occupied(&self, row: usize, col: usize) -> bool {
        self.get(row, col) == Some(Cell::Occupied)
    }

    /// Number of occupied cells on the board
    pub fn occupied_count(&self) -> usize {
        self.cells
            .iter()
            .flatten()
            .filter(|c| **c == Cell::Occupied)
            .count()
    }
}

/// Shots one participant has fired at the opponent's board
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShotGrid {
    cells: [[Shot; BOARD_SIZE]; BOARD_SIZE],
}

impl ShotGrid {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shot at (row, col), `None` when out of bounds
    pub fn get(&self, row: usize, col: usize) -> Option<Shot> {
        self.cells.get(row).and_then(|r| r.get(col)).copied()
    }

    /// Record an outcome; out-of-bounds coordinates are ignored
    pub fn set(&mut self, row: usize, col: usize, shot: Shot) {
        if let Some(cell) = self.cells.get_mut(row).and_then(|r| r.get_mut(col)) {
            *cell = shot;
        }
    }

    pub fn count(&self, shot: Shot) -> usize {
        self.cells.iter().flatten().filter(|s| **s == shot).count()
    }
}

/// Cells covered by a ship of `size` anchored at (row, col)
fn footprint(
    row: usize,
    col: usize,
    size: usize,
    horizontal: bool,
) -> impl Iterator<Item = (usize, usize)> {
    (0..size).map(move |i| {
        if horizontal {
            (row, col + i)
        } else {
            (row + i, col)
        }
    })
}

/// In-bounds cells of the 3×3 block centred on (row, col)
fn neighborhood(row: usize, col: usize) -> impl Iterator<Item = (usize, usize)> {
    let rows = row.saturating_sub(1)..=(row + 1).min(BOARD_SIZE - 1);
    rows.flat_map(move |r| {
        let cols = col.saturating_sub(1)..=(col + 1).min(BOARD_SIZE - 1);
        cols.map(move |c| (r, c))
    })
}

/// Orthogonal in-bounds neighbours of (row, col)
fn orthogonal(row: usize, col: usize) -> impl Iterator<Item = (usize, usize)> {
    let up = row.checked_sub(1).map(|r| (r, col));
    let down = (row + 1 < BOARD_SIZE).then_some((row + 1, col));
    let left = col.checked_sub(1).map(|c| (row, c));
    let right = (col + 1 < BOARD_SIZE).then_some((row, col + 1));
    [up, down, left, right].into_iter().flatten()
}

/// Check whether a ship fits at (row, col)
///
/// The run must stay on the board, every target cell must be empty, and
/// no cell in the 8-neighbourhood of any target cell may be occupied, so
/// ships never touch, not even at a corner.
pub fn can_place(board: &Board, row: usize, col: usize, size: usize, horizontal: bool) -> bool {
    if size == 0 || row >= BOARD_SIZE || col >= BOARD_SIZE {
        return false;
    }
    let end = if horizontal { col + size } else { row + size };
    if end > BOARD_SIZE {
        return false;
    }

    footprint(row, col, size, horizontal)
        .all(|(r, c)| neighborhood(r, c).all(|(nr, nc)| !board.is_occupied(nr, nc)))
}

/// Mark a ship's cells occupied
///
/// Performs no legality check. Callers must gate this behind `can_place`;
/// cells that fall off the board are skipped.
pub fn place(board: &mut Board, row: usize, col: usize, size: usize, horizontal: bool) {
    for (r, c) in footprint(row, col, size, horizontal) {
        if let Some(cell) = board.cells.get_mut(r).and_then(|line| line.get_mut(c)) {
            *cell = Cell::Occupied;
        }
    }
}

/// The 4-connected occupied region containing (row, col)
///
/// Uses an explicit work list; the region is at most one ship long.
fn region(board: &Board, row: usize, col: usize) -> Vec<(usize, usize)> {
    let mut found = Vec::new();
    if !board.is_occupied(row, col) {
        return found;
    }

    let mut visited = [[false; BOARD_SIZE]; BOARD_SIZE];
    let mut stack = vec![(row, col)];
    visited[row][col] = true;

    while let Some((r, c)) = stack.pop() {
        found.push((r, c));
        for (nr, nc) in orthogonal(r, c) {
            if !visited[nr][nc] && board.is_occupied(nr, nc) {
                visited[nr][nc] = true;
                stack.push((nr, nc));
            }
        }
    }

    found
}

/// True iff every cell of the ship containing (row, col) has been hit
///
/// Cells already marked SunkHit count as hit, so the check stays true after
/// `mark_sunk`. An unoccupied target is never sunk.
pub fn sunk(board: &Board, shots: &ShotGrid, row: usize, col: usize) -> bool {
    let cells = region(board, row, col);
    !cells.is_empty()
        && cells
            .iter()
            .all(|&(r, c)| shots.get(r, c).is_some_and(Shot::is_hit))
}

/// Overwrite every cell of the ship containing (row, col) with SunkHit
pub fn mark_sunk(board: &Board, shots: &mut ShotGrid, row: usize, col: usize) {
    for (r, c) in region(board, row, col) {
        shots.set(r, c, Shot::SunkHit);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn board_with(ships: &[(usize, usize, usize, bool)]) -> Board {
        let mut board = Board::new();
        for &(row, col, size, horizontal) in ships {
            assert!(can_place(&board, row, col, size, horizontal));
            place(&mut board, row, col, size, horizontal);
        }
        board
    }

    #[test]
    fn test_can_place_in_bounds() {
        let board = Board::new();
        assert!(can_place(&board, 0, 0, 5, true));
        assert!(can_place(&board, 0, 5, 5, true));
        assert!(can_place(&board, 5, 9, 5, false));
        assert!(!can_place(&board, 0, 6, 5, true));
        assert!(!can_place(&board, 6, 0, 5, false));
        assert!(!can_place(&board, 10, 0, 2, true));
        assert!(!can_place(&board, 0, 0, 0, true));
    }

    #[test]
    fn test_can_place_rejects_overlap() {
        let board = board_with(&[(4, 2, 4, true)]);
        assert!(!can_place(&board, 2, 3, 3, false));
        assert!(!can_place(&board, 4, 5, 2, true));
    }

    #[test]
    fn test_can_place_rejects_adjacency() {
        let board = board_with(&[(4, 4, 2, true)]);

        // side by side
        assert!(!can_place(&board, 5, 4, 2, true));
        // end to end
        assert!(!can_place(&board, 4, 6, 3, true));
        // corner touch
        assert!(!can_place(&board, 5, 6, 2, false));
        assert!(!can_place(&board, 1, 3, 3, false));
    }

    #[test]
    fn test_can_place_accepts_one_cell_gap() {
        let board = board_with(&[(4, 4, 2, true)]);
        assert!(can_place(&board, 6, 4, 2, true));
        assert!(can_place(&board, 4, 7, 3, true));
        assert!(can_place(&board, 0, 3, 3, false));
        assert!(can_place(&board, 6, 7, 3, false));
    }

    #[test]
    fn test_adjacency_exhaustive_around_single_ship() {
        let board = board_with(&[(4, 4, 3, true)]);

        for row in 0..BOARD_SIZE {
            for col in 0..BOARD_SIZE {
                let touches = (3..=5).contains(&row) && (3..=7).contains(&col);
                assert_eq!(
                    can_place(&board, row, col, 1, true),
                    !touches,
                    "cell ({row}, {col})"
                );
            }
        }
    }

    #[test]
    fn test_place_marks_cells() {
        let board = board_with(&[(2, 3, 4, false)]);
        assert_eq!(board.occupied_count(), 4);
        for r in 2..6 {
            assert_eq!(board.get(r, 3), Some(Cell::Occupied));
        }
        assert_eq!(board.get(6, 3), Some(Cell::Empty));
        assert_eq!(board.get(10, 3), None);
    }

    #[test]
    fn test_sunk_requires_every_cell() {
        let board = board_with(&[(1, 1, 3, true), (5, 5, 2, false)]);
        let mut shots = ShotGrid::new();

        shots.set(1, 1, Shot::Hit);
        shots.set(1, 2, Shot::Hit);
        assert!(!sunk(&board, &shots, 1, 2));

        shots.set(1, 3, Shot::Hit);
        assert!(sunk(&board, &shots, 1, 3));
        assert!(sunk(&board, &shots, 1, 1));

        // the other ship is untouched
        assert!(!sunk(&board, &shots, 5, 5));
    }

    #[test]
    fn test_sunk_on_empty_cell_is_false() {
        let board = board_with(&[(1, 1, 2, true)]);
        let shots = ShotGrid::new();
        assert!(!sunk(&board, &shots, 8, 8));
    }

    #[test]
    fn test_mark_sunk_is_idempotent() {
        let board = board_with(&[(3, 6, 3, false)]);
        let mut shots = ShotGrid::new();
        for r in 3..6 {
            shots.set(r, 6, Shot::Hit);
        }

        assert!(sunk(&board, &shots, 4, 6));
        mark_sunk(&board, &mut shots, 4, 6);

        assert_eq!(shots.count(Shot::SunkHit), 3);
        assert_eq!(shots.count(Shot::Hit), 0);
        for r in 3..6 {
            assert!(sunk(&board, &shots, r, 6));
        }

        mark_sunk(&board, &mut shots, 3, 6);
        assert_eq!(shots.count(Shot::SunkHit), 3);
    }

    #[test]
    fn test_mark_sunk_leaves_misses_alone() {
        let board = board_with(&[(0, 0, 2, true)]);
        let mut shots = ShotGrid::new();
        shots.set(0, 0, Shot::Hit);
        shots.set(0, 1, Shot::Hit);
        shots.set(0, 2, Shot::Miss);

        mark_sunk(&board, &mut shots, 0, 0);

        assert_eq!(shots.get(0, 2), Some(Shot::Miss));
        assert_eq!(shots.get(0, 1), Some(Shot::SunkHit));
    }

    /// Bounds plus the 3x3 block around every footprint cell, cell by cell
    fn legal_by_brute_force(
        board: &Board,
        row: usize,
        col: usize,
        size: usize,
        horizontal: bool,
    ) -> bool {
        let cells: Vec<(usize, usize)> = (0..size)
            .map(|i| if horizontal { (row, col + i) } else { (row + i, col) })
            .collect();
        if cells.iter().any(|&(r, c)| r >= BOARD_SIZE || c >= BOARD_SIZE) {
            return false;
        }
        for r in 0..BOARD_SIZE {
            for c in 0..BOARD_SIZE {
                let touches = cells
                    .iter()
                    .any(|&(cr, cc)| cr.abs_diff(r) <= 1 && cc.abs_diff(c) <= 1);
                if touches && board.is_occupied(r, c) {
                    return false;
                }
            }
        }
        true
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(256))]

        #[test]
        fn can_place_matches_brute_force(
            existing in proptest::collection::vec(
                (0..BOARD_SIZE, 0..BOARD_SIZE, 1usize..=5, any::<bool>()),
                0..5,
            ),
            row in 0..BOARD_SIZE + 2,
            col in 0..BOARD_SIZE + 2,
            size in 1usize..=5,
            horizontal in any::<bool>(),
        ) {
            let mut board = Board::new();
            for (r, c, s, h) in existing {
                if can_place(&board, r, c, s, h) {
                    place(&mut board, r, c, s, h);
                }
            }

            prop_assert_eq!(
                can_place(&board, row, col, size, horizontal),
                legal_by_brute_force(&board, row, col, size, horizontal)
            );
        }
    }
}
