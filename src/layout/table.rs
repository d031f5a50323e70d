//! Table - 2-D grid space allocation.
//!
//! # Algorithm
//!
//! Some children report a minimum that depends on the space they are given
//! (wrapped text, aspect-constrained plots), so the offer and the answer are
//! mutually dependent. Allocation is a bounded fixed-point iteration:
//!
//! 1. **Seed**: every child is asked at zero offered space. Fixed-size
//!    children contribute their minimum as the row/column guarantee.
//! 2. **Distribute**: space left after the guarantees is split by weight.
//!    When no row/column carries weight, rows/columns that want more space
//!    share it equally.
//! 3. **Re-query**: every child is asked again at its cell's allocation. The
//!    new guarantees are the per-row/column maxima of those answers.
//! 4. **Repeat** until nothing changes or the iteration cap is reached. The
//!    last allocation is accepted either way.

use super::Sizer;
use crate::error::{check_padding, check_weight, Axis, PlotError, PlotResult};
use crate::types::{point, size, ComponentId, Point, Size, SpaceRequest};

/// Default cap on allocation rounds.
pub const MAX_LAYOUT_ITERATIONS: usize = 5;

// =============================================================================
// Grid
// =============================================================================

/// Sparse grid of child slots with per-row/column weights and paddings.
#[derive(Debug, Clone)]
pub struct TableGrid {
    rows: Vec<Vec<Option<ComponentId>>>,
    row_weights: Vec<f64>,
    col_weights: Vec<f64>,
    row_padding: f64,
    col_padding: f64,
    iteration_limit: usize,
}

impl Default for TableGrid {
    fn default() -> Self {
        Self::new()
    }
}

impl TableGrid {
    pub fn new() -> Self {
        Self {
            rows: Vec::new(),
            row_weights: Vec::new(),
            col_weights: Vec::new(),
            row_padding: 0.0,
            col_padding: 0.0,
            iteration_limit: MAX_LAYOUT_ITERATIONS,
        }
    }

    /// Build from rows of optional cells. Ragged rows are padded with empty
    /// cells; a child appearing twice is rejected.
    pub fn from_rows(rows: Vec<Vec<Option<ComponentId>>>) -> PlotResult<Self> {
        let mut grid = Self::new();
        for (r, row) in rows.into_iter().enumerate() {
            grid.grow(r + 1, 0);
            for (c, cell) in row.into_iter().enumerate() {
                grid.grow(r + 1, c + 1);
                if let Some(id) = cell {
                    if grid.position(id).is_some() {
                        return Err(PlotError::InvalidConfig(format!(
                            "component {id} appears in more than one cell"
                        )));
                    }
                    grid.place(r, c, id)?;
                }
            }
        }
        Ok(grid)
    }

    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn n_cols(&self) -> usize {
        self.col_weights.len()
    }

    pub fn get(&self, row: usize, col: usize) -> Option<ComponentId> {
        self.rows.get(row).and_then(|r| r.get(col)).copied().flatten()
    }

    pub fn position(&self, id: ComponentId) -> Option<(usize, usize)> {
        self.cells().find(|&(_, _, child)| child == id).map(|(r, c, _)| (r, c))
    }

    /// Occupied cells, row-major.
    pub fn cells(&self) -> impl Iterator<Item = (usize, usize, ComponentId)> + '_ {
        self.rows.iter().enumerate().flat_map(|(r, row)| {
            row.iter()
                .enumerate()
                .filter_map(move |(c, cell)| cell.map(|id| (r, c, id)))
        })
    }

    pub fn children(&self) -> Vec<ComponentId> {
        self.cells().map(|(_, _, id)| id).collect()
    }

    /// Put `id` at (row, col), growing the grid when needed.
    pub fn place(&mut self, row: usize, col: usize, id: ComponentId) -> PlotResult<()> {
        if self.get(row, col).is_some() {
            return Err(PlotError::CellOccupied { row, col });
        }
        self.grow(row + 1, col + 1);
        self.rows[row][col] = Some(id);
        Ok(())
    }

    /// Clear the cell holding `id`. Grid dimensions are kept.
    pub fn remove(&mut self, id: ComponentId) -> bool {
        for row in &mut self.rows {
            for cell in row.iter_mut() {
                if *cell == Some(id) {
                    *cell = None;
                    return true;
                }
            }
        }
        false
    }

    /// Enlarge to at least `n_rows` x `n_cols`; new weights are 0.
    pub(crate) fn grow(&mut self, n_rows: usize, n_cols: usize) {
        let n_cols = n_cols.max(self.n_cols());
        if n_rows > self.rows.len() {
            self.rows.resize_with(n_rows, Vec::new);
            self.row_weights.resize(n_rows, 0.0);
        }
        for row in &mut self.rows {
            row.resize(n_cols, None);
        }
        self.col_weights.resize(n_cols, 0.0);
    }

    // =========================================================================
    // Weights / Padding
    // =========================================================================

    pub fn row_weight(&self, row: usize) -> Option<f64> {
        self.row_weights.get(row).copied()
    }

    pub fn col_weight(&self, col: usize) -> Option<f64> {
        self.col_weights.get(col).copied()
    }

    pub fn set_row_weight(&mut self, row: usize, weight: f64) -> PlotResult<()> {
        let weight = check_weight(weight)?;
        let len = self.row_weights.len();
        let slot = self.row_weights.get_mut(row).ok_or(PlotError::IndexOutOfRange {
            axis: Axis::Row,
            index: row,
            len,
        })?;
        *slot = weight;
        Ok(())
    }

    pub fn set_col_weight(&mut self, col: usize, weight: f64) -> PlotResult<()> {
        let weight = check_weight(weight)?;
        let len = self.col_weights.len();
        let slot = self.col_weights.get_mut(col).ok_or(PlotError::IndexOutOfRange {
            axis: Axis::Column,
            index: col,
            len,
        })?;
        *slot = weight;
        Ok(())
    }

    pub fn row_padding(&self) -> f64 {
        self.row_padding
    }

    pub fn col_padding(&self) -> f64 {
        self.col_padding
    }

    /// Gaps between adjacent rows and columns.
    pub fn set_padding(&mut self, row_padding: f64, col_padding: f64) -> PlotResult<()> {
        self.row_padding = check_padding(row_padding)?;
        self.col_padding = check_padding(col_padding)?;
        Ok(())
    }

    pub fn iteration_limit(&self) -> usize {
        self.iteration_limit
    }

    pub fn set_iteration_limit(&mut self, limit: usize) -> PlotResult<()> {
        if limit == 0 {
            return Err(PlotError::InvalidConfig(
                "table iteration limit must be at least 1".into(),
            ));
        }
        self.iteration_limit = limit;
        Ok(())
    }

    fn total_row_padding(&self) -> f64 {
        self.row_padding * self.n_rows().saturating_sub(1) as f64
    }

    fn total_col_padding(&self) -> f64 {
        self.col_padding * self.n_cols().saturating_sub(1) as f64
    }
}

// =============================================================================
// Allocation
// =============================================================================

/// Outcome of one allocation run.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TableLayout {
    pub col_widths: Vec<f64>,
    pub row_heights: Vec<f64>,
    pub guaranteed_widths: Vec<f64>,
    pub guaranteed_heights: Vec<f64>,
    pub wants_width: Vec<bool>,
    pub wants_height: Vec<bool>,
    pub iterations: usize,
    pub converged: bool,
}

struct Guarantees {
    widths: Vec<f64>,
    heights: Vec<f64>,
    wants_width: Vec<bool>,
    wants_height: Vec<bool>,
}

impl Guarantees {
    fn zeroed(n_rows: usize, n_cols: usize) -> Self {
        Self {
            widths: vec![0.0; n_cols],
            heights: vec![0.0; n_rows],
            wants_width: vec![false; n_cols],
            wants_height: vec![false; n_rows],
        }
    }

    fn same_as(&self, other: &Self) -> bool {
        self.widths == other.widths
            && self.heights == other.heights
            && self.wants_width == other.wants_width
            && self.wants_height == other.wants_height
    }
}

/// Run the bounded fixed-point iteration for `offered`.
pub fn iterate_layout(
    sizer: &mut dyn Sizer,
    grid: &TableGrid,
    offered: Size<f64>,
) -> PlotResult<TableLayout> {
    let (n_rows, n_cols) = (grid.n_rows(), grid.n_cols());
    let available_width = (offered.width - grid.total_col_padding()).max(0.0);
    let available_height = (offered.height - grid.total_row_padding()).max(0.0);

    // Seed from fixed children at zero offer. A track whose children are all
    // fixed along it keeps its guarantee and takes no free space.
    let mut guarantees = Guarantees::zeroed(n_rows, n_cols);
    let mut fixed_cols: Vec<Option<bool>> = vec![None; n_cols];
    let mut fixed_rows: Vec<Option<bool>> = vec![None; n_rows];
    for (r, c, child) in grid.cells() {
        let request = sizer.requested_space(child, size(0.0, 0.0))?;
        let (fixed_width, fixed_height) = sizer.is_fixed(child)?;
        if fixed_width {
            guarantees.widths[c] = guarantees.widths[c].max(request.width);
        }
        if fixed_height {
            guarantees.heights[r] = guarantees.heights[r].max(request.height);
        }
        fixed_cols[c] = Some(fixed_cols[c].unwrap_or(true) && fixed_width);
        fixed_rows[r] = Some(fixed_rows[r].unwrap_or(true) && fixed_height);
        guarantees.wants_width[c] |= request.wants_width;
        guarantees.wants_height[r] |= request.wants_height;
    }
    let fixed_cols: Vec<bool> = fixed_cols.into_iter().map(|f| f == Some(true)).collect();
    let fixed_rows: Vec<bool> = fixed_rows.into_iter().map(|f| f == Some(true)).collect();

    let mut iterations = 0;
    let mut converged = false;
    while iterations < grid.iteration_limit() {
        iterations += 1;
        let col_widths = distribute(
            available_width,
            &guarantees.widths,
            &grid.col_weights,
            &guarantees.wants_width,
            &fixed_cols,
        );
        let row_heights = distribute(
            available_height,
            &guarantees.heights,
            &grid.row_weights,
            &guarantees.wants_height,
            &fixed_rows,
        );

        let mut next = Guarantees::zeroed(n_rows, n_cols);
        for (r, c, child) in grid.cells() {
            let request = sizer.requested_space(child, size(col_widths[c], row_heights[r]))?;
            next.widths[c] = next.widths[c].max(request.width);
            next.heights[r] = next.heights[r].max(request.height);
            next.wants_width[c] |= request.wants_width;
            next.wants_height[r] |= request.wants_height;
        }

        converged = next.same_as(&guarantees);
        guarantees = next;
        if converged {
            break;
        }
    }

    if !converged {
        tracing::warn!(
            iterations,
            rows = n_rows,
            cols = n_cols,
            "table layout did not converge, using last allocation"
        );
    }

    Ok(TableLayout {
        col_widths: distribute(
            available_width,
            &guarantees.widths,
            &grid.col_weights,
            &guarantees.wants_width,
            &fixed_cols,
        ),
        row_heights: distribute(
            available_height,
            &guarantees.heights,
            &grid.row_weights,
            &guarantees.wants_height,
            &fixed_rows,
        ),
        guaranteed_widths: guarantees.widths,
        guaranteed_heights: guarantees.heights,
        wants_width: guarantees.wants_width,
        wants_height: guarantees.wants_height,
        iterations,
        converged,
    })
}

/// Guarantees plus a share of whatever is left over. Fixed tracks get no share.
fn distribute(
    available: f64,
    guarantees: &[f64],
    weights: &[f64],
    wants: &[bool],
    fixed: &[bool],
) -> Vec<f64> {
    let mut sizes = guarantees.to_vec();
    let free = available - guarantees.iter().sum::<f64>();
    if free <= 0.0 {
        return sizes;
    }

    let weight_sum: f64 = weights
        .iter()
        .zip(fixed)
        .filter(|&(_, &fixed)| !fixed)
        .map(|(weight, _)| weight)
        .sum();
    if weight_sum > 0.0 {
        for ((size, weight), &fixed) in sizes.iter_mut().zip(weights).zip(fixed) {
            if !fixed {
                *size += free * weight / weight_sum;
            }
        }
        return sizes;
    }

    let wanting = wants.iter().zip(fixed).filter(|&(&w, &f)| w && !f).count();
    if wanting > 0 {
        let share = free / wanting as f64;
        for ((size, &want), &fixed) in sizes.iter_mut().zip(wants).zip(fixed) {
            if want && !fixed {
                *size += share;
            }
        }
    }
    sizes
}

/// Sum of guarantees plus paddings; wants if any row/column wants.
pub fn requested_space(
    sizer: &mut dyn Sizer,
    grid: &TableGrid,
    offered: Size<f64>,
) -> PlotResult<SpaceRequest> {
    let layout = iterate_layout(sizer, grid, offered)?;
    Ok(SpaceRequest {
        width: layout.guaranteed_widths.iter().sum::<f64>() + grid.total_col_padding(),
        height: layout.guaranteed_heights.iter().sum::<f64>() + grid.total_row_padding(),
        wants_width: layout.wants_width.iter().any(|&w| w),
        wants_height: layout.wants_height.iter().any(|&w| w),
    })
}

/// Cell origin (relative to the table) and size for every child.
pub fn placements(
    grid: &TableGrid,
    layout: &TableLayout,
) -> Vec<(ComponentId, Point<f64>, Size<f64>)> {
    let mut col_x = Vec::with_capacity(layout.col_widths.len());
    let mut x = 0.0;
    for width in &layout.col_widths {
        col_x.push(x);
        x += width + grid.col_padding;
    }
    let mut row_y = Vec::with_capacity(layout.row_heights.len());
    let mut y = 0.0;
    for height in &layout.row_heights {
        row_y.push(y);
        y += height + grid.row_padding;
    }

    grid.cells()
        .map(|(r, c, id)| {
            (
                id,
                point(col_x[c], row_y[r]),
                size(layout.col_widths[c], layout.row_heights[r]),
            )
        })
        .collect()
}

/// Fixed along an axis only when every child is.
pub fn is_fixed(sizer: &mut dyn Sizer, grid: &TableGrid) -> PlotResult<(bool, bool)> {
    super::group::is_fixed(sizer, &grid.children())
}
