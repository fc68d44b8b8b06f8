//! Grid geometry: window count -> rows x cols, grid + screen -> per-cell bounds.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::GridError;

/// Rows x columns partition of the screen. `rows * cols` is always at least
/// the number of windows the layout was computed for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridLayout {
    pub rows: usize,
    pub cols: usize,
}

impl GridLayout {
    pub fn new(rows: usize, cols: usize) -> Self {
        Self { rows, cols }
    }

    pub fn cells(self) -> usize {
        self.rows * self.cols
    }
}

impl fmt::Display for GridLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.rows, self.cols)
    }
}

impl FromStr for GridLayout {
    type Err = GridError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_layout(s)
    }
}

/// Usable display rectangle, top-left origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScreenRect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl ScreenRect {
    pub const FALLBACK: Self = Self {
        x: 0,
        y: 0,
        width: 1920,
        height: 1080,
    };

    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Half-open containment: `x in [sx, sx+sw)`, `y in [sy, sy+sh)`.
    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.x && x < self.x + self.width && y >= self.y && y < self.y + self.height
    }
}

/// Pixel rectangle for one grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WindowBounds {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl WindowBounds {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> i32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> i32 {
        self.y + self.height
    }
}

/// Pick a layout for `count` windows.
///
/// 1-3 windows sit in a single row. From 4 up the layout is the closest to
/// square among candidates that are never taller than wide; ties keep the
/// candidate with more rows.
pub fn calculate_grid(count: usize) -> GridLayout {
    if count == 0 {
        return GridLayout::new(1, 1);
    }
    if count <= 3 {
        return GridLayout::new(1, count);
    }

    let side = ceil_sqrt(count);
    let mut best: Option<(usize, GridLayout)> = None;

    for rows in (1..=side).rev() {
        let cols = count.div_ceil(rows);
        if cols < rows {
            continue;
        }
        let diff = cols - rows;
        if best.is_none_or(|(best_diff, _)| diff < best_diff) {
            best = Some((diff, GridLayout::new(rows, cols)));
        }
    }

    best.map(|(_, layout)| layout)
        .unwrap_or(GridLayout::new(side, side))
}

fn ceil_sqrt(n: usize) -> usize {
    let mut s = (n as f64).sqrt() as usize;
    while s * s < n {
        s += 1;
    }
    while s > 1 && (s - 1) * (s - 1) >= n {
        s -= 1;
    }
    s
}

/// Split `screen` into `grid.rows * grid.cols` cells, row-major.
///
/// Cells are `width / cols` by `height / rows`; the truncation remainder goes
/// to the last column and last row so the cells cover the screen exactly.
/// Trailing cells beyond `count` are still returned.
pub fn calculate_window_bounds(
    grid: GridLayout,
    screen: ScreenRect,
    count: usize,
) -> Vec<WindowBounds> {
    let rows = grid.rows.max(1);
    let cols = grid.cols.max(1);
    let total = rows * cols;
    if total < count {
        tracing::debug!("layout {rows}x{cols} has {total} cells for {count} windows");
    }

    let cell_width = screen.width / cols as i32;
    let cell_height = screen.height / rows as i32;
    let extra_width = screen.width % cols as i32;
    let extra_height = screen.height % rows as i32;

    (0..total)
        .map(|i| {
            let row = i / cols;
            let col = i % cols;
            let mut width = cell_width;
            let mut height = cell_height;
            if col == cols - 1 {
                width += extra_width;
            }
            if row == rows - 1 {
                height += extra_height;
            }
            WindowBounds::new(
                screen.x + col as i32 * cell_width,
                screen.y + row as i32 * cell_height,
                width,
                height,
            )
        })
        .collect()
}

/// Smallest width and height among the first `count` cells.
pub fn min_cell_size(bounds: &[WindowBounds], count: usize) -> (i32, i32) {
    let used = &bounds[..count.min(bounds.len())];
    let width = used.iter().map(|b| b.width).min().unwrap_or(0);
    let height = used.iter().map(|b| b.height).min().unwrap_or(0);
    (width, height)
}

/// Parse `"<rows>x<cols>"`, case-insensitive.
pub fn parse_layout(s: &str) -> Result<GridLayout, GridError> {
    let normalized = s.to_ascii_lowercase();
    let parts: Vec<&str> = normalized.split('x').collect();
    if parts.len() != 2 {
        return Err(GridError::InvalidFormat(s.to_string()));
    }

    let rows = parse_axis("rows", parts[0])?;
    let cols = parse_axis("cols", parts[1])?;
    if rows <= 0 || cols <= 0 {
        return Err(GridError::NonPositive { rows, cols });
    }

    Ok(GridLayout::new(rows as usize, cols as usize))
}

fn parse_axis(axis: &'static str, raw: &str) -> Result<i64, GridError> {
    raw.trim()
        .parse::<i64>()
        .map_err(|_| GridError::InvalidNumber {
            axis,
            value: raw.to_string(),
        })
}
