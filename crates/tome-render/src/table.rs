//! Two-phase table layout.
//!
//! On entering a table every cell is measured and the widest cell of each
//! column is recorded against all cells of that column. Emission then pads
//! each cell to its column width according to the column alignment.

use tome_ast::{Align, NodeId, NodeType};

use crate::renderer::{CellWidth, Dialect, Renderer};
use crate::util::show_len;

/// Cell width function used during measurement.
pub(crate) type WidthFn<D> = fn(&mut Renderer<'_, D>, NodeId) -> usize;

/// Width of a cell's content as the dialect renders it.
pub(crate) fn rendered_width<D: Dialect>(r: &mut Renderer<'_, D>, cell: NodeId) -> usize {
    show_len(&r.measure_children(cell))
}

/// Width of a cell's plain text.
pub(crate) fn text_width<D: Dialect>(r: &mut Renderer<'_, D>, cell: NodeId) -> usize {
    show_len(&r.tree().text(cell))
}

/// Header separator cell for a column, including its leading pipe.
pub(crate) fn separator_cell(align: Align, max: usize) -> String {
    match align {
        Align::None => format!("| -{} ", "-".repeat(max.saturating_sub(1))),
        Align::Left => format!("| :-{} ", "-".repeat(max.saturating_sub(2))),
        Align::Center => format!("| :-{}: ", "-".repeat(max.saturating_sub(3))),
        Align::Right => format!("| -{}: ", "-".repeat(max.saturating_sub(2))),
    }
}

/// Spaces before and after a cell's content.
pub(crate) fn cell_padding(align: Align, padding: usize) -> (usize, usize) {
    match align {
        Align::Center => (padding / 2, padding - padding / 2),
        Align::Right => (padding, 0),
        Align::None | Align::Left => (0, padding),
    }
}

impl<D: Dialect> Renderer<'_, D> {
    /// Measure every cell of `table` and record column widths.
    ///
    /// Returns `false`, after logging, when the table has no header row or the
    /// header has no cells; such tables are skipped.
    pub(crate) fn measure_table(&mut self, table: NodeId, width: WidthFn<D>) -> bool {
        let tree = self.tree();
        let header = tree
            .child_of_kind(table, NodeType::TableHead)
            .and_then(|head| tree[head].first_child());
        let Some(header) = header else {
            tracing::debug!(dialect = D::NAME, "Skipping table without header row");
            return false;
        };

        let mut rows: Vec<Vec<NodeId>> = vec![tree.children(header).collect()];
        rows.extend(
            tree.children(table)
                .filter(|&row| tree[row].kind == NodeType::TableRow)
                .map(|row| tree.children(row).collect()),
        );
        let columns = rows[0].len();
        if columns == 0 {
            tracing::debug!(dialect = D::NAME, "Skipping table without header cells");
            return false;
        }

        let mut widths: Vec<Vec<usize>> = Vec::with_capacity(rows.len());
        for row in &rows {
            let mut row_widths = Vec::with_capacity(columns);
            for &cell in row.iter().take(columns) {
                row_widths.push(width(self, cell));
            }
            widths.push(row_widths);
        }

        let mut header_widths = Vec::with_capacity(columns);
        for col in 0..columns {
            let max = widths
                .iter()
                .filter_map(|row| row.get(col))
                .copied()
                .max()
                .unwrap_or(0);
            let scratch = self.scratch_mut();
            for (row, row_widths) in rows.iter().zip(&widths) {
                if let (Some(&cell), Some(&content)) = (row.get(col), row_widths.get(col)) {
                    scratch.cells.insert(cell, CellWidth { content, max });
                }
            }
            header_widths.push(CellWidth { content: 0, max });
        }
        tracing::trace!(dialect = D::NAME, columns, rows = rows.len(), "Measured table");
        self.scratch_mut().columns.insert(table, header_widths);
        true
    }

    /// Measured widths of a cell; `None` for cells beyond the header's columns.
    pub(crate) fn cell_width(&self, cell: NodeId) -> Option<CellWidth> {
        self.scratch().cells.get(&cell).copied()
    }

    /// Column widths of the cells `row` is missing relative to the header.
    pub(crate) fn missing_cells(&self, row: NodeId) -> Vec<CellWidth> {
        let tree = self.tree();
        let Some(table) = tree.ancestors(row).find(|&a| tree[a].kind == NodeType::Table) else {
            return Vec::new();
        };
        let Some(columns) = self.scratch().columns.get(&table) else {
            return Vec::new();
        };
        let present = tree.children(row).count();
        columns.iter().skip(present).copied().collect()
    }
}
