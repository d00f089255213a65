use crate::types::Record;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Align {
    Left,
    Right,
}

/// Rows over the ordered union of keys, with `None` where a record lacks a key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SparseTable {
    columns: Vec<String>,
    rows: Vec<Vec<Option<String>>>,
}

impl SparseTable {
    /// Build from records in order. Empty records contribute neither
    /// columns nor rows.
    pub fn from_records(records: &[Record]) -> Self {
        let mut columns: Vec<String> = Vec::new();
        for key in records.iter().flat_map(Record::keys) {
            if !columns.iter().any(|c| c == key) {
                columns.push(key.to_string());
            }
        }

        let rows = records
            .iter()
            .filter(|r| !r.is_empty())
            .map(|r| {
                columns
                    .iter()
                    .map(|c| r.get(c).map(str::to_string))
                    .collect()
            })
            .collect();

        Self { columns, rows }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn cell(&self, row: usize, column: &str) -> Option<&str> {
        let idx = self.columns.iter().position(|c| c == column)?;
        self.rows.get(row)?.get(idx)?.as_deref()
    }

    /// Render as a pipe table with a leading unnamed index column.
    pub fn to_markdown(&self) -> String {
        // Index column first, then data columns.
        let mut header = vec![String::new()];
        header.extend(self.columns.iter().map(|c| escape_cell(c)));

        let body: Vec<Vec<String>> = self
            .rows
            .iter()
            .enumerate()
            .map(|(i, row)| {
                let mut cells = vec![i.to_string()];
                cells.extend(row.iter().map(|c| c.as_deref().map(escape_cell).unwrap_or_default()));
                cells
            })
            .collect();

        let mut aligns = vec![Align::Right];
        aligns.extend((0..self.columns.len()).map(|i| self.column_align(i)));

        let widths: Vec<usize> = (0..header.len())
            .map(|i| {
                body.iter()
                    .map(|row| row[i].chars().count())
                    .chain(std::iter::once(header[i].chars().count()))
                    .max()
                    .unwrap_or(0)
                    .max(1)
            })
            .collect();

        let mut out = String::new();
        push_row(&mut out, &header, &widths, &aligns);

        out.push('|');
        for (width, align) in widths.iter().zip(&aligns) {
            let dashes = "-".repeat(width + 1);
            match align {
                Align::Left => out.push_str(&format!(":{}|", dashes)),
                Align::Right => out.push_str(&format!("{}:|", dashes)),
            }
        }
        out.push('\n');

        for row in &body {
            push_row(&mut out, row, &widths, &aligns);
        }

        out
    }

    fn column_align(&self, idx: usize) -> Align {
        let mut present = self.rows.iter().filter_map(|row| row[idx].as_deref()).peekable();
        if present.peek().is_none() {
            return Align::Left;
        }
        if present.all(|v| v.parse::<f64>().is_ok()) {
            Align::Right
        } else {
            Align::Left
        }
    }
}

fn push_row(out: &mut String, cells: &[String], widths: &[usize], aligns: &[Align]) {
    out.push('|');
    for ((cell, width), align) in cells.iter().zip(widths).zip(aligns) {
        let padded = match align {
            Align::Left => format!(" {:<width$} |", cell, width = width),
            Align::Right => format!(" {:>width$} |", cell, width = width),
        };
        out.push_str(&padded);
    }
    out.push('\n');
}

fn escape_cell(value: &str) -> String {
    value.replace('|', "\\|")
}
