#![forbid(unsafe_code)]

//! Naming plan for a rectangular grid of child locations.

/// Columns are labelled `A..=Z`.
pub const MAX_COLUMNS: u32 = 26;

/// Upper bound on `rows * columns` for one request.
pub const MAX_SECTIONS: u64 = 1_000;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GridSpec {
    pub rows: u32,
    pub columns: u32,
    pub locator_prefix: String,
    pub name_prefix: String,
    pub zero_based: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlannedSection {
    pub locator: String,
    pub name: String,
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum GridError {
    #[error("cannot create more than {MAX_COLUMNS} columns (requested {columns})")]
    TooManyColumns { columns: u32 },
    #[error("cannot create more than {MAX_SECTIONS} sections at once (requested {cells})")]
    TooManySections { cells: u64 },
}

/// One section per cell, columns outermost and rows varying fastest.
///
/// A single column gets no letter and a single row gets no number, except for a 1x1 grid,
/// which keeps its row number so the child is distinguishable from its parent prefix.
pub fn plan_sections(spec: &GridSpec) -> Result<Vec<PlannedSection>, GridError> {
    if spec.columns > MAX_COLUMNS {
        return Err(GridError::TooManyColumns {
            columns: spec.columns,
        });
    }

    let cells = u64::from(spec.rows) * u64::from(spec.columns);
    if cells > MAX_SECTIONS {
        return Err(GridError::TooManySections { cells });
    }

    let mut out = Vec::new();
    for column in 0..spec.columns {
        let column_label = column_label(column, spec.columns);
        for row in 0..spec.rows {
            let row_label = row_label(row, spec);
            let locator = format!("{}{row_label}{column_label}", spec.locator_prefix);
            let name = format!("{} {locator}", spec.name_prefix);
            out.push(PlannedSection { locator, name });
        }
    }
    Ok(out)
}

fn column_label(index: u32, columns: u32) -> String {
    if columns == 1 {
        return String::new();
    }
    char::from_u32(u32::from('A') + index)
        .map(String::from)
        .unwrap_or_default()
}

fn row_label(index: u32, spec: &GridSpec) -> String {
    let single_cell = spec.rows == 1 && spec.columns == 1;
    if spec.rows == 1 && !single_cell {
        return String::new();
    }
    let number = if spec.zero_based { index } else { index + 1 };
    number.to_string()
}
