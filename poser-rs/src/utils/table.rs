//! Table formatting utilities

use avatar_poser::{AxisMapping, AxisNegation};
use prettytable::{Cell, Row, Table};

/// Create a table with bold headers
pub fn create_table(headers: &[&str]) -> Table {
    let mut table = Table::new();
    table.set_format(*prettytable::format::consts::FORMAT_NO_LINESEP_WITH_TITLE);

    let header_cells: Vec<Cell> = headers
        .iter()
        .map(|h| Cell::new(h).style_spec("b"))
        .collect();
    table.set_titles(Row::new(header_cells));

    table
}

/// Add a row to a table
pub fn add_table_row(table: &mut Table, cells: Vec<String>) {
    let row_cells: Vec<Cell> = cells.into_iter().map(|s| Cell::new(&s)).collect();
    table.add_row(Row::new(row_cells));
}

/// Format an optional triple, `-` when absent
pub fn format_triple(value: Option<[f64; 3]>) -> String {
    value.map_or_else(
        || "-".to_string(),
        |[x, y, z]| format!("{x:.3}, {y:.3}, {z:.3}"),
    )
}

/// Format an axis mapping as `Swap [NEG|NEG]`
pub fn format_mapping(mapping: AxisMapping) -> String {
    if mapping.negation.is_empty() {
        format!("{:?}", mapping.swap)
    } else {
        format!("{:?} [{}]", mapping.swap, format_negation(mapping.negation))
    }
}

fn format_negation(negation: AxisNegation) -> String {
    negation
        .iter_names()
        .map(|(name, _)| name)
        .collect::<Vec<_>>()
        .join("|")
}

#[cfg(test)]
mod tests {
    use super::*;
    use avatar_poser::AxisSwap;

    #[test]
    fn test_format_triple() {
        assert_eq!(format_triple(None), "-");
        assert_eq!(format_triple(Some([1.0, -0.5, 0.25])), "1.000, -0.500, 0.250");
    }

    #[test]
    fn test_format_mapping() {
        assert_eq!(format_mapping(AxisMapping::CANONICAL), "Nothing");
        assert_eq!(
            format_mapping(AxisMapping::new(
                AxisSwap::YawAndRoll,
                AxisNegation::YAW | AxisNegation::ROLL
            )),
            "YawAndRoll [YAW|ROLL]"
        );
    }
}
