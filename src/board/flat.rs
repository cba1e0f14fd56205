use crate::board::number::parse_number;
use crate::spreadsheet::Cell;
use crate::spreadsheet::Grid;
use serde::Serialize;
use tracing::debug;

/// One named row of input/output/gap figures.
/// Also used as a chart point (one day or one aggregated bucket).
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct FlatRecord {
    pub name: String,
    pub input: f64,
    pub output: f64,
    pub gap: f64,
}

impl FlatRecord {
    pub fn new(name: impl Into<String>, input: f64, output: f64, gap: f64) -> Self {
        Self {
            name: name.into(),
            input,
            output,
            gap,
        }
    }
}

/// Header columns recognised in a tall-row sheet.
#[derive(Debug, Default)]
struct Columns {
    name: Option<usize>,
    input: Option<usize>,
    output: Option<usize>,
    gap: Option<usize>,
}

impl Columns {
    fn from_header(header: &[Cell]) -> Self {
        let position = |wanted: &str| {
            header
                .iter()
                .position(|cell| cell.text().eq_ignore_ascii_case(wanted))
        };
        Self {
            name: position("name").or_else(|| position("day")),
            input: position("input"),
            output: position("output"),
            gap: position("gap"),
        }
    }
}

/// Reads a tall table: the first row names the columns, each later non-blank row is a record.
pub fn extract_flat(grid: &Grid) -> Vec<FlatRecord> {
    let Some((header, rows)) = grid.rows().split_first() else {
        return Vec::new();
    };
    let columns = Columns::from_header(header);
    debug!(?columns, "Reading tall rows");

    let mut records = Vec::new();
    for row in rows {
        if row.iter().all(Cell::is_empty) {
            continue;
        }
        let field = |column: Option<usize>| column.and_then(|col| row.get(col));

        let name = match field(columns.name).map(Cell::text) {
            Some(name) if !name.is_empty() => name.into_owned(),
            _ => format!("Row {}", records.len() + 1),
        };
        let input = parse_number(field(columns.input));
        let output = parse_number(field(columns.output));
        let gap = match columns.gap {
            Some(_) => parse_number(field(columns.gap)),
            None => input - output,
        };
        records.push(FlatRecord::new(name, input, output, gap));
    }
    records
}
