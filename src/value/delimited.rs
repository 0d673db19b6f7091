use std::cmp::Ordering;
use std::sync::LazyLock;

use csv::{ReaderBuilder, WriterBuilder};

use crate::ast::TypeKeyword;
use crate::context::EvalContext;
use crate::evaluator::EvalError;
use crate::registry::{Args, OpResult, OpSpec, Registry};
use crate::value::{DataType, DataValue, ListValue, NumberValue};

/// Delimited table. The first record is the header row; row indices used by
/// operations count data rows only, starting at 0.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvValue {
    header: Vec<String>,
    rows: Vec<Vec<String>>,
    delimiter: u8,
}

impl CsvValue {
    pub fn new(header: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        CsvValue {
            header,
            rows,
            delimiter: b',',
        }
    }

    pub fn header(&self) -> &[String] {
        &self.header
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// Column index by header name, falling back to a numeric index.
    fn column_index(&self, column: &str) -> Option<usize> {
        let column = column.trim();
        self.header
            .iter()
            .position(|name| name.trim() == column)
            .or_else(|| column.parse::<usize>().ok())
            .filter(|i| *i < self.header.len())
    }

    fn require_column(&self, column: &str, function: &str) -> Result<usize, EvalError> {
        self.column_index(column)
            .ok_or_else(|| EvalError::InvalidArgument {
                function: function.to_string(),
                reason: format!("no column '{}'", column),
            })
    }

    fn with(self) -> OpResult {
        Ok(Some(self.into_data()))
    }
}

/// CSV delimiter for a list delimiter; non-ASCII delimiters fall back to `,`.
fn byte_delimiter(delimiter: char) -> u8 {
    if delimiter.is_ascii() { delimiter as u8 } else { b',' }
}

impl DataType for CsvValue {
    fn parse(_keyword: TypeKeyword, text: &str, ctx: &EvalContext<'_>) -> Result<Self, String> {
        let delimiter = byte_delimiter(ctx.delimiter());
        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .delimiter(delimiter)
            .from_reader(text.trim().as_bytes());

        let mut records = Vec::new();
        for record in reader.records() {
            let record = record.map_err(|e| format!("Invalid CSV: {}", e))?;
            records.push(record.iter().map(str::to_string).collect::<Vec<_>>());
        }

        let mut records = records.into_iter();
        let header = records.next().unwrap_or_default();
        Ok(CsvValue {
            header,
            rows: records.collect(),
            delimiter,
        })
    }

    fn stringify(&self) -> Option<String> {
        let mut writer = WriterBuilder::new()
            .flexible(true)
            .delimiter(self.delimiter)
            .from_writer(Vec::new());

        if !self.header.is_empty() {
            writer.write_record(&self.header).ok()?;
        }
        for row in &self.rows {
            writer.write_record(row).ok()?;
        }

        let bytes = writer.into_inner().ok()?;
        let text = String::from_utf8(bytes).ok()?;
        Some(text.trim_end_matches(['\r', '\n']).to_string())
    }

    fn keyword(&self) -> TypeKeyword {
        TypeKeyword::Csv
    }

    fn registry() -> &'static Registry<Self> {
        &REGISTRY
    }

    fn into_data(self) -> DataValue {
        DataValue::Csv(self)
    }
}

static REGISTRY: LazyLock<Registry<CsvValue>> =
    LazyLock::new(|| Registry::new(TypeKeyword::Csv, OPERATIONS));

const OPERATIONS: &[OpSpec<CsvValue>] = &[
    OpSpec::fixed("headers", 0, headers),
    OpSpec::fixed("row", 1, row),
    OpSpec::fixed("column", 1, column),
    OpSpec::fixed("rowCount", 0, row_count),
    OpSpec::fixed("columnCount", 0, column_count),
    OpSpec::fixed("filter", 2, filter),
    OpSpec::fixed("sortAscending", 1, sort_ascending),
    OpSpec::fixed("sortDescending", 1, sort_descending),
    OpSpec::variadic("removeRows", 0, remove_rows),
    OpSpec::fixed("delimiter", 1, delimiter),
];

fn headers(csv: CsvValue, _args: &Args, ctx: &mut EvalContext<'_>) -> OpResult {
    Ok(Some(ListValue::new(csv.header, ctx.delimiter()).into_data()))
}

fn row(csv: CsvValue, args: &Args, ctx: &mut EvalContext<'_>) -> OpResult {
    let index = args.int(0, "row")?.unwrap_or(0);
    let found = usize::try_from(index).ok().and_then(|i| csv.rows.get(i));
    Ok(found.map(|cells| ListValue::new(cells.clone(), ctx.delimiter()).into_data()))
}

/// Cells of one column across all data rows; short rows contribute an
/// empty cell.
fn column(csv: CsvValue, args: &Args, ctx: &mut EvalContext<'_>) -> OpResult {
    let Some(index) = csv.column_index(args.get_or(0, "")) else {
        return Ok(None);
    };
    let cells = csv
        .rows
        .iter()
        .map(|row| row.get(index).cloned().unwrap_or_default())
        .collect();
    Ok(Some(ListValue::new(cells, ctx.delimiter()).into_data()))
}

fn row_count(csv: CsvValue, _args: &Args, _ctx: &mut EvalContext<'_>) -> OpResult {
    Ok(Some(NumberValue::from(csv.rows.len() as i64).into_data()))
}

fn column_count(csv: CsvValue, _args: &Args, _ctx: &mut EvalContext<'_>) -> OpResult {
    Ok(Some(NumberValue::from(csv.header.len() as i64).into_data()))
}

/// Keeps the data rows whose `column` equals `value`.
fn filter(mut csv: CsvValue, args: &Args, _ctx: &mut EvalContext<'_>) -> OpResult {
    let index = csv.require_column(args.get_or(0, ""), "filter")?;
    let wanted = args.get_or(1, "");
    csv.rows
        .retain(|row| row.get(index).map(String::as_str).unwrap_or("") == wanted);
    csv.with()
}

fn compare_cells(a: &str, b: &str) -> Ordering {
    match (NumberValue::parse_decimal(a), NumberValue::parse_decimal(b)) {
        (Ok(x), Ok(y)) => x.cmp(&y),
        _ => a.cmp(b),
    }
}

fn sort_rows(mut csv: CsvValue, args: &Args, function: &str, descending: bool) -> OpResult {
    let index = csv.require_column(args.get_or(0, ""), function)?;
    csv.rows.sort_by(|a, b| {
        let x = a.get(index).map(String::as_str).unwrap_or("");
        let y = b.get(index).map(String::as_str).unwrap_or("");
        let order = compare_cells(x, y);
        if descending { order.reverse() } else { order }
    });
    csv.with()
}

fn sort_ascending(csv: CsvValue, args: &Args, _ctx: &mut EvalContext<'_>) -> OpResult {
    sort_rows(csv, args, "sortAscending", false)
}

fn sort_descending(csv: CsvValue, args: &Args, _ctx: &mut EvalContext<'_>) -> OpResult {
    sort_rows(csv, args, "sortDescending", true)
}

/// Drops data rows by index; indices out of range are ignored.
fn remove_rows(mut csv: CsvValue, args: &Args, _ctx: &mut EvalContext<'_>) -> OpResult {
    let mut unwanted = Vec::new();
    for raw in args.rest() {
        let index = raw
            .trim()
            .parse::<usize>()
            .map_err(|_| EvalError::InvalidArgument {
                function: "removeRows".to_string(),
                reason: format!("'{}' is not a row index", raw),
            })?;
        unwanted.push(index);
    }

    let rows = std::mem::take(&mut csv.rows);
    csv.rows = rows
        .into_iter()
        .enumerate()
        .filter(|(i, _)| !unwanted.contains(i))
        .map(|(_, row)| row)
        .collect();
    csv.with()
}

/// Changes the delimiter used when the table is written back out.
fn delimiter(mut csv: CsvValue, args: &Args, _ctx: &mut EvalContext<'_>) -> OpResult {
    let Some(ch) = args.char(0) else {
        return csv.with();
    };
    if !ch.is_ascii() {
        return Err(EvalError::InvalidArgument {
            function: "delimiter".to_string(),
            reason: format!("'{}' is not an ASCII delimiter", ch),
        });
    }
    csv.delimiter = ch as u8;
    csv.with()
}
