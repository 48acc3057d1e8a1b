use crate::error::ChartError;

/// One named series of `(x, y)` points, taken from a single table column.
#[derive(Debug, PartialEq)]
pub struct Series {
    pub name: String,
    pub points: Vec<(f64, f64)>,
}

/// Benchmark results as read from stdin: a tab separated table whose first
/// column is the independent variable and whose remaining columns are named
/// series of measured rates.
#[derive(Debug, PartialEq)]
pub struct ResultTable {
    pub x_label: String,
    pub series: Vec<Series>,
}

pub fn parse(input: &str) -> Result<ResultTable, ChartError> {
    let mut lines = input.lines().enumerate().map(|(i, line)| (i + 1, line));

    let (_, header) = lines
        .next()
        .ok_or_else(|| malformed(1, "missing header row"))?;
    let mut columns = header.split('\t');
    let x_label = columns
        .next()
        .filter(|label| !label.trim().is_empty())
        .ok_or_else(|| malformed(1, "missing independent variable column"))?
        .to_string();
    let names: Vec<&str> = columns.collect();
    if names.is_empty() || names.iter().any(|name| name.trim().is_empty()) {
        return Err(malformed(1, "header must name at least one series"));
    }

    let mut series: Vec<Series> = names
        .into_iter()
        .map(|name| Series {
            name: name.to_string(),
            points: Vec::new(),
        })
        .collect();

    for (line, row) in lines {
        if row.trim().is_empty() {
            continue;
        }
        let fields: Vec<&str> = row.split('\t').collect();
        if fields.len() != series.len() + 1 {
            return Err(malformed(
                line,
                format!(
                    "expected {} columns, found {}",
                    series.len() + 1,
                    fields.len()
                ),
            ));
        }
        let x = parse_number(line, fields[0])?;
        for (column, field) in series.iter_mut().zip(&fields[1..]) {
            column.points.push((x, parse_number(line, field)?));
        }
    }

    if series[0].points.is_empty() {
        return Err(malformed(2, "no data rows"));
    }

    Ok(ResultTable { x_label, series })
}

fn parse_number(line: usize, field: &str) -> Result<f64, ChartError> {
    field
        .trim()
        .parse()
        .map_err(|_| malformed(line, format!("not a number: {field:?}")))
}

fn malformed(line: usize, reason: impl Into<String>) -> ChartError {
    ChartError::MalformedInput {
        line,
        reason: reason.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_single_series_table() {
        let table = parse("message size\trate-A\n10\t5.0\n20\t7.0\n").unwrap();
        assert_eq!(table.x_label, "message size");
        assert_eq!(table.series.len(), 1);
        assert_eq!(table.series[0].name, "rate-A");
        assert_eq!(table.series[0].points, vec![(10.0, 5.0), (20.0, 7.0)]);
    }

    #[test]
    fn parses_multiple_series() {
        let table = parse("message size\tqos0\tqos1\n1\t100.0\t50.0\n").unwrap();
        assert_eq!(table.series.len(), 2);
        assert_eq!(table.series[0].points, vec![(1.0, 100.0)]);
        assert_eq!(table.series[1].points, vec![(1.0, 50.0)]);
    }

    #[test]
    fn non_numeric_field_is_malformed() {
        let err = parse("message size\trate-A\n10\tfast\n").unwrap_err();
        assert!(matches!(
            err,
            ChartError::MalformedInput { line: 2, .. }
        ));
    }

    #[test]
    fn column_count_mismatch_is_malformed() {
        let err = parse("message size\trate-A\n10\t5.0\t7.0\n").unwrap_err();
        assert!(matches!(
            err,
            ChartError::MalformedInput { line: 2, .. }
        ));
    }

    #[test]
    fn empty_input_is_malformed() {
        assert!(matches!(
            parse(""),
            Err(ChartError::MalformedInput { line: 1, .. })
        ));
    }

    #[test]
    fn header_without_series_is_malformed() {
        assert!(matches!(
            parse("message size\n10\n"),
            Err(ChartError::MalformedInput { line: 1, .. })
        ));
    }

    #[test]
    fn table_without_data_rows_is_malformed() {
        assert!(matches!(
            parse("message size\trate-A\n"),
            Err(ChartError::MalformedInput { line: 2, .. })
        ));
    }

    #[test]
    fn blank_lines_are_skipped() {
        let table = parse("message size\trate-A\n10\t5.0\n\n20\t7.0\n").unwrap();
        assert_eq!(table.series[0].points.len(), 2);
    }
}
