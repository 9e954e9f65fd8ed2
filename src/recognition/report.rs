//! Reader for the delimited HR report
//!
//! The saved report is comma-separated with `"`-quoted fields. Exports may
//! carry a title line before the header, so rows start at the first line
//! holding an `Employee Id` column.

use super::EmployeeRecord;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReportError {
    #[error("report has no header row with an 'Employee Id' column")]
    MissingHeader,

    #[error("report header lacks the '{0}' column")]
    MissingColumn(&'static str),
}

const EMPLOYEE_ID: &str = "Employee Id";
const FIRST_NAME: &str = "First Name";
const LAST_NAME: &str = "Last Name";
const DATE_BIRTHDAY: &str = "Date Birthday";
const DATE_HIRED: &str = "Date Hired";
const EMPLOYEE_STATUS: &str = "Employee Status";
const IN_PAYROLL: &str = "In Payroll";
const BADGE_TYPE: &str = "Badge Type";

/// Row-at-a-time parser over an in-memory report
pub struct ReportParser<'a> {
    data: &'a [u8],
    pos: usize,
    delimiter: u8,
    quote: u8,
}

impl<'a> ReportParser<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        ReportParser {
            data,
            pos: 0,
            delimiter: b',',
            quote: b'"',
        }
    }

    /// Parse the next row, `None` at end of input
    pub fn parse_row(&mut self) -> Option<Vec<String>> {
        if self.pos >= self.data.len() {
            return None;
        }

        let mut fields = Vec::new();
        let mut in_quotes = false;
        let mut current_field = Vec::new();

        while self.pos < self.data.len() {
            let byte = self.data[self.pos];
            self.pos += 1;

            match byte {
                b'\n' if !in_quotes => {
                    finish_field(&mut current_field, &mut fields);
                    return Some(fields);
                },
                // CRLF: skip CR, let LF end the line
                b'\r' if !in_quotes => {},
                quote if quote == self.quote => {
                    if in_quotes && self.data.get(self.pos) == Some(&self.quote) {
                        // Doubled quote
                        current_field.push(self.quote);
                        self.pos += 1;
                    } else {
                        in_quotes = !in_quotes;
                    }
                },
                delim if delim == self.delimiter && !in_quotes => {
                    finish_field(&mut current_field, &mut fields);
                },
                _ => current_field.push(byte),
            }
        }

        finish_field(&mut current_field, &mut fields);
        Some(fields)
    }
}

impl Iterator for ReportParser<'_> {
    type Item = Vec<String>;

    fn next(&mut self) -> Option<Self::Item> {
        self.parse_row()
    }
}

fn finish_field(current_field: &mut Vec<u8>, fields: &mut Vec<String>) {
    let field_bytes = std::mem::take(current_field);
    let field = String::from_utf8_lossy(&field_bytes);
    fields.push(field.trim().to_string());
}

/// Column positions resolved from the header row
struct Columns {
    id: usize,
    first_name: usize,
    last_name: usize,
    birth_date: usize,
    hire_date: usize,
    status: Option<usize>,
    in_payroll: Option<usize>,
    badge_type: Option<usize>,
}

impl Columns {
    fn from_header(header: &[String]) -> Result<Self, ReportError> {
        let find = |name: &str| header.iter().position(|h| h.trim_start_matches('\u{feff}') == name);
        let require = |name: &'static str| find(name).ok_or(ReportError::MissingColumn(name));

        Ok(Columns {
            id: require(EMPLOYEE_ID)?,
            first_name: require(FIRST_NAME)?,
            last_name: require(LAST_NAME)?,
            birth_date: require(DATE_BIRTHDAY)?,
            hire_date: require(DATE_HIRED)?,
            status: find(EMPLOYEE_STATUS),
            in_payroll: find(IN_PAYROLL),
            badge_type: find(BADGE_TYPE),
        })
    }

    fn record(&self, row: &[String]) -> EmployeeRecord {
        let cell = |idx: usize| row.get(idx).cloned().unwrap_or_default();
        let optional = |idx: Option<usize>| idx.map(cell).unwrap_or_default();

        EmployeeRecord {
            id: cell(self.id),
            first_name: cell(self.first_name),
            last_name: cell(self.last_name),
            birth_date: cell(self.birth_date),
            hire_date: cell(self.hire_date),
            status: optional(self.status),
            in_payroll: optional(self.in_payroll),
            badge_type: optional(self.badge_type),
        }
    }
}

/// Parse a report into employee records, one per data row, in file order.
///
/// Blank lines are skipped. Rows are not deduplicated.
pub fn parse_report(text: &str) -> Result<Vec<EmployeeRecord>, ReportError> {
    let mut rows = ReportParser::new(text.as_bytes())
        .filter(|row| row.iter().any(|field| !field.is_empty()));

    let header = rows
        .by_ref()
        .find(|row| {
            row.iter()
                .any(|field| field.trim_start_matches('\u{feff}') == EMPLOYEE_ID)
        })
        .ok_or(ReportError::MissingHeader)?;
    let columns = Columns::from_header(&header)?;

    Ok(rows.map(|row| columns.record(&row)).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    const REPORT: &str = "Birthday and Anniversary Report\r\n\
Employee Id,First Name,Last Name,Date Birthday,Date Hired,Employee Status,In Payroll,Badge Type\r\n\
1001,Alice,Smith,06/04/1990,01/15/2015,Active,Yes,Standard\r\n\
1002,\"O'Neil, Jr.\",\"Bob \"\"BJ\"\"\",07/01/1985,06/02/2005,Active,Yes,Standard\r\n\
\r\n\
1003,Charlie,Brown,06/03/1980,06/03/2010,Active,No,Contractor\r\n";

    #[test]
    fn test_parse_row_quoting() {
        let mut parser = ReportParser::new(b"a,\"b,c\",\"say \"\"hi\"\"\"\nlast");
        assert_eq!(parser.parse_row().unwrap(), ["a", "b,c", "say \"hi\""]);
        assert_eq!(parser.parse_row().unwrap(), ["last"]);
        assert!(parser.parse_row().is_none());
    }

    #[test]
    fn test_newline_inside_quotes() {
        let rows: Vec<Vec<String>> = ReportParser::new(b"\"two\nlines\",x\r\n").collect();
        assert_eq!(rows, vec![vec!["two\nlines".to_string(), "x".to_string()]]);
    }

    #[test]
    fn test_parse_report_skips_title_and_blank_lines() {
        let records = parse_report(REPORT).unwrap();
        assert_eq!(records.len(), 3);

        assert_eq!(records[0].id, "1001");
        assert_eq!(records[0].birth_date, "06/04/1990");
        assert_eq!(records[1].first_name, "O'Neil, Jr.");
        assert_eq!(records[1].last_name, "Bob \"BJ\"");
        assert_eq!(records[2].badge_type, "Contractor");
        assert_eq!(records[2].in_payroll, "No");
    }

    #[test]
    fn test_duplicates_are_kept() {
        let text = "Employee Id,First Name,Last Name,Date Birthday,Date Hired\n\
7,Dana,Lee,01/01/1990,01/01/2020\n\
7,Dana,Lee,01/01/1990,01/01/2020\n";
        let records = parse_report(text).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0], records[1]);
        assert_eq!(records[0].status, "");
    }

    #[test]
    fn test_missing_header() {
        assert_eq!(
            parse_report("Name,Birthday\nAlice,06/04/1990\n"),
            Err(ReportError::MissingHeader)
        );
        assert_eq!(
            parse_report("Employee Id,First Name,Last Name,Date Birthday\n"),
            Err(ReportError::MissingColumn(DATE_HIRED))
        );
    }

    #[test]
    fn test_short_rows_fill_empty() {
        let records =
            parse_report("Employee Id,First Name,Last Name,Date Birthday,Date Hired\n9,Eve\n").unwrap();
        assert_eq!(records[0].first_name, "Eve");
        assert_eq!(records[0].birth_date, "");
    }
}
