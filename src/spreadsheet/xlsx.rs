use crate::error::BoardError;
use crate::error::ResultMessage;
use crate::helpers::xml::XmlAttributeHelper;
use crate::helpers::xml::XmlNodeHelper;
use crate::helpers::xml::XmlReader;
use crate::helpers::xml::XmlTextContextHelper;
use crate::helpers::zip::ZipHelper;
use crate::match_xml_events;
use crate::spreadsheet::cell::to_error_value;
use crate::spreadsheet::cell::Cell;
use crate::spreadsheet::grid::Grid;
use crate::spreadsheet::grid::GridBuilder;
use crate::spreadsheet::reference::in_sheet_bounds;
use crate::spreadsheet::reference::index_to_reference;
use crate::spreadsheet::reference::reference_to_index;
use crate::spreadsheet::reference::MAX_ROWS;
use crate::spreadsheet::SpreadsheetError;
use quick_xml::events::Event;
use quick_xml::name::QName;
use std::borrow::Cow;
use std::collections::HashMap;
use std::io::BufRead;
use std::io::Cursor;
use zip::ZipArchive;

// XML tag names for parsing Excel XLSX format
const TAG_RELATIONSHIP: &[u8] = b"Relationship";     // Workbook relationship entry
const TAG_SHARED_STRING_ITEM: QName = QName(b"si");   // Shared string table item
const TAG_PHONETIC_TEXT: QName = QName(b"rPh");       // Phonetic text for Asian languages
const TAG_TEXT: QName = QName(b"t");                  // Text content within strings
const TAG_SHEET: QName = QName(b"sheet");             // Worksheet definition
const TAG_ROW: QName = QName(b"row");                 // Row in worksheet
const TAG_CELL: QName = QName(b"c");                  // Cell in worksheet
const TAG_INLINE_STRING: QName = QName(b"is");        // Inline string value
const TAG_VALUE: QName = QName(b"v");                 // Cell value content

/// Cell value kinds named by the `t` attribute of a worksheet cell.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
enum CellType {
    #[default]
    Empty,
    Number,
    Boolean,
    IsoDateTime,
    InlineString,
    SharedString,
    Error,
}

impl CellType {
    fn parse(t: Option<&str>) -> Self {
        match t {
            Some("inlineStr") | Some("str") => CellType::InlineString,
            Some("s") => CellType::SharedString,
            Some("d") => CellType::IsoDateTime,
            Some("b") => CellType::Boolean,
            Some("e") => CellType::Error,
            _ => CellType::Number,
        }
    }
}

/// An Excel 2007+ workbook opened from an in-memory upload
pub(crate) struct XlsxWorkbook<'a> {
    zip: ZipArchive<Cursor<&'a [u8]>>,
    /// Worksheets in workbook order as (name, zip_path) pairs
    sheets: Vec<(String, String)>,
}

impl<'a> XlsxWorkbook<'a> {
    pub(crate) fn open(file_name: &str, bytes: &'a [u8]) -> Result<XlsxWorkbook<'a>, BoardError> {
        let mut zip = ZipArchive::new(Cursor::new(bytes))?;
        let sheets = load_workbook(&mut zip)?;
        if sheets.is_empty() {
            Err(SpreadsheetError::SpreadsheetEmptyError(file_name.to_owned()))?
        }
        Ok(XlsxWorkbook { zip, sheets })
    }

    pub(crate) fn sheet_names(&self) -> Vec<&str> {
        self.sheets.iter().map(|(name, _)| name.as_str()).collect()
    }

    /// Decodes the first worksheet into a grid.
    pub(crate) fn first_sheet(&mut self) -> Result<Grid, BoardError> {
        let (sheet_name, zip_path) = self.sheets[0].clone();
        let shared_strings = self.load_shared_strings()?;
        let mut reader = self.zip.xml_reader(&zip_path)?
            .ok_or_else(|| SpreadsheetError::FileError(zip_path.to_owned()))?;

        let mut grid = GridBuilder::new();
        let mut row_count = 0usize;
        let mut col_count = 0usize;
        let mut row = 0usize;
        let mut col = 0usize;
        let mut kind = CellType::default();
        let mut value = String::new();
        match_xml_events!(reader => {
            Event::Start(event) if event.name() == TAG_ROW => {
                if let Some(number) = event.parse_attribute_value::<usize>("r")? {
                    if !(1..=MAX_ROWS).contains(&number) {
                        return invalid_reference(&sheet_name, format!("row {}", number));
                    }
                    row_count = number - 1;
                }
                col_count = 0;
            }
            Event::End(event) if event.name() == TAG_ROW => {
                row_count += 1;
                col_count = 0;
            }
            Event::Start(event) if event.name() == TAG_CELL => {
                (row, col) = match event.get_attribute_value("r")? {
                    Some(reference) => match reference_to_index(&reference) {
                        Some(position) => position,
                        None => return invalid_reference(&sheet_name, reference.to_string()),
                    },
                    None => (row_count, col_count),
                };
                if !in_sheet_bounds(row, col) {
                    return invalid_reference(&sheet_name, format!("R{}C{}", row + 1, col + 1));
                }
                col_count = col + 1;
                kind = CellType::parse(event.get_attribute_value("t")?.as_deref());
                value.clear();
            }
            Event::Start(event) if kind != CellType::Empty && event.name() == TAG_INLINE_STRING => {
                value = read_string_value(&mut reader, TAG_INLINE_STRING, false)?;
            }
            Event::Start(event) if kind != CellType::Empty && event.name() == TAG_VALUE => {
                value = read_string_value(&mut reader, TAG_VALUE, true)?;
            }
            Event::End(event) if event.name() == TAG_CELL => {
                if kind != CellType::Empty && !value.is_empty() {
                    let cell = to_cell(kind, &value, &shared_strings)
                        .with_prefix(&format!("{}!{}", sheet_name, index_to_reference(row, col)))?;
                    grid.push(row, col, cell);
                }
                kind = CellType::Empty;
                value.clear();
            }
        });
        Ok(grid.finish())
    }

    /// Loads the shared string table; workbooks without one have no shared strings.
    fn load_shared_strings(&mut self) -> Result<Vec<String>, BoardError> {
        let mut shared_strings = Vec::<String>::new();
        let mut reader = match self.zip.xml_reader("xl/sharedStrings.xml")? {
            Some(reader) => reader,
            None => return Ok(shared_strings),
        };
        match_xml_events!(reader => {
            Event::Start(event) if event.name() == TAG_SHARED_STRING_ITEM => {
                let string = read_string_value(&mut reader, TAG_SHARED_STRING_ITEM, false)?;
                shared_strings.push(string);
            }
        });
        Ok(shared_strings)
    }
}

/// Cell positions outside the worksheet limits are rejected before anything is laid out.
fn invalid_reference<T>(sheet_name: &str, reference: String) -> Result<T, BoardError> {
    Err(BoardError::from(SpreadsheetError::InvalidReference(reference))).with_prefix(sheet_name)
}

fn to_cell(kind: CellType, value: &str, shared_strings: &[String]) -> Result<Cell, BoardError> {
    let cell = match kind {
        CellType::Empty => Cell::Empty,
        CellType::Number => match value.trim().parse::<f64>() {
            Ok(number) => Cell::Number(number),
            Err(_) => Cell::from(value),
        },
        CellType::Boolean => Cell::from(if value == "1" { "TRUE" } else { "FALSE" }),
        CellType::IsoDateTime | CellType::InlineString => Cell::from(value),
        CellType::SharedString => {
            let index = value.trim().parse::<usize>()?;
            let string = shared_strings
                .get(index)
                .ok_or(SpreadsheetError::SharedStringMissing(index))?;
            Cell::from(string.as_str())
        }
        CellType::Error => Cell::from(to_error_value(value)),
    };
    Ok(cell)
}

/// Parses `xl/workbook.xml` and its relationships into (name, zip_path) pairs, in sheet order
fn load_workbook(zip: &mut ZipArchive<Cursor<&[u8]>>) -> Result<Vec<(String, String)>, BoardError> {
    let relationships = load_relationships(zip, "xl/_rels/workbook.xml.rels")?;
    let mut reader = zip.xml_reader("xl/workbook.xml")?
        .ok_or_else(|| SpreadsheetError::FileError("xl/workbook.xml".to_string()))?;
    let mut sheets: Vec<(String, String)> = Vec::new();
    match_xml_events!(reader => {
        Event::Start(event) if event.name() == TAG_SHEET => {
            let mut name = None::<Cow<str>>;
            let mut id = None::<Cow<str>>;
            for result in event.attributes() {
                let attribute = result?;
                let key = attribute.key.local_name();
                if key.as_ref() == b"name" {
                    name = Some(attribute.get_value()?);
                } else if key.as_ref() == b"id" {
                    id = Some(attribute.get_value()?);
                }
            }
            if let Some((name, id)) = name.zip(id) {
                if let Some(path) = relationships.get(&*id) {
                    sheets.push((name.to_string(), path.to_owned()));
                }
            }
        }
    });
    Ok(sheets)
}

/// Maps worksheet relationship ids to archive paths
fn load_relationships(zip: &mut ZipArchive<Cursor<&[u8]>>, path: &str) -> Result<HashMap<String, String>, BoardError> {
    let mut reader = zip.xml_reader(path)?
        .ok_or_else(|| SpreadsheetError::FileError(path.to_string()))?;
    let mut relationships: HashMap<String, String> = HashMap::new();
    match_xml_events!(reader => {
        Event::Start(event) if event.local_name().as_ref() == TAG_RELATIONSHIP => {
            let id = event.get_attribute_value("Id")?;
            let kind = event.get_attribute_value("Type")?;
            let target = event.get_attribute_value("Target")?;
            if kind.map(|it| it.ends_with("/worksheet")).unwrap_or(true) {
                if let Some((id, target)) = id.zip(target) {
                    relationships.insert(id.to_string(), to_zip_path(target));
                }
            }
        }
    });
    Ok(relationships)
}

/// Resolves a relationship target against the `xl/` folder of the archive
fn to_zip_path(path: Cow<'_, str>) -> String {
    if let Some(absolute) = path.strip_prefix('/') {
        absolute.to_string()
    } else if path.starts_with("xl/") {
        path.to_string()
    } else {
        format!("xl/{path}")
    }
}

/// Reads text content up to `end_tag`, skipping phonetic annotations
fn read_string_value<R: BufRead>(
    reader: &mut XmlReader<R>,
    end_tag: QName,
    is_text_content: bool,
) -> Result<String, BoardError> {
    let mut is_phonetic_text = false;
    let mut is_text = is_text_content;
    let mut text = String::new();
    match_xml_events!(reader => {
        Event::End(event) if event.name() == end_tag => break,
        Event::Start(event) if event.name() == TAG_PHONETIC_TEXT => is_phonetic_text = true,
        Event::End(event) if event.name() == TAG_PHONETIC_TEXT => is_phonetic_text = false,
        Event::Start(event) if !is_phonetic_text && event.name() == TAG_TEXT => is_text = true,
        Event::End(event) if is_text && event.name() == TAG_TEXT => is_text = false,
        Event::Text(event) if is_text => text.push_str(&event.xml_content()?),
        Event::CData(event) if is_text => text.push_str(&event.xml_content()?),
        Event::GeneralRef(event) if is_text => text.push_bytes_ref(&event)?,
    });
    Ok(text)
}
