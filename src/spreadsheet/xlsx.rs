use crate::error::MergerError;
use crate::helpers::reader::UnifiedReader;
use crate::helpers::xml::XmlAttributeHelper;
use crate::helpers::xml::XmlNodeHelper;
use crate::helpers::xml::XmlReader;
use crate::helpers::xml::XmlTextContextHelper;
use crate::helpers::zip::ZipHelper;
use crate::match_xml_events;
use crate::spreadsheet::cell::Cell;
use crate::spreadsheet::cell::CellType;
use crate::spreadsheet::range::Range;
use crate::spreadsheet::reference::reference_to_index;
use crate::spreadsheet::sheet::Sheet;
use crate::spreadsheet::Spreadsheet;
use crate::spreadsheet::SpreadsheetError;
use quick_xml::events::Event;
use quick_xml::name::QName;
use std::borrow::Cow;
use std::collections::HashMap;
use std::io::BufReader;
use std::path::Path;
use std::sync::Arc;
use zip::read::ZipFile;
use zip::ZipArchive;

// XML tag names of the SpreadsheetML parts
const TAG_RELATIONSHIP: &[u8] = b"Relationship";              // Package relationship
const TAG_CUSTOM_FORMATS: QName = QName(b"numFmts");          // Custom number formats container
const TAG_CUSTOM_FORMAT: QName = QName(b"numFmt");            // Individual custom number format
const TAG_FORMAT_INDEXES: QName = QName(b"cellXfs");          // Cell format indexes container
const TAG_FORMAT_INDEX: QName = QName(b"xf");                 // Individual cell format index
const TAG_SHARED_STRING_ITEM: QName = QName(b"si");           // Shared string table item
const TAG_PHONETIC_TEXT: QName = QName(b"rPh");               // Phonetic text for Asian languages
const TAG_TEXT: QName = QName(b"t");                          // Text content within strings
const TAG_WORKBOOK_PROPERTIES: QName = QName(b"workbookPr");  // Workbook properties
const TAG_SHEET: QName = QName(b"sheet");                     // Worksheet definition
const TAG_ROW: QName = QName(b"row");                         // Row in worksheet
const TAG_CELL: QName = QName(b"c");                          // Cell in worksheet
const TAG_INLINE_STRING: QName = QName(b"is");                // Inline string value
const TAG_VALUE: QName = QName(b"v");                         // Cell value content

/// An `.xlsx` workbook opened from a local file or an in-memory buffer.
pub struct XlsxSpreadsheet {
    /// File name of the spreadsheet
    name: String,
    /// ZIP archive containing the package parts
    zip: ZipArchive<UnifiedReader>,
    /// Cell type per style index, used to tell dates from plain numbers
    number_formats: Vec<CellType>,
    /// Shared string table, loaded on the first sheet read
    shared_strings: Option<Vec<String>>,
    /// Worksheets as (name, zip_path) pairs in workbook order
    sheets: Vec<(String, String)>,
}

impl XlsxSpreadsheet {
    /// Opens a workbook stored on disk.
    pub fn open(path: &Path) -> Result<XlsxSpreadsheet, MergerError> {
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_else(|| path.to_string_lossy().to_string());
        XlsxSpreadsheet::new(&name, UnifiedReader::open(path)?)
    }

    /// Opens a workbook from uploaded bytes; the buffer itself is never consumed.
    pub fn from_bytes(name: &str, bytes: Arc<[u8]>) -> Result<XlsxSpreadsheet, MergerError> {
        XlsxSpreadsheet::new(name, UnifiedReader::memory(bytes))
    }

    pub(crate) fn new(name: &str, mut reader: UnifiedReader) -> Result<XlsxSpreadsheet, MergerError> {
        if reader.is_compound_file()? {
            Err(SpreadsheetError::CompoundFileError(name.to_owned()))?
        }

        let mut zip = ZipArchive::new(reader)?;
        let (sheets, is_1904) = load_workbook(&mut zip)?;
        if sheets.is_empty() {
            Err(SpreadsheetError::SpreadsheetEmptyError(name.to_owned()))?
        }

        let number_formats = load_number_formats(&mut zip, is_1904)?;
        Ok(XlsxSpreadsheet {
            name: name.to_owned(),
            zip,
            number_formats,
            shared_strings: None,
            sheets,
        })
    }
}

impl Spreadsheet for XlsxSpreadsheet {
    fn name(&self) -> String {
        self.name.to_owned()
    }

    fn sheet_names(&self) -> Vec<String> {
        self.sheets.iter().map(|(name, _)| name.to_owned()).collect()
    }

    /// Streams the worksheet part and keeps every non-empty cell inside `range`.
    fn read_sheet(&mut self, sheet_name: &str, range: Option<Range>) -> Result<Sheet, MergerError> {
        let zip_path = self
            .sheets
            .iter()
            .find(|(name, _)| name == sheet_name)
            .map(|(_, zip_path)| zip_path.to_owned())
            .ok_or_else(|| SpreadsheetError::SheetNotFound(sheet_name.to_owned()))?;

        if self.shared_strings.is_none() {
            self.shared_strings = Some(load_shared_strings(&mut self.zip)?);
        }
        let shared_strings = self.shared_strings.as_deref().unwrap_or_default();

        let mut sheet = Sheet::new(&self.name, sheet_name, range);
        let mut row_count = 0usize;
        let mut col_count = 0usize;
        let mut row = 0usize;
        let mut col = 0usize;
        let mut kind = CellType::default();
        let mut value = String::new();
        let mut reader = self
            .zip
            .xml_reader(&zip_path)?
            .ok_or_else(|| SpreadsheetError::FileError(zip_path.to_owned()))?;
        match_xml_events!(reader => {
            Event::Start(event) if event.name() == TAG_ROW => {
                if let Some(number) = event.parse_attribute_value::<usize>("r")? {
                    row_count = number.saturating_sub(1);
                }
                col_count = 0;
            }
            Event::End(event) if event.name() == TAG_ROW => {
                row_count += 1;
                col_count = 0;
            }
            Event::Start(event) if event.name() == TAG_CELL => {
                (row, col) = event.get_attribute_value("r")?
                    .and_then(|reference| reference_to_index(&reference))
                    .unwrap_or((row_count, col_count));
                col_count = col + 1;
                value.clear();
                if sheet.after_row_upper_bound(row) {
                    break;
                } else if sheet.contains(row, col) {
                    kind = event.get_attribute_value("t")?.map(|t| {
                        match t.as_ref() {
                            "inlineStr" | "str" => CellType::InlineString,
                            "s" => CellType::SharedString,
                            "d" => CellType::IsoDateTime,
                            "b" => CellType::Boolean,
                            "e" => CellType::Error,
                            _ => CellType::Number,
                        }
                    }).unwrap_or(CellType::Number);
                    if let Some(format_id) = event.get_attribute_value("s")? {
                        if kind == CellType::Number && !format_id.is_empty() {
                            let index = format_id.parse::<usize>()?;
                            kind = self.number_formats.get(index).copied().unwrap_or(CellType::Number);
                        }
                    }
                } else {
                    kind = CellType::default();
                }
            }
            Event::Start(event) if kind != CellType::Empty && event.name() == TAG_INLINE_STRING => {
                value = read_string_value(&mut reader, TAG_INLINE_STRING, false)?;
            }
            Event::Start(event) if kind != CellType::Empty && event.name() == TAG_VALUE => {
                value = read_string_value(&mut reader, TAG_VALUE, true)?;
            }
            Event::End(event) if kind != CellType::Empty && !value.is_empty() && event.name() == TAG_CELL => {
                sheet.push(Cell::decode(row, col, kind, &value, shared_strings)?);
                value.clear();
                kind = CellType::default();
            }
        });
        Ok(sheet)
    }
}

/// Loads worksheet names and part paths, and whether the 1904 date system is in use.
fn load_workbook(zip: &mut ZipArchive<UnifiedReader>) -> Result<(Vec<(String, String)>, bool), MergerError> {
    let relationships = load_relationships(zip, "xl/_rels/workbook.xml.rels")?;
    let mut reader = zip.xml_reader("xl/workbook.xml")?
        .ok_or_else(|| SpreadsheetError::FileError("xl/workbook.xml".to_string()))?;
    let mut sheets: Vec<(String, String)> = Vec::new();
    let mut is_1904 = false;
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
        Event::Start(event) if event.name() == TAG_WORKBOOK_PROPERTIES => {
            is_1904 = event.get_attribute_value("date1904")?
                .map(|value| value.eq("1") || value.eq("true"))
                .unwrap_or(false);
        }
    });
    Ok((sheets, is_1904))
}

/// Maps relationship ids to worksheet part paths.
fn load_relationships(zip: &mut ZipArchive<UnifiedReader>, path: &str) -> Result<HashMap<String, String>, MergerError> {
    let mut reader = zip.xml_reader(path)?
        .ok_or_else(|| SpreadsheetError::FileError(path.to_string()))?;
    let mut relationships: HashMap<String, String> = HashMap::new();
    match_xml_events!(reader => {
        Event::Start(event) if event.local_name().as_ref() == TAG_RELATIONSHIP => {
            let id = event.get_attribute_value("Id")?;
            let kind = event.get_attribute_value("Type")?;
            let target = event.get_attribute_value("Target")?;
            // Chartsheets and dialog sheets carry no cells
            if kind.map(|it| it.ends_with("/worksheet")).unwrap_or(true) {
                if let Some((id, target)) = id.zip(target) {
                    relationships.insert(id.to_string(), to_zip_path(target));
                }
            }
        }
    });
    Ok(relationships)
}

/// Resolves a relationship target against the `xl/` folder of the package.
fn to_zip_path(path: Cow<'_, str>) -> String {
    if let Some(absolute) = path.strip_prefix('/') {
        absolute.to_string()
    } else if path.starts_with("xl/") {
        path.to_string()
    } else {
        format!("xl/{path}")
    }
}

/// Loads the cell type of every style index from `xl/styles.xml`.
fn load_number_formats(zip: &mut ZipArchive<UnifiedReader>, is_1904: bool) -> Result<Vec<CellType>, MergerError> {
    let mut reader = match zip.xml_reader("xl/styles.xml")? {
        Some(reader) => reader,
        None => return Ok(Vec::new()),
    };

    let mut has_custom_formats = false;
    let mut custom_formats_context = false;
    let mut custom_formats = HashMap::<String, CellType>::new();

    let mut has_format_indexes = false;
    let mut format_indexes_context = false;
    let mut format_indexes = Vec::<String>::new();

    match_xml_events!(reader => {
        Event::Start(event) if !custom_formats_context && event.name() == TAG_CUSTOM_FORMATS => {
            has_custom_formats = true;
            custom_formats_context = true;
        }
        Event::End(event) if custom_formats_context && event.name() == TAG_CUSTOM_FORMATS => {
            custom_formats_context = false;
            if has_custom_formats && has_format_indexes {
                break;
            }
        }
        Event::Start(event) if custom_formats_context && event.name() == TAG_CUSTOM_FORMAT => {
            let id = event.get_attribute_value("numFmtId")?;
            let format = event.get_attribute_value("formatCode")?;
            if let Some((id, format)) = id.zip(format) {
                let style = CellType::parse_custom_number_format(&format, is_1904);
                custom_formats.insert(id.to_string(), style);
            }
        }

        Event::Start(event) if !format_indexes_context && event.name() == TAG_FORMAT_INDEXES => {
            has_format_indexes = true;
            format_indexes_context = true;
        }
        Event::End(event) if format_indexes_context && event.name() == TAG_FORMAT_INDEXES => {
            format_indexes_context = false;
            if has_custom_formats && has_format_indexes {
                break;
            }
        }
        Event::Start(event) if format_indexes_context && event.name() == TAG_FORMAT_INDEX => {
            let id = event.get_attribute_value("numFmtId")?.unwrap_or(Cow::Borrowed("0"));
            format_indexes.push(id.to_string());
        }
    });

    Ok(format_indexes
        .iter()
        .map(|id| {
            custom_formats
                .get(id)
                .copied()
                .or_else(|| CellType::parse_builtin_number_format_id(id, is_1904))
                .unwrap_or(CellType::Number)
        })
        .collect())
}

/// Loads the whole shared string table.
fn load_shared_strings(zip: &mut ZipArchive<UnifiedReader>) -> Result<Vec<String>, MergerError> {
    let mut shared_strings = Vec::<String>::new();
    let mut reader = match zip.xml_reader("xl/sharedStrings.xml")? {
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

/// Reads the text up to `end_tag`, skipping phonetic runs.
/// With `is_text_content` the element body is text itself rather than `<t>` children.
fn read_string_value(
    reader: &mut XmlReader<BufReader<ZipFile<'_, UnifiedReader>>>,
    end_tag: QName,
    is_text_content: bool,
) -> Result<String, MergerError> {
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spreadsheet::cell::CellValue;
    use rust_xlsxwriter::Format;
    use rust_xlsxwriter::Workbook;

    fn workbook_bytes() -> Arc<[u8]> {
        let mut workbook = Workbook::new();
        let cover = workbook.add_worksheet();
        cover.set_name("Cover").unwrap();
        cover.write_string(0, 0, "title").unwrap();

        let date = Format::new().set_num_format("yyyy-mm-dd");
        let data = workbook.add_worksheet();
        data.set_name("Draft Roll Control Chart").unwrap();
        data.write_string(0, 0, "skipped").unwrap();
        data.write_string(2, 1, "Aamalva & Co").unwrap();
        data.write_number(2, 2, 42.5).unwrap();
        data.write_boolean(2, 3, true).unwrap();
        data.write_number_with_format(2, 4, 45_292.0, &date).unwrap();
        data.write_string(3, 6, "outside").unwrap();
        Arc::from(workbook.save_to_buffer().unwrap())
    }

    #[test]
    fn lists_sheets_in_workbook_order() {
        let spreadsheet = XlsxSpreadsheet::from_bytes("book.xlsx", workbook_bytes()).unwrap();
        assert_eq!(spreadsheet.name(), "book.xlsx");
        assert_eq!(spreadsheet.sheet_names(), vec!["Cover", "Draft Roll Control Chart"]);
    }

    #[test]
    fn reads_typed_cells() {
        let mut spreadsheet = XlsxSpreadsheet::from_bytes("book.xlsx", workbook_bytes()).unwrap();
        let sheet = spreadsheet.read_sheet("Draft Roll Control Chart", None).unwrap();
        assert_eq!(sheet.height(), 4);
        assert_eq!(sheet.width(), 7);

        let rows = sheet.rows_from(2);
        assert_eq!(rows[0][1], CellValue::from("Aamalva & Co"));
        assert_eq!(rows[0][2], CellValue::Number(42.5));
        assert_eq!(rows[0][3], CellValue::Boolean(true));
        assert_eq!(rows[0][4], CellValue::Date(45_292.0));
    }

    #[test]
    fn range_drops_outside_cells() {
        let mut spreadsheet = XlsxSpreadsheet::from_bytes("book.xlsx", workbook_bytes()).unwrap();
        let range = Range::try_from("B:F").unwrap();
        let sheet = spreadsheet.read_sheet("Draft Roll Control Chart", Some(range)).unwrap();
        assert_eq!(sheet.cells.len(), 4);
        assert_eq!(sheet.height(), 3);
    }

    #[test]
    fn missing_sheet_is_an_error() {
        let mut spreadsheet = XlsxSpreadsheet::from_bytes("book.xlsx", workbook_bytes()).unwrap();
        let result = spreadsheet.read_sheet("Nope", None);
        assert!(matches!(
            result,
            Err(MergerError::SpreadsheetError(SpreadsheetError::SheetNotFound(_)))
        ));
    }

    #[test]
    fn rejects_non_workbooks() {
        let bytes: Arc<[u8]> = Arc::from(&b"not a zip archive"[..]);
        assert!(XlsxSpreadsheet::from_bytes("broken.xlsx", bytes).is_err());

        let bytes: Arc<[u8]> = Arc::from(&[0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1, 0, 0][..]);
        assert!(matches!(
            XlsxSpreadsheet::from_bytes("legacy.xlsx", bytes),
            Err(MergerError::SpreadsheetError(SpreadsheetError::CompoundFileError(_)))
        ));
    }

    #[test]
    fn zip_paths() {
        assert_eq!(to_zip_path(Cow::Borrowed("worksheets/sheet1.xml")), "xl/worksheets/sheet1.xml");
        assert_eq!(to_zip_path(Cow::Borrowed("/xl/worksheets/sheet1.xml")), "xl/worksheets/sheet1.xml");
        assert_eq!(to_zip_path(Cow::Borrowed("xl/worksheets/sheet1.xml")), "xl/worksheets/sheet1.xml");
    }
}
