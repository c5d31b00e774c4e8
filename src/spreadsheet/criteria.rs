use crate::conf::AUTO_DETECT_SHEET_TOKENS;
use std::fmt::Display;

/// Chooses the worksheet to read from a workbook.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SheetLocator {
    /// Exactly this sheet name.
    Fixed(String),
    /// First sheet whose normalized name contains every auto-detect token.
    AutoDetect,
}

impl SheetLocator {
    /// Returns the name of the chosen sheet, in workbook order, if any.
    pub fn locate<S: AsRef<str>>(&self, sheet_names: &[S]) -> Option<String> {
        match self {
            SheetLocator::Fixed(target) => sheet_names
                .iter()
                .map(as_str)
                .find(|name| *name == target.as_str())
                .map(str::to_owned),
            SheetLocator::AutoDetect => sheet_names
                .iter()
                .map(as_str)
                .find(|name| {
                    let normalized = normalize_sheet_name(name);
                    AUTO_DETECT_SHEET_TOKENS
                        .iter()
                        .all(|token| normalized.contains(token))
                })
                .map(str::to_owned),
        }
    }
}

impl Display for SheetLocator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SheetLocator::Fixed(name) => write!(f, "'{name}'"),
            SheetLocator::AutoDetect => write!(f, "name containing {}", AUTO_DETECT_SHEET_TOKENS.join(" + ")),
        }
    }
}

fn as_str<S: AsRef<str>>(name: &S) -> &str {
    name.as_ref()
}

/// Lowercases, turns non-breaking spaces into spaces and trims.
pub(crate) fn normalize_sheet_name(name: &str) -> String {
    name.to_lowercase().replace('\u{a0}', " ").trim().to_owned()
}
