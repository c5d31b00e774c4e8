use crate::conf::TAG_COLUMN_NAME;
use crate::conf::TAG_FALLBACK;
use crate::conf::TAG_MARKER;
use crate::error::MergerError;
use regex::Regex;
use std::path::Path;

/// Derives the per-file label written in the leading tag column.
#[derive(Clone, Debug)]
pub struct TagInjector {
    pattern: Regex,
    fallback: String,
    column_name: String,
}

impl TagInjector {
    /// The label is the text before the first `marker`; `fallback` is used when the marker is absent.
    pub fn new(marker: &str, fallback: &str, column_name: &str) -> Result<Self, MergerError> {
        let pattern = Regex::new(&format!("(?s)^(.*?){}", regex::escape(marker)))?;
        Ok(TagInjector {
            pattern,
            fallback: fallback.to_owned(),
            column_name: column_name.to_owned(),
        })
    }

    pub fn column_name(&self) -> &str {
        &self.column_name
    }

    /// Pure function of the file name; directory components are ignored.
    pub fn derive_label(&self, file_name: &str) -> String {
        let base_name = Path::new(file_name)
            .file_name()
            .map(|name| name.to_string_lossy())
            .unwrap_or_else(|| file_name.into());
        self.pattern
            .captures(&base_name)
            .and_then(|captures| captures.get(1))
            .map(|prefix| prefix.as_str().trim().to_owned())
            .unwrap_or_else(|| self.fallback.to_owned())
    }
}

impl Default for TagInjector {
    fn default() -> Self {
        TagInjector::new(TAG_MARKER, TAG_FALLBACK, TAG_COLUMN_NAME).expect("Hardcode regex pattern")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn derive_label(file_name: &str) -> String {
        TagInjector::default().derive_label(file_name)
    }

    #[test]
    fn label_before_marker() {
        assert_eq!(derive_label("Aamalva-Format-A1_(Name of PRI)_SEC_Rajasthan.xlsx"), "Aamalva");
        assert_eq!(derive_label("  Bassi Kalan -Format-A1.xlsx"), "Bassi Kalan");
        assert_eq!(derive_label("data-a1/Aamalva-Format-A1.xlsx"), "Aamalva");
    }

    #[test]
    fn first_marker_wins() {
        assert_eq!(derive_label("X-Format-A1-Format-A1.xlsx"), "X");
    }

    #[test]
    fn missing_marker_falls_back() {
        assert_eq!(derive_label("Aamalva_Format_A1.xlsx"), "UNKNOWN");
        assert_eq!(derive_label(""), "UNKNOWN");
    }

    #[test]
    fn empty_prefix_is_kept() {
        assert_eq!(derive_label("-Format-A1.xlsx"), "");
    }

    #[test]
    fn same_prefix_same_label() {
        let injector = TagInjector::default();
        assert_eq!(
            injector.derive_label("Aamalva-Format-A1 (1).xlsx"),
            injector.derive_label("Aamalva-Format-A1 (2).xlsx")
        );
        assert_eq!(injector.column_name(), "Panchayat Name");
    }
}
