//! Low-level helpers shared by the spreadsheet codec.
pub(crate) mod reader;
pub(crate) mod xml;
pub(crate) mod zip;
