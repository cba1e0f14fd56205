//! Low-level readers shared by the workbook decoder.
pub(crate) mod xml;
pub(crate) mod zip;
