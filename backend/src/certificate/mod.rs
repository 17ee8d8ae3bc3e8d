//! Certificate production: serials, dates, fonts, the PDF overlay and the
//! batch that packages everything into an archive.

pub mod batch;
pub mod compose;
pub mod date;
pub mod document;
pub mod fonts;
pub mod serial;
