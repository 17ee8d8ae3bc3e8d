//! Font programs and their advance widths.
//!
//! Text is always drawn as WinAnsi-encoded single bytes, and widths are
//! measured on exactly those bytes, so what is measured is what is drawn.

use crate::error::PdfError;
use std::sync::Arc;

/// Built-in serif fallback used when no custom font was uploaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StandardFont {
    TimesRoman,
    TimesBold,
}

// Advance widths (1/1000 em) for codes 32..=126, from the Adobe core font metrics.
const TIMES_ROMAN_ASCII: [u16; 95] = [
    250, 333, 408, 500, 500, 833, 778, 180, 333, 333, 500, 564, 250, 333, 250, 278, // ' '..'/'
    500, 500, 500, 500, 500, 500, 500, 500, 500, 500, 278, 278, 564, 564, 564, 444, // '0'..'?'
    921, 722, 667, 667, 722, 611, 556, 722, 722, 333, 389, 722, 611, 889, 722, 722, // '@'..'O'
    556, 722, 667, 556, 611, 722, 722, 944, 722, 722, 611, 333, 278, 333, 469, 500, // 'P'..'_'
    333, 444, 500, 444, 500, 444, 333, 500, 500, 278, 278, 500, 278, 778, 500, 500, // '`'..'o'
    500, 500, 333, 389, 278, 500, 500, 722, 500, 500, 444, 480, 200, 480, 541, // 'p'..'~'
];

const TIMES_BOLD_ASCII: [u16; 95] = [
    250, 333, 555, 500, 500, 1000, 833, 278, 333, 333, 500, 570, 250, 333, 250, 278,
    500, 500, 500, 500, 500, 500, 500, 500, 500, 500, 333, 333, 570, 570, 570, 500,
    930, 722, 667, 722, 722, 667, 611, 778, 778, 389, 500, 778, 667, 944, 722, 778,
    611, 778, 722, 556, 667, 722, 722, 1000, 722, 722, 667, 333, 278, 333, 581, 500,
    333, 500, 556, 444, 556, 444, 333, 500, 556, 278, 333, 556, 278, 833, 556, 500,
    556, 556, 444, 389, 333, 556, 500, 722, 500, 500, 444, 394, 220, 394, 520,
];

impl StandardFont {
    pub fn base_font(self) -> &'static str {
        match self {
            StandardFont::TimesRoman => "Times-Roman",
            StandardFont::TimesBold => "Times-Bold",
        }
    }

    fn ascii_widths(self) -> &'static [u16; 95] {
        match self {
            StandardFont::TimesRoman => &TIMES_ROMAN_ASCII,
            StandardFont::TimesBold => &TIMES_BOLD_ASCII,
        }
    }

    /// Width of one WinAnsi code. Accented Latin letters share the width of
    /// their base letter in the Times faces.
    pub fn code_width(self, code: u8) -> u16 {
        let widths = self.ascii_widths();
        if (32..=126).contains(&code) {
            return widths[(code - 32) as usize];
        }
        let ch = winansi_to_char(code);
        if let Some(base) = latin_base_letter(ch) {
            return widths[(base as u8 - 32) as usize];
        }
        match ch {
            '\u{2014}' | '\u{2026}' | '\u{2030}' => 1000,
            '\u{2018}' | '\u{2019}' | '\u{201A}' => 333,
            '\u{00A0}' => 250,
            _ => 500,
        }
    }
}

fn latin_base_letter(ch: char) -> Option<char> {
    let base = match ch {
        'À'..='Å' => 'A',
        'Ç' => 'C',
        'È'..='Ë' => 'E',
        'Ì'..='Ï' => 'I',
        'Ñ' => 'N',
        'Ò'..='Ö' | 'Ø' => 'O',
        'Ù'..='Ü' => 'U',
        'Ý' | 'Ÿ' => 'Y',
        'Š' => 'S',
        'Ž' => 'Z',
        'à'..='å' => 'a',
        'ç' => 'c',
        'è'..='ë' => 'e',
        'ì'..='ï' => 'i',
        'ñ' => 'n',
        'ò'..='ö' | 'ø' => 'o',
        'ù'..='ü' => 'u',
        'ý' | 'ÿ' => 'y',
        'š' => 's',
        'ž' => 'z',
        _ => return None,
    };
    Some(base)
}

// Windows-1252 code points 0x80..=0x9F; '\0' marks undefined slots.
const CP1252_HIGH: [char; 32] = [
    '\u{20AC}', '\0', '\u{201A}', '\u{0192}', '\u{201E}', '\u{2026}', '\u{2020}', '\u{2021}',
    '\u{02C6}', '\u{2030}', '\u{0160}', '\u{2039}', '\u{0152}', '\0', '\u{017D}', '\0',
    '\0', '\u{2018}', '\u{2019}', '\u{201C}', '\u{201D}', '\u{2022}', '\u{2013}', '\u{2014}',
    '\u{02DC}', '\u{2122}', '\u{0161}', '\u{203A}', '\u{0153}', '\0', '\u{017E}', '\u{0178}',
];

pub fn winansi_to_char(code: u8) -> char {
    match code {
        0x80..=0x9F => CP1252_HIGH[(code - 0x80) as usize],
        _ => code as char,
    }
}

fn char_to_winansi(ch: char) -> Option<u8> {
    match ch as u32 {
        0x20..=0x7E | 0xA0..=0xFF => Some(ch as u8),
        _ => CP1252_HIGH
            .iter()
            .position(|c| *c == ch && ch != '\0')
            .map(|idx| 0x80 + idx as u8),
    }
}

/// WinAnsi bytes for `text`; anything outside the code page becomes `?`.
pub fn encode_winansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|ch| char_to_winansi(ch).unwrap_or(b'?'))
        .collect()
}

/// Metrics of an uploaded TrueType/OpenType font, ready to embed.
#[derive(Debug)]
pub struct TrueTypeFont {
    pub data: Arc<Vec<u8>>,
    pub postscript_name: String,
    /// Widths for codes 32..=255 in 1/1000 em.
    pub widths: Vec<u16>,
    pub ascent: i16,
    pub descent: i16,
    pub cap_height: i16,
    pub bbox: [i16; 4],
    pub italic_angle: f32,
}

pub const FIRST_CHAR: u8 = 32;
pub const LAST_CHAR: u8 = 255;

impl TrueTypeFont {
    pub fn parse(data: Arc<Vec<u8>>) -> Result<Self, PdfError> {
        let face = ttf_parser::Face::parse(&data, 0).map_err(|e| PdfError::Font(e.to_string()))?;
        let units = f32::from(face.units_per_em().max(1));
        let scale = |v: i16| -> i16 { (f32::from(v) * 1000.0 / units).round() as i16 };

        let missing_width = face
            .glyph_hor_advance(ttf_parser::GlyphId(0))
            .unwrap_or(0);
        let widths = (FIRST_CHAR..=LAST_CHAR)
            .map(|code| {
                let advance = face
                    .glyph_index(winansi_to_char(code))
                    .and_then(|gid| face.glyph_hor_advance(gid))
                    .unwrap_or(missing_width);
                (f32::from(advance) * 1000.0 / units).round() as u16
            })
            .collect();

        let postscript_name = face
            .names()
            .into_iter()
            .find(|n| n.name_id == ttf_parser::name_id::POST_SCRIPT_NAME)
            .and_then(|n| n.to_string())
            .map(|n| n.chars().filter(|c| c.is_ascii_alphanumeric() || *c == '-').collect::<String>())
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| "CustomFont".to_string());

        let bbox = face.global_bounding_box();
        Ok(TrueTypeFont {
            postscript_name,
            widths,
            ascent: scale(face.ascender()),
            descent: scale(face.descender()),
            cap_height: scale(face.capital_height().unwrap_or(face.ascender())),
            bbox: [
                scale(bbox.x_min),
                scale(bbox.y_min),
                scale(bbox.x_max),
                scale(bbox.y_max),
            ],
            italic_angle: face.italic_angle(),
            data,
        })
    }

    fn code_width(&self, code: u8) -> u16 {
        code.checked_sub(FIRST_CHAR)
            .and_then(|idx| self.widths.get(idx as usize).copied())
            .unwrap_or(0)
    }
}

/// A resolved font: either a standard face or a parsed custom one.
#[derive(Debug, Clone)]
pub enum FontProgram {
    Standard(StandardFont),
    TrueType(Arc<TrueTypeFont>),
}

impl FontProgram {
    /// Custom bytes when present, otherwise the standard `fallback`.
    pub fn resolve(custom: Option<&Arc<Vec<u8>>>, fallback: StandardFont) -> Result<Self, PdfError> {
        match custom {
            Some(bytes) => Ok(FontProgram::TrueType(Arc::new(TrueTypeFont::parse(bytes.clone())?))),
            None => Ok(FontProgram::Standard(fallback)),
        }
    }

    fn code_width(&self, code: u8) -> u16 {
        match self {
            FontProgram::Standard(font) => font.code_width(code),
            FontProgram::TrueType(font) => font.code_width(code),
        }
    }

    /// Width of `text` in points at `size`.
    pub fn measure(&self, text: &str, size: f32) -> f32 {
        let units: u32 = encode_winansi(text)
            .into_iter()
            .map(|code| u32::from(self.code_width(code)))
            .sum();
        units as f32 * size / 1000.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn times_roman_widths() {
        let roman = FontProgram::Standard(StandardFont::TimesRoman);
        // H(722) e(444) l(278) l(278) o(500)
        assert_eq!(roman.measure("Hello", 10.0), 22.22);
        assert_eq!(roman.measure("", 12.0), 0.0);
    }

    #[test]
    fn bold_is_wider_than_roman_for_caps() {
        let roman = FontProgram::Standard(StandardFont::TimesRoman);
        let bold = FontProgram::Standard(StandardFont::TimesBold);
        let text = "JANE WANJIKU";
        assert!(bold.measure(text, 20.0) > roman.measure(text, 20.0));
    }

    #[test]
    fn accented_letters_measure_like_base_letters() {
        let bold = StandardFont::TimesBold;
        assert_eq!(bold.code_width(b'\xC9'), bold.code_width(b'E'));
    }

    #[test]
    fn winansi_encoding() {
        assert_eq!(encode_winansi("Aé€"), vec![b'A', 0xE9, 0x80]);
        assert_eq!(encode_winansi("日本"), b"??".to_vec());
        assert_eq!(winansi_to_char(0x93), '\u{201C}');
    }

    #[test]
    fn garbage_font_is_rejected() {
        let err = TrueTypeFont::parse(Arc::new(vec![0, 1, 2, 3])).unwrap_err();
        assert!(matches!(err, PdfError::Font(_)));
    }
}
