//! Page overlay on top of an existing single-page PDF, built on `lopdf`.
//!
//! The template is parsed fresh for every certificate. Drawing operations are
//! collected and appended as one extra content stream when the document is
//! saved; the template's own content is wrapped in `q`/`Q` so whatever
//! graphics state it leaves behind cannot shift the overlay.

use crate::certificate::fonts::{encode_winansi, FontProgram, StandardFont, TrueTypeFont, FIRST_CHAR, LAST_CHAR};
use crate::error::PdfError;
use common::model::settings::Rgb;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream, StringFormat};

/// A font registered in the page resources.
#[derive(Debug, Clone)]
pub struct EmbeddedFont {
    resource_name: String,
    program: FontProgram,
}

impl EmbeddedFont {
    pub fn measure(&self, text: &str, size: f32) -> f32 {
        self.program.measure(text, size)
    }

    pub fn program(&self) -> &FontProgram {
        &self.program
    }
}

pub struct CertificateDocument {
    doc: Document,
    page_id: ObjectId,
    page_width: f32,
    fonts: Vec<(String, ObjectId)>,
    operations: Vec<Operation>,
}

fn number(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r as f32),
        _ => None,
    }
}

fn color_operands(color: Rgb) -> Vec<Object> {
    vec![color.r.into(), color.g.into(), color.b.into()]
}

impl CertificateDocument {
    /// Parses `template` and targets its first page.
    pub fn load(template: &[u8]) -> Result<Self, PdfError> {
        let doc = Document::load_mem(template)?;
        let page_id = doc
            .get_pages()
            .values()
            .next()
            .copied()
            .ok_or(PdfError::NoPages)?;

        let media_box = inherited_attribute(&doc, page_id, b"MediaBox")
            .ok_or_else(|| PdfError::Malformed("page has no MediaBox".to_string()))?;
        let media_box = resolve(&doc, &media_box).as_array()?.clone();
        let corners: Vec<f32> = media_box.iter().filter_map(|o| number(resolve(&doc, o))).collect();
        let page_width = match corners.as_slice() {
            [llx, _, urx, _] => (urx - llx).abs(),
            _ => return Err(PdfError::Malformed("MediaBox is not a rectangle".to_string())),
        };

        Ok(CertificateDocument {
            doc,
            page_id,
            page_width,
            fonts: Vec::new(),
            operations: Vec::new(),
        })
    }

    pub fn page_width(&self) -> f32 {
        self.page_width
    }

    /// Adds the font object(s) for `program` to the document.
    pub fn embed_font(&mut self, program: FontProgram) -> Result<EmbeddedFont, PdfError> {
        let font_id = match &program {
            FontProgram::Standard(font) => self.add_standard_font(*font),
            FontProgram::TrueType(font) => self.add_truetype_font(font),
        };
        let resource_name = self.unused_font_name()?;
        self.fonts.push((resource_name.clone(), font_id));
        Ok(EmbeddedFont {
            resource_name,
            program,
        })
    }

    fn add_standard_font(&mut self, font: StandardFont) -> ObjectId {
        self.doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => font.base_font(),
            "Encoding" => "WinAnsiEncoding",
        })
    }

    fn add_truetype_font(&mut self, font: &TrueTypeFont) -> ObjectId {
        let file_id = self.doc.add_object(Stream::new(
            dictionary! { "Length1" => font.data.len() as i64 },
            font.data.as_ref().clone(),
        ));
        let descriptor_id = self.doc.add_object(dictionary! {
            "Type" => "FontDescriptor",
            "FontName" => font.postscript_name.as_str(),
            // Nonsymbolic.
            "Flags" => 32,
            "FontBBox" => font.bbox.iter().map(|v| Object::Integer(i64::from(*v))).collect::<Vec<_>>(),
            "ItalicAngle" => font.italic_angle,
            "Ascent" => i64::from(font.ascent),
            "Descent" => i64::from(font.descent),
            "CapHeight" => i64::from(font.cap_height),
            "StemV" => 80,
            "FontFile2" => file_id,
        });
        self.doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "TrueType",
            "BaseFont" => font.postscript_name.as_str(),
            "FirstChar" => i64::from(FIRST_CHAR),
            "LastChar" => i64::from(LAST_CHAR),
            "Widths" => font.widths.iter().map(|w| Object::Integer(i64::from(*w))).collect::<Vec<_>>(),
            "Encoding" => "WinAnsiEncoding",
            "FontDescriptor" => descriptor_id,
        })
    }

    /// A resource name that collides neither with the template's fonts nor
    /// with fonts embedded earlier in this document.
    fn unused_font_name(&self) -> Result<String, PdfError> {
        let existing = self.template_font_names()?;
        let taken = |name: &str| {
            existing.iter().any(|n| n == name.as_bytes()) || self.fonts.iter().any(|(n, _)| n == name)
        };
        let mut idx = self.fonts.len() + 1;
        loop {
            let candidate = format!("CertF{idx}");
            if !taken(&candidate) {
                return Ok(candidate);
            }
            idx += 1;
        }
    }

    fn template_font_names(&self) -> Result<Vec<Vec<u8>>, PdfError> {
        let Some(resources) = inherited_attribute(&self.doc, self.page_id, b"Resources") else {
            return Ok(Vec::new());
        };
        let resources = resolve(&self.doc, &resources).as_dict()?;
        match resources.get(b"Font") {
            Ok(fonts) => Ok(resolve(&self.doc, fonts)
                .as_dict()?
                .iter()
                .map(|(name, _)| name.clone())
                .collect()),
            Err(_) => Ok(Vec::new()),
        }
    }

    /// Left edge at `x`, baseline at `y`, page coordinates from bottom-left.
    pub fn draw_text(&mut self, text: &str, x: f32, y: f32, size: f32, font: &EmbeddedFont, color: Rgb) {
        self.operations.extend([
            Operation::new("BT", vec![]),
            Operation::new("rg", color_operands(color)),
            Operation::new(
                "Tf",
                vec![Object::Name(font.resource_name.as_bytes().to_vec()), size.into()],
            ),
            Operation::new("Td", vec![x.into(), y.into()]),
            Operation::new(
                "Tj",
                vec![Object::String(encode_winansi(text), StringFormat::Literal)],
            ),
            Operation::new("ET", vec![]),
        ]);
    }

    /// Opaque filled rectangle with no border.
    pub fn draw_rectangle(&mut self, x: f32, y: f32, width: f32, height: f32, fill: Rgb) {
        self.operations.extend([
            Operation::new("rg", color_operands(fill)),
            Operation::new("re", vec![x.into(), y.into(), width.into(), height.into()]),
            Operation::new("f", vec![]),
        ]);
    }

    /// Writes the overlay into the page and serializes the document.
    pub fn save(mut self) -> Result<Vec<u8>, PdfError> {
        self.install_fonts()?;
        self.install_overlay()?;
        let mut out = Vec::new();
        self.doc.save_to(&mut out)?;
        Ok(out)
    }

    fn install_fonts(&mut self) -> Result<(), PdfError> {
        if self.fonts.is_empty() {
            return Ok(());
        }
        // Give the page its own resource and font dictionaries so inherited or
        // shared dictionaries of the template stay untouched.
        let mut resources = match inherited_attribute(&self.doc, self.page_id, b"Resources") {
            Some(obj) => resolve(&self.doc, &obj).as_dict()?.clone(),
            None => Dictionary::new(),
        };
        let mut font_dict = match resources.get(b"Font") {
            Ok(obj) => resolve(&self.doc, obj).as_dict()?.clone(),
            Err(_) => Dictionary::new(),
        };
        for (name, id) in &self.fonts {
            font_dict.set(name.as_bytes().to_vec(), Object::Reference(*id));
        }
        resources.set("Font", Object::Dictionary(font_dict));

        let page = self.doc.get_object_mut(self.page_id)?.as_dict_mut()?;
        page.set("Resources", Object::Dictionary(resources));
        Ok(())
    }

    fn install_overlay(&mut self) -> Result<(), PdfError> {
        let mut operations = vec![Operation::new("Q", vec![]), Operation::new("q", vec![])];
        operations.append(&mut self.operations);
        operations.push(Operation::new("Q", vec![]));
        let overlay = Content { operations }.encode()?;

        let existing: Vec<Object> = {
            let page = self.doc.get_object(self.page_id)?.as_dict()?;
            match page.get(b"Contents") {
                Ok(Object::Reference(id)) => match self.doc.get_object(*id)? {
                    Object::Array(items) => items.clone(),
                    _ => vec![Object::Reference(*id)],
                },
                Ok(Object::Array(items)) => items.clone(),
                _ => Vec::new(),
            }
        };

        let open_id = self.doc.add_object(Stream::new(dictionary! {}, b"q\n".to_vec()));
        let overlay_id = self.doc.add_object(Stream::new(dictionary! {}, overlay));

        let mut contents = Vec::with_capacity(existing.len() + 2);
        contents.push(Object::Reference(open_id));
        contents.extend(existing);
        contents.push(Object::Reference(overlay_id));

        let page = self.doc.get_object_mut(self.page_id)?.as_dict_mut()?;
        page.set("Contents", Object::Array(contents));
        Ok(())
    }
}

/// Follows a single indirect reference; anything else is returned as is.
fn resolve<'a>(doc: &'a Document, obj: &'a Object) -> &'a Object {
    match obj {
        Object::Reference(id) => doc.get_object(*id).unwrap_or(obj),
        _ => obj,
    }
}

/// Looks up a page attribute, walking up the page tree for inherited ones.
fn inherited_attribute(doc: &Document, page_id: ObjectId, key: &[u8]) -> Option<Object> {
    let mut current = Some(page_id);
    // Bounded walk in case of a cyclic Parent chain.
    for _ in 0..64 {
        let node = doc.get_object(current?).ok()?.as_dict().ok()?;
        if let Ok(value) = node.get(key) {
            return Some(value.clone());
        }
        current = node.get(b"Parent").ok().and_then(|p| p.as_reference().ok());
    }
    None
}
