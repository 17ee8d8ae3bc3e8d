//! Per-participant certificate composition.
//!
//! Composition is split in two: [`layout`] is a pure function that decides what
//! goes where, and [`compose`] replays that plan onto a fresh copy of the
//! template. Keeping the plan separate makes positions testable without
//! parsing PDF output.

use crate::certificate::date::format_for_certificate;
use crate::certificate::document::{CertificateDocument, EmbeddedFont};
use crate::certificate::fonts::{FontProgram, StandardFont};
use crate::certificate::serial::display_name;
use crate::error::{ComposeError, PdfError};
use common::model::participant::Participant;
use common::model::settings::{CenterMode, RegionText, RenderSettings, Rgb};
use std::sync::Arc;

/// Custom font bytes uploaded for the session. `None` means the standard
/// Times face is used for that weight.
#[derive(Debug, Clone, Default)]
pub struct FontAssets {
    pub regular: Option<Arc<Vec<u8>>>,
    pub bold: Option<Arc<Vec<u8>>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontRole {
    Regular,
    Bold,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    /// Opaque white rectangle over pre-printed template text.
    Wipe { x: f32, y: f32, width: f32, height: f32 },
    Text {
        text: String,
        x: f32,
        y: f32,
        size: f32,
        role: FontRole,
        color: Rgb,
    },
}

/// Left edge that centers a run of `width` points on `center`.
pub fn centered_left(center: f32, width: f32) -> f32 {
    center - width / 2.0
}

fn region_center(region: &RegionText, page_width: f32) -> f32 {
    match region.center {
        CenterMode::Region => region.wipe.x + region.wipe.width / 2.0,
        CenterMode::Page => page_width / 2.0,
    }
}

fn wiped_region(ops: &mut Vec<DrawOp>, region: &RegionText, text: String, font: &FontProgram, page_width: f32) {
    ops.push(DrawOp::Wipe {
        x: region.wipe.x,
        y: region.wipe.y,
        width: region.wipe.width,
        height: region.wipe.height,
    });
    let width = font.measure(&text, region.size);
    ops.push(DrawOp::Text {
        x: centered_left(region_center(region, page_width), width),
        y: region.baseline,
        size: region.size,
        role: FontRole::Regular,
        color: region.color,
        text,
    });
}

/// Plans every drawing operation for one certificate, in paint order.
pub fn layout(
    participant: &Participant,
    serial: &str,
    settings: &RenderSettings,
    regular: &FontProgram,
    bold: &FontProgram,
    page_width: f32,
) -> Vec<DrawOp> {
    let mut ops = Vec::with_capacity(6);

    ops.push(DrawOp::Text {
        text: serial.to_string(),
        x: settings.serial.x,
        y: settings.serial.y,
        size: settings.serial.size,
        role: FontRole::Regular,
        color: settings.serial.color,
    });

    let name = display_name(&participant.name);
    let name_width = bold.measure(&name, settings.name.size);
    ops.push(DrawOp::Text {
        x: centered_left(settings.name.x, name_width),
        y: settings.name.y,
        size: settings.name.size,
        role: FontRole::Bold,
        color: settings.name.color,
        text: name,
    });

    let course = participant.course.trim();
    if !course.is_empty() {
        wiped_region(&mut ops, &settings.course, course.to_uppercase(), regular, page_width);
    }

    let date = format_for_certificate(&participant.date);
    if !date.is_empty() {
        wiped_region(&mut ops, &settings.date, date, regular, page_width);
    }

    ops
}

fn render(
    template: &[u8],
    participant: &Participant,
    serial: &str,
    settings: &RenderSettings,
    fonts: &FontAssets,
) -> Result<Vec<u8>, PdfError> {
    let mut doc = CertificateDocument::load(template)?;
    let regular = doc.embed_font(FontProgram::resolve(fonts.regular.as_ref(), StandardFont::TimesRoman)?)?;
    let bold = doc.embed_font(FontProgram::resolve(fonts.bold.as_ref(), StandardFont::TimesBold)?)?;

    let ops = layout(
        participant,
        serial,
        settings,
        regular.program(),
        bold.program(),
        doc.page_width(),
    );
    for op in &ops {
        match op {
            DrawOp::Wipe { x, y, width, height } => doc.draw_rectangle(*x, *y, *width, *height, Rgb::WHITE),
            DrawOp::Text {
                text,
                x,
                y,
                size,
                role,
                color,
            } => {
                let font: &EmbeddedFont = match role {
                    FontRole::Regular => &regular,
                    FontRole::Bold => &bold,
                };
                doc.draw_text(text, *x, *y, *size, font, *color);
            }
        }
    }
    doc.save()
}

/// Produces the finished certificate for `participant`. `template` is only
/// read; every call starts from the pristine bytes.
pub fn compose(
    template: &[u8],
    participant: &Participant,
    serial: &str,
    settings: &RenderSettings,
    fonts: &FontAssets,
) -> Result<Vec<u8>, ComposeError> {
    render(template, participant, serial, settings, fonts).map_err(|source| ComposeError {
        national_id: participant.national_id.clone(),
        source,
    })
}
