use std::borrow::Cow;
use std::collections::HashMap;
use std::sync::Arc;

use crate::foundation::error::{DrapeError, DrapeResult};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
/// RGBA8 brush color used by Parley text layout.
pub struct TextBrushRgba8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

/// Font files supplied by the host, keyed by the family name elements refer to.
#[derive(Clone, Debug, Default)]
pub struct FontBook {
    fonts: HashMap<String, Arc<Vec<u8>>>,
}

impl FontBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, family: impl Into<String>, bytes: Vec<u8>) {
        self.fonts.insert(family.into(), Arc::new(bytes));
    }

    pub fn get(&self, family: &str) -> Option<&Arc<Vec<u8>>> {
        self.fonts.get(family)
    }

    /// Requested family, or any registered font when the family is unknown.
    pub fn resolve(&self, family: &str) -> Option<(&str, &Arc<Vec<u8>>)> {
        if let Some((k, v)) = self.fonts.get_key_value(family) {
            return Some((k.as_str(), v));
        }
        let mut keys: Vec<&String> = self.fonts.keys().collect();
        keys.sort();
        let k = keys.first()?;
        self.fonts.get(k.as_str()).map(|v| (k.as_str(), v))
    }

    pub fn is_empty(&self) -> bool {
        self.fonts.is_empty()
    }
}

/// Stateful helper for building Parley text layouts from raw font bytes.
///
/// Each distinct font key is registered with the font collection once; later layouts reuse the
/// resolved family name.
pub struct TextLayoutEngine {
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<TextBrushRgba8>,
    families: HashMap<String, String>,
}

impl Default for TextLayoutEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for TextLayoutEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextLayoutEngine")
            .field("families", &self.families)
            .finish()
    }
}

impl TextLayoutEngine {
    pub fn new() -> Self {
        Self {
            font_ctx: parley::FontContext::default(),
            layout_ctx: parley::LayoutContext::new(),
            families: HashMap::new(),
        }
    }

    fn family_for(&mut self, font_key: &str, font_bytes: &[u8]) -> DrapeResult<String> {
        if let Some(name) = self.families.get(font_key) {
            return Ok(name.clone());
        }
        let families = self
            .font_ctx
            .collection
            .register_fonts(parley::fontique::Blob::from(font_bytes.to_vec()), None);
        let family_id = families.first().map(|(id, _)| *id).ok_or_else(|| {
            DrapeError::validation(format!("no font families registered for '{font_key}'"))
        })?;
        let family_name = self
            .font_ctx
            .collection
            .family_name(family_id)
            .ok_or_else(|| DrapeError::validation("registered font family has no name"))?
            .to_string();
        self.families
            .insert(font_key.to_string(), family_name.clone());
        Ok(family_name)
    }

    /// Shape a single run of text with the given font and styling.
    pub fn layout_line(
        &mut self,
        text: &str,
        font_key: &str,
        font_bytes: &[u8],
        size_px: f32,
        letter_spacing: f32,
        brush: TextBrushRgba8,
    ) -> DrapeResult<parley::Layout<TextBrushRgba8>> {
        if !size_px.is_finite() || size_px <= 0.0 {
            return Err(DrapeError::validation(
                "text size_px must be finite and > 0",
            ));
        }
        let family_name = self.family_for(font_key, font_bytes)?;

        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(Cow::Owned(family_name)),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(size_px));
        builder.push_default(parley::style::StyleProperty::Brush(brush));
        if letter_spacing != 0.0 {
            builder.push_default(parley::style::StyleProperty::LetterSpacing(
                letter_spacing,
            ));
        }

        let mut layout: parley::Layout<TextBrushRgba8> = builder.build(text);
        layout.break_all_lines(None);
        Ok(layout)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/text/layout.rs"]
mod tests;
