//! Name-dispatched tree translation.
//!
//! A [`Translator`] maps element names to [`ElementHandler`]s and attribute
//! names to [`AttributeHandler`]s. Elements without a handler are
//! transparent: their children are translated in place so no content is
//! lost, attributes without a handler are dropped.

use super::context::{HtmlAttributes, TranslationContext};
use crate::common::xml::Attribute;
use crate::document::DocumentCursor;
use std::collections::HashMap;

pub type ElementFn = fn(&Translator, DocumentCursor<'_>, &mut TranslationContext<'_>);
pub type AttributeFn = fn(&Attribute, &mut TranslationContext<'_>, &mut HtmlAttributes);
/// Derives attributes of an element from the element as a whole, such as
/// inline CSS computed from property children.
pub type ElementAttributesFn = fn(DocumentCursor<'_>, &mut TranslationContext<'_>, &mut HtmlAttributes);

#[derive(Clone, Copy)]
pub enum ElementHandler {
    /// Translate the children without a tag of its own.
    Default,
    /// Drop the element and everything below it.
    Ignore,
    /// Emit the given HTML tag around the children.
    Wrap(&'static str),
    Custom(ElementFn),
}

#[derive(Clone, Copy)]
pub enum AttributeHandler {
    Ignore,
    /// Copy the value under another name.
    Rename(&'static str),
    Custom(AttributeFn),
}

#[derive(Default)]
pub struct Translator {
    elements: HashMap<&'static str, ElementHandler>,
    attributes: HashMap<&'static str, AttributeHandler>,
    element_attributes: Option<ElementAttributesFn>,
}

impl Translator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn element(mut self, name: &'static str, handler: ElementHandler) -> Self {
        self.elements.insert(name, handler);
        self
    }

    /// Register `handler` for several element names at once.
    pub fn elements(mut self, names: &[&'static str], handler: ElementHandler) -> Self {
        for name in names {
            self.elements.insert(*name, handler);
        }
        self
    }

    pub fn attribute(mut self, name: &'static str, handler: AttributeHandler) -> Self {
        self.attributes.insert(name, handler);
        self
    }

    pub fn with_element_attributes(mut self, f: ElementAttributesFn) -> Self {
        self.element_attributes = Some(f);
        self
    }

    pub fn element_handler(&self, name: &str) -> ElementHandler {
        self.elements.get(name).copied().unwrap_or(ElementHandler::Default)
    }

    /// Translate a node and everything below it.
    pub fn translate(&self, cursor: DocumentCursor<'_>, ctx: &mut TranslationContext<'_>) {
        let Some(name) = cursor.name() else {
            ctx.text(cursor);
            return;
        };
        match self.element_handler(name) {
            ElementHandler::Default => self.translate_children(cursor, ctx),
            ElementHandler::Ignore => {},
            ElementHandler::Wrap(tag) => self.wrap(tag, cursor, ctx, HtmlAttributes::new()),
            ElementHandler::Custom(f) => f(self, cursor, ctx),
        }
    }

    pub fn translate_children(&self, cursor: DocumentCursor<'_>, ctx: &mut TranslationContext<'_>) {
        for child in cursor.children() {
            self.translate(child, ctx);
        }
    }

    /// Collect the HTML attributes of an element into `attrs`.
    pub fn translate_attributes(
        &self,
        cursor: DocumentCursor<'_>,
        ctx: &mut TranslationContext<'_>,
        attrs: &mut HtmlAttributes,
    ) {
        for attribute in cursor.attributes() {
            self.translate_attribute(attribute, ctx, attrs);
        }
        if let Some(f) = self.element_attributes {
            f(cursor, ctx, attrs);
        }
    }

    /// Translate one attribute, which need not come from the source tree.
    pub fn translate_attribute(&self, attribute: &Attribute, ctx: &mut TranslationContext<'_>, attrs: &mut HtmlAttributes) {
        match self.attributes.get(attribute.name.as_str()) {
            None | Some(AttributeHandler::Ignore) => {},
            Some(AttributeHandler::Rename(name)) => attrs.push(*name, attribute.value.as_str()),
            Some(AttributeHandler::Custom(f)) => f(attribute, ctx, attrs),
        }
    }

    /// Write `<tag ...>` with the fixed `attrs` followed by the translated
    /// attributes of `cursor`.
    pub fn open_tag(
        &self,
        tag: &str,
        cursor: DocumentCursor<'_>,
        ctx: &mut TranslationContext<'_>,
        mut attrs: HtmlAttributes,
    ) {
        self.translate_attributes(cursor, ctx, &mut attrs);
        write_open_tag(ctx, tag, &attrs);
    }

    pub fn wrap(&self, tag: &str, cursor: DocumentCursor<'_>, ctx: &mut TranslationContext<'_>, attrs: HtmlAttributes) {
        self.open_tag(tag, cursor, ctx, attrs);
        self.translate_children(cursor, ctx);
        close_tag(ctx, tag);
    }
}

pub fn write_open_tag(ctx: &mut TranslationContext<'_>, tag: &str, attrs: &HtmlAttributes) {
    let mut tag_text = String::with_capacity(tag.len() + 2);
    tag_text.push('<');
    tag_text.push_str(tag);
    attrs.write_to(&mut tag_text);
    tag_text.push('>');
    ctx.write(&tag_text);
}

#[inline]
pub fn close_tag(ctx: &mut TranslationContext<'_>, tag: &str) {
    ctx.write("</");
    ctx.write(tag);
    ctx.write(">");
}
