use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, HtmlElement};

use crate::overlay::Overlay;

pub const OVERLAY_ID_ATTR: &str = "data-overlay-id";

/// Creates the DOM node for one result overlay and appends it to the layer.
/// With no typeset markup the raw source renders verbatim as text.
pub fn mount_overlay(
    document: &Document,
    layer: &HtmlElement,
    overlay: &Overlay,
    markup: Option<String>,
) -> Result<HtmlElement, JsValue> {
    let element: HtmlElement = document
        .create_element("div")?
        .dyn_into()
        .map_err(|_| JsValue::from_str("Overlay node is not an HtmlElement"))?;
    element.set_class_name("result-overlay");
    element.set_attribute(OVERLAY_ID_ATTR, &overlay.id.as_u32().to_string())?;
    match markup {
        Some(markup) => element.set_inner_html(&markup),
        None => element.set_text_content(Some(&overlay.source)),
    }
    position_element(&element, overlay.x, overlay.y);
    layer.append_child(&element)?;
    Ok(element)
}

pub fn position_element(element: &HtmlElement, x: f64, y: f64) {
    let style = element.style();
    let _ = style.set_property("left", &format!("{x}px"));
    let _ = style.set_property("top", &format!("{y}px"));
}

pub fn clear_layer(layer: &HtmlElement) {
    layer.set_inner_html("");
}
