use js_sys::{Array, Function, Object, Reflect};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, Window};

pub const ENGINE_SCRIPT_ID: &str = "mathjax-script";
const ENGINE_SRC: &str = "https://cdn.jsdelivr.net/npm/mathjax@3/es5/tex-svg.js";

/// Bootstraps the typesetting engine once per session: the configuration
/// object must be on `window` before the loader script runs.
pub fn install_engine(window: &Window, document: &Document) -> Result<(), JsValue> {
    remove_engine(document);
    configure_engine(window)?;

    let script = document.create_element("script")?;
    script.set_attribute("src", ENGINE_SRC)?;
    script.set_attribute("async", "")?;
    script.set_id(ENGINE_SCRIPT_ID);
    let head = document
        .head()
        .ok_or_else(|| JsValue::from_str("Missing document head"))?;
    head.append_child(&script)?;
    Ok(())
}

pub fn remove_engine(document: &Document) {
    if let Some(existing) = document.get_element_by_id(ENGINE_SCRIPT_ID) {
        existing.remove();
    }
}

fn configure_engine(window: &Window) -> Result<(), JsValue> {
    let tex = Object::new();
    Reflect::set(
        &tex,
        &JsValue::from_str("inlineMath"),
        &delimiter_pairs(&[["$", "$"]]),
    )?;
    Reflect::set(
        &tex,
        &JsValue::from_str("displayMath"),
        &delimiter_pairs(&[["$$", "$$"]]),
    )?;
    let config = Object::new();
    Reflect::set(&config, &JsValue::from_str("tex"), &tex)?;
    Reflect::set(window.as_ref(), &JsValue::from_str("MathJax"), &config)?;
    Ok(())
}

fn delimiter_pairs(pairs: &[[&str; 2]]) -> JsValue {
    let out = Array::new();
    for pair in pairs {
        out.push(&Array::of2(
            &JsValue::from_str(pair[0]),
            &JsValue::from_str(pair[1]),
        ));
    }
    out.into()
}

/// Capability probe: `Some(markup)` when the engine is ready, `None` while
/// it is still loading or failed to load. Callers fall back to rendering the
/// source verbatim.
pub fn render_markup(window: &Window, source: &str) -> Option<String> {
    let mathjax = Reflect::get(window.as_ref(), &JsValue::from_str("MathJax")).ok()?;
    let tex2svg = Reflect::get(&mathjax, &JsValue::from_str("tex2svg"))
        .ok()?
        .dyn_into::<Function>()
        .ok()?;
    let node = tex2svg.call1(&mathjax, &JsValue::from_str(source)).ok()?;
    Reflect::get(&node, &JsValue::from_str("outerHTML"))
        .ok()?
        .as_string()
}
