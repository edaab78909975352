use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{
    CanvasRenderingContext2d, Element, Event, HtmlButtonElement, HtmlCanvasElement, HtmlElement,
    PointerEvent,
};

use inkmath_shared::RecognizeRequest;

use crate::dom::{event_to_point, get_element, set_button_busy, set_status};
use crate::net::{recognize, RecognizeCallback};
use crate::overlay::OverlayId;
use crate::palette::{palette_index_from_event, render_palette};
use crate::render::{clear_layer, mount_overlay, position_element};
use crate::session::merge_results;
use crate::state::{DragState, Phase, State};
use crate::surface::{
    begin_stroke, clear_canvas, end_stroke, extend_stroke, resize_canvas, snapshot_data_url,
};
use crate::typeset::{install_engine, remove_engine, render_markup};

fn debug_enabled(window: &web_sys::Window) -> bool {
    let search = window.location().search().ok().unwrap_or_default();
    search.contains("debug=1") || search.contains("debug=true")
}

fn mount_appended(
    window: &web_sys::Window,
    document: &web_sys::Document,
    layer: &HtmlElement,
    state_rc: &Rc<RefCell<State>>,
    appended: &[OverlayId],
) {
    for &id in appended {
        let element = {
            let state = state_rc.borrow();
            let Some(overlay) = state.overlays.get(id) else {
                continue;
            };
            let markup = render_markup(window, &overlay.source);
            match mount_overlay(document, layer, overlay, markup) {
                Ok(element) => element,
                Err(error) => {
                    web_sys::console::error_1(&error);
                    continue;
                }
            }
        };
        let rect = element.get_bounding_client_rect();
        state_rc
            .borrow_mut()
            .overlays
            .set_measured_box(id, rect.width(), rect.height());
        attach_drag(window, state_rc, &element, id);
    }
}

fn attach_drag(
    window: &web_sys::Window,
    state_rc: &Rc<RefCell<State>>,
    element: &HtmlElement,
    id: OverlayId,
) {
    {
        let drag_state = state_rc.clone();
        let drag_element = element.clone();
        let ondown = Closure::<dyn FnMut(PointerEvent)>::new(move |event: PointerEvent| {
            if event.button() != 0 {
                return;
            }
            event.prevent_default();
            event.stop_propagation();
            let rect = drag_element.get_bounding_client_rect();
            let mut state = drag_state.borrow_mut();
            state.overlays.set_measured_box(id, rect.width(), rect.height());
            state.drag = Some(DragState {
                id,
                grab_dx: event.client_x() as f64 - rect.left(),
                grab_dy: event.client_y() as f64 - rect.top(),
            });
            let _ = drag_element.set_pointer_capture(event.pointer_id());
        });
        let _ = element
            .add_event_listener_with_callback("pointerdown", ondown.as_ref().unchecked_ref());
        ondown.forget();
    }

    {
        let drag_state = state_rc.clone();
        let drag_element = element.clone();
        let drag_window = window.clone();
        let onmove = Closure::<dyn FnMut(PointerEvent)>::new(move |event: PointerEvent| {
            let viewport_width = drag_window
                .inner_width()
                .ok()
                .and_then(|value| value.as_f64())
                .unwrap_or(0.0);
            let viewport_height = drag_window
                .inner_height()
                .ok()
                .and_then(|value| value.as_f64())
                .unwrap_or(0.0);
            let mut state = drag_state.borrow_mut();
            let Some(drag) = state.drag else {
                return;
            };
            if drag.id != id {
                return;
            }
            let x = event.client_x() as f64 - drag.grab_dx;
            let y = event.client_y() as f64 - drag.grab_dy;
            if let Some((x, y)) =
                state
                    .overlays
                    .update_position(id, x, y, viewport_width, viewport_height)
            {
                position_element(&drag_element, x, y);
            }
        });
        let _ =
            element.add_event_listener_with_callback("pointermove", onmove.as_ref().unchecked_ref());
        onmove.forget();
    }

    {
        let drag_state = state_rc.clone();
        let onup = Closure::<dyn FnMut(PointerEvent)>::new(move |_: PointerEvent| {
            let mut state = drag_state.borrow_mut();
            if state.drag.map(|drag| drag.id) == Some(id) {
                state.drag = None;
            }
        });
        let _ = element.add_event_listener_with_callback("pointerup", onup.as_ref().unchecked_ref());
        let _ =
            element.add_event_listener_with_callback("pointercancel", onup.as_ref().unchecked_ref());
        onup.forget();
    }
}

#[wasm_bindgen(start)]
pub fn run() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();

    let window = web_sys::window().ok_or_else(|| JsValue::from_str("Missing window"))?;
    let document = window
        .document()
        .ok_or_else(|| JsValue::from_str("Missing document"))?;
    let debug = debug_enabled(&window);

    let canvas: HtmlCanvasElement = get_element(&document, "pad")?;
    let ctx = canvas
        .get_context("2d")?
        .ok_or_else(|| JsValue::from_str("Missing canvas context"))?
        .dyn_into::<CanvasRenderingContext2d>()?;

    let reset_button: HtmlButtonElement = get_element(&document, "reset")?;
    let calc_button: HtmlButtonElement = get_element(&document, "calculate")?;
    let palette_el: HtmlElement = get_element(&document, "palette")?;
    let overlay_layer: HtmlElement = get_element(&document, "overlays")?;
    let status_el: Element = get_element(&document, "status")?;
    let status_text: Element = get_element(&document, "statusText")?;

    let state = Rc::new(RefCell::new(State::new(canvas.clone(), ctx)));

    if let Err(error) = install_engine(&window, &document) {
        // Overlays fall back to verbatim text when the engine never loads.
        web_sys::console::warn_1(&error);
    }

    {
        let state = state.borrow();
        render_palette(&document, &palette_el, &state.palette, state.palette_selected);
    }
    set_status(&status_el, &status_text, "ready", "Draw an expression");

    {
        let mut state = state.borrow_mut();
        resize_canvas(&window, &mut state);
    }

    {
        let resize_state = state.clone();
        let window_cb = window.clone();
        let onresize = Closure::<dyn FnMut()>::new(move || {
            let mut state = resize_state.borrow_mut();
            resize_canvas(&window_cb, &mut state);
        });
        window.add_event_listener_with_callback("resize", onresize.as_ref().unchecked_ref())?;
        onresize.forget();
    }

    {
        let document_cb = document.clone();
        let onbeforeunload = Closure::<dyn FnMut(Event)>::new(move |_| {
            remove_engine(&document_cb);
        });
        window.add_event_listener_with_callback(
            "beforeunload",
            onbeforeunload.as_ref().unchecked_ref(),
        )?;
        onbeforeunload.forget();
    }

    {
        let palette_state = state.clone();
        let palette_el_cb = palette_el.clone();
        let document_cb = document.clone();
        let onclick = Closure::<dyn FnMut(Event)>::new(move |event: Event| {
            let Some(index) = palette_index_from_event(&event) else {
                return;
            };
            let mut state = palette_state.borrow_mut();
            let Some(color) = state.palette.get(index).cloned() else {
                return;
            };
            state.palette_selected = index;
            state.stroke_color = color;
            render_palette(
                &document_cb,
                &palette_el_cb,
                &state.palette,
                state.palette_selected,
            );
        });
        palette_el.add_event_listener_with_callback("click", onclick.as_ref().unchecked_ref())?;
        onclick.forget();
    }

    {
        let down_state = state.clone();
        let down_canvas = canvas.clone();
        let ondown = Closure::<dyn FnMut(PointerEvent)>::new(move |event: PointerEvent| {
            if event.button() != 0 {
                return;
            }
            event.prevent_default();
            let Some((x, y)) = event_to_point(&down_canvas, &event) else {
                return;
            };
            let mut state = down_state.borrow_mut();
            begin_stroke(&mut state, x, y);
            let _ = down_canvas.set_pointer_capture(event.pointer_id());
        });
        canvas.add_event_listener_with_callback("pointerdown", ondown.as_ref().unchecked_ref())?;
        ondown.forget();
    }

    {
        let move_state = state.clone();
        let move_canvas = canvas.clone();
        let onmove = Closure::<dyn FnMut(PointerEvent)>::new(move |event: PointerEvent| {
            let Some((x, y)) = event_to_point(&move_canvas, &event) else {
                return;
            };
            let mut state = move_state.borrow_mut();
            extend_stroke(&mut state, x, y);
        });
        canvas.add_event_listener_with_callback("pointermove", onmove.as_ref().unchecked_ref())?;
        onmove.forget();
    }

    {
        let up_state = state.clone();
        let onup = Closure::<dyn FnMut(PointerEvent)>::new(move |_: PointerEvent| {
            let mut state = up_state.borrow_mut();
            end_stroke(&mut state);
        });
        canvas.add_event_listener_with_callback("pointerup", onup.as_ref().unchecked_ref())?;
        canvas.add_event_listener_with_callback("pointercancel", onup.as_ref().unchecked_ref())?;
        onup.forget();
    }

    {
        let reset_state = state.clone();
        let reset_layer = overlay_layer.clone();
        let status_el_cb = status_el.clone();
        let status_text_cb = status_text.clone();
        let onclick = Closure::<dyn FnMut(Event)>::new(move |_| {
            {
                let mut guard = reset_state.borrow_mut();
                let state = &mut *guard;
                state.phase = Phase::Resetting;
                clear_canvas(state);
                state.vars.clear();
                state.overlays.clear();
                state.drag = None;
                state.phase = Phase::Idle;
            }
            clear_layer(&reset_layer);
            set_status(&status_el_cb, &status_text_cb, "ready", "Draw an expression");
        });
        reset_button.add_event_listener_with_callback("click", onclick.as_ref().unchecked_ref())?;
        onclick.forget();
    }

    {
        let submit_state = state.clone();
        let submit_window = window.clone();
        let submit_document = document.clone();
        let submit_layer = overlay_layer.clone();
        let status_el_cb = status_el.clone();
        let status_text_cb = status_text.clone();
        let calc_button_cb = calc_button.clone();
        let onclick = Closure::<dyn FnMut(Event)>::new(move |_| {
            // Snapshot and variable copy are taken synchronously here; strokes
            // drawn while the call is in flight belong to the next submission.
            let request = {
                let mut state = submit_state.borrow_mut();
                if debug && state.is_submitting() {
                    // Allowed race: submissions are not serialized, results
                    // merge in arrival order.
                    web_sys::console::log_1(&"Submission already in flight".into());
                }
                let snapshot = match snapshot_data_url(&state) {
                    Ok(snapshot) => snapshot,
                    Err(error) => {
                        web_sys::console::error_1(&error);
                        return;
                    }
                };
                state.phase = Phase::Submitting;
                RecognizeRequest {
                    image: snapshot,
                    variables: state.vars.get().clone(),
                }
            };
            set_status(&status_el_cb, &status_text_cb, "busy", "Recognizing...");
            set_button_busy(&calc_button_cb, true);

            let done_state = submit_state.clone();
            let done_window = submit_window.clone();
            let done_document = submit_document.clone();
            let done_layer = submit_layer.clone();
            let done_status_el = status_el_cb.clone();
            let done_status_text = status_text_cb.clone();
            let done_button = calc_button_cb.clone();
            let done: RecognizeCallback = Rc::new(move |outcome| {
                set_button_busy(&done_button, false);
                match outcome {
                    Ok(results) => {
                        let merged = {
                            let mut guard = done_state.borrow_mut();
                            let state = &mut *guard;
                            let merged =
                                merge_results(&mut state.vars, &mut state.overlays, &results);
                            clear_canvas(state);
                            state.phase = Phase::Idle;
                            merged
                        };
                        for name in &merged.skipped_assignments {
                            web_sys::console::warn_1(
                                &format!("Dropping non-numeric assignment for {name}").into(),
                            );
                        }
                        if debug {
                            web_sys::console::log_1(
                                &format!(
                                    "Recognition round results={} overlays={}",
                                    results.len(),
                                    merged.appended.len()
                                )
                                .into(),
                            );
                        }
                        mount_appended(
                            &done_window,
                            &done_document,
                            &done_layer,
                            &done_state,
                            &merged.appended,
                        );
                        set_status(
                            &done_status_el,
                            &done_status_text,
                            "ready",
                            "Draw an expression",
                        );
                    }
                    Err(failure) => {
                        web_sys::console::error_1(
                            &format!("Recognition failed: {failure}").into(),
                        );
                        done_state.borrow_mut().phase = Phase::Idle;
                        set_status(
                            &done_status_el,
                            &done_status_text,
                            "error",
                            "Recognition failed, try again",
                        );
                    }
                }
            });
            recognize(&submit_window, &request, done);
        });
        calc_button.add_event_listener_with_callback("click", onclick.as_ref().unchecked_ref())?;
        onclick.forget();
    }

    Ok(())
}
