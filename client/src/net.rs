use std::fmt;
use std::rc::Rc;

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Request, RequestInit, Response, Window};

use inkmath_shared::{Recognition, RecognizeRequest, RecognizeResponse};

/// The gateway forwards this path to the configured recognizer endpoint.
pub const RECOGNIZE_PATH: &str = "/api/calculate";

#[derive(Debug)]
pub enum RecognitionFailure {
    Transport(String),
    Status(u16),
    Malformed(String),
}

impl fmt::Display for RecognitionFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecognitionFailure::Transport(detail) => write!(f, "transport error: {detail}"),
            RecognitionFailure::Status(status) => write!(f, "recognizer returned status {status}"),
            RecognitionFailure::Malformed(detail) => write!(f, "malformed response: {detail}"),
        }
    }
}

pub type RecognizeCallback = Rc<dyn Fn(Result<Vec<Recognition>, RecognitionFailure>)>;

fn js_error_text(value: &JsValue) -> String {
    value.as_string().unwrap_or_else(|| format!("{value:?}"))
}

/// Sends the snapshot plus variable context to the recognizer. Exactly one
/// network attempt; `done` fires once on the event loop with the parsed
/// results or the failure. No partial results are ever delivered.
pub fn recognize(window: &Window, request: &RecognizeRequest, done: RecognizeCallback) {
    let payload = match serde_json::to_string(request) {
        Ok(payload) => payload,
        Err(error) => {
            done(Err(RecognitionFailure::Malformed(error.to_string())));
            return;
        }
    };

    let init = RequestInit::new();
    init.set_method("POST");
    init.set_body(&JsValue::from_str(&payload));
    let request = match Request::new_with_str_and_init(RECOGNIZE_PATH, &init) {
        Ok(request) => request,
        Err(error) => {
            done(Err(RecognitionFailure::Transport(js_error_text(&error))));
            return;
        }
    };
    if let Err(error) = request.headers().set("content-type", "application/json") {
        done(Err(RecognitionFailure::Transport(js_error_text(&error))));
        return;
    }

    let promise = window.fetch_with_request(&request);

    let done_ok = done.clone();
    let on_response = Closure::<dyn FnMut(JsValue)>::new(move |value: JsValue| {
        let response: Response = match value.dyn_into() {
            Ok(response) => response,
            Err(_) => {
                done_ok(Err(RecognitionFailure::Transport(
                    "fetch resolved without a response".to_string(),
                )));
                return;
            }
        };
        if !response.ok() {
            done_ok(Err(RecognitionFailure::Status(response.status())));
            return;
        }
        let text_promise = match response.text() {
            Ok(promise) => promise,
            Err(error) => {
                done_ok(Err(RecognitionFailure::Transport(js_error_text(&error))));
                return;
            }
        };
        let done_text = done_ok.clone();
        let on_text = Closure::<dyn FnMut(JsValue)>::new(move |value: JsValue| {
            let Some(text) = value.as_string() else {
                done_text(Err(RecognitionFailure::Malformed(
                    "response body is not text".to_string(),
                )));
                return;
            };
            match serde_json::from_str::<RecognizeResponse>(&text) {
                Ok(parsed) => done_text(Ok(parsed.data)),
                Err(error) => done_text(Err(RecognitionFailure::Malformed(error.to_string()))),
            }
        });
        let done_text_err = done_ok.clone();
        let on_text_err = Closure::<dyn FnMut(JsValue)>::new(move |error: JsValue| {
            done_text_err(Err(RecognitionFailure::Transport(js_error_text(&error))));
        });
        let _ = text_promise.then2(&on_text, &on_text_err);
        on_text.forget();
        on_text_err.forget();
    });
    let done_err = done.clone();
    let on_reject = Closure::<dyn FnMut(JsValue)>::new(move |error: JsValue| {
        done_err(Err(RecognitionFailure::Transport(js_error_text(&error))));
    });
    let _ = promise.then2(&on_response, &on_reject);
    on_response.forget();
    on_reject.forget();
}
