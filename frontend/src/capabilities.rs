//! Browser integrations: speech recognition, file reads, print, scrolling.
//! Nothing in the chat view model depends on this module.

use js_sys::{Array, Function, Reflect};
use wasm_bindgen::{closure::Closure, JsCast, JsValue};
use web_sys::{ScrollBehavior, ScrollIntoViewOptions};
use yew::prelude::*;

use crate::config::SPEECH_LANG;

/* -------------------------------------------------------------------------- */
/*                            speech recognition                              */
/* -------------------------------------------------------------------------- */

type Handler = Closure<dyn FnMut(JsValue)>;

/// Wraps `SpeechRecognition` / `webkitSpeechRecognition`. Dropping it stops
/// the recognizer and releases the JS callbacks.
pub struct SpeechInput {
    recognizer: JsValue,
    _handlers:  [Handler; 3],
}

fn prop(target: &JsValue, key: &str) -> Option<JsValue> {
    Reflect::get(target, &JsValue::from_str(key)).ok()
}

fn set_prop(target: &JsValue, key: &str, value: &JsValue) {
    if Reflect::set(target, &JsValue::from_str(key), value).is_err() {
        log::warn!("speech: cannot set {key}");
    }
}

/// Concatenated transcript of a `SpeechRecognitionEvent`.
fn transcript_of(event: &JsValue) -> String {
    let Some(results) = prop(event, "results") else {
        return String::new();
    };
    Array::from(&results)
        .iter()
        .filter_map(|result| Reflect::get_u32(&result, 0).ok())
        .filter_map(|alt| prop(&alt, "transcript").and_then(|t| t.as_string()))
        .collect()
}

impl SpeechInput {
    /// `None` when the browser has no recognizer.
    pub fn new(on_text: Callback<String>, on_end: Callback<()>, on_denied: Callback<()>) -> Option<Self> {
        let window: JsValue = web_sys::window()?.into();
        let ctor = ["SpeechRecognition", "webkitSpeechRecognition"]
            .iter()
            .filter_map(|name| prop(&window, name))
            .find(|v| v.is_function())?
            .unchecked_into::<Function>();
        let recognizer = Reflect::construct(&ctor, &Array::new()).ok()?;

        set_prop(&recognizer, "lang", &JsValue::from_str(SPEECH_LANG));
        set_prop(&recognizer, "interimResults", &JsValue::TRUE);
        set_prop(&recognizer, "continuous", &JsValue::FALSE);

        let onresult: Handler = Closure::new(move |e: JsValue| on_text.emit(transcript_of(&e)));
        let onerror: Handler = {
            let on_end = on_end.clone();
            Closure::new(move |e: JsValue| {
                let code = prop(&e, "error").and_then(|v| v.as_string()).unwrap_or_default();
                log::warn!("speech recognition error: {code}");
                on_end.emit(());
                if code == "not-allowed" {
                    on_denied.emit(());
                }
            })
        };
        let onend: Handler = Closure::new(move |_: JsValue| on_end.emit(()));

        set_prop(&recognizer, "onresult", onresult.as_ref());
        set_prop(&recognizer, "onerror", onerror.as_ref());
        set_prop(&recognizer, "onend", onend.as_ref());

        Some(Self { recognizer, _handlers: [onresult, onerror, onend] })
    }

    fn call(&self, method: &str) {
        let result = prop(&self.recognizer, method)
            .and_then(|f| f.dyn_into::<Function>().ok())
            .map(|f| f.call0(&self.recognizer));
        if !matches!(result, Some(Ok(_))) {
            log::warn!("speech: {method}() failed");
        }
    }

    pub fn start(&self) {
        self.call("start");
    }

    pub fn stop(&self) {
        self.call("stop");
    }
}

impl Drop for SpeechInput {
    fn drop(&mut self) {
        for key in ["onresult", "onerror", "onend"] {
            set_prop(&self.recognizer, key, &JsValue::NULL);
        }
        self.stop();
    }
}

/* -------------------------------------------------------------------------- */
/*                                  files                                     */
/* -------------------------------------------------------------------------- */

/// Reads a picked file as a `data:` URL, the shape `/query` expects for images.
pub async fn read_as_data_url(file: web_sys::File) -> Result<String, String> {
    let file = gloo::file::File::from(file);
    gloo::file::futures::read_as_data_url(&file)
        .await
        .map_err(|e| e.to_string())
}

/* -------------------------------------------------------------------------- */
/*                              print / scroll                                */
/* -------------------------------------------------------------------------- */

/// Opens the browser print dialog (used as "Export PDF").
pub fn print_page() {
    if let Some(Err(e)) = web_sys::window().map(|w| w.print()) {
        log::error!("print: {e:?}");
    }
}

pub fn scroll_into_view(node: &NodeRef) {
    if let Some(el) = node.cast::<web_sys::Element>() {
        let options = ScrollIntoViewOptions::new();
        options.set_behavior(ScrollBehavior::Smooth);
        el.scroll_into_view_with_scroll_into_view_options(&options);
    }
}
