//! Small DOM helpers shared by the screens.

use wasm_bindgen::JsValue;
use web_sys::{HtmlInputElement, HtmlTextAreaElement};
use yew::prelude::*;

/// Current value of an `<input>` behind a node ref; empty when unmounted.
pub fn node_value(node: &NodeRef) -> String {
    node.cast::<HtmlInputElement>()
        .map(|input| input.value())
        .unwrap_or_default()
}

/// `oninput` handler writing the field into a string state.
pub fn bind_input(state: &UseStateHandle<String>) -> Callback<InputEvent> {
    let state = state.clone();
    Callback::from(move |e: InputEvent| {
        if let Some(input) = e.target_dyn_into::<HtmlInputElement>() {
            state.set(input.value());
        }
    })
}

pub fn textarea_value(e: &InputEvent) -> Option<String> {
    e.target_dyn_into::<HtmlTextAreaElement>().map(|t| t.value())
}

/* -------------------- dates -------------------- */

fn parse_date(iso: &str) -> Option<js_sys::Date> {
    let date = js_sys::Date::new(&JsValue::from_str(iso));
    // invalid dates have a NaN timestamp
    (!date.get_time().is_nan()).then_some(date)
}

/// `toLocaleDateString()`; the raw string when the browser cannot parse it.
pub fn format_date(iso: Option<&str>) -> String {
    match iso {
        Some(s) => parse_date(s)
            .map(|d| String::from(d.to_locale_date_string("en-US", &JsValue::UNDEFINED)))
            .unwrap_or_else(|| s.to_string()),
        None => "—".into(),
    }
}

/// `toLocaleString()` counterpart of [`format_date`].
pub fn format_datetime(iso: Option<&str>) -> String {
    match iso {
        Some(s) => parse_date(s)
            .map(|d| String::from(d.to_locale_string("en-US", &JsValue::UNDEFINED)))
            .unwrap_or_else(|| s.to_string()),
        None => "—".into(),
    }
}

/// Badge class used by every status pill.
pub fn status_badge(status: &str) -> &'static str {
    if status == "resolved" { "badge resolved" } else { "badge escalated" }
}
