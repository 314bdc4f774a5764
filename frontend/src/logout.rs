use yew::prelude::*;
use yew_router::prelude::*;

use crate::{session::use_session, Route};

#[derive(Properties, PartialEq)]
pub struct LogoutProps {
    #[prop_or(AttrValue::Static("btn-primary btn-danger"))]
    pub class: AttrValue,
}

#[function_component(Logout)]
pub fn logout(props: &LogoutProps) -> Html {
    let navigator = use_navigator().unwrap();
    let session   = use_session();

    // no server round-trip: the token is only forgotten locally
    let onclick = Callback::from(move |_: MouseEvent| {
        session.clear();
        navigator.replace(&Route::Login);
    });

    html! { <button class={props.class.clone()} {onclick}>{ "Logout" }</button> }
}
