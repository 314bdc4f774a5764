use wasm_bindgen_futures::spawn_local;
use yew::prelude::*;

use crate::models::{Ack, ProfileUpdate};
use crate::session::use_session;
use crate::utils::bind_input;

#[derive(Properties, PartialEq)]
pub struct ProfileModalProps {
    pub on_close: Callback<()>,
}

#[function_component(ProfileModal)]
pub fn profile_modal(props: &ProfileModalProps) -> Html {
    let session  = use_session();
    let name     = use_state(String::new);
    let password = use_state(String::new);

    let onsubmit = {
        let api      = session.api();
        let name     = name.clone();
        let password = password.clone();
        let on_close = props.on_close.clone();

        Callback::from(move |ev: SubmitEvent| {
            ev.prevent_default();
            let body = ProfileUpdate { name: (*name).clone(), password: (*password).clone() };
            let api      = api.clone();
            let on_close = on_close.clone();

            spawn_local(async move {
                match api.put::<_, Ack>("/users/me", &body).await {
                    Ok(_) => {
                        gloo_dialogs::alert("Profile Updated Successfully!");
                        on_close.emit(());
                    }
                    Err(e) => {
                        log::error!("profile update: {e}");
                        gloo_dialogs::alert("Failed to update profile.");
                    }
                }
            });
        })
    };

    let close = {
        let on_close = props.on_close.clone();
        Callback::from(move |_: MouseEvent| on_close.emit(()))
    };

    html! {
        <div class="modal-overlay" onclick={close.clone()}>
            <div class="modal-content" onclick={Callback::from(|e: MouseEvent| e.stop_propagation())}>
                <h3>{"👤 Edit Profile"}</h3>
                <form class="profile-form" {onsubmit}>
                    <label>{"New Name"}</label>
                    <input class="form-control" type="text" placeholder="Enter new name"
                        value={(*name).clone()} oninput={bind_input(&name)} />
                    <label>{"New Password"}</label>
                    <input class="form-control" type="password" placeholder="Enter new password"
                        value={(*password).clone()} oninput={bind_input(&password)} />
                    <div class="modal-actions">
                        <button type="submit" class="btn-primary">{"Save"}</button>
                        <button type="button" class="btn-primary btn-secondary" onclick={close}>{"Cancel"}</button>
                    </div>
                </form>
            </div>
        </div>
    }
}
