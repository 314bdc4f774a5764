use yew::prelude::*;
use yew_router::prelude::*;
use wasm_bindgen_futures::spawn_local;

use crate::models::{Role, TokenResponse};
use crate::session::{use_session, Credentials};
use crate::utils::node_value;
use crate::Route;

/* -------------------------------------------------------------------------- */
/*                        role  →  landing screen                              */
/* -------------------------------------------------------------------------- */

pub fn route_for_role(role: &str) -> Route {
    if role == Role::Tutor.as_str() {
        Route::Tutor
    } else if role == Role::Admin.as_str() {
        Route::Admin
    } else {
        Route::Chat
    }
}

/* -------------------------------------------------------------------------- */
/*                              login component                                */
/* -------------------------------------------------------------------------- */

#[function_component(LoginForm)]
pub fn login_form() -> Html {
    let navigator    = use_navigator().unwrap();
    let session      = use_session();
    let email_ref    = use_node_ref();
    let password_ref = use_node_ref();

    let onsubmit = {
        let email_ref    = email_ref.clone();
        let password_ref = password_ref.clone();

        Callback::from(move |ev: SubmitEvent| {
            ev.prevent_default();

            let email    = node_value(&email_ref);
            let password = node_value(&password_ref);
            let navigator = navigator.clone();
            let session   = session.clone();

            spawn_local(async move {
                // anonymous client: no credential yet
                let resp = session
                    .api()
                    .post_form::<TokenResponse>("/login", &[("username", &email), ("password", &password)])
                    .await;

                match resp {
                    Ok(token) => {
                        log::info!("signed in as {}", token.role);
                        let target = route_for_role(&token.role);
                        session.establish(Credentials::new(token.access_token, token.role));
                        navigator.push(&target);
                    }
                    Err(e) => {
                        log::error!("login: {e}");
                        gloo_dialogs::alert("Invalid Credentials");
                    }
                }
            });
        })
    };

    html! {
        <div class="auth-container">
            <div class="auth-card">
                <h2>{"👋 Welcome Back"}</h2>
                <p class="muted">{"Enter your credentials to access your account."}</p>

                <form {onsubmit}>
                    <input ref={email_ref}    class="form-control" type="email"    placeholder="Email Address" required=true />
                    <input ref={password_ref} class="form-control" type="password" placeholder="Password"      required=true />
                    <button type="submit" class="btn-primary">{"Sign In"}</button>
                </form>

                <p class="auth-switch">
                    {"Don't have an account? "}
                    <Link<Route> to={Route::Register}>{"Register"}</Link<Route>>
                </p>
            </div>
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn landing_route_per_role() {
        assert_eq!(route_for_role("tutor"), Route::Tutor);
        assert_eq!(route_for_role("admin"), Route::Admin);
        assert_eq!(route_for_role("student"), Route::Chat);
        assert_eq!(route_for_role(""), Route::Chat);
        assert_eq!(route_for_role("Admin"), Route::Chat);
    }
}
