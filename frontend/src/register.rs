use yew::prelude::*;
use yew_router::prelude::*;
use wasm_bindgen_futures::spawn_local;

use crate::models::{Ack, RegisterBody, Role};
use crate::session::use_session;
use crate::utils::bind_input;
use crate::Route;

/// Tutors must name the subject they cover; nobody else sees the field.
pub fn subject_required(role: Role) -> bool {
    role == Role::Tutor
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct RegisterFields {
    pub name:     String,
    pub email:    String,
    pub password: String,
    pub subject:  String,
}

impl RegisterFields {
    /// Body for `POST /register/{role}`; `subject` only travels for tutors.
    pub fn body_for(&self, role: Role) -> RegisterBody {
        RegisterBody {
            name:     self.name.clone(),
            email:    self.email.clone(),
            password: self.password.clone(),
            subject:  subject_required(role).then(|| self.subject.clone()),
        }
    }
}

#[function_component(RegisterForm)]
pub fn register_form() -> Html {
    let navigator = use_navigator().unwrap();
    let session   = use_session();
    let role      = use_state(|| Role::Student);

    let name      = use_state(String::new);
    let email     = use_state(String::new);
    let password  = use_state(String::new);
    let subject   = use_state(String::new);

    let onsubmit = {
        let role     = role.clone();
        let name     = name.clone();
        let email    = email.clone();
        let password = password.clone();
        let subject  = subject.clone();

        Callback::from(move |ev: SubmitEvent| {
            ev.prevent_default();

            let role   = *role;
            let fields = RegisterFields {
                name:     (*name).clone(),
                email:    (*email).clone(),
                password: (*password).clone(),
                subject:  (*subject).clone(),
            };
            let navigator = navigator.clone();
            let api       = session.api();

            spawn_local(async move {
                let path = format!("/register/{role}");
                match api.post::<_, Ack>(&path, Some(&fields.body_for(role))).await {
                    Ok(_) => {
                        gloo_dialogs::alert("Registration Successful! Please Login.");
                        navigator.push(&Route::Login);
                    }
                    Err(e) => {
                        log::error!("register: {e} ({:?})", e.detail());
                        gloo_dialogs::alert("Registration failed. Email might be taken.");
                    }
                }
            });
        })
    };

    let role_buttons = Role::ALL.iter().map(|&r| {
        let class = classes!("role-btn", (*role == r).then_some("active"));
        let onclick = {
            let role = role.clone();
            Callback::from(move |_: MouseEvent| role.set(r))
        };
        html! { <button key={r.as_str()} type="button" {class} {onclick}>{ r.label() }</button> }
    });

    html! {
        <div class="auth-container">
            <div class="auth-card">
                <h2>{"🚀 Create Account"}</h2>

                <div class="role-group">{ for role_buttons }</div>

                <form {onsubmit}>
                    <input class="form-control" type="text"     placeholder="Full Name"     required=true
                        value={(*name).clone()}     oninput={bind_input(&name)} />
                    <input class="form-control" type="email"    placeholder="Email Address" required=true
                        value={(*email).clone()}    oninput={bind_input(&email)} />
                    <input class="form-control" type="password" placeholder="Password"      required=true
                        value={(*password).clone()} oninput={bind_input(&password)} />

                    if subject_required(*role) {
                        <input class="form-control" type="text" placeholder="Subject Specialization" required=true
                            value={(*subject).clone()} oninput={bind_input(&subject)} />
                    }

                    <button type="submit" class="btn-primary">{ format!("Join as {}", role.label()) }</button>
                </form>

                <p class="auth-switch">
                    {"Already have an account? "}
                    <Link<Route> to={Route::Login}>{"Login"}</Link<Route>>
                </p>
            </div>
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_tutors_need_a_subject() {
        assert!(subject_required(Role::Tutor));
        assert!(!subject_required(Role::Student));
        assert!(!subject_required(Role::Admin));
    }

    #[test]
    fn subject_travels_only_for_tutors() {
        let fields = RegisterFields {
            name: "Grace".into(),
            email: "grace@example.com".into(),
            password: "secret".into(),
            subject: "Physics".into(),
        };
        assert_eq!(fields.body_for(Role::Tutor).subject.as_deref(), Some("Physics"));
        assert_eq!(fields.body_for(Role::Student).subject, None);
        assert_eq!(fields.body_for(Role::Admin).subject, None);
    }
}
