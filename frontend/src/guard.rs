use yew::prelude::*;
use yew_router::prelude::*;

use crate::models::Role;
use crate::session::{use_session, Credentials};
use crate::Route;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Access {
    Render,
    RedirectToLogin,
}

/// No credential, or a role other than the required one, sends the visitor to login.
pub fn access_for(credentials: Option<&Credentials>, need: Option<Role>) -> Access {
    match (credentials, need) {
        (None, _) => Access::RedirectToLogin,
        (Some(c), Some(role)) if !c.has_role(role) => Access::RedirectToLogin,
        (Some(_), _) => Access::Render,
    }
}

#[derive(Properties, PartialEq)]
pub struct GuardProps {
    #[prop_or_default]
    pub need: Option<Role>,
    #[prop_or_default]
    pub children: Children,
}

#[function_component(Guard)]
pub fn guard(props: &GuardProps) -> Html {
    let session = use_session();
    match access_for(session.credentials(), props.need) {
        Access::Render => html! { for props.children.iter() },
        Access::RedirectToLogin => html!(<Redirect<Route> to={Route::Login} />),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_credential_redirects() {
        assert_eq!(access_for(None, Some(Role::Student)), Access::RedirectToLogin);
        assert_eq!(access_for(None, None), Access::RedirectToLogin);
    }

    #[test]
    fn wrong_role_redirects() {
        let c = Credentials::new("t", "student");
        assert_eq!(access_for(Some(&c), Some(Role::Admin)), Access::RedirectToLogin);
        assert_eq!(access_for(Some(&c), Some(Role::Tutor)), Access::RedirectToLogin);
    }

    #[test]
    fn matching_role_renders() {
        let c = Credentials::new("t", "admin");
        assert_eq!(access_for(Some(&c), Some(Role::Admin)), Access::Render);
    }

    #[test]
    fn any_role_renders_when_none_required() {
        let c = Credentials::new("t", "");
        assert_eq!(access_for(Some(&c), None), Access::Render);
    }
}
