use std::rc::Rc;

use gloo::storage::{LocalStorage, Storage};
use yew::prelude::*;

use crate::api::ApiClient;
use crate::config::{ROLE_KEY, TOKEN_KEY};
use crate::models::Role;

/* ---------------- stored credential ---------------- */
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Credentials {
    pub token: String,
    pub role:  String,
}

impl Credentials {
    pub fn new(token: impl Into<String>, role: impl Into<String>) -> Self {
        Self { token: token.into(), role: role.into() }
    }

    pub fn has_role(&self, role: Role) -> bool {
        self.role == role.as_str()
    }
}

/* ---------------- persistence ---------------------- */

/// Where the token/role pair lives between page loads.
pub trait CredentialStore {
    fn load(&self) -> Option<Credentials>;
    fn save(&self, credentials: &Credentials);
    fn clear(&self);
}

/// `window.localStorage`, raw strings under `token` and `role`.
#[derive(Clone, Copy, Debug, Default)]
pub struct BrowserStore;

impl CredentialStore for BrowserStore {
    fn load(&self) -> Option<Credentials> {
        let storage = LocalStorage::raw();
        let token = storage.get_item(TOKEN_KEY).ok().flatten()?;
        let role = storage.get_item(ROLE_KEY).ok().flatten().unwrap_or_default();
        Some(Credentials { token, role })
    }

    fn save(&self, credentials: &Credentials) {
        let storage = LocalStorage::raw();
        if storage.set_item(TOKEN_KEY, &credentials.token).is_err()
            || storage.set_item(ROLE_KEY, &credentials.role).is_err()
        {
            log::error!("could not persist credentials to local storage");
        }
    }

    fn clear(&self) {
        let storage = LocalStorage::raw();
        let _ = storage.remove_item(TOKEN_KEY);
        let _ = storage.remove_item(ROLE_KEY);
    }
}

/* ---------------- session state -------------------- */

pub enum SessionAction {
    /// Login: persist then publish.
    Establish(Credentials),
    /// Logout: both keys go together.
    Clear,
}

/// Current credential plus the store it is mirrored into.
#[derive(Clone)]
pub struct SessionState {
    store:       Rc<dyn CredentialStore>,
    credentials: Option<Credentials>,
}

impl SessionState {
    /// Reads whatever the store kept from a previous page load.
    pub fn restore(store: Rc<dyn CredentialStore>) -> Self {
        let credentials = store.load();
        Self { store, credentials }
    }

    pub fn credentials(&self) -> Option<&Credentials> {
        self.credentials.as_ref()
    }

    pub fn apply(&mut self, action: SessionAction) {
        match action {
            SessionAction::Establish(credentials) => {
                self.store.save(&credentials);
                self.credentials = Some(credentials);
            }
            SessionAction::Clear => {
                self.store.clear();
                self.credentials = None;
            }
        }
    }
}

impl PartialEq for SessionState {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.store, &other.store) && self.credentials == other.credentials
    }
}

impl Reducible for SessionState {
    type Action = SessionAction;

    fn reduce(self: Rc<Self>, action: Self::Action) -> Rc<Self> {
        let mut next = (*self).clone();
        next.apply(action);
        Rc::new(next)
    }
}

/* ---------------- context ------------------------- */

/// Live credential shared by the router, the guard and every screen.
#[derive(Clone, PartialEq)]
pub struct SessionContext {
    state: UseReducerHandle<SessionState>,
}

impl SessionContext {
    pub fn credentials(&self) -> Option<&Credentials> {
        self.state.credentials()
    }

    /// Client bound to the current credential.
    pub fn api(&self) -> ApiClient {
        ApiClient::new(self.credentials())
    }

    pub fn establish(&self, credentials: Credentials) {
        self.state.dispatch(SessionAction::Establish(credentials));
    }

    pub fn clear(&self) {
        self.state.dispatch(SessionAction::Clear);
    }
}

#[hook]
pub fn use_session() -> SessionContext {
    use_context::<SessionContext>().expect("SessionProvider missing")
}

#[derive(Properties, PartialEq)]
pub struct SessionProviderProps {
    #[prop_or_default]
    pub children: Children,
}

#[function_component(SessionProvider)]
pub fn session_provider(props: &SessionProviderProps) -> Html {
    // initialised once from storage, synchronously, before the first route renders
    let state = use_reducer(|| SessionState::restore(Rc::new(BrowserStore)));
    let context = SessionContext { state };

    html! {
        <ContextProvider<SessionContext> context={context}>
            { for props.children.iter() }
        </ContextProvider<SessionContext>>
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::cell::RefCell;

    use super::*;

    #[derive(Default)]
    pub(crate) struct MemoryStore {
        items: RefCell<Option<Credentials>>,
    }

    impl CredentialStore for MemoryStore {
        fn load(&self) -> Option<Credentials> {
            self.items.borrow().clone()
        }

        fn save(&self, credentials: &Credentials) {
            *self.items.borrow_mut() = Some(credentials.clone());
        }

        fn clear(&self) {
            *self.items.borrow_mut() = None;
        }
    }

    #[test]
    fn restores_what_the_store_kept() {
        let store = Rc::new(MemoryStore::default());
        assert_eq!(SessionState::restore(store.clone()).credentials(), None);

        store.save(&Credentials::new("abc", "tutor"));
        let state = SessionState::restore(store);
        assert_eq!(state.credentials(), Some(&Credentials::new("abc", "tutor")));
    }

    #[test]
    fn login_then_logout_goes_through_the_store() {
        let store = Rc::new(MemoryStore::default());
        let mut state = SessionState::restore(store.clone());

        state.apply(SessionAction::Establish(Credentials::new("abc", "student")));
        assert_eq!(store.load(), Some(Credentials::new("abc", "student")));
        assert_eq!(state.credentials().map(|c| c.role.as_str()), Some("student"));

        // a reload after login sees the same credential
        assert_eq!(SessionState::restore(store.clone()).credentials(), state.credentials());

        state.apply(SessionAction::Clear);
        assert_eq!(store.load(), None);
        assert_eq!(state.credentials(), None);
        assert_eq!(SessionState::restore(store).credentials(), None);
    }

    #[test]
    fn role_comparison_is_exact() {
        let c = Credentials::new("t", "tutor");
        assert!(c.has_role(Role::Tutor));
        assert!(!c.has_role(Role::Admin));
        assert!(!Credentials::new("t", "Tutor").has_role(Role::Tutor));
        assert!(!Credentials::new("t", "").has_role(Role::Student));
    }
}
