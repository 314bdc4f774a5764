use yew::prelude::*;
use yew_router::prelude::*;

mod api;
mod auth;
mod capabilities;
mod config;
mod error;
mod guard;
mod layout;
mod logout;
mod markdown;
mod models;
mod register;
mod session;
mod utils;

// screens
mod admin;
mod chat;
mod conversation;
mod profile;
mod rating;
mod resolutions;
mod tutor;

use guard::Guard;
use models::Role;
use session::SessionProvider;

/* -------------------- routing -------------------- */

#[derive(Routable, Clone, PartialEq, Debug)]
pub enum Route {
    #[at("/")]
    Root,
    #[at("/login")]
    Login,
    #[at("/register")]
    Register,
    #[at("/chat")]
    Chat,
    #[at("/tutor")]
    Tutor,
    #[at("/admin")]
    Admin,
    #[not_found]
    #[at("/404")]
    NotFound,
}

fn switch(route: Route) -> Html {
    match route {
        Route::Root => html!(<Redirect<Route> to={Route::Login} />),
        Route::Login => html!(<auth::LoginForm />),
        Route::Register => html!(<register::RegisterForm />),
        Route::Chat => html!(<Guard need={Role::Student}><chat::Chat /></Guard>),
        Route::Tutor => html!(<Guard need={Role::Tutor}><tutor::TutorDashboard /></Guard>),
        Route::Admin => html!(<Guard need={Role::Admin}><admin::AdminDashboard /></Guard>),
        Route::NotFound => html!(<h1>{"404 – Not Found"}</h1>),
    }
}

/* -------------------- entry point ---------------- */

#[function_component(App)]
fn app() -> Html {
    html! {
        <SessionProvider>
            <BrowserRouter>
                <Switch<Route> render={switch} />
            </BrowserRouter>
        </SessionProvider>
    }
}

fn main() {
    wasm_logger::init(wasm_logger::Config::new(log::Level::Info));
    log::info!("api origin: {}", config::API_BASE);
    yew::Renderer::<App>::new().render();
}
