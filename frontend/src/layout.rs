use yew::prelude::*;

use crate::logout;

#[derive(Properties, PartialEq)]
pub struct DashboardLayoutProps {
    pub title: AttrValue,
    /// Rendered under the title (subtitle, status line…).
    #[prop_or_default]
    pub subtitle: Html,
    /// Extra header buttons, placed before Logout.
    #[prop_or_default]
    pub actions: Html,
    #[prop_or_default]
    pub children: Children,
}

/// Frame shared by the tutor and admin screens.
#[function_component(DashboardLayout)]
pub fn dashboard_layout(props: &DashboardLayoutProps) -> Html {
    html! {
        <div class="dashboard-container">
            <header class="dashboard-header">
                <div>
                    <h1>{ props.title.clone() }</h1>
                    { props.subtitle.clone() }
                </div>
                <div class="header-actions">
                    { props.actions.clone() }
                    <logout::Logout class="btn-primary btn-danger btn-auto" />
                </div>
            </header>

            <main class="main-content">
                { for props.children.iter() }
            </main>
        </div>
    }
}
