use std::collections::HashMap;
use std::rc::Rc;

use wasm_bindgen_futures::spawn_local;
use yew::prelude::*;
use yew_router::prelude::*;

use crate::api::ApiClient;
use crate::error::{ApiError, LoginRedirect};
use crate::layout::DashboardLayout;
use crate::models::{Ack, PendingQuery, TutorAnswerBody};
use crate::session::use_session;
use crate::utils::{format_datetime, textarea_value};
use crate::Route;

/* -------------------------------------------------------------------------- */
/*                               loading                                      */
/* -------------------------------------------------------------------------- */

async fn load_pending(api: &ApiClient) -> Result<Vec<PendingQuery>, ApiError> {
    api.get::<Vec<PendingQuery>>("/tutor/pending").await
}

const LOAD_REDIRECT: LoginRedirect = LoginRedirect::OnAuthFailure;

/* -------------------------------------------------------------------------- */
/*                                 drafts                                     */
/* -------------------------------------------------------------------------- */

/// Answer text being written, one entry per pending query.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Drafts(HashMap<i64, String>);

pub enum DraftAction {
    Edit { query_id: i64, text: String },
    Clear(i64),
}

impl Drafts {
    pub fn text(&self, query_id: i64) -> &str {
        self.0.get(&query_id).map(String::as_str).unwrap_or_default()
    }

    /// Draft for `query_id`, or `None` when there is nothing to submit.
    pub fn submittable(&self, query_id: i64) -> Option<String> {
        self.0.get(&query_id).filter(|d| !d.is_empty()).cloned()
    }

    pub fn apply(&mut self, action: DraftAction) {
        match action {
            DraftAction::Edit { query_id, text } => {
                self.0.insert(query_id, text);
            }
            DraftAction::Clear(query_id) => {
                self.0.remove(&query_id);
            }
        }
    }
}

impl Reducible for Drafts {
    type Action = DraftAction;

    fn reduce(self: Rc<Self>, action: Self::Action) -> Rc<Self> {
        let mut next = (*self).clone();
        next.apply(action);
        Rc::new(next)
    }
}

/* -------------------------------------------------------------------------- */
/*                              tutor workspace                               */
/* -------------------------------------------------------------------------- */

#[function_component(TutorDashboard)]
pub fn tutor_dashboard() -> Html {
    let navigator = use_navigator().unwrap();
    let session   = use_session();
    let queries   = use_state(Vec::<PendingQuery>::new);
    let drafts    = use_reducer(Drafts::default);

    /* -------- initial load -------- */
    {
        let api       = session.api();
        let queries   = queries.clone();
        let navigator = navigator.clone();
        use_effect_with((), move |_| {
            spawn_local(async move {
                match load_pending(&api).await {
                    Ok(list) => queries.set(list),
                    Err(e) if LOAD_REDIRECT.applies(&e) => navigator.push(&Route::Login),
                    Err(e) => log::error!("pending queries: {e}"),
                }
            });
            || ()
        });
    }

    /* -------- submit one answer, then reload -------- */
    let on_submit = {
        let api     = session.api();
        let queries = queries.clone();
        let drafts  = drafts.clone();

        Callback::from(move |query_id: i64| {
            let Some(content) = drafts.submittable(query_id) else {
                return;
            };
            let api     = api.clone();
            let queries = queries.clone();
            let drafts  = drafts.dispatcher();

            spawn_local(async move {
                let body = TutorAnswerBody { query_id, content };
                match api.post::<_, Ack>("/tutor/answer", Some(&body)).await {
                    Ok(_) => {
                        gloo_dialogs::alert("Answer Submitted Successfully!");
                        drafts.dispatch(DraftAction::Clear(query_id));

                        match load_pending(&api).await {
                            Ok(list) => queries.set(list),
                            Err(e) => log::error!("pending queries: {e}"),
                        }
                    }
                    Err(e) => {
                        log::error!("answer #{query_id}: {e}");
                        gloo_dialogs::alert("Failed to submit answer.");
                    }
                }
            });
        })
    };

    /* ---------------------------- rendering ------------------------------- */

    let subtitle = html!(<p class="muted">{"Review and answer student escalations."}</p>);

    let body = if queries.is_empty() {
        html! {
            <div class="empty-card">
                <div class="empty-icon">{"🎉"}</div>
                <h2>{"All Caught Up!"}</h2>
                <p class="muted">{"There are no pending queries requiring your attention."}</p>
            </div>
        }
    } else {
        let cards = queries.iter().map(|q| {
            let query_id = q.query_id;
            let oninput = {
                let drafts = drafts.dispatcher();
                Callback::from(move |e: InputEvent| {
                    if let Some(text) = textarea_value(&e) {
                        drafts.dispatch(DraftAction::Edit { query_id, text });
                    }
                })
            };
            let onclick = {
                let on_submit = on_submit.clone();
                Callback::from(move |_: MouseEvent| on_submit.emit(query_id))
            };
            let draft = drafts.text(query_id).to_string();

            html! {
                <div key={query_id} class="query-card">
                    <div class="qc-header">
                        <div class="qc-id">
                            <span class="badge escalated">{"Escalated"}</span>
                            <span class="muted">{ format!("ID: #{query_id}") }</span>
                        </div>
                        <span class="qc-time">{ format_datetime(q.timestamp.as_deref()) }</span>
                    </div>

                    <div class="qc-body">
                        <div class="qc-label">{"Student Question:"}</div>
                        <div class="qc-question">{ q.content.clone() }</div>

                        <div class="qc-label">{"Your Answer:"}</div>
                        <div class="qc-input-area">
                            <textarea class="qc-textarea" rows="3"
                                placeholder="Write a clear and helpful explanation..."
                                value={draft} {oninput} />
                            <button class="btn-primary btn-auto" {onclick}>{"Send"}</button>
                        </div>
                    </div>
                </div>
            }
        });
        html! { for cards }
    };

    html! {
        <DashboardLayout title="👨‍🏫 Tutor Workspace" {subtitle}>
            <div class="dashboard-column">{ body }</div>
        </DashboardLayout>
    }
}
