use std::cell::RefCell;
use std::rc::Rc;

use web_sys::HtmlInputElement;
use wasm_bindgen_futures::spawn_local;
use yew::prelude::*;
use yew_router::prelude::*;

use crate::capabilities::{read_as_data_url, scroll_into_view, SpeechInput};
use crate::conversation::{
    compose, outgoing_text, ActiveView, Bubble, Conversation, ConversationAction, Delivery, Outgoing,
    Sequence,
};
use crate::error::LoginRedirect;
use crate::logout::Logout;
use crate::markdown;
use crate::models::{Ack, ChatSession, NewQuery, QueryStatus};
use crate::profile::ProfileModal;
use crate::rating::RatingModal;
use crate::resolutions::Resolutions;
use crate::session::use_session;
use crate::utils::{bind_input, format_date};
use crate::Route;

/// A rejected send only leaves the screen on 403; history errors are just logged.
const SEND_REDIRECT: LoginRedirect = LoginRedirect::OnForbidden;

#[derive(Clone, Copy, PartialEq)]
enum Tab {
    Chat,
    Escalations,
}

/* -------------------------------------------------------------------------- */
/*                              chat screen                                   */
/* -------------------------------------------------------------------------- */

#[function_component(Chat)]
pub fn chat() -> Html {
    let navigator = use_navigator().unwrap();
    let session   = use_session();
    let conv      = use_reducer(Conversation::default);
    let sequence  = use_mut_ref(Sequence::default);

    /* -------- UI state -------- */
    let tab          = use_state(|| Tab::Chat);
    let input        = use_state(String::new);
    let image        = use_state(|| None::<String>);
    let rating_for   = use_state(|| None::<i64>);
    let show_profile = use_state(|| false);
    let listening    = use_state(|| false);
    let speech: Rc<RefCell<Option<SpeechInput>>> = use_mut_ref(|| None);

    let end_ref  = use_node_ref();
    let file_ref = use_node_ref();

    /* ------------------------------------------------------------------ */
    /* history reload: every snapshot carries a ticket                    */
    /* ------------------------------------------------------------------ */
    let load_history = {
        let api        = session.api();
        let dispatcher = conv.dispatcher();

        Callback::from(move |ticket: u64| {
            let api        = api.clone();
            let dispatcher = dispatcher.clone();

            spawn_local(async move {
                match api.get::<Vec<ChatSession>>("/history").await {
                    Ok(sessions) => dispatcher.dispatch(ConversationAction::HistoryLoaded { ticket, sessions }),
                    Err(e) => log::error!("history #{ticket}: {e}"),
                }
            });
        })
    };

    let refresh = {
        let load_history = load_history.clone();
        let sequence     = sequence.clone();
        Callback::from(move |_: ()| load_history.emit(sequence.borrow().next()))
    };

    {
        let refresh = refresh.clone();
        use_effect_with((), move |_| {
            refresh.emit(());
            || ()
        });
    }

    /* -------- speech recognizer, built once -------- */
    {
        let speech    = speech.clone();
        let input     = input.clone();
        let listening = listening.clone();
        use_effect_with((), move |_| {
            let on_text = Callback::from(move |text: String| input.set(text));
            let on_end  = {
                let listening = listening.clone();
                Callback::from(move |_: ()| listening.set(false))
            };
            let on_denied = Callback::from(|_: ()| gloo_dialogs::alert("Mic denied"));
            *speech.borrow_mut() = SpeechInput::new(on_text, on_end, on_denied);

            move || {
                speech.borrow_mut().take();
            }
        });
    }

    /* -------- keep the newest bubble in view -------- */
    {
        let end_ref = end_ref.clone();
        let deps = (conv.bubbles().len(), conv.is_waiting(), image.is_some());
        use_effect_with(deps, move |_| {
            scroll_into_view(&end_ref);
            || ()
        });
    }

    /* ------------------------------------------------------------------ */
    /* outgoing messages                                                  */
    /* ------------------------------------------------------------------ */
    let deliver = {
        let api          = session.api();
        let dispatcher   = conv.dispatcher();
        let load_history = load_history.clone();
        let sequence     = sequence.clone();
        let navigator    = navigator.clone();

        Callback::from(move |(local_id, request): (u64, NewQuery)| {
            let api          = api.clone();
            let dispatcher   = dispatcher.clone();
            let load_history = load_history.clone();
            let sequence     = sequence.clone();
            let navigator    = navigator.clone();

            spawn_local(async move {
                match api.post::<_, Ack>("/query", Some(&request)).await {
                    Ok(_) => {
                        let refresh_ticket = sequence.borrow().next();
                        dispatcher.dispatch(ConversationAction::Delivered { local_id, refresh_ticket });
                        load_history.emit(refresh_ticket);
                    }
                    Err(e) => {
                        log::error!("query: {e}");
                        dispatcher.dispatch(ConversationAction::Failed(local_id));
                        if SEND_REDIRECT.applies(&e) {
                            navigator.push(&Route::Login);
                        } else {
                            gloo_dialogs::alert("Error sending message.");
                        }
                    }
                }
            });
        })
    };

    let onsubmit = {
        let input      = input.clone();
        let image      = image.clone();
        let listening  = listening.clone();
        let speech     = speech.clone();
        let sequence   = sequence.clone();
        let dispatcher = conv.dispatcher();
        let deliver    = deliver.clone();

        Callback::from(move |ev: SubmitEvent| {
            ev.prevent_default();
            let Some(request) = compose(&input, (*image).clone()) else {
                return;
            };

            let text = outgoing_text(&input, image.is_some());
            input.set(String::new());
            image.set(None);
            if *listening {
                if let Some(s) = speech.borrow().as_ref() {
                    s.stop();
                }
            }

            // optimistic bubble goes in before the request leaves
            let local_id = sequence.borrow().next();
            dispatcher.dispatch(ConversationAction::Queue { local_id, text, request: request.clone() });
            deliver.emit((local_id, request));
        })
    };

    let on_retry = {
        let dispatcher = conv.dispatcher();
        let deliver    = deliver.clone();
        Callback::from(move |o: Outgoing| {
            dispatcher.dispatch(ConversationAction::Retry(o.local_id));
            deliver.emit((o.local_id, o.request));
        })
    };

    let on_discard = {
        let dispatcher = conv.dispatcher();
        Callback::from(move |local_id: u64| dispatcher.dispatch(ConversationAction::Discard(local_id)))
    };

    /* ------------------------------------------------------------------ */
    /* sidebar / query actions                                            */
    /* ------------------------------------------------------------------ */
    let on_new_chat = {
        let api        = session.api();
        let dispatcher = conv.dispatcher();
        let refresh    = refresh.clone();
        let input      = input.clone();
        let image      = image.clone();

        Callback::from(move |_: MouseEvent| {
            let api        = api.clone();
            let dispatcher = dispatcher.clone();
            let refresh    = refresh.clone();
            let input      = input.clone();
            let image      = image.clone();

            spawn_local(async move {
                match api.post::<(), Ack>("/session/new", None).await {
                    Ok(_) => {
                        dispatcher.dispatch(ConversationAction::NewChat);
                        input.set(String::new());
                        image.set(None);
                        refresh.emit(());
                    }
                    Err(e) => {
                        log::error!("new session: {e}");
                        gloo_dialogs::alert("Could not start new chat");
                    }
                }
            });
        })
    };

    let on_escalate = {
        let api     = session.api();
        let refresh = refresh.clone();

        Callback::from(move |query_id: i64| {
            if !gloo_dialogs::confirm("Move this to 'Tutor Resolutions'?") {
                return;
            }
            let api     = api.clone();
            let refresh = refresh.clone();

            spawn_local(async move {
                match api.post::<(), Ack>(&format!("/escalate/{query_id}"), None).await {
                    Ok(_) => {
                        gloo_dialogs::alert("Moved to Escalations!");
                        refresh.emit(());
                    }
                    Err(e) => {
                        log::error!("escalate #{query_id}: {e}");
                        gloo_dialogs::alert("Failed");
                    }
                }
            });
        })
    };

    let on_select = {
        let dispatcher = conv.dispatcher();
        let tab        = tab.clone();
        Callback::from(move |session_id: i64| {
            dispatcher.dispatch(ConversationAction::Select(session_id));
            tab.set(Tab::Chat);
        })
    };

    /* -------- composer extras -------- */
    let on_pick_image = {
        let image = image.clone();
        Callback::from(move |e: Event| {
            let input: HtmlInputElement = e.target_unchecked_into();
            let Some(file) = input.files().and_then(|list| list.get(0)) else {
                return;
            };
            let image = image.clone();
            spawn_local(async move {
                match read_as_data_url(file).await {
                    Ok(url) => image.set(Some(url)),
                    Err(e) => log::error!("image read: {e}"),
                }
            });
        })
    };

    let open_picker = {
        let file_ref = file_ref.clone();
        Callback::from(move |_: MouseEvent| {
            if let Some(input) = file_ref.cast::<HtmlInputElement>() {
                input.click();
            }
        })
    };

    let toggle_mic = {
        let speech    = speech.clone();
        let listening = listening.clone();
        Callback::from(move |_: MouseEvent| {
            let speech = speech.borrow();
            let Some(recognizer) = speech.as_ref() else {
                gloo_dialogs::alert("Use Chrome");
                return;
            };
            if *listening {
                recognizer.stop();
            } else {
                recognizer.start();
            }
            listening.set(!*listening);
        })
    };

    /* ---------------------------- rendering ------------------------------- */

    let escalations: Vec<_> = conv.escalations().into_iter().cloned().collect();
    let waiting = conv.is_waiting();

    let active = conv.active();
    let history_items = conv.history().iter().map(|s| {
        let id = s.session_id;
        let onclick = {
            let on_select = on_select.clone();
            Callback::from(move |_: MouseEvent| on_select.emit(id))
        };
        let selected = active == ActiveView::Session(id);
        html! {
            <div key={id} class={classes!("history-item", selected.then_some("active"))} {onclick}>
                <div>{ format_date(s.started_at.as_deref()) }</div>
                <div class="history-count">{ format!("{} Queries", s.queries.len()) }</div>
            </div>
        }
    });

    let bubbles = conv.bubbles().into_iter().map(|b| {
        render_bubble(b, &on_escalate, &rating_for, &on_retry, &on_discard)
    });

    let tab_button = |t: Tab, label: Html| {
        let onclick = {
            let tab = tab.clone();
            Callback::from(move |_: MouseEvent| tab.set(t))
        };
        html! { <button class={classes!("tab-btn", (*tab == t).then_some("active"))} {onclick}>{ label }</button> }
    };

    let escalation_label = html! {
        <>
            {"👨‍🏫 Tutor Resolutions"}
            if !escalations.is_empty() {
                <span class="count-badge">{ escalations.len().to_string() }</span>
            }
        </>
    };

    html! {
        <div class="chat-layout">
            /* ---------------- sidebar ---------------- */
            <div class="sidebar">
                <div class="sidebar-header"><span>{"📚"}</span>{" DoubtSolver"}</div>

                <div class="sidebar-new">
                    <button class="btn-primary btn-outline" onclick={on_new_chat}>
                        <span>{"+"}</span>{" New Chat"}
                    </button>
                </div>

                <div class="history-list">
                    <div class="history-title">{"HISTORY"}</div>
                    { for history_items }
                </div>

                <div class="sidebar-footer">
                    <button class="btn-primary btn-muted" onclick={{
                        let show_profile = show_profile.clone();
                        Callback::from(move |_: MouseEvent| show_profile.set(true))
                    }}>{"👤 My Profile"}</button>
                    <Logout />
                </div>
            </div>

            /* ---------------- main pane ---------------- */
            <div class="chat-main">
                <div class="tabs-header">
                    { tab_button(Tab::Chat, html!({"💬 AI Chat"})) }
                    { tab_button(Tab::Escalations, escalation_label) }
                </div>

                if *tab == Tab::Chat {
                    <div class="messages-area">
                        if conv.shows_welcome() {
                            <div class="welcome">
                                <div class="welcome-icon">{"🤖"}</div>
                                <h2>{"How can I help you today?"}</h2>
                                <p class="muted">{"Ask about math, science, coding, or upload an image."}</p>
                            </div>
                        } else {
                            { for bubbles }
                        }
                        if waiting {
                            <div class="message-bubble msg-ai">{"Thinking..."}</div>
                        }
                        <div ref={end_ref} />
                    </div>

                    <div class="input-container">
                        if let Some(src) = (*image).clone() {
                            <div class="image-preview">
                                <img src={src} alt="Preview" />
                                <button class="image-remove" onclick={{
                                    let image = image.clone();
                                    Callback::from(move |_: MouseEvent| image.set(None))
                                }}>{"×"}</button>
                            </div>
                        }
                        <form class="input-box-wrapper" {onsubmit}>
                            <input type="file" accept="image/*" ref={file_ref} style="display:none" onchange={on_pick_image} />
                            <button type="button" class="icon-btn" title="Attach Image" onclick={open_picker}>{"📎"}</button>
                            <button type="button" class={classes!("icon-btn", "mic-btn", (*listening).then_some("active"))}
                                title="Speak" onclick={toggle_mic}>{"🎤"}</button>
                            <input class="chat-input"
                                placeholder={if *listening { "Listening..." } else { "Type doubt or attach image..." }}
                                value={(*input).clone()}
                                oninput={bind_input(&input)}
                                disabled={waiting} />
                            <button type="submit" class="icon-btn send-btn" disabled={waiting}>{"➤"}</button>
                        </form>
                    </div>
                } else {
                    <Resolutions queries={escalations} />
                }
            </div>

            if let Some(answer_id) = *rating_for {
                <RatingModal {answer_id} on_close={{
                    let rating_for = rating_for.clone();
                    Callback::from(move |_: ()| rating_for.set(None))
                }} />
            }

            if *show_profile {
                <ProfileModal on_close={{
                    let show_profile = show_profile.clone();
                    Callback::from(move |_: ()| show_profile.set(false))
                }} />
            }
        </div>
    }
}

/* -------------------------------------------------------------------------- */
/*                                 bubbles                                    */
/* -------------------------------------------------------------------------- */

fn render_bubble(
    bubble: Bubble,
    on_escalate: &Callback<i64>,
    rating_for: &UseStateHandle<Option<i64>>,
    on_retry: &Callback<Outgoing>,
    on_discard: &Callback<u64>,
) -> Html {
    match bubble {
        Bubble::User { query_id, text, status } => html! {
            <div class="message-bubble msg-user">
                <div class="message-text">{ text }</div>
                if status == QueryStatus::Answered {
                    <div class="msg-actions">
                        <span class="action-link escalate-link" onclick={{
                            let on_escalate = on_escalate.clone();
                            Callback::from(move |_: MouseEvent| on_escalate.emit(query_id))
                        }}>{"Not satisfied? Ask Tutor"}</span>
                    </div>
                }
            </div>
        },
        Bubble::Ai { answer_id, text, .. } => html! {
            <div class="message-bubble msg-ai">
                <span class="ai-badge-inline">{"🤖 AI"}</span>
                <div class="message-text">{ markdown::render(&text) }</div>
                <div class="msg-actions">
                    <div class="rate-btn-link" onclick={{
                        let rating_for = rating_for.clone();
                        Callback::from(move |_: MouseEvent| rating_for.set(Some(answer_id)))
                    }}><span>{"⭐ Rate"}</span></div>
                </div>
            </div>
        },
        Bubble::Outgoing(o) => {
            let state = match o.delivery {
                Delivery::Pending => "pending",
                Delivery::Confirmed { .. } => "confirmed",
                Delivery::Failed => "failed",
            };
            let failed   = o.delivery == Delivery::Failed;
            let local_id = o.local_id;
            let text     = o.text.clone();
            html! {
                <div class={classes!("message-bubble", "msg-user", state)}>
                    <div class="message-text">{ text }</div>
                    if failed {
                        <div class="msg-actions">
                            <span class="failed-note">{"Not sent."}</span>
                            <span class="action-link" onclick={{
                                let on_retry = on_retry.clone();
                                Callback::from(move |_: MouseEvent| on_retry.emit(o.clone()))
                            }}>{"Retry"}</span>
                            <span class="action-link" onclick={{
                                let on_discard = on_discard.clone();
                                Callback::from(move |_: MouseEvent| on_discard.emit(local_id))
                            }}>{"Discard"}</span>
                        </div>
                    }
                </div>
            }
        }
    }
}
