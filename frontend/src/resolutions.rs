use yew::prelude::*;

use crate::conversation::tutor_reply;
use crate::markdown;
use crate::models::Query;
use crate::utils::status_badge;

#[derive(Properties, PartialEq)]
pub struct ResolutionsProps {
    pub queries: Vec<Query>,
}

/// "Tutor Resolutions" tab: escalated queries and the tutor's reply, if any.
#[function_component(Resolutions)]
pub fn resolutions(props: &ResolutionsProps) -> Html {
    if props.queries.is_empty() {
        return html! {
            <div class="resolution-list">
                <div class="empty-state"><h3>{"No Escalations Yet"}</h3></div>
            </div>
        };
    }

    let cards = props.queries.iter().map(|q| {
        let status = q.status.as_str();
        html! {
            <div key={q.query_id} class="res-card">
                <div class="res-header">
                    <span>{ format!("#{}", q.query_id) }</span>
                    <span class={status_badge(status)}>{ status }</span>
                </div>
                <div class="res-body">
                    <div class="res-question">{ q.content.clone() }</div>
                    {
                        match tutor_reply(q) {
                            Some(answer) => html! {
                                <div class="tutor-reply-box">
                                    <div class="tutor-badge">{"👨‍🏫 Tutor Reply"}</div>
                                    { markdown::render(&answer.content) }
                                </div>
                            },
                            None => html!(<div class="waiting">{"Waiting..."}</div>),
                        }
                    }
                </div>
            </div>
        }
    });

    html! { <div class="resolution-list">{ for cards }</div> }
}
