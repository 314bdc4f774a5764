use wasm_bindgen_futures::spawn_local;
use yew::prelude::*;

use crate::models::{Ack, FeedbackBody};
use crate::session::use_session;

pub const MAX_STARS: u8 = 5;

/// Star colour for position `star` while the pointer rests on `hovered`.
pub fn star_lit(star: u8, hovered: u8) -> bool {
    star <= hovered
}

#[derive(Properties, PartialEq)]
pub struct RatingModalProps {
    pub answer_id: i64,
    pub on_close:  Callback<()>,
}

#[function_component(RatingModal)]
pub fn rating_modal(props: &RatingModalProps) -> Html {
    let session = use_session();
    let hovered = use_state(|| 0u8);

    let on_rate = {
        let api       = session.api();
        let answer_id = props.answer_id;
        let on_close  = props.on_close.clone();

        Callback::from(move |rating: u8| {
            let api      = api.clone();
            let on_close = on_close.clone();
            let body     = FeedbackBody { answer_id, rating, comment: "User rating".into() };

            spawn_local(async move {
                match api.post::<_, Ack>("/feedback", Some(&body)).await {
                    Ok(_) => {
                        gloo_dialogs::alert(&format!("Rated {rating} stars!"));
                        on_close.emit(());
                    }
                    Err(e) => {
                        log::error!("feedback on answer #{answer_id}: {e}");
                        gloo_dialogs::alert("Failed");
                    }
                }
            });
        })
    };

    let stars = (1..=MAX_STARS).map(|star| {
        let style = if star_lit(star, *hovered) { "color:#fbbf24" } else { "color:#e5e7eb" };
        let onmouseenter = {
            let hovered = hovered.clone();
            Callback::from(move |_: MouseEvent| hovered.set(star))
        };
        let onmouseleave = {
            let hovered = hovered.clone();
            Callback::from(move |_: MouseEvent| hovered.set(0))
        };
        let onclick = {
            let on_rate = on_rate.clone();
            Callback::from(move |_: MouseEvent| on_rate.emit(star))
        };
        html! {
            <span key={star} class="star-btn" {style} {onmouseenter} {onmouseleave} {onclick}>{"★"}</span>
        }
    });

    let close = {
        let on_close = props.on_close.clone();
        Callback::from(move |_: MouseEvent| on_close.emit(()))
    };

    html! {
        <div class="modal-overlay" onclick={close.clone()}>
            <div class="modal-content" onclick={Callback::from(|e: MouseEvent| e.stop_propagation())}>
                <h3>{"Rate Answer"}</h3>
                <div class="star-container">{ for stars }</div>
                <button class="btn-primary btn-secondary" onclick={close}>{"Cancel"}</button>
            </div>
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stars_light_up_to_the_hovered_one() {
        let lit: Vec<u8> = (1..=MAX_STARS).filter(|&s| star_lit(s, 3)).collect();
        assert_eq!(lit, [1, 2, 3]);
        assert!((1..=MAX_STARS).all(|s| !star_lit(s, 0)));
    }
}
