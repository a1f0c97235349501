use std::rc::Rc;
use uuid::Uuid;
use web_sys::HtmlInputElement;
use yew::prelude::*;
use shared::{
    lifecycle::{ballot_status, BallotStatus},
    models::ActivePoll,
};
use crate::{
    api,
    countdown::{use_time_left, Countdown},
    storage::{self, RecordedVote},
    styles::*,
};

#[derive(Clone, PartialEq)]
enum Load {
    Loading,
    Ready(Rc<ActivePoll>),
    Failed(String),
}

#[function_component]
pub fn VotePage() -> Html {
    let load = use_state(|| Load::Loading);
    let selected = use_state(|| None::<Uuid>);
    let voted = use_state(|| None::<RecordedVote>);
    let submitting = use_state(|| false);
    let error = use_state(|| None::<String>);

    {
        let load = load.clone();
        let voted = voted.clone();
        use_effect_with_deps(move |_| {
            wasm_bindgen_futures::spawn_local(async move {
                match api::fetch_active_poll().await {
                    Ok(poll) => {
                        voted.set(storage::recorded_vote(poll.id));
                        load.set(Load::Ready(Rc::new(poll)));
                    }
                    Err(e) => load.set(Load::Failed(e)),
                }
            });
            || ()
        }, ());
    }

    let ends_at = match &*load {
        Load::Ready(poll) => poll.ends_at,
        _ => None,
    };
    let time_left = use_time_left(ends_at);

    let poll = match &*load {
        Load::Loading => return html! {
            <div class={CARD}>
                <div class={combine_classes("animate-pulse", TEXT_MUTED)}>{"Loading poll..."}</div>
            </div>
        },
        Load::Failed(e) => return html! {
            <div class={CARD}>
                <div class={alert_style("error")}>{e}</div>
            </div>
        },
        Load::Ready(poll) => poll.clone(),
    };

    let countdown = match time_left {
        Some(seconds) if seconds > 0 => html! { <Countdown {seconds} /> },
        _ => html! {},
    };

    let status = ballot_status(time_left, voted.is_some());

    if status == BallotStatus::Ended {
        return html! {
            <div class={CARD}>
                <h1 class={HEADING_LG}>{&poll.question}</h1>
                <div class={ENDED}>{"Voting has ended."}</div>
            </div>
        };
    }

    if let (BallotStatus::Voted, Some(record)) = (status, *voted) {
        let chosen = record.option_id.and_then(|id| poll.option(id));
        return html! {
            <div class={CARD}>
                <h1 class={HEADING_LG}>{&poll.question}</h1>
                {countdown}
                <div class={alert_style("success")}>{"Thank you for voting!"}</div>
                {if let Some(option) = chosen {
                    html! { <p class="text-gray-200 text-center">{format!("You voted for: {}", option.text)}</p> }
                } else { html! {} }}
            </div>
        };
    }

    let onsubmit = {
        let poll = poll.clone();
        let selected = selected.clone();
        let voted = voted.clone();
        let submitting = submitting.clone();
        let error = error.clone();
        Callback::from(move |e: SubmitEvent| {
            e.prevent_default();
            let Some(option_id) = *selected else { return };
            if *submitting {
                return;
            }

            submitting.set(true);
            error.set(None);
            let poll_id = poll.id;
            let voted = voted.clone();
            let submitting = submitting.clone();
            let error = error.clone();
            wasm_bindgen_futures::spawn_local(async move {
                match api::cast_vote(option_id).await {
                    Ok(()) => {
                        storage::remember_vote(poll_id, option_id);
                        voted.set(Some(RecordedVote { option_id: Some(option_id) }));
                    }
                    Err(e) => error.set(Some(e)),
                }
                submitting.set(false);
            });
        })
    };

    html! {
        <div class={CARD}>
            <h1 class={HEADING_LG}>{&poll.question}</h1>
            {countdown}
            {if let Some(e) = &*error {
                html! { <div class={alert_style("error")}>{e}</div> }
            } else { html! {} }}

            <form {onsubmit} class={SPACE_Y_LG}>
                <ul class={SPACE_Y_BASE}>
                    {for poll.options.iter().map(|option| {
                        let id = option.id;
                        let onchange = {
                            let selected = selected.clone();
                            Callback::from(move |e: Event| {
                                let input: HtmlInputElement = e.target_unchecked_into();
                                if input.checked() {
                                    selected.set(Some(id));
                                }
                            })
                        };
                        html! {
                            <li class={CARD_SECTION}>
                                <label class="flex items-center gap-3 text-white cursor-pointer">
                                    <input type="radio" name="option"
                                        value={id.to_string()}
                                        checked={*selected == Some(id)}
                                        disabled={*submitting}
                                        {onchange} />
                                    <span class="break-words">{&option.text}</span>
                                </label>
                            </li>
                        }
                    })}
                </ul>

                <button type="submit" class={button_primary(true)}
                    disabled={selected.is_none() || *submitting}>
                    {if *submitting { "Submitting..." } else { "Submit Vote" }}
                </button>
            </form>
        </div>
    }
}
