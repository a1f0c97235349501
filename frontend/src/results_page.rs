use std::rc::Rc;
use gloo_timers::callback::Interval;
use yew::prelude::*;
use shared::{
    lifecycle::{format_share, vote_share},
    models::ActivePoll,
};
use crate::{
    api,
    config::CONFIG,
    countdown::{use_time_left, Countdown},
    styles::*,
};

#[derive(Clone, Default)]
pub struct ResultsState {
    poll: Option<ActivePoll>,
    error: Option<String>,
}

impl Reducible for ResultsState {
    type Action = Msg;

    fn reduce(self: Rc<Self>, action: Self::Action) -> Rc<Self> {
        let mut next = (*self).clone();
        match action {
            Msg::PollReceived(poll) => {
                next.poll = Some(poll);
                next.error = None;
            },
            Msg::Error(error) => {
                next.poll = None;
                next.error = Some(error);
            },
        }
        Rc::new(next)
    }
}

pub enum Msg {
    PollReceived(ActivePoll),
    Error(String),
}

#[function_component]
pub fn ResultsPage() -> Html {
    let state = use_reducer(ResultsState::default);

    use_effect_with_deps({
        let state = state.clone();
        move |_| {
            let refresh = move || {
                let state = state.clone();
                wasm_bindgen_futures::spawn_local(async move {
                    match api::fetch_active_poll().await {
                        Ok(poll) => state.dispatch(Msg::PollReceived(poll)),
                        Err(e) => state.dispatch(Msg::Error(e)),
                    }
                });
            };
            refresh();

            let interval = Interval::new(CONFIG.results_refresh_ms, refresh);
            move || drop(interval)
        }
    }, ());

    let time_left = use_time_left(state.poll.as_ref().and_then(|poll| poll.ends_at));

    let Some(poll) = &state.poll else {
        return html! {
            <div class={CARD}>
                {if let Some(error) = &state.error {
                    html! { <div class={alert_style("error")}>{error}</div> }
                } else {
                    html! { <div class={combine_classes("animate-pulse", TEXT_MUTED)}>{"Loading results..."}</div> }
                }}
            </div>
        };
    };

    html! {
        <div class={CARD}>
            <h1 class={HEADING_LG}>{&poll.question}</h1>
            {match time_left {
                Some(0) => html! { <div class={ENDED}>{"Poll ended."}</div> },
                Some(seconds) => html! { <Countdown {seconds} /> },
                None => html! {},
            }}

            <ul class={SPACE_Y_BASE}>
                {for poll.options.iter().map(|option| html! {
                    <li class={CARD_SECTION}>
                        <div class={FLEX_BETWEEN}>
                            <span class="text-white break-words">{&option.text}</span>
                            <span class={TEXT_MUTED}>
                                {format!("{} votes ({}%)", option.votes, format_share(option.votes, poll.total_votes))}
                            </span>
                        </div>
                        <div class={BAR_TRACK}>
                            <div class={BAR_FILL}
                                style={format!("width: {}%", vote_share(option.votes, poll.total_votes))} />
                        </div>
                    </li>
                })}
            </ul>

            <p class={combine_classes(TEXT_MUTED, "mt-4 text-center")}>
                {format!("Total votes: {}", poll.total_votes)}
            </p>
        </div>
    }
}
