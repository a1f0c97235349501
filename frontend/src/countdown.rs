use gloo_timers::callback::Interval;
use shared::lifecycle::{format_time_left, seconds_left};
use time::OffsetDateTime;
use yew::prelude::*;
use crate::{config::CONFIG, styles::*};

/// Seconds until `ends_at`, re-evaluated every tick. `None` for polls without an end.
#[hook]
pub fn use_time_left(ends_at: Option<OffsetDateTime>) -> Option<i64> {
    let time_left = use_state(|| seconds_left(ends_at, OffsetDateTime::now_utc()));

    {
        let time_left = time_left.clone();
        use_effect_with_deps(move |ends_at| {
            let ends_at = *ends_at;
            let tick = move || time_left.set(seconds_left(ends_at, OffsetDateTime::now_utc()));
            tick();

            let interval = ends_at.map(|_| Interval::new(CONFIG.countdown_tick_ms, tick));
            move || drop(interval)
        }, ends_at);
    }

    *time_left
}

#[derive(Properties, PartialEq)]
pub struct CountdownProps {
    pub seconds: i64,
}

#[function_component]
pub fn Countdown(props: &CountdownProps) -> Html {
    html! {
        <div class={COUNTDOWN}>
            {format!("Time left: {}", format_time_left(props.seconds))}
        </div>
    }
}
