use time::{Duration, OffsetDateTime};
use uuid::Uuid;
use wasm_bindgen::JsValue;
use web_sys::{HtmlInputElement, HtmlSelectElement};
use yew::prelude::*;
use shared::{
    lifecycle::countdown_from_ends_at,
    models::*,
    validation::{validate_poll_request, MIN_OPTIONS},
};
use crate::{
    api,
    config::CONFIG,
    poll_option_list::PollOptionList,
    poll_table::PollTable,
    styles::*,
};

#[derive(Clone)]
pub struct FormState {
    question: String,
    options: Vec<String>,
    countdown_minutes: Option<i32>,
    ends_at: Option<OffsetDateTime>,
    editing: Option<Uuid>,
    error: Option<String>,
    submitting: bool,
}

impl Default for FormState {
    fn default() -> Self {
        Self {
            question: String::new(),
            options: vec![String::new(); MIN_OPTIONS],
            countdown_minutes: None,
            ends_at: None,
            editing: None,
            error: None,
            submitting: false,
        }
    }
}

pub struct PollAdmin {
    state: FormState,
    polls: Vec<Poll>,
    busy: bool,
}

pub enum Msg {
    PollsLoaded(Result<Vec<Poll>, String>),
    UpdateQuestion(String),
    UpdateOptions(Vec<String>),
    UpdateCountdown(String),
    Submit,
    SubmitResult(Result<Poll, String>),
    StartEdit(Uuid),
    CancelEdit,
    SetActive(Uuid, bool),
    Delete(Uuid),
    Deleted(Uuid, Result<(), String>),
    ActionDone(Result<(), String>),
}

impl Component for PollAdmin {
    type Message = Msg;
    type Properties = ();

    fn create(ctx: &Context<Self>) -> Self {
        Self::refresh(ctx);
        Self {
            state: FormState::default(),
            polls: Vec::new(),
            busy: false,
        }
    }

    fn update(&mut self, ctx: &Context<Self>, msg: Self::Message) -> bool {
        match msg {
            Msg::PollsLoaded(result) => {
                match result {
                    Ok(polls) => self.polls = polls,
                    Err(error) => self.state.error = Some(error),
                }
                true
            },
            Msg::UpdateQuestion(question) => {
                self.state.question = question;
                true
            },
            Msg::UpdateOptions(options) => {
                self.state.options = options;
                true
            },
            Msg::UpdateCountdown(value) => {
                self.state.countdown_minutes = value.parse().ok();
                true
            },
            Msg::Submit => {
                if self.state.submitting {
                    return false;
                }

                let request = self.create_request();
                if let Err(error) = validate_poll_request(&request, OffsetDateTime::now_utc()) {
                    self.state.error = Some(error.to_string());
                    return true;
                }

                self.state.submitting = true;
                self.state.error = None;
                let editing = self.state.editing;

                ctx.link().send_future(async move {
                    let result = match editing {
                        Some(id) => api::update_poll(id, request).await,
                        None => api::create_poll(request).await,
                    };
                    Msg::SubmitResult(result)
                });
                true
            },
            Msg::SubmitResult(result) => {
                match result {
                    Ok(_) => {
                        self.state = FormState::default();
                        Self::refresh(ctx);
                    }
                    Err(error) => {
                        self.state.error = Some(error);
                        self.state.submitting = false;
                    }
                }
                true
            },
            Msg::StartEdit(id) => {
                let Some(poll) = self.polls.iter().find(|poll| poll.id == id) else {
                    return false;
                };
                self.state = FormState {
                    question: poll.question.clone(),
                    options: poll.options.iter().map(|opt| opt.text.clone()).collect(),
                    countdown_minutes: countdown_from_ends_at(poll.ends_at, OffsetDateTime::now_utc())
                        .or(poll.countdown_minutes),
                    ends_at: poll.ends_at,
                    editing: Some(id),
                    error: None,
                    submitting: false,
                };
                true
            },
            Msg::CancelEdit => {
                self.state = FormState::default();
                true
            },
            Msg::SetActive(id, is_active) => {
                self.busy = true;
                ctx.link().send_future(async move {
                    Msg::ActionDone(api::set_active(id, is_active).await.map(|_| ()))
                });
                true
            },
            Msg::Delete(id) => {
                if !confirm("Are you sure you want to delete this poll?") {
                    return false;
                }
                self.busy = true;
                ctx.link().send_future(async move {
                    Msg::Deleted(id, api::delete_poll(id).await)
                });
                true
            },
            Msg::Deleted(id, result) => {
                if result.is_ok() && self.state.editing == Some(id) {
                    self.state = FormState::default();
                }
                ctx.link().send_message(Msg::ActionDone(result));
                true
            },
            Msg::ActionDone(result) => {
                self.busy = false;
                if let Err(error) = result {
                    self.state.error = Some(error);
                }
                Self::refresh(ctx);
                true
            },
        }
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        html! {
            <div class={BG_PAGE}>
                <div class={CONTAINER}>
                    <h1 class={HEADING_LG}>{"Poll Admin"}</h1>
                    {if let Some(error) = &self.state.error {
                        html! { <div class={alert_style("error")}>{error}</div> }
                    } else { html! {} }}

                    <div class={SPACE_Y_LG}>
                        <section class={CARD_SECTION}>
                            <h2 class={HEADING_MD}>
                                {if self.state.editing.is_some() { "Edit Poll" } else { "Create Poll" }}
                            </h2>
                            {self.render_form(ctx)}
                        </section>

                        <section class={CARD_SECTION}>
                            <h2 class={HEADING_MD}>{"Polls"}</h2>
                            <PollTable
                                polls={self.polls.clone()}
                                busy={self.busy}
                                on_edit={ctx.link().callback(Msg::StartEdit)}
                                on_set_active={ctx.link().callback(|(id, is_active)| Msg::SetActive(id, is_active))}
                                on_delete={ctx.link().callback(Msg::Delete)}
                            />
                        </section>
                    </div>
                </div>
            </div>
        }
    }
}

impl PollAdmin {
    fn refresh(ctx: &Context<Self>) {
        ctx.link().send_future(async {
            Msg::PollsLoaded(api::fetch_polls().await)
        });
    }

    fn create_request(&self) -> PollRequest {
        let ends_at = self.state.countdown_minutes
            .map(|minutes| OffsetDateTime::now_utc() + Duration::minutes(i64::from(minutes)));

        PollRequest {
            question: self.state.question.clone(),
            options: self.state.options.clone(),
            ends_at,
            countdown_minutes: self.state.countdown_minutes,
        }
    }

    fn render_form(&self, ctx: &Context<Self>) -> Html {
        let onsubmit = ctx.link().callback(|e: SubmitEvent| {
            e.prevent_default();
            Msg::Submit
        });
        let oninput = ctx.link().callback(|e: InputEvent| {
            let input: HtmlInputElement = e.target_unchecked_into();
            Msg::UpdateQuestion(input.value())
        });
        let submit_label = match (self.state.submitting, self.state.editing.is_some()) {
            (true, _) => "Saving...",
            (false, true) => "Update Poll",
            (false, false) => "Create Poll",
        };

        html! {
            <form {onsubmit} class={SPACE_Y_LG}>
                <div class={SPACE_Y_BASE}>
                    <label class={TEXT_LABEL}>{"Question"}</label>
                    <input type="text" class={INPUT_BASE} value={self.state.question.clone()}
                        required={true}
                        {oninput}
                        disabled={self.state.submitting}
                        placeholder="Enter question" />
                </div>

                <PollOptionList
                    options={self.state.options.clone()}
                    disabled={self.state.submitting}
                    on_change={ctx.link().callback(Msg::UpdateOptions)}
                />

                {self.render_countdown(ctx)}

                {if let Some(ends_at) = self.state.ends_at {
                    html! {
                        <p class={TEXT_MUTED}>{format!("Currently ends at {}", local_time(ends_at))}</p>
                    }
                } else { html! {} }}

                <div class="flex gap-4">
                    <button type="submit" class={button_primary(false)} disabled={self.state.submitting}>
                        {submit_label}
                    </button>
                    {if self.state.editing.is_some() {
                        html! {
                            <button type="button"
                                class={combine_classes(BUTTON_BASE, BUTTON_SECONDARY)}
                                disabled={self.state.submitting}
                                onclick={ctx.link().callback(|_| Msg::CancelEdit)}>
                                {"Cancel"}
                            </button>
                        }
                    } else { html! {} }}
                </div>
            </form>
        }
    }

    fn render_countdown(&self, ctx: &Context<Self>) -> Html {
        let selected = self.state.countdown_minutes;
        let onchange = ctx.link().callback(|e: Event| {
            let select: HtmlSelectElement = e.target_unchecked_into();
            Msg::UpdateCountdown(select.value())
        });

        // An edited poll may carry a countdown outside the preset choices.
        let mut choices: Vec<i32> = CONFIG.countdown_choices.to_vec();
        if let Some(minutes) = selected {
            if !choices.contains(&minutes) {
                choices.push(minutes);
                choices.sort_unstable();
            }
        }

        html! {
            <div class={SPACE_Y_BASE}>
                <label class={TEXT_LABEL}>{"Countdown"}</label>
                <select class={INPUT_BASE} {onchange} disabled={self.state.submitting}>
                    <option value="" selected={selected.is_none()}>{"None"}</option>
                    {for choices.into_iter().map(|minutes| html! {
                        <option value={minutes.to_string()} selected={selected == Some(minutes)}>
                            {format!("{} minutes", minutes)}
                        </option>
                    })}
                </select>
            </div>
        }
    }
}

fn confirm(message: &str) -> bool {
    web_sys::window()
        .and_then(|window| window.confirm_with_message(message).ok())
        .unwrap_or(false)
}

fn local_time(at: OffsetDateTime) -> String {
    let millis = (at.unix_timestamp_nanos() / 1_000_000) as f64;
    js_sys::Date::new(&JsValue::from_f64(millis))
        .to_locale_string("default", &JsValue::UNDEFINED)
        .into()
}
