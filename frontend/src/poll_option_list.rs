use yew::prelude::*;
use web_sys::HtmlInputElement;
use shared::validation::MIN_OPTIONS;
use crate::styles::*;

#[derive(Properties, PartialEq)]
pub struct PollOptionListProps {
    pub options: Vec<String>,
    pub disabled: bool,
    pub on_change: Callback<Vec<String>>,
}

/// Editable list of answer texts. Never drops below the minimum option count.
#[function_component]
pub fn PollOptionList(props: &PollOptionListProps) -> Html {
    let can_remove = props.options.len() > MIN_OPTIONS && !props.disabled;
    let can_add = !props.disabled;

    let on_add = {
        let options = props.options.clone();
        let on_change = props.on_change.clone();
        Callback::from(move |_: MouseEvent| {
            let mut next = options.clone();
            next.push(String::new());
            on_change.emit(next);
        })
    };

    html! {
        <div class={SPACE_Y_BASE}>
            <div class={FLEX_BETWEEN}>
                <label class={TEXT_LABEL}>{"Options"}</label>
                <span class={TEXT_MUTED}>
                    {format!("Options: {}", props.options.len())}
                </span>
            </div>

            <ul class={SPACE_Y_BASE}>
                {for props.options.iter().enumerate().map(|(index, option)| {
                    let oninput = {
                        let options = props.options.clone();
                        let on_change = props.on_change.clone();
                        Callback::from(move |e: InputEvent| {
                            let target = e.target_unchecked_into::<HtmlInputElement>();
                            let mut next = options.clone();
                            next[index] = target.value();
                            on_change.emit(next);
                        })
                    };
                    let onremove = {
                        let options = props.options.clone();
                        let on_change = props.on_change.clone();
                        Callback::from(move |_: MouseEvent| {
                            let mut next = options.clone();
                            next.remove(index);
                            on_change.emit(next);
                        })
                    };

                    html! {
                        <li class={CARD_SECTION}>
                            <div class="flex gap-2 items-center">
                                <input
                                    type="text"
                                    required={true}
                                    value={option.clone()}
                                    placeholder={format!("Option {}", index + 1)}
                                    disabled={props.disabled}
                                    class={INPUT_BASE}
                                    {oninput}
                                />
                                {if can_remove {
                                    html! {
                                        <button
                                            type="button"
                                            onclick={onremove}
                                            class={combine_classes(BUTTON_BASE, BUTTON_DANGER)}
                                        >
                                            {"Remove"}
                                        </button>
                                    }
                                } else { html! {} }}
                            </div>
                        </li>
                    }
                })}
            </ul>

            <button
                type="button"
                onclick={on_add}
                disabled={!can_add}
                class={combine_classes(BUTTON_BASE, BUTTON_SECONDARY)}
            >
                {"+ Add Option"}
            </button>
        </div>
    }
}
