use time::OffsetDateTime;
use uuid::Uuid;
use yew::prelude::*;
use shared::models::Poll;
use crate::styles::*;

#[derive(Properties, PartialEq)]
pub struct PollTableProps {
    pub polls: Vec<Poll>,
    pub busy: bool,
    pub on_edit: Callback<Uuid>,
    pub on_set_active: Callback<(Uuid, bool)>,
    pub on_delete: Callback<Uuid>,
}

#[function_component]
pub fn PollTable(props: &PollTableProps) -> Html {
    if props.polls.is_empty() {
        return html! {
            <p class={TEXT_MUTED}>{"No polls yet."}</p>
        };
    }

    let now = OffsetDateTime::now_utc();

    html! {
        <table class="w-full text-left text-gray-200">
            <thead>
                <tr class="border-b border-gray-700">
                    <th class="py-2">{"Question"}</th>
                    <th class="py-2">{"Options"}</th>
                    <th class="py-2">{"Status"}</th>
                    <th class="py-2">{"Actions"}</th>
                </tr>
            </thead>
            <tbody>
                {for props.polls.iter().map(|poll| {
                    let id = poll.id;
                    let is_active = poll.is_active;
                    let on_edit = props.on_edit.reform(move |_: MouseEvent| id);
                    let on_toggle = props.on_set_active.reform(move |_: MouseEvent| (id, !is_active));
                    let on_delete = props.on_delete.reform(move |_: MouseEvent| id);

                    html! {
                        <tr class="border-b border-gray-800 align-top">
                            <td class="py-2 pr-4 break-words">{&poll.question}</td>
                            <td class="py-2 pr-4">
                                <ul class="list-disc pl-4">
                                    {for poll.options.iter().map(|opt| html! { <li>{&opt.text}</li> })}
                                </ul>
                            </td>
                            <td class="py-2 pr-4">
                                {if is_active && poll.is_ended(now) {
                                    html! { <span class="text-orange-400 font-semibold">{"Active (ended)"}</span> }
                                } else if is_active {
                                    html! { <span class="text-green-400 font-semibold">{"Active"}</span> }
                                } else {
                                    html! { <span class={TEXT_MUTED}>{"Inactive"}</span> }
                                }}
                            </td>
                            <td class="py-2">
                                <div class="flex gap-2 flex-wrap">
                                    <button type="button" onclick={on_edit} disabled={props.busy}
                                        class={combine_classes(BUTTON_BASE, BUTTON_WARNING)}>
                                        {"Edit"}
                                    </button>
                                    <button type="button" onclick={on_toggle} disabled={props.busy}
                                        class={combine_classes(BUTTON_BASE, if is_active { BUTTON_SECONDARY } else { BUTTON_SUCCESS })}>
                                        {if is_active { "Deactivate" } else { "Activate" }}
                                    </button>
                                    <button type="button" onclick={on_delete} disabled={props.busy}
                                        class={combine_classes(BUTTON_BASE, BUTTON_DANGER)}>
                                        {"Delete"}
                                    </button>
                                </div>
                            </td>
                        </tr>
                    }
                })}
            </tbody>
        </table>
    }
}
