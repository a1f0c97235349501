use yew::prelude::*;
use yew_router::prelude::*;
use crate::{Route, styles::*};

#[function_component]
pub fn Home() -> Html {
    html! {
        <div class={CONTAINER}>
            <h1 class={combine_classes(HEADING_LG, "text-white")}>{"Live Poll"}</h1>

            <div class="space-y-8 max-w-3xl mx-auto">
                <div class="bg-gray-800 p-6 rounded-lg shadow-lg">
                    <p class="text-gray-300 mb-4">
                        {"One question at a time. The host prepares polls on the admin page and opens one; 
                        everyone else answers it on the vote page while the results page keeps the tally live."}
                    </p>
                    <p class="text-gray-300">
                        {"Opening a poll clears every earlier vote. A poll may carry a countdown, after which 
                        the vote page stops accepting answers."}
                    </p>
                </div>

                <div class="bg-gray-800 p-6 rounded-lg shadow-lg">
                    <h2 class="text-xl font-semibold mb-4 text-white">{"Get Started"}</h2>
                    <div class="flex flex-col sm:flex-row gap-4 justify-center">
                        <Link<Route> to={Route::Vote}
                            classes="bg-blue-600 hover:bg-blue-700 text-white px-8 py-3 rounded-lg text-lg font-semibold text-center transition-colors">
                            {"Vote"}
                        </Link<Route>>
                        <Link<Route> to={Route::Results}
                            classes="bg-green-600 hover:bg-green-700 text-white px-8 py-3 rounded-lg text-lg font-semibold text-center transition-colors">
                            {"Live Results"}
                        </Link<Route>>
                        <Link<Route> to={Route::Admin}
                            classes="bg-gray-600 hover:bg-gray-700 text-white px-8 py-3 rounded-lg text-lg font-semibold text-center transition-colors">
                            {"Manage Polls"}
                        </Link<Route>>
                    </div>
                </div>
            </div>
        </div>
    }
}
