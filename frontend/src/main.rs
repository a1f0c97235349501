use yew::prelude::*;
use yew_router::prelude::*;

mod styles;
mod config;
mod api;
mod storage;
mod countdown;
mod home;
mod poll_admin;
mod poll_option_list;
mod poll_table;
mod vote_page;
mod results_page;

use crate::{
    home::Home,
    poll_admin::PollAdmin,
    vote_page::VotePage,
    results_page::ResultsPage,
};

#[derive(Clone, Routable, PartialEq)]
pub enum Route {
    #[at("/")] Home,
    #[at("/admin")] Admin,
    #[at("/vote")] Vote,
    #[at("/results")] Results,
}

fn nav_link(route: Route, label: &'static str, current_route: &Option<Route>) -> Html {
    let is_current = current_route.as_ref() == Some(&route);
    html! {
        <Link<Route> to={route} classes={classes!(
            "text-base", "md:text-lg", "font-medium", "px-4", "py-2", "rounded-md",
            "transition-colors", "duration-200", "ease-in-out",
            "text-gray-200", "border", "border-transparent", "hover:border-blue-400", "hover:text-blue-400",
            if is_current {
                "text-blue-400 border-blue-400 ring-2 ring-blue-500 ring-offset-1 ring-offset-gray-900"
            } else {
                ""
            }
        )}>
            {label}
        </Link<Route>>
    }
}

#[function_component(Navigation)]
fn navigation() -> Html {
    let current_route = use_route::<Route>();

    html! {
        <nav class="bg-gray-900 shadow-lg fixed top-0 w-full z-50">
            <div class="container mx-auto px-6 py-4 flex justify-center space-x-8">
                {nav_link(Route::Home, "Home", &current_route)}
                {nav_link(Route::Vote, "Vote", &current_route)}
                {nav_link(Route::Results, "Results", &current_route)}
                {nav_link(Route::Admin, "Admin", &current_route)}
            </div>
        </nav>
    }
}

#[function_component(App)]
fn app() -> Html {
    html! {
        <BrowserRouter>
            <div class="min-h-screen bg-gray-900">
                <Navigation />
                <div class="pt-16">
                    <Switch<Route> render={switch} />
                </div>
            </div>
        </BrowserRouter>
    }
}

fn switch(routes: Route) -> Html {
    match routes {
        Route::Home => html! { <Home /> },
        Route::Admin => html! { <PollAdmin /> },
        Route::Vote => html! { <VotePage /> },
        Route::Results => html! { <ResultsPage /> },
    }
}

fn main() {
    #[cfg(target_arch = "wasm32")]
    console_error_panic_hook::set_once();
    yew::Renderer::<App>::new().render();
}
