use log::info;
use yew::prelude::*;

use section_nav::components::nav::SectionNav;
use section_nav::config;
use section_nav::pages::home::Home;

#[function_component]
fn App() -> Html {
    let site = use_state(config::load);

    html! {
        <>
            <SectionNav
                items={site.sections.clone()}
                spy={site.spy.clone()}
                header_offset={site.header_offset}
                scroll_limit={site.scroll}
            />
            <Home header_offset={site.header_offset} />
        </>
    }
}

fn main() {
    // Initialize console error panic hook for better error messages
    console_error_panic_hook::set_once();

    // Initialize logging
    console_log::init_with_level(config::log_level()).expect("error initializing log");

    info!("Starting application");
    yew::Renderer::<App>::new().render();
}
