use web_sys::HtmlInputElement;
use yew::prelude::*;

use crate::hooks::use_smooth_scroll;
use crate::navigate::DEFAULT_HEADER_OFFSET_PX;

const CONTACT_INPUT_ID: &str = "contact-email";

#[derive(Properties, PartialEq)]
pub struct HomeProps {
    #[prop_or(DEFAULT_HEADER_OFFSET_PX)]
    pub header_offset: f64,
}

#[function_component(Home)]
pub fn home(props: &HomeProps) -> Html {
    let scroller = use_smooth_scroll(props.header_offset);
    let email_ref = use_node_ref();

    // Jump to the form and put the cursor in it once the page stops moving
    let to_contact = {
        let scroller = scroller.clone();
        let email_ref = email_ref.clone();
        Callback::from(move |e: MouseEvent| {
            e.prevent_default();
            let email_ref = email_ref.clone();
            scroller.scroll_to_then("contact", move || {
                if let Some(input) = email_ref.cast::<HtmlInputElement>() {
                    let _ = input.focus();
                }
            });
        })
    };

    let to_services = {
        let scroller = scroller.clone();
        Callback::from(move |e: MouseEvent| {
            e.prevent_default();
            scroller.scroll_to("services");
        })
    };

    html! {
        <div class="landing-page">
            <style>
                {r#"
                    .landing-page section {
                        min-height: 100vh;
                        padding: 120px 2rem 4rem;
                        box-sizing: border-box;
                    }
                    .landing-page section:nth-child(odd) {
                        background: #1a1a1a;
                        color: #fff;
                    }
                    .hero-cta {
                        margin-right: 1rem;
                        padding: 0.75rem 1.5rem;
                        border-radius: 8px;
                        border: 1px solid rgba(30, 144, 255, 0.5);
                        background: #1E90FF;
                        color: #fff;
                        cursor: pointer;
                    }
                    .hero-cta.secondary {
                        background: transparent;
                    }
                    .contact-form input {
                        padding: 0.75rem;
                        width: min(400px, 100%);
                    }
                "#}
            </style>

            <section id="hero" class="hero">
                <h1>{"Automation that works while you sleep"}</h1>
                <p class="hero-subtitle">
                    {"We build AI assistants and workflows for small businesses."}
                </p>
                <button class="hero-cta" onclick={to_contact}>{"Get a quote"}</button>
                <button class="hero-cta secondary" onclick={to_services}>{"See what we do"}</button>
            </section>

            <section id="services" class="services">
                <h2>{"Services"}</h2>
                <ul>
                    <li>{"Customer support chatbots"}</li>
                    <li>{"Voice assistants"}</li>
                    <li>{"Back-office automation"}</li>
                </ul>
            </section>

            <section id="offers" class="offers">
                <h2>{"Offers"}</h2>
                <p>{"Start small with a single workflow, then grow into a full assistant."}</p>
            </section>

            <section id="case-studies" class="case-studies">
                <h2>{"Case studies"}</h2>
                <p>{"A dental clinic that stopped missing after-hours calls."}</p>
                <p>{"A webshop answering order questions in three languages."}</p>
            </section>

            <section id="process" class="process">
                <h2>{"Process"}</h2>
                <ol>
                    <li>{"Discovery call"}</li>
                    <li>{"Prototype in two weeks"}</li>
                    <li>{"Launch and iterate"}</li>
                </ol>
            </section>

            <section id="contact" class="contact">
                <h2>{"Contact"}</h2>
                <form class="contact-form" onsubmit={Callback::from(|e: SubmitEvent| e.prevent_default())}>
                    <input
                        id={CONTACT_INPUT_ID}
                        ref={email_ref}
                        type="email"
                        placeholder="you@company.com"
                    />
                    <button class="hero-cta" type="submit">{"Send"}</button>
                </form>
            </section>
        </div>
    }
}
