use serde::Deserialize;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys::{Event, KeyboardEvent, Node};
use yew::prelude::*;

use crate::hooks::{use_scroll_position, use_scroll_spy, use_smooth_scroll};
use crate::navigate::DEFAULT_HEADER_OFFSET_PX;
use crate::scroll::{RateLimit, ScrollDirection, ScrollMetrics};
use crate::spy::{SectionId, SpyOptions};

/// Below this the header never hides, whatever the direction
const HIDE_AFTER_PX: f64 = 600.0;

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct NavItem {
    pub id: SectionId,
    pub label: String,
}

impl NavItem {
    pub fn new(id: &str, label: &str) -> Self {
        Self {
            id: SectionId::from(id),
            label: label.to_string(),
        }
    }
}

#[derive(Properties, PartialEq)]
pub struct SectionNavProps {
    pub items: Vec<NavItem>,
    #[prop_or_default]
    pub spy: SpyOptions,
    #[prop_or(DEFAULT_HEADER_OFFSET_PX)]
    pub header_offset: f64,
    #[prop_or_default]
    pub scroll_limit: RateLimit,
}

#[function_component(SectionNav)]
pub fn section_nav(props: &SectionNavProps) -> Html {
    let sections: Vec<SectionId> = props.items.iter().map(|item| item.id.clone()).collect();
    let active = use_scroll_spy(sections, props.spy.clone());
    let scroll = use_scroll_position(props.scroll_limit);
    let scroller = use_smooth_scroll(props.header_offset);
    let menu_open = use_state(|| false);
    let nav_ref = use_node_ref();

    // Escape or a press outside the header closes the mobile menu
    {
        let open_now = *menu_open;
        let menu_open = menu_open.clone();
        let nav_ref = nav_ref.clone();
        use_effect_with_deps(
            move |open| {
                let document = web_sys::window().and_then(|window| window.document());
                let listeners = (*open).then(|| {
                    let on_key = {
                        let menu_open = menu_open.clone();
                        Closure::wrap(Box::new(move |e: KeyboardEvent| {
                            if e.key() == "Escape" {
                                menu_open.set(false);
                            }
                        }) as Box<dyn FnMut(KeyboardEvent)>)
                    };
                    let on_press = Closure::wrap(Box::new(move |e: MouseEvent| {
                        if press_closes_menu(pressed_inside(&nav_ref, &e)) {
                            menu_open.set(false);
                        }
                    }) as Box<dyn FnMut(MouseEvent)>);
                    (on_key, on_press)
                });
                if let (Some(document), Some((on_key, on_press))) = (&document, &listeners) {
                    let _ = document
                        .add_event_listener_with_callback("keydown", on_key.as_ref().unchecked_ref());
                    let _ = document.add_event_listener_with_callback(
                        "mousedown",
                        on_press.as_ref().unchecked_ref(),
                    );
                }

                move || {
                    if let (Some(document), Some((on_key, on_press))) = (document, listeners) {
                        let _ = document.remove_event_listener_with_callback(
                            "keydown",
                            on_key.as_ref().unchecked_ref(),
                        );
                        let _ = document.remove_event_listener_with_callback(
                            "mousedown",
                            on_press.as_ref().unchecked_ref(),
                        );
                    }
                }
            },
            open_now,
        );
    }

    let toggle_menu = {
        let menu_open = menu_open.clone();
        Callback::from(move |e: MouseEvent| {
            e.prevent_default();
            menu_open.set(!*menu_open);
        })
    };

    let menu_class = if *menu_open {
        "nav-right mobile-menu-open"
    } else {
        "nav-right"
    };

    let first = logo_target(&props.items);

    html! {
        <nav ref={nav_ref} class={header_classes(&scroll, *menu_open)}>
            <style>
                {r#"
                    .top-nav {
                        position: fixed;
                        top: 0;
                        left: 0;
                        right: 0;
                        height: 80px;
                        z-index: 100;
                        background: transparent;
                        transition: background 0.3s ease, transform 0.3s ease;
                    }
                    .top-nav.at-top .nav-link {
                        text-shadow: 0 1px 4px rgba(0, 0, 0, 0.6);
                    }
                    .top-nav.scrolled {
                        background: rgba(26, 26, 26, 0.95);
                        backdrop-filter: blur(10px);
                    }
                    .top-nav.nav-hidden {
                        transform: translateY(-100%);
                    }
                    .nav-content {
                        display: flex;
                        align-items: center;
                        justify-content: space-between;
                        height: 100%;
                        padding: 0 2rem;
                    }
                    .nav-link {
                        color: #ddd;
                        margin-left: 1.5rem;
                        text-decoration: none;
                        border-bottom: 2px solid transparent;
                    }
                    .nav-link.active {
                        color: #fff;
                        border-bottom-color: #1E90FF;
                    }
                    .burger-menu {
                        display: none;
                    }
                    @media (max-width: 768px) {
                        .burger-menu {
                            display: block;
                        }
                        .nav-right {
                            display: none;
                        }
                        .nav-right.mobile-menu-open {
                            display: flex;
                            flex-direction: column;
                            position: absolute;
                            top: 80px;
                            left: 0;
                            right: 0;
                            background: rgba(26, 26, 26, 0.98);
                            padding: 1rem 2rem;
                        }
                    }
                "#}
            </style>
            <div class="nav-content">
                {
                    if let Some((first, label)) = first {
                        let scroller = scroller.clone();
                        let onclick = Callback::from(move |e: MouseEvent| {
                            e.prevent_default();
                            scroller.scroll_to(&first);
                        });
                        html! { <a href="#" class="nav-logo" {onclick}>{ label }</a> }
                    } else {
                        html! {}
                    }
                }

                <button class="burger-menu" onclick={toggle_menu}>
                    <span></span>
                    <span></span>
                    <span></span>
                </button>
                <div class={menu_class}>
                    { for props.items.iter().map(|item| {
                        let id = item.id.to_string();
                        let is_active = active.is_current(&id);
                        let onclick = {
                            let scroller = scroller.clone();
                            let menu_open = menu_open.clone();
                            let id = id.clone();
                            Callback::from(move |e: MouseEvent| {
                                e.prevent_default();
                                menu_open.set(false);
                                scroller.scroll_to(&id);
                            })
                        };
                        html! {
                            <a
                                href={format!("#{}", id)}
                                class={classes!("nav-link", is_active.then(|| "active"))}
                                aria-current={if is_active { "true" } else { "false" }}
                                {onclick}
                            >
                                { item.label.clone() }
                            </a>
                        }
                    }) }
                </div>
            </div>
        </nav>
    }
}

/// The logo jumps to the first section and carries its label
fn logo_target(items: &[NavItem]) -> Option<(String, String)> {
    items
        .first()
        .map(|item| (item.id.to_string(), item.label.clone()))
}

fn header_classes(scroll: &ScrollMetrics, menu_open: bool) -> Classes {
    let hidden =
        scroll.direction == ScrollDirection::Down && scroll.scroll_y > HIDE_AFTER_PX && !menu_open;
    classes!(
        "top-nav",
        scroll.is_at_top.then(|| "at-top"),
        scroll.is_scrolled.then(|| "scrolled"),
        hidden.then(|| "nav-hidden"),
    )
}

/// `None` when the press cannot be placed, e.g. the header is not mounted
fn pressed_inside(nav: &NodeRef, event: &Event) -> Option<bool> {
    let nav = nav.cast::<Node>()?;
    let target = event.target()?.dyn_into::<Node>().ok()?;
    Some(nav.contains(Some(&target)))
}

fn press_closes_menu(inside: Option<bool>) -> bool {
    inside == Some(false)
}
