//! Custom element shell: binds each host element to its own widget.
//!
//! SYSTEM CONTEXT
//! ==============
//! A small JS class forwards `connectedCallback` / `disconnectedCallback` to
//! Rust. Attaching reads the element's attributes, mounts a fresh
//! `FeedPanel` and spawns a connection driver; the returned teardown aborts
//! the driver (closing the socket or cancelling a pending retry) and unmounts
//! the panel. Re-attaching always starts from an empty feed.
//!
//! Tag definitions happen once at startup and are never undone.

use std::cell::RefCell;

use futures::future::{AbortHandle, Abortable};
use leptos::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

use crate::components::feed_panel::FeedPanel;
use crate::config::{BUILTIN_VARIANTS, PageLocation, Variant, WidgetConfig};
use crate::net::driver;
use crate::net::link::Link;
use crate::registry::{Registry, RegistryError};
use crate::state::feed::FeedState;

#[wasm_bindgen(inline_js = r#"
export function defineFeedElement(tag, attach) {
    if (customElements.get(tag)) {
        return false;
    }
    customElements.define(tag, class extends HTMLElement {
        connectedCallback() {
            if (this.__feedTeardown) {
                this.__feedTeardown();
            }
            this.__feedTeardown = attach(this);
        }
        disconnectedCallback() {
            const teardown = this.__feedTeardown;
            this.__feedTeardown = null;
            if (teardown) {
                teardown();
            }
        }
    });
    return true;
}
"#)]
extern "C" {
    #[wasm_bindgen(catch, js_name = defineFeedElement)]
    fn define_feed_element(tag: &str, attach: &js_sys::Function) -> Result<bool, JsValue>;
}

thread_local! {
    static REGISTRY: RefCell<Registry> = RefCell::new(Registry::default());
}

/// Define every built-in widget tag with the document.
pub fn register_builtin() {
    for variant in BUILTIN_VARIANTS {
        match define(variant) {
            Ok(()) => log::debug!("defined <{}>", variant.tag),
            Err(e) => leptos::logging::warn!("{e}"),
        }
    }
}

fn define(variant: Variant) -> Result<(), RegistryError> {
    REGISTRY.with(|registry| registry.borrow().check(&variant))?;

    let on_attach = Closure::<dyn FnMut(web_sys::HtmlElement) -> JsValue>::new(move |host: web_sys::HtmlElement| {
        let teardown = attach(host, variant);
        Closure::once_into_js(teardown)
    });
    match define_feed_element(variant.tag, on_attach.as_ref().unchecked_ref()) {
        Ok(true) => {
            // Lives as long as the tag definition, i.e. the page.
            on_attach.forget();
            REGISTRY.with(|registry| registry.borrow_mut().define(&variant))
        }
        Ok(false) => Err(RegistryError::AlreadyDefined(variant.tag)),
        Err(e) => Err(RegistryError::Rejected { tag: variant.tag, reason: format!("{e:?}") }),
    }
}

/// Start a widget on `host`; returns its teardown.
fn attach(host: web_sys::HtmlElement, variant: Variant) -> impl FnOnce() + 'static {
    let config = WidgetConfig::from_attrs(|name| host.get_attribute(name), &page_location());
    let channel = config.channel.clone();
    log::debug!("<{}> attached to channel {channel}", variant.tag);

    let feed = RwSignal::new(FeedState::with_cap(config.history_cap));
    let link = Link::new(config.channel.clone(), &config.endpoint, config.policy);

    host.set_inner_html("");
    let view = {
        let channel = config.channel;
        let endpoint = config.endpoint;
        leptos::mount::mount_to(host, move || {
            view! { <FeedPanel feed=feed channel=channel endpoint=endpoint variant=variant/> }
        })
    };

    let (abort, registration) = AbortHandle::new_pair();
    leptos::task::spawn_local(async move {
        let _ = Abortable::new(driver::run(link, feed), registration).await;
    });

    move || {
        abort.abort();
        drop(view);
        feed.dispose();
        log::debug!("<{}> detached from channel {channel}", variant.tag);
    }
}

fn page_location() -> PageLocation {
    let location = web_sys::window().map(|w| w.location());
    PageLocation {
        host: location.as_ref().and_then(|l| l.host().ok()),
        secure: location
            .and_then(|l| l.protocol().ok())
            .is_some_and(|p| p == "https:"),
    }
}
