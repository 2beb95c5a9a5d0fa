//! Browser websocket driver for a widget's [`Link`].
//!
//! One driver task runs per widget instance and owns that instance's `Link`,
//! so a scheduled reconnect always acts on the widget that scheduled it. The
//! task never ends on its own; the element shell aborts it on detach, which
//! drops the open socket or the pending retry timer.
//!
//! ERROR HANDLING
//! ==============
//! Open failures, transport errors and closes are all fed to the `Link` as
//! termination events. Nothing here is surfaced to the UI.

use std::pin::Pin;

use futures::{Sink, StreamExt};
use gloo_net::websocket::futures::WebSocket;
use gloo_net::websocket::{Message, State, WebSocketError};
use leptos::prelude::{RwSignal, Update};

use super::link::{Attempt, Directive, Link, LinkEvent, RetryPoll};
use crate::state::feed::FeedState;

/// Run the connect / deliver / reconnect loop forever.
pub async fn run(mut link: Link, feed: RwSignal<FeedState>) {
    let mut attempt = link.start();
    loop {
        connect_and_run(&mut link, &attempt, feed).await;
        attempt = wait_for_retry(&mut link).await;
    }
}

/// Sleep until the link's scheduled reconnect is due and start it.
async fn wait_for_retry(link: &mut Link) -> Attempt {
    loop {
        match link.poll_retry(now_ms()) {
            RetryPoll::Due(next) => return next,
            RetryPoll::Pending(wait) => gloo_timers::future::sleep(wait).await,
            RetryPoll::Idle => {
                let wait = link.ensure_retry(now_ms());
                gloo_timers::future::sleep(wait).await;
            }
        }
    }
}

/// Open one connection and pump its events into the link until it terminates.
async fn connect_and_run(link: &mut Link, attempt: &Attempt, feed: RwSignal<FeedState>) {
    let generation = attempt.generation;
    let mut ws = match WebSocket::open(&attempt.url) {
        Ok(ws) => ws,
        Err(e) => {
            link.handle(generation, LinkEvent::Errored(e.to_string()), now_ms());
            return;
        }
    };

    // The sink becomes ready once the handshake settles, either way.
    let ready = futures::future::poll_fn(|cx| Sink::<Message>::poll_ready(Pin::new(&mut ws), cx)).await;
    if ready.is_ok() && matches!(ws.state(), State::Open) {
        link.handle(generation, LinkEvent::Opened, now_ms());
    }

    while let Some(msg) = ws.next().await {
        let event = match msg {
            Ok(Message::Text(text)) => LinkEvent::Message(text),
            Ok(Message::Bytes(bytes)) => LinkEvent::Message(String::from_utf8_lossy(&bytes).into_owned()),
            Err(WebSocketError::ConnectionClose(close)) => LinkEvent::Closed { code: close.code, reason: close.reason },
            Err(e) => LinkEvent::Errored(e.to_string()),
        };
        let terminal = matches!(event, LinkEvent::Errored(_) | LinkEvent::Closed { .. });
        if let Directive::Deliver(payload) = link.handle(generation, event, now_ms()) {
            feed.update(|f| f.push(payload));
        }
        if terminal {
            return;
        }
    }

    link.end_of_stream(generation, now_ms());
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn now_ms() -> u64 {
    js_sys::Date::now().max(0.0) as u64
}
