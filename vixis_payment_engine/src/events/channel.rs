//! Simple stateless pub-sub event handler
//!
//! This module lets components of the system subscribe to payment engine events and react to them.
//! Handlers are stateless: they receive the event, and nothing else. They may be async, and each
//! event is handled on its own spawned task, so a slow or failing handler can never block the
//! request path that produced the event.
use std::{future::Future, pin::Pin, sync::Arc};

use log::*;
use tokio::{sync::mpsc, task::JoinSet};

pub type Handler<E> = Arc<dyn Fn(E) -> Pin<Box<dyn Future<Output = ()> + Send>> + Send + Sync>;

pub struct EventHandler<E: Send + Sync + 'static> {
    listener: mpsc::Receiver<E>,
    sender: mpsc::Sender<E>,
    handler: Handler<E>,
}

impl<E: Send + Sync + 'static> EventHandler<E> {
    pub fn new(buffer_size: usize, handler: Handler<E>) -> Self {
        let (sender, receiver) = mpsc::channel(buffer_size);
        Self { listener: receiver, sender, handler }
    }

    pub fn subscribe(&self) -> EventProducer<E> {
        EventProducer::new(self.sender.clone())
    }

    pub async fn start_handler(mut self) {
        debug!("📬️ Starting event handler");
        // Drop the internal sender so the receive loop ends once the last producer is gone.
        drop(self.sender);
        let mut in_flight = JoinSet::new();
        loop {
            tokio::select! {
                event = self.listener.recv() => match event {
                    Some(ev) => {
                        trace!("📬️ Handling event");
                        let handler = Arc::clone(&self.handler);
                        in_flight.spawn(async move {
                            (handler)(ev).await;
                            trace!("📬️ Event handled");
                        });
                    },
                    None => break,
                },
                // Reap completed handler tasks as we go, so the set does not accumulate results.
                Some(finished) = in_flight.join_next(), if !in_flight.is_empty() => {
                    if let Err(e) = finished {
                        warn!("📬️ An event handler task failed: {e}");
                    }
                },
            }
        }
        if !in_flight.is_empty() {
            debug!("📬️ No more producers. Draining {} in-flight handler(s).", in_flight.len());
        }
        while let Some(finished) = in_flight.join_next().await {
            if let Err(e) = finished {
                warn!("📬️ An event handler task failed: {e}");
            }
        }
        debug!("📬️ Event handler has shut down");
    }
}

#[derive(Clone)]
pub struct EventProducer<E: Send + Sync> {
    sender: mpsc::Sender<E>,
}

impl<E: Send + Sync> EventProducer<E> {
    pub fn new(sender: mpsc::Sender<E>) -> Self {
        Self { sender }
    }

    pub async fn publish_event(&self, event: E) {
        if let Err(e) = self.sender.send(event).await {
            error!("📬️ Failed to send event: {e}");
        }
    }
}
