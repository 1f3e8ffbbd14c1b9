use std::{pin::Pin, sync::Arc};

use crate::events::{EventHandler, EventProducer, Handler, InvoicePaidEvent};

#[derive(Default, Clone)]
pub struct EventProducers {
    pub invoice_paid_producer: Vec<EventProducer<InvoicePaidEvent>>,
}

pub struct EventHandlers {
    pub on_invoice_paid: Option<EventHandler<InvoicePaidEvent>>,
}

impl EventHandlers {
    pub fn new(buffer_size: usize, hooks: EventHooks) -> Self {
        let on_invoice_paid = hooks.on_invoice_paid.map(|f| EventHandler::new(buffer_size, f));
        Self { on_invoice_paid }
    }

    pub fn producers(&self) -> EventProducers {
        let mut result = EventProducers::default();
        if let Some(handler) = &self.on_invoice_paid {
            result.invoice_paid_producer.push(handler.subscribe());
        }
        result
    }

    pub async fn start_handlers(self) {
        if let Some(handler) = self.on_invoice_paid {
            tokio::spawn(async move {
                handler.start_handler().await;
            });
        }
    }
}

#[derive(Default, Clone)]
pub struct EventHooks {
    pub on_invoice_paid: Option<Handler<InvoicePaidEvent>>,
}

impl EventHooks {
    pub fn on_invoice_paid<F>(&mut self, f: F) -> &mut Self
    where F: (Fn(InvoicePaidEvent) -> Pin<Box<dyn std::future::Future<Output = ()> + Send>>) + Send + Sync + 'static
    {
        self.on_invoice_paid = Some(Arc::new(f));
        self
    }
}
