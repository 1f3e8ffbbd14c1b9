mod events;
mod helpers;
mod invoices;
mod mocks;
mod rates;
mod webhook;
