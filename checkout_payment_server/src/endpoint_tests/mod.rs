mod auth;
mod orders;
mod webhook;
