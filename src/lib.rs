//! Telegram bot that relays text messages to Google Gemini and replies
//! with the generated text. A small HTTP endpoint reports liveness to the
//! hosting platform.

pub mod bot;
pub mod config;
pub mod gemini;
pub mod liveness;
