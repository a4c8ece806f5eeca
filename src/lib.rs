//! Backend for the Vailite landing site: localized content with an admin
//! editor, lead capture forms and the AI text-adventure demo.

pub mod adventure;
pub mod config;
pub mod content;
pub mod i18n;
pub mod leads;
pub mod openai;
pub mod publish;
pub mod retry;
pub mod security;
pub mod server;
