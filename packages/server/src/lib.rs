// AskAI Live - Question Coordination API
//
// Backend for a live event Q&A wall: attendees submit questions, a
// moderation gate screens them, a scheduled worker answers them with an
// LLM, and every lifecycle transition fans out over SignalR to the shared
// display and the question's author.

pub mod config;
pub mod domains;
pub mod kernel;
pub mod server;

pub use config::*;
