//! # Canned Replies
//!
//! File: cli/src/resolver/canned.rs
//!
//! Fixed answers for trivial phrases (identity, well-being, greetings) so they
//! never reach the external lookups. Matching is case-insensitive; greetings
//! must match a whole message, the other phrases may appear anywhere in it.

use super::{Query, Strategy};
use crate::core::error::Result;
use async_trait::async_trait;
use rand::seq::SliceRandom;

pub const IDENTITY_REPLY: &str = "I'm A.S.I.A 🤖, your intelligent assistant developed by Pixel Studio. I can answer almost anything!";
pub const WELL_BEING_REPLY: &str = "I'm doing great 😄 and ready to help you. What do you want to know?";

/// Whole-message greetings.
pub const GREETING_WORDS: &[&str] = &["hi", "hii", "hiii", "hey", "hello", "hola"];

/// One of these is picked at random for a greeting.
pub const GREETING_REPLIES: &[&str] = &["Hey 👋", "Hi there!", "Hello!", "Hey, how can I help?"];

/// Returns the canned reply for `folded` (an already lower-cased message), if any.
pub fn canned_reply(folded: &str) -> Option<String> {
    if folded.contains("who are you") || folded.contains("your name") {
        return Some(IDENTITY_REPLY.to_string());
    }
    if folded.contains("how are you") {
        return Some(WELL_BEING_REPLY.to_string());
    }
    if GREETING_WORDS.contains(&folded) {
        return GREETING_REPLIES
            .choose(&mut rand::thread_rng())
            .map(|reply| reply.to_string());
    }
    None
}

/// The canned-pattern step of the cascade.
pub struct CannedReplies;

#[async_trait]
impl Strategy for CannedReplies {
    fn name(&self) -> &'static str {
        "canned"
    }

    async fn answer(&self, query: &Query) -> Result<Option<String>> {
        Ok(canned_reply(query.folded()))
    }
}
