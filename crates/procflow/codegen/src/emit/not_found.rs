//! Not-found fallbacks
//!
//! A message whose instance has already finished, expired or never
//! existed is recorded and dropped. It is never an error.

use crate::ir::{MessageDef, MessageKind, NotFoundFallback};
use std::collections::BTreeMap;

/// One fallback per inbound message kind the process declares
pub fn emit(messages: &[MessageDef]) -> Vec<NotFoundFallback> {
    let mut by_kind: BTreeMap<MessageKind, Vec<String>> = BTreeMap::new();
    for message in messages.iter().filter(|m| m.kind.is_inbound()) {
        by_kind
            .entry(message.kind)
            .or_default()
            .push(message.name.clone());
    }
    by_kind
        .into_iter()
        .map(|(kind, messages)| NotFoundFallback { kind, messages })
        .collect()
}
