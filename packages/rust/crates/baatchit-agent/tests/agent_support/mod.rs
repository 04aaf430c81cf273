#![allow(dead_code)]

mod fakes;

#[allow(unused_imports)]
pub use fakes::{
    RecordedCall, ScriptedCompletion, ScriptedSearch, agent_with, search_call, store_with_ttl,
    TEST_SYSTEM_PROMPT,
};
