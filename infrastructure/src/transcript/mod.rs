//! Transcript persistence — append-only JSONL.
//!
//! Provides [`JsonlTranscriptStore`], which implements the
//! [`TranscriptStore`](divebar_application::TranscriptStore) port, and
//! [`JsonlTranscriptReader`], which implements
//! [`TranscriptReader`](divebar_application::TranscriptReader) for
//! `dive-bar analyze`.
//!
//! | `type` | Fields besides `type`, `timestamp`, `session_id` |
//! |--------|--------------------------------------------------|
//! | `session_start` | `bar_name`, `agent_count`, `config_hash` |
//! | `utterance` | `turn_number`, `speaker`, `content`, generation metrics |
//! | `regeneration` | `turn_number`, `speaker`, `attempt_count` |
//! | `session_end` | |

mod jsonl_store;
mod reader;

pub use jsonl_store::JsonlTranscriptStore;
pub use reader::JsonlTranscriptReader;
