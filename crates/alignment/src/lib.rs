pub mod advance;
pub mod config;
pub mod index;
pub mod normalize;
pub mod script;
pub mod session;
pub mod tail;
pub mod view;

pub use advance::{AdvanceOutcome, AdvanceReason, advance};
pub use config::AlignConfig;
pub use index::NgramIndex;
pub use normalize::{normalize, normalize_token, spoken_tokens};
pub use script::{Script, ScriptToken};
pub use session::{AlignmentSession, SessionDebug};
pub use tail::SpokenTail;
pub use view::HighlightFrame;
