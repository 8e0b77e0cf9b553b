//! Device Command Protocol
//!
//! Frame limits, instruction vocabulary, command framing and per-kind stage
//! planning.

pub mod apdu;
pub mod frames;
pub mod instructions;
pub mod plan;

pub use apdu::Command;
pub use frames::{split, split_with_path_prefix, MAX_FRAME_LEN, MAX_SCHEDULE_PAIRS_PER_FRAME};
pub use instructions::CLASS;
pub use plan::{build_public_info_plan, build_sign_plan};
