//! Player pipeline steps
//!
//! Each function here is one named [`Step`](super::pipeline::Step) in the
//! player frame. Steps only touch the [`FrameContext`](super::pipeline::FrameContext)
//! they are given.

pub mod action;
pub mod collision;
pub mod contact;
pub mod movement;
pub mod triggers;
