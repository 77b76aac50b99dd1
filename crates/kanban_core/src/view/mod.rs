//! Read models assembled from repository read primitives.

pub mod board_view;
