// Design brief interpretation.
// Implements: keyword resolution, operation planning, script rendering.
// Resolution is pure; everything downstream of it reports failures as
// generation errors carrying the brief.

pub mod catalog;
pub mod domain;
pub mod handlers;
pub mod interpreter;
pub mod operations;
pub mod params;
pub mod resolver;
pub mod script;
