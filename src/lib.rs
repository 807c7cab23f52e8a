//! Risk tolerance assessment service: scores the 13-question Grable-Lytton
//! questionnaire, rescales the total onto a 1.0-10.0 risk tier, and maps the
//! tier to a recommended asset allocation. Hosted behind a JSON API and a CLI.

pub mod cli;
pub mod data;
pub mod scoring;
pub mod server;
