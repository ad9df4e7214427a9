pub mod app;
pub mod download;
pub mod preview;
pub mod upload;

use anonpy_fetch::{ReqwestClient, ResourceClient};

use crate::settings::Effective;

/// What every subcommand runs against.
pub struct Ctx {
    pub client:   ResourceClient<ReqwestClient>,
    pub settings: Effective,
}
