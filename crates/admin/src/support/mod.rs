#![forbid(unsafe_code)]

mod args;
mod envelope;
mod jsonrpc;
mod time;

pub(crate) use args::*;
pub(crate) use envelope::*;
pub(crate) use jsonrpc::*;
pub(crate) use time::*;
