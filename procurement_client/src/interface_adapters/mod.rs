// Interface adapters: HTTP facade, problem decoding, and the wire protocol.

pub mod clients;
pub mod endpoints;
pub mod problem;
pub mod protocol;
