/// JSON-RPC 2.0 bridge between the embedding frontend and the viewer.
pub mod web_rpc;
