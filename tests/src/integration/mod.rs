//! Cross-crate integration flows.

#[cfg(test)]
mod harness;
mod http_flow;
mod offload_flow;
